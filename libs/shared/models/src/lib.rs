pub mod appointment;
pub mod error;

pub use appointment::{
    AppointmentStatus, AppointmentType, CleanAppointment, InsuranceType, RawAppointment,
    VisitModality, DATETIME_COLUMNS, REQUIRED_COLUMNS,
};
pub use error::AppError;
