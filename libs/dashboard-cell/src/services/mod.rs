pub mod filter;
pub mod metrics;
