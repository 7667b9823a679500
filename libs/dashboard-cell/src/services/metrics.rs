// =====================================================================================
// DASHBOARD METRICS
// =====================================================================================

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use shared_models::{AppointmentStatus, AppointmentType, CleanAppointment};

use crate::models::{DashboardMetrics, FilterOptions, GroupBy, GroupMetrics, StatusCounts};
use crate::services::filter::DashboardFilter;

const UNKNOWN_GROUP: &str = "unknown";

/// Median of the values; the mean of the two middle values for an even count.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

fn summarize<'a, I>(records: I) -> DashboardMetrics
where
    I: IntoIterator<Item = &'a CleanAppointment>,
{
    let mut counts = StatusCounts::default();
    let mut volume = 0usize;
    let mut lead_times = Vec::new();
    let mut wait_times = Vec::new();
    let mut durations = Vec::new();
    let mut negative_duration_count = 0usize;

    for record in records {
        volume += 1;
        counts.record(record.status);

        if let Some(lead) = record.lead_time_minutes {
            lead_times.push(lead);
        }
        if let Some(wait) = record.wait_time_minutes {
            wait_times.push(wait);
        }
        match record.visit_duration_minutes {
            Some(duration) if duration < 0.0 => negative_duration_count += 1,
            Some(duration) => durations.push(duration),
            None => {}
        }
    }

    DashboardMetrics {
        volume,
        completion_rate: counts.rate(counts.completed),
        cancellation_rate: counts.rate(counts.canceled),
        no_show_rate: counts.rate(counts.no_show),
        rescheduled_rate: counts.rate(counts.rescheduled),
        status_counts: counts,
        median_lead_time_minutes: median(&mut lead_times),
        median_wait_time_minutes: median(&mut wait_times),
        median_visit_duration_minutes: median(&mut durations),
        negative_duration_count,
    }
}

pub fn compute_metrics(records: &[CleanAppointment], filter: &DashboardFilter) -> DashboardMetrics {
    let metrics = summarize(filter.apply(records));
    debug!("Computed metrics over {} of {} appointments", metrics.volume, records.len());
    metrics
}

fn group_key(record: &CleanAppointment, group_by: GroupBy) -> String {
    let key = match group_by {
        GroupBy::Clinic => record.clinic_id.clone(),
        GroupBy::Provider => record.provider_id.clone(),
        GroupBy::AppointmentType => record.appointment_type.map(|t| t.to_string()),
        GroupBy::VisitModality => record.visit_modality.map(|m| m.to_string()),
        GroupBy::InsuranceType => record.insurance_type.map(|i| i.to_string()),
        GroupBy::Day => record.scheduled_date().map(|d| d.format("%Y-%m-%d").to_string()),
    };
    key.unwrap_or_else(|| UNKNOWN_GROUP.to_string())
}

/// Metrics per group, ordered by group key. Rows lacking the key land in
/// `"unknown"`.
pub fn compute_breakdown(
    records: &[CleanAppointment],
    filter: &DashboardFilter,
    group_by: GroupBy,
) -> Vec<GroupMetrics> {
    let mut groups: BTreeMap<String, Vec<&CleanAppointment>> = BTreeMap::new();
    for record in filter.apply(records) {
        groups.entry(group_key(record, group_by)).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(key, members)| GroupMetrics {
            key,
            metrics: summarize(members),
        })
        .collect()
}

pub fn filter_options(records: &[CleanAppointment]) -> FilterOptions {
    let mut clinics = BTreeSet::new();
    let mut providers = BTreeSet::new();
    let mut appointment_types: BTreeSet<AppointmentType> = BTreeSet::new();
    let mut statuses: BTreeSet<AppointmentStatus> = BTreeSet::new();

    for record in records {
        if let Some(clinic) = &record.clinic_id {
            clinics.insert(clinic.clone());
        }
        if let Some(provider) = &record.provider_id {
            providers.insert(provider.clone());
        }
        appointment_types.extend(record.appointment_type);
        statuses.extend(record.status);
    }

    let dates = records.iter().filter_map(CleanAppointment::scheduled_date);

    FilterOptions {
        clinics: clinics.into_iter().collect(),
        providers: providers.into_iter().collect(),
        appointment_types: appointment_types.into_iter().collect(),
        statuses: statuses.into_iter().collect(),
        first_scheduled_date: dates.clone().min(),
        last_scheduled_date: dates.max(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared_models::{InsuranceType, VisitModality};

    fn record(
        id: &str,
        clinic: &str,
        status: Option<AppointmentStatus>,
        lead: Option<f64>,
        wait: Option<f64>,
        duration: Option<f64>,
    ) -> CleanAppointment {
        CleanAppointment {
            appointment_id: id.into(),
            clinic_id: Some(clinic.into()),
            scheduled_start: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap().and_hms_opt(9, 0, 0),
            status,
            lead_time_minutes: lead,
            wait_time_minutes: wait,
            visit_duration_minutes: duration,
            ..Default::default()
        }
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [5.0]), Some(5.0));
        assert_eq!(median(&mut [9.0, 1.0, 5.0]), Some(5.0));
        assert_eq!(median(&mut [4.0, -2.0, 10.0, 2.0]), Some(3.0));
    }

    #[test]
    fn test_rates_use_known_statuses() {
        let records = vec![
            record("1", "A", Some(AppointmentStatus::Completed), None, None, None),
            record("2", "A", Some(AppointmentStatus::Completed), None, None, None),
            record("3", "A", Some(AppointmentStatus::NoShow), None, None, None),
            record("4", "A", Some(AppointmentStatus::Canceled), None, None, None),
            record("5", "A", None, None, None, None),
        ];

        let metrics = compute_metrics(&records, &DashboardFilter::default());

        assert_eq!(metrics.volume, 5);
        assert_eq!(metrics.status_counts.unknown, 1);
        assert_eq!(metrics.completion_rate, Some(0.5));
        assert_eq!(metrics.no_show_rate, Some(0.25));
        assert_eq!(metrics.cancellation_rate, Some(0.25));
        assert_eq!(metrics.rescheduled_rate, Some(0.0));
    }

    #[test]
    fn test_empty_selection() {
        let metrics = compute_metrics(&[], &DashboardFilter::default());

        assert_eq!(metrics.volume, 0);
        assert_eq!(metrics.completion_rate, None);
        assert_eq!(metrics.median_lead_time_minutes, None);
    }

    #[test]
    fn test_negative_durations_are_excluded() {
        let records = vec![
            record("1", "A", None, Some(100.0), Some(-5.0), Some(30.0)),
            record("2", "A", None, Some(-10.0), Some(15.0), Some(-20.0)),
            record("3", "A", None, None, None, Some(50.0)),
        ];

        let metrics = compute_metrics(&records, &DashboardFilter::default());

        assert_eq!(metrics.median_lead_time_minutes, Some(45.0));
        assert_eq!(metrics.median_wait_time_minutes, Some(5.0));
        assert_eq!(metrics.median_visit_duration_minutes, Some(40.0));
        assert_eq!(metrics.negative_duration_count, 1);
    }

    #[test]
    fn test_breakdown_by_clinic() {
        let mut orphan = record("4", "X", Some(AppointmentStatus::Completed), None, None, None);
        orphan.clinic_id = None;
        let records = vec![
            record("1", "B", Some(AppointmentStatus::Completed), None, None, None),
            record("2", "A", Some(AppointmentStatus::Canceled), None, None, None),
            record("3", "B", Some(AppointmentStatus::NoShow), None, None, None),
            orphan,
        ];

        let groups = compute_breakdown(&records, &DashboardFilter::default(), GroupBy::Clinic);

        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["A", "B", "unknown"]);
        assert_eq!(groups[1].metrics.volume, 2);
        assert_eq!(groups[1].metrics.completion_rate, Some(0.5));
    }

    fn keys(records: &[CleanAppointment], group_by: GroupBy) -> Vec<(String, usize)> {
        compute_breakdown(records, &DashboardFilter::default(), group_by)
            .into_iter()
            .map(|g| (g.key, g.metrics.volume))
            .collect()
    }

    fn owned(pairs: &[(&str, usize)]) -> Vec<(String, usize)> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn varied() -> Vec<CleanAppointment> {
        let mut first = record("1", "A", None, None, None, None);
        first.provider_id = Some("PR-2".into());
        first.appointment_type = Some(AppointmentType::MedCheck);
        first.visit_modality = Some(VisitModality::Telehealth);
        first.insurance_type = Some(InsuranceType::SelfPay);

        let mut second = record("2", "A", None, None, None, None);
        second.provider_id = Some("PR-1".into());
        second.appointment_type = Some(AppointmentType::MedCheck);
        second.visit_modality = Some(VisitModality::InPerson);
        second.insurance_type = Some(InsuranceType::Medicaid);
        second.scheduled_start = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(23, 59, 0);

        let mut third = record("3", "A", None, None, None, None);
        third.scheduled_start = None;

        vec![first, second, third]
    }

    #[test]
    fn test_breakdown_by_provider() {
        assert_eq!(
            keys(&varied(), GroupBy::Provider),
            owned(&[("PR-1", 1), ("PR-2", 1), ("unknown", 1)])
        );
    }

    #[test]
    fn test_breakdown_by_appointment_type() {
        assert_eq!(
            keys(&varied(), GroupBy::AppointmentType),
            owned(&[("med_check", 2), ("unknown", 1)])
        );
    }

    #[test]
    fn test_breakdown_by_visit_modality() {
        assert_eq!(
            keys(&varied(), GroupBy::VisitModality),
            owned(&[("in_person", 1), ("telehealth", 1), ("unknown", 1)])
        );
    }

    #[test]
    fn test_breakdown_by_insurance_type() {
        assert_eq!(
            keys(&varied(), GroupBy::InsuranceType),
            owned(&[("medicaid", 1), ("self_pay", 1), ("unknown", 1)])
        );
    }

    #[test]
    fn test_breakdown_by_day() {
        let mut records = varied();
        records.push(record("4", "B", None, None, None, None));

        assert_eq!(
            keys(&records, GroupBy::Day),
            owned(&[("2024-03-04", 2), ("2024-03-05", 1), ("unknown", 1)])
        );
    }

    #[test]
    fn test_group_by_parses_aliases() {
        assert_eq!("Clinic_ID".parse::<GroupBy>().unwrap(), GroupBy::Clinic);
        assert_eq!(" date ".parse::<GroupBy>().unwrap(), GroupBy::Day);
        assert_eq!("insurance_type".parse::<GroupBy>().unwrap(), GroupBy::InsuranceType);
        assert!("weather".parse::<GroupBy>().is_err());
    }

    #[test]
    fn test_filter_options() {
        let mut other = record("2", "A", Some(AppointmentStatus::Completed), None, None, None);
        other.scheduled_start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap().and_hms_opt(8, 0, 0);
        other.appointment_type = Some(AppointmentType::Intake);
        let records = vec![
            record("1", "B", Some(AppointmentStatus::NoShow), None, None, None),
            other,
        ];

        let options = filter_options(&records);

        assert_eq!(options.clinics, vec!["A", "B"]);
        assert_eq!(options.appointment_types, vec![AppointmentType::Intake]);
        assert_eq!(
            options.statuses,
            vec![AppointmentStatus::Completed, AppointmentStatus::NoShow]
        );
        assert_eq!(options.first_scheduled_date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(options.last_scheduled_date, NaiveDate::from_ymd_opt(2024, 3, 4));
    }
}
