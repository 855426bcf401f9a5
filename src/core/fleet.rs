//! Folds per-vehicle statuses into the daily fleet completion signal.

use crate::domain::model::{StatusKind, VehicleStatus};
use chrono::NaiveDate;
use serde::Serialize;

/// True iff the fleet is non-empty and every vehicle has a non-pending
/// status from a record dated `today` whose responsible equals
/// `responsible` exactly.
pub fn is_fleet_complete(statuses: &[VehicleStatus], today: NaiveDate, responsible: &str) -> bool {
    !statuses.is_empty()
        && statuses
            .iter()
            .all(|status| is_done_for(status, today, responsible))
}

fn is_done_for(status: &VehicleStatus, today: NaiveDate, responsible: &str) -> bool {
    status.kind != StatusKind::Pending
        && status.review_date() == Some(today)
        && status.responsible.as_deref() == Some(responsible)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    pub date: NaiveDate,
    pub responsible: String,
    pub vehicles: usize,
    pub complete: usize,
    pub critical: usize,
    pub pending: usize,
    /// Codes of vehicles still lacking today's review by `responsible`.
    pub outstanding: Vec<String>,
    pub fleet_complete: bool,
}

pub fn summarize(statuses: &[VehicleStatus], today: NaiveDate, responsible: &str) -> FleetSummary {
    let count = |kind: StatusKind| statuses.iter().filter(|s| s.kind == kind).count();
    let outstanding = statuses
        .iter()
        .filter(|s| !is_done_for(s, today, responsible))
        .map(|s| s.code.clone())
        .collect();

    let summary = FleetSummary {
        date: today,
        responsible: responsible.to_string(),
        vehicles: statuses.len(),
        complete: count(StatusKind::Complete),
        critical: count(StatusKind::Critical),
        pending: count(StatusKind::Pending),
        outstanding,
        fleet_complete: is_fleet_complete(statuses, today, responsible),
    };

    tracing::info!(
        "Fleet on {} for '{}': {}/{} done, {} critical",
        today,
        responsible,
        summary.vehicles - summary.outstanding.len(),
        summary.vehicles,
        summary.critical
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::StatusCounters;
    use chrono::DateTime;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn status(id: i64, kind: StatusKind, responsible: Option<&str>, at: Option<&str>) -> VehicleStatus {
        VehicleStatus {
            vehicle_id: id,
            code: format!("V{}", id),
            name: None,
            kind,
            counters: StatusCounters::default(),
            catalog_items: None,
            reviewed_at: at.map(|a| DateTime::parse_from_rfc3339(a).unwrap()),
            responsible: responsible.map(str::to_string),
            reviewed_today: false,
        }
    }

    const TODAY: &str = "2026-03-03T10:00:00-03:00";
    const YESTERDAY: &str = "2026-03-02T10:00:00-03:00";

    #[test]
    fn test_empty_fleet_is_never_complete() {
        assert!(!is_fleet_complete(&[], day("2026-03-03"), "Grupo 2"));
    }

    #[test]
    fn test_all_vehicles_done_today() {
        let statuses = vec![
            status(1, StatusKind::Complete, Some("Grupo 2"), Some(TODAY)),
            status(2, StatusKind::Critical, Some("Grupo 2"), Some(TODAY)),
        ];
        assert!(is_fleet_complete(&statuses, day("2026-03-03"), "Grupo 2"));
    }

    #[test]
    fn test_one_vehicle_missing_today() {
        let statuses = vec![
            status(1, StatusKind::Complete, Some("Grupo 2"), Some(TODAY)),
            status(2, StatusKind::Pending, None, None),
        ];
        assert!(!is_fleet_complete(&statuses, day("2026-03-03"), "Grupo 2"));
    }

    #[test]
    fn test_yesterdays_record_does_not_count() {
        let statuses = vec![
            status(1, StatusKind::Complete, Some("Grupo 2"), Some(TODAY)),
            status(2, StatusKind::Complete, Some("Grupo 2"), Some(YESTERDAY)),
        ];
        assert!(!is_fleet_complete(&statuses, day("2026-03-03"), "Grupo 2"));
    }

    #[test]
    fn test_responsible_must_match_exactly() {
        let statuses = vec![
            status(1, StatusKind::Complete, Some("Grupo 2"), Some(TODAY)),
            status(2, StatusKind::Complete, Some("grupo 2"), Some(TODAY)),
        ];
        assert!(!is_fleet_complete(&statuses, day("2026-03-03"), "Grupo 2"));

        let other = vec![status(1, StatusKind::Complete, Some("Grupo 1"), Some(TODAY))];
        assert!(!is_fleet_complete(&other, day("2026-03-03"), "Grupo 2"));
    }

    #[test]
    fn test_pending_status_with_record_is_not_done() {
        let statuses = vec![status(1, StatusKind::Pending, Some("Grupo 2"), Some(TODAY))];
        assert!(!is_fleet_complete(&statuses, day("2026-03-03"), "Grupo 2"));
    }

    #[test]
    fn test_evaluation_order_does_not_matter() {
        let mut statuses = vec![
            status(1, StatusKind::Complete, Some("Grupo 2"), Some(TODAY)),
            status(2, StatusKind::Critical, Some("Grupo 2"), Some(TODAY)),
            status(3, StatusKind::Complete, Some("Grupo 2"), Some(YESTERDAY)),
        ];
        let forward = summarize(&statuses, day("2026-03-03"), "Grupo 2");
        statuses.reverse();
        let backward = summarize(&statuses, day("2026-03-03"), "Grupo 2");
        assert_eq!(forward.fleet_complete, backward.fleet_complete);
        assert_eq!(forward.complete, backward.complete);
        assert_eq!(forward.outstanding, vec!["V3".to_string()]);
    }

    #[test]
    fn test_summary_counts() {
        let statuses = vec![
            status(1, StatusKind::Complete, Some("Grupo 2"), Some(TODAY)),
            status(2, StatusKind::Critical, Some("Grupo 2"), Some(TODAY)),
            status(3, StatusKind::Pending, None, None),
        ];
        let summary = summarize(&statuses, day("2026-03-03"), "Grupo 2");
        assert_eq!(summary.vehicles, 3);
        assert_eq!(summary.complete, 1);
        assert_eq!(summary.critical, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.outstanding, vec!["V3".to_string()]);
        assert!(!summary.fleet_complete);
    }
}
