//! Derives a vehicle's display status from its latest review.

use crate::domain::model::{
    FinalMark, ReviewRecord, StatusCounters, StatusKind, Vehicle, VehicleStatus,
};
use chrono::NaiveDate;

/// Pure function of its inputs; `today` only feeds `reviewed_today`.
///
/// Entries that reference equipment no longer in the vehicle's catalog are
/// ignored when the hierarchy is loaded. A vehicle listed without nested
/// compartments counts every entry.
pub fn derive(vehicle: &Vehicle, latest: Option<&ReviewRecord>, today: NaiveDate) -> VehicleStatus {
    let catalog_items = vehicle
        .has_hierarchy()
        .then(|| vehicle.equipment().count());

    let Some(record) = latest else {
        return VehicleStatus {
            vehicle_id: vehicle.id,
            code: vehicle.code.clone(),
            name: vehicle.name.clone(),
            kind: StatusKind::Pending,
            counters: StatusCounters::default(),
            catalog_items,
            reviewed_at: None,
            responsible: None,
            reviewed_today: false,
        };
    };

    let counters = count_entries(vehicle, record);
    let unmarked = count_unmarked(vehicle, record);

    VehicleStatus {
        vehicle_id: vehicle.id,
        code: vehicle.code.clone(),
        name: vehicle.name.clone(),
        kind: classify(&counters, unmarked),
        counters,
        catalog_items,
        reviewed_at: Some(record.submitted_at),
        responsible: Some(record.responsible.clone()),
        reviewed_today: record.review_date() == today,
    }
}

fn count_entries(vehicle: &Vehicle, record: &ReviewRecord) -> StatusCounters {
    let filter_by_catalog = vehicle.has_hierarchy();
    let mut counters = StatusCounters::default();

    for entry in &record.entries {
        if filter_by_catalog && !vehicle.contains_equipment(entry.equipment_id) {
            tracing::debug!(
                "Ignoring entry for equipment {} no longer in {}",
                entry.equipment_id,
                vehicle.code
            );
            continue;
        }
        counters.expected += 1;
        match entry.mark {
            FinalMark::Present => counters.present += 1,
            FinalMark::Absent => counters.absent += 1,
        }
    }

    counters
}

fn count_unmarked(vehicle: &Vehicle, record: &ReviewRecord) -> usize {
    let filter_by_catalog = vehicle.has_hierarchy();
    record
        .unmarked
        .iter()
        .filter(|&&id| !filter_by_catalog || vehicle.contains_equipment(id))
        .count()
}

/// An absent item wins over unmarked ones; a partial review stays pending.
fn classify(counters: &StatusCounters, unmarked: usize) -> StatusKind {
    if counters.absent > 0 {
        StatusKind::Critical
    } else if counters.expected == 0 || unmarked > 0 {
        StatusKind::Pending
    } else {
        StatusKind::Complete
    }
}
