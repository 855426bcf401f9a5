//! Submission gate: turns a finished draft into an immutable review record.

use crate::core::draft::ReviewDraft;
use crate::domain::model::{FinalMark, ReviewEntry, ReviewRecord};
use crate::domain::ports::InventoryStore;
use crate::utils::error::{InventoryError, Result};
use chrono::{DateTime, FixedOffset};

/// Validates `draft` and builds the record without contacting the store.
///
/// A blank responsible fails with [`InventoryError::MissingResponsible`]
/// before marks are looked at. Any unset line fails with
/// [`InventoryError::Rejected`] carrying the number of unset lines.
pub fn prepare(
    draft: &ReviewDraft,
    responsible: &str,
    now: DateTime<FixedOffset>,
) -> Result<ReviewRecord> {
    if responsible.trim().is_empty() {
        return Err(InventoryError::MissingResponsible);
    }

    let unset_count = draft.unset_count();
    if unset_count > 0 {
        return Err(InventoryError::Rejected { unset_count });
    }

    let entries = draft
        .lines()
        .iter()
        .filter_map(|line| {
            FinalMark::from_mark(line.mark).map(|mark| ReviewEntry {
                equipment_id: line.item.equipment_id,
                mark,
                note: line.note.clone(),
            })
        })
        .collect();

    Ok(ReviewRecord {
        id: None,
        vehicle_id: draft.vehicle_id(),
        responsible: responsible.to_string(),
        submitted_at: now,
        general_note: draft.general_note().to_string(),
        entries,
        unmarked: Vec::new(),
    })
}

/// Validates and hands the record to the store.
///
/// Store failures are returned unchanged. The draft is only borrowed, so a
/// failed submission leaves it exactly as it was for a retry.
pub async fn submit<S>(
    store: &S,
    draft: &ReviewDraft,
    responsible: &str,
    now: DateTime<FixedOffset>,
) -> Result<ReviewRecord>
where
    S: InventoryStore + ?Sized,
{
    let record = match prepare(draft, responsible, now) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("Review of {} not submitted: {}", draft.vehicle_code(), e);
            return Err(e);
        }
    };

    let created = store.create_review(&record).await?;
    tracing::info!(
        "Review of {} saved by '{}' ({} item(s), {} absent)",
        draft.vehicle_code(),
        created.responsible,
        created.entries.len(),
        draft.absent_count()
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::draft::tests::vehicle_with_items;
    use crate::domain::model::ReviewMark;

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-03-02T08:30:00-03:00").unwrap()
    }

    #[test]
    fn test_one_unset_item_rejects() {
        let mut draft = ReviewDraft::begin(&vehicle_with_items(1, "V1", &[1, 2, 3]));
        draft.set_mark(1, ReviewMark::Present).unwrap();
        draft.set_mark(2, ReviewMark::Present).unwrap();

        let err = prepare(&draft, "Grupo 1", now()).unwrap_err();
        assert!(matches!(err, InventoryError::Rejected { unset_count: 1 }));
    }

    #[test]
    fn test_untouched_draft_reports_all_unset() {
        let draft = ReviewDraft::begin(&vehicle_with_items(1, "V1", &[1, 2, 3, 4]));
        let err = prepare(&draft, "Grupo 1", now()).unwrap_err();
        assert!(matches!(err, InventoryError::Rejected { unset_count: 4 }));
    }

    #[test]
    fn test_blank_responsible_fails_even_when_complete() {
        let mut draft = ReviewDraft::begin(&vehicle_with_items(1, "V1", &[1, 2]));
        draft.mark_all(ReviewMark::Present);

        for responsible in ["", "   ", "\t"] {
            let err = prepare(&draft, responsible, now()).unwrap_err();
            assert!(matches!(err, InventoryError::MissingResponsible));
        }
    }

    #[test]
    fn test_blank_responsible_checked_before_marks() {
        let draft = ReviewDraft::begin(&vehicle_with_items(1, "V1", &[1, 2]));
        let err = prepare(&draft, "", now()).unwrap_err();
        assert!(matches!(err, InventoryError::MissingResponsible));
    }

    #[test]
    fn test_record_copies_marks_and_notes_verbatim() {
        let mut draft = ReviewDraft::begin(&vehicle_with_items(7, "ATI-01", &[1, 2, 3]));
        draft.set_mark(1, ReviewMark::Present).unwrap();
        draft.set_mark(2, ReviewMark::Absent).unwrap();
        draft.set_mark(3, ReviewMark::Present).unwrap();
        draft.set_note(2, "  missing since Friday ").unwrap();
        draft.set_general_note("Tyres checked");

        let record = prepare(&draft, "Grupo 3", now()).unwrap();

        assert_eq!(record.id, None);
        assert_eq!(record.vehicle_id, 7);
        assert_eq!(record.responsible, "Grupo 3");
        assert_eq!(record.submitted_at, now());
        assert_eq!(record.general_note, "Tyres checked");
        let marks: Vec<_> = record.entries.iter().map(|e| e.mark).collect();
        assert_eq!(
            marks,
            vec![FinalMark::Present, FinalMark::Absent, FinalMark::Present]
        );
        assert_eq!(record.entries[1].note, "  missing since Friday ");
    }

    #[test]
    fn test_empty_vehicle_submits_empty_record() {
        let draft = ReviewDraft::begin(&vehicle_with_items(3, "UFI-01", &[]));
        let record = prepare(&draft, "Grupo 1", now()).unwrap();
        assert!(record.entries.is_empty());
    }
}
