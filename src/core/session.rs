//! Presentation-facing review session.
//!
//! One draft is active at a time. Every draft gets a generation number;
//! a load or submission that resolves after its generation was replaced
//! (another vehicle was opened, or the review was abandoned) comes back as
//! [`Outcome::Superseded`] and leaves the session untouched.

use crate::core::catalog::CatalogCache;
use crate::core::draft::ReviewDraft;
use crate::core::fleet::{self, FleetSummary};
use crate::core::{gate, status};
use crate::domain::model::{
    EquipmentId, ReviewMark, ReviewRecord, VehicleId, VehicleStatus,
};
use crate::domain::ports::InventoryStore;
use crate::utils::error::{InventoryError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Applied(T),
    /// The response belonged to a draft that is no longer active.
    Superseded,
}

impl<T> Outcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(value) => Some(value),
            Outcome::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Outcome::Superseded)
    }
}

#[derive(Debug, Default)]
struct SessionState {
    generation: u64,
    draft: Option<ReviewDraft>,
}

pub struct InventorySession<S: InventoryStore + ?Sized> {
    catalog: CatalogCache<S>,
    state: Mutex<SessionState>,
}

impl<S: InventoryStore + ?Sized> InventorySession<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            catalog: CatalogCache::new(store),
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn catalog(&self) -> &CatalogCache<S> {
        &self.catalog
    }

    /// Starts a fresh screen load: cached catalog data is dropped.
    pub async fn refresh(&self) {
        self.catalog.invalidate().await;
    }

    /// Abandons any active draft and opens a new one for `vehicle_id`.
    pub async fn begin_review(&self, vehicle_id: VehicleId) -> Result<Outcome<ReviewDraft>> {
        let ticket = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            state.draft = None;
            state.generation
        };

        let loaded = self.catalog.load(vehicle_id).await;

        let mut state = self.state.lock().await;
        if state.generation != ticket {
            tracing::warn!("Discarding catalog load for superseded review of vehicle {}", vehicle_id);
            return Ok(Outcome::Superseded);
        }

        let draft = ReviewDraft::begin(&loaded?);
        state.draft = Some(draft.clone());
        Ok(Outcome::Applied(draft))
    }

    /// Snapshot of the active draft.
    pub async fn draft(&self) -> Option<ReviewDraft> {
        self.state.lock().await.draft.clone()
    }

    pub async fn set_mark(&self, equipment_id: EquipmentId, mark: ReviewMark) -> Result<()> {
        let mut state = self.state.lock().await;
        active_draft(&mut state)?.set_mark(equipment_id, mark)
    }

    /// Marks every line of the active draft at once.
    pub async fn mark_all(&self, mark: ReviewMark) -> Result<()> {
        let mut state = self.state.lock().await;
        active_draft(&mut state)?.mark_all(mark);
        Ok(())
    }

    pub async fn set_note(&self, equipment_id: EquipmentId, text: impl Into<String>) -> Result<()> {
        let mut state = self.state.lock().await;
        active_draft(&mut state)?.set_note(equipment_id, text)
    }

    pub async fn set_general_note(&self, text: impl Into<String>) -> Result<()> {
        let mut state = self.state.lock().await;
        active_draft(&mut state)?.set_general_note(text);
        Ok(())
    }

    /// Navigating away: the draft is dropped and in-flight responses for it are ignored.
    pub async fn abandon(&self) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        if let Some(draft) = state.draft.take() {
            tracing::debug!("Abandoned review draft for {}", draft.vehicle_code());
        }
    }

    /// Submits the active draft. On success the draft is cleared; on any
    /// error it is kept as it was so the caller can fix it or retry.
    pub async fn submit(
        &self,
        responsible: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<Outcome<ReviewRecord>> {
        let (draft, ticket) = {
            let mut state = self.state.lock().await;
            let draft = active_draft(&mut state)?.clone();
            (draft, state.generation)
        };

        let result = gate::submit(self.catalog.store().as_ref(), &draft, responsible, now).await;

        let mut state = self.state.lock().await;
        if state.generation != ticket {
            tracing::warn!(
                "Discarding submission result for superseded review of {}",
                draft.vehicle_code()
            );
            return Ok(Outcome::Superseded);
        }

        let record = result?;
        state.draft = None;
        state.generation += 1;
        Ok(Outcome::Applied(record))
    }

    pub async fn vehicle_status(
        &self,
        vehicle_id: VehicleId,
        responsible: Option<&str>,
        today: NaiveDate,
    ) -> Result<VehicleStatus> {
        let (vehicle, latest) = tokio::try_join!(
            self.catalog.load(vehicle_id),
            self.catalog.store().latest_review(vehicle_id, responsible)
        )?;
        Ok(status::derive(&vehicle, latest.as_ref(), today))
    }

    /// Derived status of every vehicle, ordered by code.
    pub async fn fleet_status(
        &self,
        responsible: Option<&str>,
        today: NaiveDate,
    ) -> Result<Vec<VehicleStatus>> {
        let (vehicles, reviews) = tokio::try_join!(
            self.catalog.load_all(),
            self.catalog.store().fleet_reviews(responsible)
        )?;

        Ok(vehicles
            .iter()
            .map(|vehicle| status::derive(vehicle, reviews.get(&vehicle.id), today))
            .collect())
    }

    /// Whether `responsible` has reviewed every vehicle on `today`.
    /// Nothing is written back to the store.
    pub async fn is_fleet_complete(&self, responsible: &str, today: NaiveDate) -> Result<bool> {
        let statuses = self.fleet_status(Some(responsible), today).await?;
        Ok(fleet::is_fleet_complete(&statuses, today, responsible))
    }

    pub async fn fleet_summary(&self, responsible: &str, today: NaiveDate) -> Result<FleetSummary> {
        let statuses = self.fleet_status(Some(responsible), today).await?;
        Ok(fleet::summarize(&statuses, today, responsible))
    }
}

fn active_draft(state: &mut SessionState) -> Result<&mut ReviewDraft> {
    state.draft.as_mut().ok_or(InventoryError::NoActiveDraft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::core::draft::tests::vehicle_with_items;

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-03-02T08:30:00-03:00").unwrap()
    }

    fn session() -> InventorySession<MemoryStore> {
        InventorySession::new(Arc::new(MemoryStore::new(vec![
            vehicle_with_items(1, "V1", &[1, 2, 3]),
            vehicle_with_items(2, "V2", &[4]),
        ])))
    }

    #[tokio::test]
    async fn test_edits_without_draft_fail() {
        let session = session();
        let err = session.set_mark(1, ReviewMark::Present).await.unwrap_err();
        assert!(matches!(err, InventoryError::NoActiveDraft));
        assert!(session.submit("Grupo 1", now()).await.is_err());
    }

    #[tokio::test]
    async fn test_begin_replaces_previous_draft() {
        let session = session();
        session.begin_review(1).await.unwrap();
        session.set_mark(1, ReviewMark::Present).await.unwrap();

        let draft = session.begin_review(2).await.unwrap().applied().unwrap();
        assert_eq!(draft.vehicle_id(), 2);
        let err = session.set_mark(1, ReviewMark::Present).await.unwrap_err();
        assert!(matches!(err, InventoryError::UnknownItem { .. }));
    }

    #[tokio::test]
    async fn test_rejected_submission_keeps_draft() {
        let session = session();
        session.begin_review(1).await.unwrap();
        session.set_mark(1, ReviewMark::Present).await.unwrap();
        session.set_note(1, "ok").await.unwrap();

        let err = session.submit("Grupo 1", now()).await.unwrap_err();
        assert!(matches!(err, InventoryError::Rejected { unset_count: 2 }));

        let draft = session.draft().await.unwrap();
        assert_eq!(draft.line(1).unwrap().note, "ok");
        assert_eq!(draft.unset_count(), 2);
    }

    #[tokio::test]
    async fn test_accepted_submission_clears_draft() {
        let session = session();
        session.begin_review(2).await.unwrap();
        session.set_mark(4, ReviewMark::Present).await.unwrap();

        let record = session.submit("Grupo 1", now()).await.unwrap().applied().unwrap();
        assert!(record.id.is_some());
        assert!(session.draft().await.is_none());
    }

    #[tokio::test]
    async fn test_mark_all_readies_draft() {
        let session = session();
        session.begin_review(1).await.unwrap();
        session.mark_all(ReviewMark::Present).await.unwrap();
        session.set_mark(3, ReviewMark::Absent).await.unwrap();

        let draft = session.draft().await.unwrap();
        assert!(draft.is_ready());
        assert_eq!(draft.absent_count(), 1);
    }

    #[tokio::test]
    async fn test_abandon_drops_draft() {
        let session = session();
        session.begin_review(1).await.unwrap();
        session.abandon().await;
        assert!(session.draft().await.is_none());
    }
}
