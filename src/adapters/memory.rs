use crate::domain::model::{ReviewRecord, Vehicle, VehicleId};
use crate::domain::ports::InventoryStore;
use crate::utils::error::{InventoryError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// In-process store. Reviews are kept in insertion order; the latest wins.
#[derive(Debug, Default)]
pub struct MemoryStore {
    vehicles: Mutex<Vec<Vehicle>>,
    reviews: Mutex<Vec<ReviewRecord>>,
    next_review_id: AtomicUsize,
    unavailable: AtomicBool,
    vehicle_fetches: AtomicUsize,
}

impl MemoryStore {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Self {
            vehicles: Mutex::new(vehicles),
            next_review_id: AtomicUsize::new(1),
            ..Self::default()
        }
    }

    /// Makes every call fail with `Unavailable` until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `get_vehicle` calls served so far.
    pub fn vehicle_fetches(&self) -> usize {
        self.vehicle_fetches.load(Ordering::SeqCst)
    }

    pub async fn reviews(&self) -> Vec<ReviewRecord> {
        self.reviews.lock().await.clone()
    }

    pub async fn insert_review(&self, record: ReviewRecord) {
        self.reviews.lock().await.push(record);
    }

    pub async fn remove_vehicle(&self, id: VehicleId) {
        self.vehicles.lock().await.retain(|v| v.id != id);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(InventoryError::unavailable("memory store switched off"));
        }
        Ok(())
    }

    fn matches(record: &ReviewRecord, responsible: Option<&str>) -> bool {
        responsible.map_or(true, |r| record.responsible == r)
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        self.check_available()?;
        let mut vehicles: Vec<Vehicle> = self
            .vehicles
            .lock()
            .await
            .iter()
            .map(|v| Vehicle {
                compartments: Vec::new(),
                ..v.clone()
            })
            .collect();
        vehicles.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(vehicles)
    }

    async fn get_vehicle(&self, id: VehicleId) -> Result<Vehicle> {
        self.check_available()?;
        self.vehicle_fetches.fetch_add(1, Ordering::SeqCst);
        self.vehicles
            .lock()
            .await
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or_else(|| InventoryError::not_found("vehicle", id))
    }

    async fn latest_review(
        &self,
        vehicle_id: VehicleId,
        responsible: Option<&str>,
    ) -> Result<Option<ReviewRecord>> {
        self.check_available()?;
        Ok(self
            .reviews
            .lock()
            .await
            .iter()
            .rev()
            .find(|r| r.vehicle_id == vehicle_id && Self::matches(r, responsible))
            .cloned())
    }

    async fn fleet_reviews(
        &self,
        responsible: Option<&str>,
    ) -> Result<HashMap<VehicleId, ReviewRecord>> {
        self.check_available()?;
        let mut latest = HashMap::new();
        for record in self
            .reviews
            .lock()
            .await
            .iter()
            .filter(|r| Self::matches(r, responsible))
        {
            latest.insert(record.vehicle_id, record.clone());
        }
        Ok(latest)
    }

    async fn create_review(&self, record: &ReviewRecord) -> Result<ReviewRecord> {
        self.check_available()?;
        if !self.vehicles.lock().await.iter().any(|v| v.id == record.vehicle_id) {
            return Err(InventoryError::StoreRejected {
                status: 400,
                body: format!("{{\"vehiculo\":[\"Invalid pk \\\"{}\\\"\"]}}", record.vehicle_id),
            });
        }
        let id = self.next_review_id.fetch_add(1, Ordering::SeqCst) as i64;
        let created = ReviewRecord {
            id: Some(id),
            ..record.clone()
        };
        self.reviews.lock().await.push(created.clone());
        Ok(created)
    }
}
