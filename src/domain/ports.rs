use crate::domain::model::{ReviewRecord, Vehicle, VehicleId};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Request/response boundary to the remote data store.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Fleet listing ordered by vehicle code. Nested compartments may be empty.
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>>;

    async fn get_vehicle(&self, id: VehicleId) -> Result<Vehicle>;

    /// Most recent review of a vehicle, optionally restricted to one responsible.
    async fn latest_review(
        &self,
        vehicle_id: VehicleId,
        responsible: Option<&str>,
    ) -> Result<Option<ReviewRecord>>;

    /// Most recent review per vehicle. Vehicles never reviewed are absent from the map.
    async fn fleet_reviews(
        &self,
        responsible: Option<&str>,
    ) -> Result<HashMap<VehicleId, ReviewRecord>>;

    async fn create_review(&self, record: &ReviewRecord) -> Result<ReviewRecord>;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn headers(&self) -> Vec<(String, String)>;
}
