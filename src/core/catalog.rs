//! Fleet hierarchy cache, filled once per screen load.

use crate::domain::model::{Vehicle, VehicleId};
use crate::domain::ports::InventoryStore;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// No retries happen here; store failures reach the caller unchanged.
pub struct CatalogCache<S: InventoryStore + ?Sized> {
    store: Arc<S>,
    vehicles: RwLock<HashMap<VehicleId, Vehicle>>,
    fleet: RwLock<Option<Vec<Vehicle>>>,
}

impl<S: InventoryStore + ?Sized> CatalogCache<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            vehicles: RwLock::new(HashMap::new()),
            fleet: RwLock::new(None),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Vehicle with its full compartment/equipment hierarchy.
    pub async fn load(&self, id: VehicleId) -> Result<Vehicle> {
        if let Some(vehicle) = self.vehicles.read().await.get(&id) {
            return Ok(vehicle.clone());
        }

        tracing::debug!("Catalog miss for vehicle {}, fetching", id);
        let mut vehicle = self.store.get_vehicle(id).await?;
        vehicle.normalize_order();
        self.vehicles.write().await.insert(id, vehicle.clone());
        Ok(vehicle)
    }

    /// Fleet ordered by code. Nested compartments are not required.
    pub async fn load_all(&self) -> Result<Vec<Vehicle>> {
        if let Some(fleet) = self.fleet.read().await.as_ref() {
            return Ok(fleet.clone());
        }

        let mut fleet = self.store.list_vehicles().await?;
        fleet.sort_by(|a, b| a.code.cmp(&b.code));
        for vehicle in &mut fleet {
            vehicle.normalize_order();
        }
        tracing::debug!("Catalog loaded {} vehicle(s)", fleet.len());
        *self.fleet.write().await = Some(fleet.clone());
        Ok(fleet)
    }

    /// Drops everything cached; the next load goes to the store.
    pub async fn invalidate(&self) {
        self.vehicles.write().await.clear();
        *self.fleet.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::core::draft::tests::vehicle_with_items;
    use crate::utils::error::InventoryError;

    fn cache() -> (Arc<MemoryStore>, CatalogCache<MemoryStore>) {
        let store = Arc::new(MemoryStore::new(vec![
            vehicle_with_items(2, "PMH-02", &[3, 4]),
            vehicle_with_items(1, "PMH-01", &[1, 2]),
        ]));
        (store.clone(), CatalogCache::new(store))
    }

    #[test]
    fn test_load_fetches_once() {
        let (store, cache) = cache();
        tokio_test::block_on(async {
            let first = cache.load(1).await.unwrap();
            let second = cache.load(1).await.unwrap();
            assert_eq!(first, second);
            assert_eq!(first.equipment().count(), 2);
        });
        assert_eq!(store.vehicle_fetches(), 1);
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let (store, cache) = cache();
        tokio_test::block_on(async {
            cache.load(1).await.unwrap();
            cache.invalidate().await;
            cache.load(1).await.unwrap();
        });
        assert_eq!(store.vehicle_fetches(), 2);
    }

    #[tokio::test]
    async fn test_load_all_is_ordered_by_code() {
        let (_, cache) = cache();
        let fleet = cache.load_all().await.unwrap();
        let codes: Vec<_> = fleet.iter().map(|v| v.code.as_str()).collect();
        assert_eq!(codes, vec!["PMH-01", "PMH-02"]);
    }

    #[tokio::test]
    async fn test_unknown_vehicle_is_not_found() {
        let (_, cache) = cache();
        let err = cache.load(404).await.unwrap_err();
        assert!(matches!(err, InventoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_unavailable_is_surfaced_without_retry() {
        let (store, cache) = cache();
        store.set_unavailable(true);
        let err = cache.load(1).await.unwrap_err();
        assert!(err.is_retryable());

        store.set_unavailable(false);
        assert!(cache.load(1).await.is_ok());
    }
}
