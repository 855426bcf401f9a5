//! REST client for the inventory backend.
//!
//! The backend speaks JSON with Spanish field names; the wire structs below
//! map them onto the domain model and back.

use crate::domain::model::{
    Compartment, EquipmentItem, FinalMark, ReviewEntry, ReviewRecord, Vehicle, VehicleId,
};
use crate::domain::ports::{ConfigProvider, InventoryStore};
use crate::utils::error::{InventoryError, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::task::JoinSet;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListWire<T> {
    Paginated {
        results: Vec<T>,
        #[serde(default)]
        next: Option<String>,
    },
    Plain(Vec<T>),
}

#[derive(Debug, Deserialize)]
struct VehicleWire {
    id: VehicleId,
    codigo: String,
    #[serde(default)]
    nombre: Option<String>,
    #[serde(default)]
    compartimentos: Vec<CompartmentWire>,
}

#[derive(Debug, Deserialize)]
struct CompartmentWire {
    id: i64,
    vehiculo: VehicleId,
    nombre: String,
    #[serde(default)]
    orden: u32,
    #[serde(default = "active")]
    activo: bool,
    #[serde(default)]
    equipos: Vec<EquipmentWire>,
}

#[derive(Debug, Deserialize)]
struct EquipmentWire {
    id: i64,
    compartimento: i64,
    nombre: String,
    #[serde(default = "one")]
    cantidad_esperada: u32,
    #[serde(default)]
    orden: u32,
    #[serde(default = "active")]
    activo: bool,
}

#[derive(Debug, Deserialize)]
struct ReviewWire {
    id: Option<i64>,
    vehiculo: VehicleId,
    responsable: String,
    fecha: DateTime<FixedOffset>,
    #[serde(default)]
    observaciones_generales: String,
    #[serde(default)]
    detalles_revision: Vec<DetailWire>,
}

#[derive(Debug, Deserialize, Serialize)]
struct DetailWire {
    equipo: i64,
    estado: String,
    #[serde(default)]
    observaciones: String,
}

#[derive(Debug, Serialize)]
struct CreateReviewWire<'a> {
    vehiculo: VehicleId,
    responsable: &'a str,
    observaciones_generales: &'a str,
    detalles: Vec<DetailWire>,
}

/// The create endpoint echoes the payload; id and date are optional there.
#[derive(Debug, Deserialize)]
struct CreatedReviewWire {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    fecha: Option<DateTime<FixedOffset>>,
}

fn active() -> bool {
    true
}

fn one() -> u32 {
    1
}

impl From<VehicleWire> for Vehicle {
    fn from(wire: VehicleWire) -> Self {
        Vehicle {
            id: wire.id,
            code: wire.codigo,
            name: wire.nombre.filter(|n| !n.is_empty()),
            compartments: wire
                .compartimentos
                .into_iter()
                .map(|c| Compartment {
                    id: c.id,
                    vehicle_id: c.vehiculo,
                    name: c.nombre,
                    order: c.orden,
                    active: c.activo,
                    equipment: c
                        .equipos
                        .into_iter()
                        .map(|e| EquipmentItem {
                            id: e.id,
                            compartment_id: e.compartimento,
                            name: e.nombre,
                            expected_quantity: e.cantidad_esperada,
                            order: e.orden,
                            active: e.activo,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl From<ReviewWire> for ReviewRecord {
    fn from(wire: ReviewWire) -> Self {
        let mut entries = Vec::new();
        let mut unmarked = Vec::new();

        for detail in wire.detalles_revision {
            match mark_from_wire(&detail.estado) {
                Some(mark) => entries.push(ReviewEntry {
                    equipment_id: detail.equipo,
                    mark,
                    note: detail.observaciones,
                }),
                None => {
                    tracing::debug!(
                        "Equipment {} still unmarked in review of vehicle {} (state '{}')",
                        detail.equipo,
                        wire.vehiculo,
                        detail.estado
                    );
                    unmarked.push(detail.equipo);
                }
            }
        }

        ReviewRecord {
            id: wire.id,
            vehicle_id: wire.vehiculo,
            responsible: wire.responsable,
            submitted_at: wire.fecha,
            general_note: wire.observaciones_generales,
            entries,
            unmarked,
        }
    }
}

fn mark_from_wire(estado: &str) -> Option<FinalMark> {
    match estado {
        "si" => Some(FinalMark::Present),
        "no" => Some(FinalMark::Absent),
        _ => None,
    }
}

fn mark_to_wire(mark: FinalMark) -> &'static str {
    match mark {
        FinalMark::Present => "si",
        FinalMark::Absent => "no",
    }
}

#[derive(Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    pub fn new<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in config.headers() {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                InventoryError::InvalidConfigValueError {
                    field: "store.headers".to_string(),
                    value: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            let header_value = HeaderValue::from_str(&value).map_err(|e| {
                InventoryError::InvalidConfigValueError {
                    field: format!("store.headers.{}", name),
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
            headers.insert(header_name, header_value);
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                InventoryError::unavailable(e.to_string())
            } else {
                InventoryError::ApiError(e)
            }
        })
    }

    /// Maps non-success statuses onto the error taxonomy.
    async fn check(response: Response, resource: &str, id: &str) -> Result<Response> {
        let status = response.status();
        tracing::debug!("API response status: {} ({} {})", status, resource, id);

        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(InventoryError::not_found(resource, id));
        }
        if status.is_server_error() {
            return Err(InventoryError::unavailable(format!(
                "store answered {} for {} {}",
                status, resource, id
            )));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    "Could not read {} body for {} {}: {}",
                    status,
                    resource,
                    id,
                    e
                );
                format!("<unreadable body: {}>", e)
            }
        };
        Err(InventoryError::StoreRejected {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        resource: &str,
        id: &str,
    ) -> Result<T> {
        tracing::debug!("Making API request to: {}", url);
        let response = self.send(self.client.get(url).query(query)).await?;
        let response = Self::check(response, resource, id).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Fetches every page of a list endpoint, following `next` links.
    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        resource: &str,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page: ListWire<T> = self.get_json(&self.url(path), query, resource, "list").await?;

        loop {
            match page {
                ListWire::Plain(batch) => {
                    items.extend(batch);
                    return Ok(items);
                }
                ListWire::Paginated { results, next } => {
                    items.extend(results);
                    match next {
                        Some(next_url) => {
                            page = self.get_json(&next_url, &[], resource, "list").await?;
                        }
                        None => return Ok(items),
                    }
                }
            }
        }
    }

    fn review_query(vehicle_id: VehicleId, responsible: Option<&str>) -> Vec<(&'static str, String)> {
        let mut query = vec![("vehiculo", vehicle_id.to_string())];
        if let Some(r) = responsible.filter(|r| !r.is_empty()) {
            query.push(("responsable", r.to_string()));
        }
        query
    }
}

#[async_trait]
impl InventoryStore for HttpStore {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        let wires: Vec<VehicleWire> = self.get_list("/vehiculos/", &[], "vehicle").await?;
        Ok(wires.into_iter().map(Vehicle::from).collect())
    }

    async fn get_vehicle(&self, id: VehicleId) -> Result<Vehicle> {
        let wire: VehicleWire = self
            .get_json(
                &self.url(&format!("/vehiculos/{}/", id)),
                &[],
                "vehicle",
                &id.to_string(),
            )
            .await?;
        Ok(wire.into())
    }

    async fn latest_review(
        &self,
        vehicle_id: VehicleId,
        responsible: Option<&str>,
    ) -> Result<Option<ReviewRecord>> {
        let query = Self::review_query(vehicle_id, responsible);
        let page: ListWire<ReviewWire> = self
            .get_json(&self.url("/revisiones/"), &query, "review", "list")
            .await?;
        let first = match page {
            ListWire::Plain(items) | ListWire::Paginated { results: items, .. } => {
                items.into_iter().next()
            }
        };
        Ok(first.map(ReviewRecord::from))
    }

    /// One first-page query per vehicle, run concurrently. The review
    /// history itself is never paged through.
    async fn fleet_reviews(
        &self,
        responsible: Option<&str>,
    ) -> Result<HashMap<VehicleId, ReviewRecord>> {
        let vehicles = self.list_vehicles().await?;
        tracing::debug!("Fetching latest review for {} vehicle(s)", vehicles.len());

        let mut lookups = JoinSet::new();
        for vehicle in vehicles {
            let store = self.clone();
            let responsible = responsible.map(str::to_string);
            lookups.spawn(async move {
                store
                    .latest_review(vehicle.id, responsible.as_deref())
                    .await
                    .map(|record| (vehicle.id, record))
            });
        }

        let mut latest = HashMap::new();
        while let Some(joined) = lookups.join_next().await {
            let joined = joined
                .map_err(|e| InventoryError::unavailable(format!("review lookup aborted: {}", e)))?;
            if let (vehicle_id, Some(record)) = joined? {
                latest.insert(vehicle_id, record);
            }
        }
        Ok(latest)
    }

    async fn create_review(&self, record: &ReviewRecord) -> Result<ReviewRecord> {
        let payload = CreateReviewWire {
            vehiculo: record.vehicle_id,
            responsable: &record.responsible,
            observaciones_generales: &record.general_note,
            detalles: record
                .entries
                .iter()
                .map(|e| DetailWire {
                    equipo: e.equipment_id,
                    estado: mark_to_wire(e.mark).to_string(),
                    observaciones: e.note.clone(),
                })
                .collect(),
        };

        let url = self.url("/revisiones/");
        tracing::debug!("Posting review of vehicle {} to {}", record.vehicle_id, url);
        let response = self.send(self.client.post(&url).json(&payload)).await?;
        let response = Self::check(response, "review", &record.vehicle_id.to_string()).await?;
        let bytes = response.bytes().await?;
        let created: CreatedReviewWire = serde_json::from_slice(&bytes)?;

        Ok(ReviewRecord {
            id: created.id,
            submitted_at: created.fecha.unwrap_or(record.submitted_at),
            ..record.clone()
        })
    }
}
