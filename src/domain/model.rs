use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

pub type VehicleId = i64;
pub type CompartmentId = i64;
pub type EquipmentId = i64;
pub type ReviewId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub code: String,
    pub name: Option<String>,
    /// Empty when the vehicle came from a fleet listing without nested expansion.
    #[serde(default)]
    pub compartments: Vec<Compartment>,
}

impl Vehicle {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.code)
    }

    /// Active equipment in compartment order, then item order.
    pub fn equipment(&self) -> impl Iterator<Item = (&Compartment, &EquipmentItem)> {
        self.compartments
            .iter()
            .filter(|c| c.active)
            .flat_map(|c| c.equipment.iter().filter(|e| e.active).map(move |e| (c, e)))
    }

    pub fn contains_equipment(&self, id: EquipmentId) -> bool {
        self.equipment().any(|(_, e)| e.id == id)
    }

    pub fn has_hierarchy(&self) -> bool {
        !self.compartments.is_empty()
    }

    /// Sorts compartments and their items by (ordering key, name).
    pub fn normalize_order(&mut self) {
        self.compartments
            .sort_by(|a, b| (a.order, &a.name).cmp(&(b.order, &b.name)));
        for compartment in &mut self.compartments {
            compartment
                .equipment
                .sort_by(|a, b| (a.order, &a.name).cmp(&(b.order, &b.name)));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compartment {
    pub id: CompartmentId,
    pub vehicle_id: VehicleId,
    pub name: String,
    pub order: u32,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub equipment: Vec<EquipmentItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentItem {
    pub id: EquipmentId,
    pub compartment_id: CompartmentId,
    pub name: String,
    #[serde(default = "default_quantity")]
    pub expected_quantity: u32,
    pub order: u32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewMark {
    #[default]
    Unset,
    Present,
    Absent,
}

/// Final mark of a submitted entry. `Unset` cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalMark {
    Present,
    Absent,
}

impl FinalMark {
    pub fn from_mark(mark: ReviewMark) -> Option<Self> {
        match mark {
            ReviewMark::Unset => None,
            ReviewMark::Present => Some(FinalMark::Present),
            ReviewMark::Absent => Some(FinalMark::Absent),
        }
    }
}

impl From<FinalMark> for ReviewMark {
    fn from(mark: FinalMark) -> Self {
        match mark {
            FinalMark::Present => ReviewMark::Present,
            FinalMark::Absent => ReviewMark::Absent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub equipment_id: EquipmentId,
    pub mark: FinalMark,
    #[serde(default)]
    pub note: String,
}

/// Immutable result of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Assigned by the store once created.
    pub id: Option<ReviewId>,
    pub vehicle_id: VehicleId,
    pub responsible: String,
    pub submitted_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub general_note: String,
    pub entries: Vec<ReviewEntry>,
    /// Equipment the store still holds as unmarked for this review.
    /// Always empty for records built from a draft.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmarked: Vec<EquipmentId>,
}

impl ReviewRecord {
    /// Calendar day of the submission in the offset it was recorded with.
    pub fn review_date(&self) -> NaiveDate {
        self.submitted_at.date_naive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Pending,
    Complete,
    Critical,
}

impl StatusKind {
    pub fn label(&self) -> &'static str {
        match self {
            StatusKind::Pending => "pending",
            StatusKind::Complete => "complete",
            StatusKind::Critical => "critical",
        }
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusCounters {
    pub expected: usize,
    pub present: usize,
    pub absent: usize,
}

/// Derived per-vehicle status. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleStatus {
    pub vehicle_id: VehicleId,
    pub code: String,
    pub name: Option<String>,
    pub kind: StatusKind,
    pub counters: StatusCounters,
    /// Active catalog items, when the hierarchy was loaded.
    pub catalog_items: Option<usize>,
    pub reviewed_at: Option<DateTime<FixedOffset>>,
    pub responsible: Option<String>,
    /// Whether the source record was submitted on the evaluation day.
    pub reviewed_today: bool,
}

impl VehicleStatus {
    pub fn review_date(&self) -> Option<NaiveDate> {
        self.reviewed_at.map(|at| at.date_naive())
    }
}
