//! In-progress review of one vehicle.
//!
//! A draft holds exactly one line per active equipment item of the vehicle
//! it was begun from, each seeded as [`ReviewMark::Unset`] with an empty note.
//! Drafts are plain data; nothing here touches the store.

use crate::domain::model::{EquipmentId, ReviewMark, Vehicle, VehicleId};
use crate::utils::error::{InventoryError, Result};
use serde::Serialize;
use std::collections::HashMap;

/// Display snapshot of the item a line refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftItem {
    pub equipment_id: EquipmentId,
    pub name: String,
    pub compartment: String,
    pub expected_quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftLine {
    pub item: DraftItem,
    pub mark: ReviewMark,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewDraft {
    vehicle_id: VehicleId,
    vehicle_code: String,
    lines: Vec<DraftLine>,
    #[serde(skip)]
    index: HashMap<EquipmentId, usize>,
    general_note: String,
}

impl ReviewDraft {
    pub fn begin(vehicle: &Vehicle) -> Self {
        let lines: Vec<DraftLine> = vehicle
            .equipment()
            .map(|(compartment, item)| DraftLine {
                item: DraftItem {
                    equipment_id: item.id,
                    name: item.name.clone(),
                    compartment: compartment.name.clone(),
                    expected_quantity: item.expected_quantity,
                },
                mark: ReviewMark::Unset,
                note: String::new(),
            })
            .collect();

        let index = lines
            .iter()
            .enumerate()
            .map(|(pos, line)| (line.item.equipment_id, pos))
            .collect();

        tracing::debug!(
            "Began review draft for vehicle {} with {} item(s)",
            vehicle.code,
            lines.len()
        );

        Self {
            vehicle_id: vehicle.id,
            vehicle_code: vehicle.code.clone(),
            lines,
            index,
            general_note: String::new(),
        }
    }

    pub fn vehicle_id(&self) -> VehicleId {
        self.vehicle_id
    }

    pub fn vehicle_code(&self) -> &str {
        &self.vehicle_code
    }

    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    pub fn line(&self, equipment_id: EquipmentId) -> Option<&DraftLine> {
        self.index.get(&equipment_id).map(|&pos| &self.lines[pos])
    }

    pub fn equipment_ids(&self) -> impl Iterator<Item = EquipmentId> + '_ {
        self.lines.iter().map(|l| l.item.equipment_id)
    }

    pub fn general_note(&self) -> &str {
        &self.general_note
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn set_mark(&mut self, equipment_id: EquipmentId, mark: ReviewMark) -> Result<()> {
        let line = self.line_mut(equipment_id)?;
        line.mark = mark;
        Ok(())
    }

    pub fn set_note(&mut self, equipment_id: EquipmentId, text: impl Into<String>) -> Result<()> {
        let line = self.line_mut(equipment_id)?;
        line.note = text.into();
        Ok(())
    }

    pub fn set_general_note(&mut self, text: impl Into<String>) {
        self.general_note = text.into();
    }

    /// Marks every line, overwriting earlier marks.
    pub fn mark_all(&mut self, mark: ReviewMark) {
        for line in &mut self.lines {
            line.mark = mark;
        }
    }

    pub fn unset_count(&self) -> usize {
        self.count(ReviewMark::Unset)
    }

    pub fn absent_count(&self) -> usize {
        self.count(ReviewMark::Absent)
    }

    pub fn present_count(&self) -> usize {
        self.count(ReviewMark::Present)
    }

    pub fn is_ready(&self) -> bool {
        self.unset_count() == 0
    }

    fn count(&self, mark: ReviewMark) -> usize {
        self.lines.iter().filter(|l| l.mark == mark).count()
    }

    fn line_mut(&mut self, equipment_id: EquipmentId) -> Result<&mut DraftLine> {
        match self.index.get(&equipment_id) {
            Some(&pos) => Ok(&mut self.lines[pos]),
            None => Err(InventoryError::UnknownItem {
                vehicle_id: self.vehicle_id,
                equipment_id,
            }),
        }
    }
}
