pub mod catalog;
pub mod draft;
pub mod fleet;
pub mod gate;
pub mod roster;
pub mod session;
pub mod status;

pub use crate::domain::model::{
    ReviewMark, ReviewRecord, StatusKind, Vehicle, VehicleStatus,
};
pub use crate::domain::ports::{ConfigProvider, InventoryStore};
pub use crate::utils::error::Result;
