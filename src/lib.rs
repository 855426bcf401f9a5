pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::Cli;
pub use config::TomlConfig;

pub use adapters::{HttpStore, MemoryStore};
pub use core::draft::ReviewDraft;
pub use core::roster::{default_responsible, Roster};
pub use core::session::{InventorySession, Outcome};
pub use utils::error::{InventoryError, Result};
