//! # Storage Layer
//!
//! Each entity (a character, a token, a user) owns one [`MacroData`] blob: its
//! macro tree, its variable text and its last import settings. Original tables
//! are shared by every entity.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: JSON files under a data directory
//! - [`memory::InMemoryStore`]: no persistence, used by tests
//!
//! ## Storage Format
//!
//! ```text
//! <root>/
//! ├── entities/
//! │   └── {entity}.json   # MacroData for one entity
//! ├── tables.json         # original tables (JSON array)
//! └── config.json         # RollmacroConfig
//! ```
//!
//! A missing entity is not an error: it loads as an empty blob, matching the
//! "created empty on first access" behavior hosts expect.

use crate::error::Result;
use crate::model::{EntityId, MacroData};
use crate::tables::OriginalTable;

pub mod fs;
pub mod memory;

pub trait DataStore {
    /// Load an entity's blob, or an empty one if it was never saved.
    fn load_entity(&self, entity: &EntityId) -> Result<MacroData>;

    fn save_entity(&mut self, entity: &EntityId, data: &MacroData) -> Result<()>;

    /// Entities that have a saved blob, sorted.
    fn list_entities(&self) -> Result<Vec<EntityId>>;

    fn load_tables(&self) -> Result<Vec<OriginalTable>>;

    fn save_tables(&mut self, tables: &[OriginalTable]) -> Result<()>;
}
