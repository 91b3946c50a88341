use super::DataStore;
use crate::error::Result;
use crate::model::{EntityId, MacroData};
use crate::tables::OriginalTable;
use std::collections::HashMap;

/// In-memory storage for testing and development.
/// Does NOT persist data.
#[derive(Default)]
pub struct InMemoryStore {
    entities: HashMap<EntityId, MacroData>,
    tables: Vec<OriginalTable>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataStore for InMemoryStore {
    fn load_entity(&self, entity: &EntityId) -> Result<MacroData> {
        Ok(self.entities.get(entity).cloned().unwrap_or_default())
    }

    fn save_entity(&mut self, entity: &EntityId, data: &MacroData) -> Result<()> {
        self.entities.insert(entity.clone(), data.clone());
        Ok(())
    }

    fn list_entities(&self) -> Result<Vec<EntityId>> {
        let mut ids: Vec<EntityId> = self.entities.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn load_tables(&self) -> Result<Vec<OriginalTable>> {
        Ok(self.tables.clone())
    }

    fn save_tables(&mut self, tables: &[OriginalTable]) -> Result<()> {
        self.tables = tables.to_vec();
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{Header, Macro, Tab};

    pub const ENTITY: &str = "aria";

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn entity() -> EntityId {
            EntityId::new(ENTITY)
        }

        pub fn with_variables(mut self, text: &str) -> Self {
            let entity = Self::entity();
            let mut data = self.store.load_entity(&entity).unwrap();
            data.replacements = text.to_string();
            self.store.save_entity(&entity, &data).unwrap();
            self
        }

        /// One tab `Combat` with header `Attacks` holding `(display, formula)` macros.
        pub fn with_macros(mut self, macros: &[(&str, &str)]) -> Self {
            let entity = Self::entity();
            let mut data = self.store.load_entity(&entity).unwrap();
            let mut header = Header::new("Attacks");
            header.macros = macros.iter().map(|(d, f)| Macro::new(*d, *f)).collect();
            let mut tab = Tab::new("Combat");
            tab.headers.push(header);
            data.tabs.push_tab(tab);
            self.store.save_entity(&entity, &data).unwrap();
            self
        }

        pub fn with_table(mut self, command: &str, table: &str) -> Self {
            let mut tables = self.store.load_tables().unwrap();
            tables.push(OriginalTable::new(command, table));
            self.store.save_tables(&tables).unwrap();
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entity_loads_empty() {
        let store = InMemoryStore::new();
        let data = store.load_entity(&EntityId::new("nobody")).unwrap();
        assert_eq!(data, MacroData::default());
        assert!(store.list_entities().unwrap().is_empty());
    }

    #[test]
    fn test_entities_are_isolated() {
        let mut store = InMemoryStore::new();
        let mut data = MacroData::default();
        data.replacements = "hp=1".to_string();
        store.save_entity(&EntityId::new("b"), &data).unwrap();
        store.save_entity(&EntityId::new("a"), &MacroData::default()).unwrap();

        assert_eq!(
            store.load_entity(&EntityId::new("b")).unwrap().replacements,
            "hp=1"
        );
        assert!(store.load_entity(&EntityId::new("a")).unwrap().replacements.is_empty());
        assert_eq!(
            store.list_entities().unwrap(),
            vec![EntityId::new("a"), EntityId::new("b")]
        );
    }
}
