//! # API Facade
//!
//! The single entry point for every rollmacro operation, whatever the UI. It
//! dispatches to `commands/*.rs`, resolves user-typed node references to ids,
//! and supplies the settings (import defaults, sync rules) commands need from
//! the host configuration. It does no I/O of its own beyond reading that
//! configuration.
//!
//! `RollmacroApi<S: DataStore>` is generic over the storage backend:
//! `FileStore` in production, `InMemoryStore` in tests.

use crate::commands;
use crate::config::RollmacroConfig;
use crate::error::{Result, RollmacroError};
use crate::importer::ImportConfig;
use crate::model::{EntityId, MacroTree};
use crate::roll::{send, DiceRoller};
use crate::store::DataStore;
use serde_json::Value;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct RollmacroApi<S: DataStore> {
    store: S,
    config_dir: PathBuf,
}

impl<S: DataStore> RollmacroApi<S> {
    pub fn new(store: S, config_dir: PathBuf) -> Self {
        Self { store, config_dir }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn load_config(&self) -> Result<RollmacroConfig> {
        RollmacroConfig::load(&self.config_dir)
    }

    pub fn entities(&self) -> Result<Vec<EntityId>> {
        self.store.list_entities()
    }

    // --- rolling ---

    pub fn roll(&mut self, entity: &EntityId, formula: &str) -> Result<commands::CmdResult> {
        commands::roll::run(&mut self.store, entity, formula)
    }

    /// Resolve `formula` and hand the result to `roller` using the configured
    /// game system.
    pub fn roll_with(
        &mut self,
        entity: &EntityId,
        formula: &str,
        roller: &dyn DiceRoller,
    ) -> Result<commands::CmdResult> {
        let system = self.load_config()?.game_system;
        let mut result = commands::roll::run(&mut self.store, entity, formula)?;
        let response = match &result.route {
            Some(route) => send(route, &system, roller)?,
            None => None,
        };
        if let Some(response) = &response {
            result.add_message(commands::CmdMessage::info(response.text.clone()));
        }
        Ok(result.with_response(response))
    }

    pub fn roll_inline(&mut self, entity: &EntityId, text: &str) -> Result<Vec<commands::CmdResult>> {
        commands::roll::run_inline(&mut self.store, entity, text)
    }

    pub fn roll_macro(&mut self, entity: &EntityId, macro_ref: &str) -> Result<commands::CmdResult> {
        let id = self.resolve_node(entity, macro_ref)?;
        commands::roll::run_macro(&mut self.store, entity, id)
    }

    // --- variables ---

    pub fn variables(&self, entity: &EntityId, expanded: bool) -> Result<commands::CmdResult> {
        commands::variables::list(&self.store, entity, expanded)
    }

    pub fn set_variables(&mut self, entity: &EntityId, text: &str) -> Result<commands::CmdResult> {
        commands::variables::set(&mut self.store, entity, text)
    }

    pub fn change_variable(&mut self, entity: &EntityId, command: &str) -> Result<commands::CmdResult> {
        commands::variables::change(&mut self.store, entity, command)
    }

    // --- import ---

    pub fn import(
        &mut self,
        entity: &EntityId,
        tab_name: &str,
        raw_text: &str,
        config: Option<ImportConfig>,
        split_variables: bool,
    ) -> Result<commands::CmdResult> {
        let fallback = self.load_config()?.import;
        commands::import::run(
            &mut self.store,
            entity,
            tab_name,
            raw_text,
            config,
            &fallback,
            split_variables,
        )
    }

    // --- tree ---

    pub fn tree(&self, entity: &EntityId) -> Result<commands::CmdResult> {
        commands::tree::show(&self.store, entity)
    }

    pub fn add_tab(&mut self, entity: &EntityId, name: Option<&str>) -> Result<commands::CmdResult> {
        commands::tree::add_tab(&mut self.store, entity, name)
    }

    pub fn rename_tab(&mut self, entity: &EntityId, tab_ref: &str, name: &str) -> Result<commands::CmdResult> {
        let id = self.resolve_node(entity, tab_ref)?;
        commands::tree::rename_tab(&mut self.store, entity, id, name)
    }

    pub fn delete_tab(&mut self, entity: &EntityId, tab_ref: &str) -> Result<commands::CmdResult> {
        let id = self.resolve_node(entity, tab_ref)?;
        commands::tree::delete_tab(&mut self.store, entity, id)
    }

    pub fn add_header(
        &mut self,
        entity: &EntityId,
        tab_ref: &str,
        name: Option<&str>,
    ) -> Result<commands::CmdResult> {
        let id = self.resolve_node(entity, tab_ref)?;
        commands::tree::add_header(&mut self.store, entity, id, name)
    }

    pub fn delete_header(&mut self, entity: &EntityId, header_ref: &str) -> Result<commands::CmdResult> {
        let id = self.resolve_node(entity, header_ref)?;
        commands::tree::delete_header(&mut self.store, entity, id)
    }

    pub fn toggle_header(&mut self, entity: &EntityId, header_ref: &str) -> Result<commands::CmdResult> {
        let id = self.resolve_node(entity, header_ref)?;
        commands::tree::toggle_header(&mut self.store, entity, id)
    }

    pub fn add_macro(
        &mut self,
        entity: &EntityId,
        header_ref: &str,
        display: Option<&str>,
        formula: Option<&str>,
    ) -> Result<commands::CmdResult> {
        let id = self.resolve_node(entity, header_ref)?;
        commands::tree::add_macro(&mut self.store, entity, id, display, formula)
    }

    pub fn update_macro(
        &mut self,
        entity: &EntityId,
        macro_ref: &str,
        display: Option<&str>,
        formula: Option<&str>,
    ) -> Result<commands::CmdResult> {
        let id = self.resolve_node(entity, macro_ref)?;
        commands::tree::update_macro(&mut self.store, entity, id, display, formula)
    }

    pub fn delete_macro(&mut self, entity: &EntityId, macro_ref: &str) -> Result<commands::CmdResult> {
        let id = self.resolve_node(entity, macro_ref)?;
        commands::tree::delete_macro(&mut self.store, entity, id)
    }

    // --- original tables ---

    pub fn tables(&self) -> Result<commands::CmdResult> {
        commands::tables::list(&self.store)
    }

    pub fn save_table(&mut self, command: &str, body: &str) -> Result<commands::CmdResult> {
        commands::tables::save(&mut self.store, command, body)
    }

    pub fn delete_table(&mut self, command: &str) -> Result<commands::CmdResult> {
        commands::tables::delete(&mut self.store, command)
    }

    pub fn backup_tables(&self) -> Result<commands::CmdResult> {
        commands::tables::backup(&self.store)
    }

    pub fn restore_tables(&mut self, json: &str) -> Result<commands::CmdResult> {
        commands::tables::restore(&mut self.store, json)
    }

    // --- sheet sync ---

    pub fn sync_pull(&mut self, entity: &EntityId, sheet: &Value) -> Result<commands::CmdResult> {
        let rules = self.load_config()?.sync_rules;
        commands::sync::pull(&mut self.store, entity, sheet, &rules)
    }

    pub fn sync_push(&self, entity: &EntityId, key: &str, sheet: &Value) -> Result<commands::CmdResult> {
        let rules = self.load_config()?.sync_rules;
        commands::sync::push(&self.store, entity, key, sheet, &rules)
    }

    pub fn config(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.config_dir, action)
    }

    /// Resolve a node reference: a full id, or a unique prefix of one.
    fn resolve_node(&self, entity: &EntityId, input: &str) -> Result<Uuid> {
        let input = input.trim();
        if let Ok(id) = Uuid::parse_str(input) {
            return Ok(id);
        }
        let data = self.store.load_entity(entity)?;
        resolve_prefix(&data.tabs, input)
    }
}

fn resolve_prefix(tree: &MacroTree, prefix: &str) -> Result<Uuid> {
    if prefix.is_empty() {
        return Err(RollmacroError::Validation("Empty node reference".to_string()));
    }
    let prefix = prefix.to_ascii_lowercase();
    let mut matches = Vec::new();
    for tab in &tree.tabs {
        matches.push(tab.id);
        for header in &tab.headers {
            matches.push(header.id);
            matches.extend(header.macros.iter().map(|m| m.id));
        }
    }
    matches.retain(|id| id.to_string().starts_with(&prefix));

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(RollmacroError::Validation(format!(
            "No node matches {}",
            prefix
        ))),
        _ => Err(RollmacroError::Validation(format!(
            "{} matches {} nodes, use a longer prefix",
            prefix,
            matches.len()
        ))),
    }
}

pub use crate::commands::config::ConfigAction;
pub use commands::{CmdMessage, CmdResult, MessageLevel};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::Route;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::InMemoryStore;
    use tempfile::TempDir;

    fn api_with(store: InMemoryStore) -> (TempDir, RollmacroApi<InMemoryStore>) {
        let dir = TempDir::new().unwrap();
        let api = RollmacroApi::new(store, dir.path().to_path_buf());
        (dir, api)
    }

    #[test]
    fn test_roll_dispatches() {
        let (_dir, mut api) = api_with(StoreFixture::new().with_variables("str=1").store);
        let res = api.roll(&StoreFixture::entity(), "2d6+{str}").unwrap();
        assert_eq!(res.route, Some(Route::Roll("2d6+1".to_string())));
    }

    struct FixedRoller(&'static str);

    impl DiceRoller for FixedRoller {
        fn roll(&self, system: &str, command: &str) -> Result<crate::roll::RollResponse> {
            Ok(crate::roll::RollResponse {
                ok: !command.is_empty(),
                text: format!("{} ({}) ＞ {}", system, command, self.0),
                ..Default::default()
            })
        }

        fn roll_table(&self, _table: &str) -> Result<crate::roll::RollResponse> {
            Ok(crate::roll::RollResponse {
                ok: true,
                text: self.0.to_string(),
                ..Default::default()
            })
        }
    }

    #[test]
    fn test_roll_with_roller() {
        let (dir, mut api) = api_with(StoreFixture::new().with_variables("hp=3\nstr=1").store);
        let mut config = RollmacroConfig::default();
        config.set("game-system", "Cthulhu7th").unwrap();
        config.save(dir.path()).unwrap();
        let entity = StoreFixture::entity();

        let res = api.roll_with(&entity, "/bcd 1d20+{str}", &FixedRoller("14")).unwrap();
        let response = res.response.unwrap();
        assert_eq!(response.text, "Cthulhu7th (1d20+1) ＞ 14");
        assert_eq!(response.result_value(), "14");

        let res = api.roll_with(&entity, ":hp+1", &FixedRoller("14")).unwrap();
        assert!(res.response.is_none());
        assert_eq!(res.change.unwrap().new.to_string(), "4");
    }

    #[test]
    fn test_roll_inline() {
        let (_dir, mut api) = api_with(StoreFixture::new().with_variables("str=1").store);
        let results = api
            .roll_inline(&StoreFixture::entity(), "[[/bcd 2d6]] then [[/bcd 1d4+{str}]]")
            .unwrap();
        let routes: Vec<_> = results.into_iter().filter_map(|r| r.route).collect();
        assert_eq!(
            routes,
            vec![Route::Roll("2d6".to_string()), Route::Roll("1d4+1".to_string())]
        );
    }

    #[test]
    fn test_macro_by_id_prefix() {
        let (_dir, mut api) = api_with(StoreFixture::new().with_macros(&[("Hit", "1d20")]).store);
        let entity = StoreFixture::entity();
        let tree = api.tree(&entity).unwrap().tree.unwrap();
        let id = tree.tabs[0].headers[0].macros[0].id.to_string();

        let res = api.roll_macro(&entity, &id[..8]).unwrap();
        assert_eq!(res.route, Some(Route::Roll("1d20".to_string())));
        let res = api.roll_macro(&entity, &id).unwrap();
        assert_eq!(res.route, Some(Route::Roll("1d20".to_string())));
    }

    #[test]
    fn test_resolve_prefix_errors() {
        let mut tree = MacroTree::new();
        let tab = tree.add_tab(None);
        assert!(resolve_prefix(&tree, "").is_err());
        assert!(resolve_prefix(&tree, "zz").is_err());
        assert_eq!(resolve_prefix(&tree, &tab.to_string()[..6]).unwrap(), tab);
    }

    #[test]
    fn test_import_uses_configured_defaults() {
        let (dir, mut api) = api_with(InMemoryStore::new());
        let mut config = RollmacroConfig::default();
        config.set("macro-splitter", ":").unwrap();
        config.save(dir.path()).unwrap();

        let entity = StoreFixture::entity();
        api.import(&entity, "T", "■H=\nHit:1d20", None, false).unwrap();
        let tree = api.tree(&entity).unwrap().tree.unwrap();
        assert_eq!(tree.tabs[0].headers[0].macros[0].display, "Hit");
    }

    #[test]
    fn test_sync_uses_configured_rules() {
        let (dir, mut api) = api_with(StoreFixture::new().with_variables("hp=1").store);
        let mut config = RollmacroConfig::default();
        config.sync_rules = "hp:hitPoints".to_string();
        config.save(dir.path()).unwrap();

        let entity = StoreFixture::entity();
        let sheet = serde_json::json!({"hitPoints": 9});
        api.sync_pull(&entity, &sheet).unwrap();
        let res = api.variables(&entity, false).unwrap();
        assert_eq!(res.output.as_deref(), Some("hp=9"));
    }
}
