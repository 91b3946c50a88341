//! Tree editing. Each function loads the entity, applies one [`MacroTree`]
//! operation and saves.
//!
//! [`MacroTree`]: crate::model::MacroTree

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{EntityId, MacroData};
use crate::store::DataStore;
use uuid::Uuid;

fn edit<S, F>(store: &mut S, entity: &EntityId, f: F) -> Result<CmdResult>
where
    S: DataStore,
    F: FnOnce(&mut MacroData) -> Result<CmdResult>,
{
    let mut data = store.load_entity(entity)?;
    let result = f(&mut data)?;
    store.save_entity(entity, &data)?;
    Ok(result)
}

fn created(id: Uuid, message: String) -> CmdResult {
    let mut result = CmdResult::default().with_created_ids(vec![id]);
    result.add_message(CmdMessage::success(message));
    result
}

fn done(message: String) -> CmdResult {
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(message));
    result
}

pub fn show<S: DataStore>(store: &S, entity: &EntityId) -> Result<CmdResult> {
    let data = store.load_entity(entity)?;
    Ok(CmdResult::default().with_tree(data.tabs))
}

pub fn add_tab<S: DataStore>(store: &mut S, entity: &EntityId, name: Option<&str>) -> Result<CmdResult> {
    edit(store, entity, |data| {
        let id = data.tabs.add_tab(name);
        Ok(created(id, format!("Added tab {}", id)))
    })
}

pub fn rename_tab<S: DataStore>(store: &mut S, entity: &EntityId, tab_id: Uuid, name: &str) -> Result<CmdResult> {
    edit(store, entity, |data| {
        data.tabs.rename_tab(tab_id, name)?;
        Ok(done(format!("Renamed tab to {}", name)))
    })
}

pub fn delete_tab<S: DataStore>(store: &mut S, entity: &EntityId, tab_id: Uuid) -> Result<CmdResult> {
    edit(store, entity, |data| {
        let tab = data.tabs.delete_tab(tab_id)?;
        Ok(done(format!("Deleted tab {}", tab.name)))
    })
}

pub fn add_header<S: DataStore>(
    store: &mut S,
    entity: &EntityId,
    tab_id: Uuid,
    name: Option<&str>,
) -> Result<CmdResult> {
    edit(store, entity, |data| {
        let id = data.tabs.add_header(tab_id, name)?;
        Ok(created(id, format!("Added header {}", id)))
    })
}

pub fn delete_header<S: DataStore>(store: &mut S, entity: &EntityId, header_id: Uuid) -> Result<CmdResult> {
    edit(store, entity, |data| {
        let header = data.tabs.delete_header(header_id)?;
        Ok(done(format!("Deleted header {}", header.name)))
    })
}

pub fn toggle_header<S: DataStore>(store: &mut S, entity: &EntityId, header_id: Uuid) -> Result<CmdResult> {
    edit(store, entity, |data| {
        let open = data.tabs.toggle_header(header_id)?;
        let state = if open { "open" } else { "closed" };
        Ok(done(format!("Header is now {}", state)))
    })
}

pub fn add_macro<S: DataStore>(
    store: &mut S,
    entity: &EntityId,
    header_id: Uuid,
    display: Option<&str>,
    formula: Option<&str>,
) -> Result<CmdResult> {
    edit(store, entity, |data| {
        let id = data.tabs.add_macro(header_id, display, formula)?;
        Ok(created(id, format!("Added macro {}", id)))
    })
}

pub fn update_macro<S: DataStore>(
    store: &mut S,
    entity: &EntityId,
    macro_id: Uuid,
    display: Option<&str>,
    formula: Option<&str>,
) -> Result<CmdResult> {
    edit(store, entity, |data| {
        let m = data.tabs.update_macro(macro_id, display, formula)?;
        Ok(done(format!("Updated macro {}: {}", m.display, m.formula)))
    })
}

pub fn delete_macro<S: DataStore>(store: &mut S, entity: &EntityId, macro_id: Uuid) -> Result<CmdResult> {
    edit(store, entity, |data| {
        let m = data.tabs.delete_macro(macro_id)?;
        Ok(done(format!("Deleted macro {}", m.display)))
    })
}
