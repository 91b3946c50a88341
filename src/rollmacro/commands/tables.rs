use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::DataStore;
use crate::tables::{self, find_by_command, OriginalTable};

pub fn list<S: DataStore>(store: &S) -> Result<CmdResult> {
    Ok(CmdResult::default().with_tables(store.load_tables()?))
}

/// Create a table, or replace the body of the one with the same command.
pub fn save<S: DataStore>(store: &mut S, command: &str, body: &str) -> Result<CmdResult> {
    let mut all = store.load_tables()?;
    let table = match find_by_command(&all, command) {
        Some(existing) => OriginalTable {
            id: existing.id.clone(),
            command: command.trim().to_string(),
            table: body.to_string(),
        },
        None => OriginalTable::new(command.trim(), body),
    };
    let name = table.display_name().to_string();
    tables::upsert(&mut all, table)?;
    store.save_tables(&all)?;

    let mut result = CmdResult::default().with_tables(all);
    result.add_message(CmdMessage::success(format!(
        "Saved table {} ({})",
        command.trim(),
        name
    )));
    Ok(result)
}

pub fn delete<S: DataStore>(store: &mut S, command: &str) -> Result<CmdResult> {
    let mut all = store.load_tables()?;
    let removed = tables::remove(&mut all, command)?;
    store.save_tables(&all)?;

    let mut result = CmdResult::default().with_tables(all);
    result.add_message(CmdMessage::success(format!("Deleted table {}", removed.command)));
    Ok(result)
}

pub fn backup<S: DataStore>(store: &S) -> Result<CmdResult> {
    let all = store.load_tables()?;
    Ok(CmdResult::default().with_output(tables::backup(&all)?))
}

/// Replace every table with the contents of a backup.
pub fn restore<S: DataStore>(store: &mut S, json: &str) -> Result<CmdResult> {
    let restored = tables::restore(json)?;
    store.save_tables(&restored)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Restored {} table(s)",
        restored.len()
    )));
    Ok(result.with_tables(restored))
}
