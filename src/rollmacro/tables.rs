//! Original tables: user-written roll tables invoked by typing their command.
//!
//! The table body is handed to the roller as-is; its first line (usually the
//! dice expression, e.g. `1D6`) doubles as the display name.

use crate::error::{Result, RollmacroError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TABLE_NAME: &str = "New Table";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalTable {
    pub id: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub table: String,
}

impl OriginalTable {
    pub fn new(command: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            command: command.into(),
            table: table.into(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.table
            .lines()
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .unwrap_or(DEFAULT_TABLE_NAME)
    }

    /// Check this table against the rest of the collection.
    pub fn validate(&self, others: &[OriginalTable]) -> Result<()> {
        let command = self.command.trim();
        if command.is_empty() {
            if self.table.trim().is_empty() {
                return Ok(());
            }
            return Err(RollmacroError::Validation(
                "A table with content needs a command".to_string(),
            ));
        }
        if !command.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(RollmacroError::Validation(format!(
                "Table command must be alphanumeric: {}",
                command
            )));
        }
        let duplicate = others
            .iter()
            .filter(|t| t.id != self.id)
            .any(|t| t.command.trim().eq_ignore_ascii_case(command));
        if duplicate {
            return Err(RollmacroError::Validation(format!(
                "Table command already in use: {}",
                command
            )));
        }
        Ok(())
    }
}

/// Case-insensitive command lookup. Tables without a command never match.
pub fn find_by_command<'a>(tables: &'a [OriginalTable], command: &str) -> Option<&'a OriginalTable> {
    let command = command.trim();
    if command.is_empty() {
        return None;
    }
    tables
        .iter()
        .find(|t| t.command.trim().eq_ignore_ascii_case(command))
}

/// Insert or replace `table` (matched by id) after validating it.
pub fn upsert(tables: &mut Vec<OriginalTable>, table: OriginalTable) -> Result<()> {
    table.validate(tables)?;
    match tables.iter_mut().find(|t| t.id == table.id) {
        Some(existing) => *existing = table,
        None => tables.push(table),
    }
    Ok(())
}

pub fn remove(tables: &mut Vec<OriginalTable>, command: &str) -> Result<OriginalTable> {
    let pos = tables
        .iter()
        .position(|t| t.command.trim().eq_ignore_ascii_case(command.trim()))
        .ok_or_else(|| RollmacroError::TableNotFound(command.to_string()))?;
    Ok(tables.remove(pos))
}

pub fn backup(tables: &[OriginalTable]) -> Result<String> {
    Ok(serde_json::to_string_pretty(tables)?)
}

/// Parse a backup. Anything but a JSON array of tables is rejected.
pub fn restore(json: &str) -> Result<Vec<OriginalTable>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.is_array() {
        return Err(RollmacroError::Validation(
            "Table backup must be a JSON array".to_string(),
        ));
    }
    let tables: Vec<OriginalTable> = serde_json::from_value(value)?;
    for (i, table) in tables.iter().enumerate() {
        table.validate(&tables[..i])?;
    }
    Ok(tables)
}
