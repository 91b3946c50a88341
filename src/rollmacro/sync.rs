//! # Sheet Sync
//!
//! Keeps store variables and a character sheet's property bag in step. The sheet
//! is a JSON object; a property is either a scalar field or a table, which is a
//! list of row objects (an array, or an object keyed by row index).
//!
//! Rules are written one per line as `variable:target`:
//!
//! ```text
//! hp:hitPoints              # scalar field `hitPoints`
//! str:abilities,name,score  # row of `abilities` whose `name` is `str`, column `score`
//! ```
//!
//! [`pull`] copies sheet values into entries that already exist in the store;
//! [`push`] turns a changed variable into updates for the sheet.

use crate::variables::{ChangeResult, VariableStore};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetTarget {
    Field(String),
    TableCell {
        table: String,
        label_column: String,
        value_column: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRule {
    pub variable: String,
    pub target: SheetTarget,
}

/// A write the host should perform on the sheet. `path` is dot separated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SheetUpdate {
    Field { path: String, value: String },
    Cell { path: String, value: String },
}

impl SheetUpdate {
    pub fn path(&self) -> &str {
        match self {
            SheetUpdate::Field { path, .. } | SheetUpdate::Cell { path, .. } => path,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            SheetUpdate::Field { value, .. } | SheetUpdate::Cell { value, .. } => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullOutcome {
    pub updated_text: String,
    pub updated_keys: Vec<String>,
}

/// Lines without a `:` are ignored.
pub fn parse_rules(text: &str) -> Vec<SyncRule> {
    text.lines()
        .filter_map(|line| {
            let (variable, target) = line.trim().split_once(':')?;
            let (variable, target) = (variable.trim(), target.trim());
            if variable.is_empty() || target.is_empty() {
                return None;
            }
            let target = if target.contains(',') {
                let mut parts = target.split(',').map(str::trim);
                SheetTarget::TableCell {
                    table: parts.next().unwrap_or_default().to_string(),
                    label_column: parts.next().unwrap_or_default().to_string(),
                    value_column: parts.next().unwrap_or_default().to_string(),
                }
            } else {
                SheetTarget::Field(target.to_string())
            };
            Some(SyncRule {
                variable: variable.to_string(),
                target,
            })
        })
        .collect()
}

/// Copy sheet values into the store text. Variables missing from the store are
/// not created.
pub fn pull(store_text: &str, sheet: &Value, rules: &[SyncRule]) -> PullOutcome {
    let mut store = VariableStore::parse(store_text);
    let mut updated_keys: Vec<String> = Vec::new();

    for rule in rules {
        let Some(value) = read_target(sheet, rule) else {
            continue;
        };
        let Some((idx, previous)) = store.find_entry(&rule.variable) else {
            tracing::debug!(variable = %rule.variable, "sync target has no store entry");
            continue;
        };
        if updated_keys.contains(&rule.variable) {
            tracing::warn!(variable = %rule.variable, "key conflict in sync rules");
        }
        if previous != value {
            let line = format!("{}={}", rule.variable, value);
            store.replace_line(idx, &line);
        }
        updated_keys.push(rule.variable.clone());
    }

    PullOutcome {
        updated_text: store.to_text(),
        updated_keys,
    }
}

/// Sheet updates for a changed variable.
pub fn push(change: &ChangeResult, sheet: &Value, rules: &[SyncRule]) -> Vec<SheetUpdate> {
    let value = change.new.to_string();
    let matching: Vec<&SyncRule> = rules.iter().filter(|r| r.variable == change.key).collect();
    if matching.len() > 1 {
        tracing::warn!(variable = %change.key, "key conflict in sync rules");
    }

    let mut updates = Vec::new();
    for rule in matching {
        match &rule.target {
            SheetTarget::Field(field) => {
                if sheet.get(field).is_none() {
                    tracing::warn!(field = %field, "sheet has no such field");
                    continue;
                }
                updates.push(SheetUpdate::Field {
                    path: field.clone(),
                    value: value.clone(),
                });
            }
            SheetTarget::TableCell {
                table,
                label_column,
                value_column,
            } => {
                let Some(rows) = sheet.get(table) else {
                    tracing::warn!(table = %table, "sheet has no such table");
                    continue;
                };
                let before = updates.len();
                for (row_key, row) in table_rows(rows) {
                    if cell_text(row.get(label_column)).as_deref() == Some(change.key.as_str()) {
                        updates.push(SheetUpdate::Cell {
                            path: format!("{}.{}.{}", table, row_key, value_column),
                            value: value.clone(),
                        });
                    }
                }
                if updates.len() == before {
                    tracing::warn!(table = %table, label = %change.key, "no table row for variable");
                }
            }
        }
    }
    updates
}

/// Write `updates` into a JSON sheet in place.
pub fn apply_updates(sheet: &mut Value, updates: &[SheetUpdate]) {
    for update in updates {
        let segments: Vec<&str> = update.path().split('.').collect();
        match node_at(sheet, &segments) {
            Some(node) => *node = Value::String(update.value().to_string()),
            None => tracing::warn!(path = %update.path(), "sheet path not writable"),
        }
    }
}

fn node_at<'a>(node: &'a mut Value, segments: &[&str]) -> Option<&'a mut Value> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(node);
    };
    let child = match node {
        Value::Array(items) => items.get_mut(first.parse::<usize>().ok()?)?,
        Value::Object(map) => map.entry(first.to_string()).or_insert(Value::Null),
        _ => return None,
    };
    node_at(child, rest)
}

fn read_target(sheet: &Value, rule: &SyncRule) -> Option<String> {
    match &rule.target {
        SheetTarget::Field(field) => {
            let value = sheet.get(field)?;
            if value.is_object() || value.is_array() {
                return None;
            }
            cell_text(Some(value))
        }
        SheetTarget::TableCell {
            table,
            label_column,
            value_column,
        } => table_rows(sheet.get(table)?)
            .into_iter()
            .filter(|(_, row)| {
                cell_text(row.get(label_column)).as_deref() == Some(rule.variable.as_str())
            })
            .filter_map(|(_, row)| cell_text(row.get(value_column)))
            .last(),
    }
}

fn table_rows(rows: &Value) -> Vec<(String, &Value)> {
    match rows {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, row)| (i.to_string(), row))
            .collect(),
        Value::Object(map) => map.iter().map(|(k, row)| (k.clone(), row)).collect(),
        _ => Vec::new(),
    }
}

fn cell_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::VarValue;
    use serde_json::json;

    fn sheet() -> Value {
        json!({
            "hitPoints": 12,
            "name": "Aria",
            "abilities": [
                {"name": "str", "score": "14"},
                {"name": "dex", "score": 16}
            ]
        })
    }

    fn rules() -> Vec<SyncRule> {
        parse_rules("hp:hitPoints\nstr:abilities,name,score\ndex : abilities, name, score\nnonsense")
    }

    #[test]
    fn test_parse_rules() {
        let rules = rules();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].target, SheetTarget::Field("hitPoints".to_string()));
        assert_eq!(
            rules[2].target,
            SheetTarget::TableCell {
                table: "abilities".to_string(),
                label_column: "name".to_string(),
                value_column: "score".to_string(),
            }
        );
    }

    #[test]
    fn test_pull_updates_existing_entries_only() {
        let out = pull("# stats\nhp=5\nstr=10\nlevel=3", &sheet(), &rules());
        assert_eq!(out.updated_text, "# stats\nhp=12\nstr=14\nlevel=3");
        assert_eq!(out.updated_keys, vec!["hp", "str"]);
    }

    #[test]
    fn test_pull_leaves_unchanged_lines_raw() {
        let out = pull("hp = 12", &sheet(), &rules());
        assert_eq!(out.updated_text, "hp = 12");
    }

    #[test]
    fn test_push_field_and_cell() {
        let change = ChangeResult {
            key: "hp".to_string(),
            previous: Some("12".to_string()),
            new: VarValue::Number(9.0),
        };
        assert_eq!(
            push(&change, &sheet(), &rules()),
            vec![SheetUpdate::Field {
                path: "hitPoints".to_string(),
                value: "9".to_string()
            }]
        );

        let change = ChangeResult {
            key: "dex".to_string(),
            previous: None,
            new: VarValue::Number(17.0),
        };
        let updates = push(&change, &sheet(), &rules());
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].path(), "abilities.1.score");
    }

    #[test]
    fn test_push_without_rule_or_field_is_empty() {
        let change = ChangeResult {
            key: "mp".to_string(),
            previous: None,
            new: VarValue::Number(1.0),
        };
        assert!(push(&change, &sheet(), &rules()).is_empty());

        let missing = parse_rules("mp:manaPoints");
        assert!(push(&change, &sheet(), &missing).is_empty());
    }

    #[test]
    fn test_apply_updates() {
        let mut sheet = sheet();
        apply_updates(
            &mut sheet,
            &[
                SheetUpdate::Field {
                    path: "hitPoints".to_string(),
                    value: "9".to_string(),
                },
                SheetUpdate::Cell {
                    path: "abilities.0.score".to_string(),
                    value: "15".to_string(),
                },
            ],
        );
        assert_eq!(sheet["hitPoints"], "9");
        assert_eq!(sheet["abilities"][0]["score"], "15");
    }
}
