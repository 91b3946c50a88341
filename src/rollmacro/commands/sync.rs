use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::EntityId;
use crate::store::DataStore;
use crate::sync::{parse_rules, pull as pull_sheet, push as push_sheet};
use crate::variables::{ChangeResult, VarValue, VariableStore};
use serde_json::Value;

/// Copy sheet values into the entity's variables.
pub fn pull<S: DataStore>(
    store: &mut S,
    entity: &EntityId,
    sheet: &Value,
    rules_text: &str,
) -> Result<CmdResult> {
    let rules = parse_rules(rules_text);
    let mut data = store.load_entity(entity)?;
    let outcome = pull_sheet(&data.replacements, sheet, &rules);

    let mut result = CmdResult::default();
    if outcome.updated_text != data.replacements {
        data.replacements = outcome.updated_text;
        store.save_entity(entity, &data)?;
    }
    if outcome.updated_keys.is_empty() {
        result.add_message(CmdMessage::info("No variables matched the sheet"));
    } else {
        result.add_message(CmdMessage::success(format!(
            "Synced {}",
            outcome.updated_keys.join(", ")
        )));
    }
    Ok(result)
}

/// Sheet updates that carry a variable's current value out to the sheet.
pub fn push<S: DataStore>(
    store: &S,
    entity: &EntityId,
    key: &str,
    sheet: &Value,
    rules_text: &str,
) -> Result<CmdResult> {
    let data = store.load_entity(entity)?;
    let vars = VariableStore::parse(&data.replacements);
    let mut result = CmdResult::default();

    let Some(value) = vars.get(key) else {
        result.add_message(CmdMessage::warning(format!("No variable named {}", key)));
        return Ok(result);
    };
    let change = ChangeResult {
        key: key.to_string(),
        previous: Some(value.to_string()),
        new: VarValue::Text(value.to_string()),
    };

    let updates = push_sheet(&change, sheet, &parse_rules(rules_text));
    if updates.is_empty() {
        result.add_message(CmdMessage::warning(format!("No sheet target for {}", key)));
    }
    Ok(result.with_sheet_updates(updates))
}
