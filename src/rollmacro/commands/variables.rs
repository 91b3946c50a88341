use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::EntityId;
use crate::store::DataStore;
use crate::variables::{apply_change, expand_table, VariableStore};

/// List variables in store order, optionally with values pre-expanded.
pub fn list<S: DataStore>(store: &S, entity: &EntityId, expanded: bool) -> Result<CmdResult> {
    let data = store.load_entity(entity)?;
    let vars = VariableStore::parse(&data.replacements);
    let pairs = if expanded {
        expand_table(&vars)
    } else {
        vars.ordered()
    };
    Ok(CmdResult::default()
        .with_variables(pairs)
        .with_output(data.replacements))
}

/// Replace the raw variable text wholesale.
pub fn set<S: DataStore>(store: &mut S, entity: &EntityId, text: &str) -> Result<CmdResult> {
    let mut data = store.load_entity(entity)?;
    data.replacements = text.to_string();
    store.save_entity(entity, &data)?;

    let count = VariableStore::parse(text).ordered().len();
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Saved {} variable(s)", count)));
    Ok(result)
}

/// Apply a `:key<op>value` command without going through roll routing.
/// `{tokens}` in the command are expanded first.
pub fn change<S: DataStore>(store: &mut S, entity: &EntityId, command: &str) -> Result<CmdResult> {
    let mut data = store.load_entity(entity)?;
    let mut result = CmdResult::default();

    let expanded = VariableStore::parse(&data.replacements).expand(command);
    let Some(outcome) = apply_change(expanded.trim(), &data.replacements) else {
        result.add_message(CmdMessage::warning(format!(
            "No variable named in: {}",
            command
        )));
        return Ok(result);
    };

    if !outcome.result.is_unchanged() {
        data.replacements = outcome.updated_text;
        store.save_entity(entity, &data)?;
    }
    result.add_message(CmdMessage::success(format!(
        "{} = {}",
        outcome.result.key, outcome.result.new
    )));
    result.change = Some(outcome.result);
    Ok(result)
}
