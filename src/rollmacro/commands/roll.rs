use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::EntityId;
use crate::roll::{inline_rolls, parse_chat_command, route, Route};
use crate::store::DataStore;
use uuid::Uuid;

/// Resolve `formula` for `entity`. Change commands are applied and persisted
/// here; table and dice formulas are returned for the client to send on.
/// A `/bcd` chat prefix is accepted and stripped.
pub fn run<S: DataStore>(store: &mut S, entity: &EntityId, formula: &str) -> Result<CmdResult> {
    let formula = parse_chat_command(formula).unwrap_or(formula);
    let mut data = store.load_entity(entity)?;
    let tables = store.load_tables()?;
    let routed = route(formula, &data.replacements, &tables);

    let mut result = CmdResult::default();
    match &routed {
        Route::Change(outcome) => {
            let change = &outcome.result;
            if change.is_unchanged() {
                result.add_message(CmdMessage::info(format!("{} = {}", change.key, change.new)));
            } else {
                data.replacements = outcome.updated_text.clone();
                store.save_entity(entity, &data)?;
                let previous = change.previous.as_deref().unwrap_or("(unset)");
                result.add_message(CmdMessage::success(format!(
                    "{}: {} -> {}",
                    change.key, previous, change.new
                )));
            }
            result.change = Some(change.clone());
        }
        Route::Table(_) => {
            result.add_message(CmdMessage::info(format!("Table: {}", formula.trim())));
        }
        Route::Ignored => {
            result.add_message(CmdMessage::warning(format!(
                "No variable named in: {}",
                formula.trim()
            )));
        }
        Route::Roll(command) if command.is_empty() => {
            result.add_message(CmdMessage::warning("Nothing to roll"));
        }
        Route::Roll(_) => {}
    }

    Ok(result.with_route(routed))
}

/// Roll every `[[/bcd …]]` literal found in `text`, in order.
pub fn run_inline<S: DataStore>(store: &mut S, entity: &EntityId, text: &str) -> Result<Vec<CmdResult>> {
    inline_rolls(text)
        .iter()
        .map(|formula| run(store, entity, formula))
        .collect()
}

/// Roll the formula stored in a macro.
pub fn run_macro<S: DataStore>(store: &mut S, entity: &EntityId, macro_id: Uuid) -> Result<CmdResult> {
    let data = store.load_entity(entity)?;
    let formula = data.tabs.macro_formula(macro_id)?.to_string();
    run(store, entity, &formula)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn test_roll_expands_variables() {
        let mut store = StoreFixture::new().with_variables("str=3").store;
        let entity = StoreFixture::entity();
        let res = run(&mut store, &entity, "1d20+{str}").unwrap();
        assert_eq!(res.route, Some(Route::Roll("1d20+3".to_string())));
        assert!(res.change.is_none());
    }

    #[test]
    fn test_change_is_persisted() {
        let mut store = StoreFixture::new().with_variables("hp=10\nmp=5").store;
        let entity = StoreFixture::entity();
        let res = run(&mut store, &entity, ":hp+3").unwrap();

        assert_eq!(res.change.unwrap().new.to_string(), "13");
        assert!(matches!(res.messages[0].level, MessageLevel::Success));
        assert_eq!(store.load_entity(&entity).unwrap().replacements, "hp=13\nmp=5");
    }

    #[test]
    fn test_unchanged_lookup_does_not_rewrite() {
        let mut store = StoreFixture::new().with_variables("hp = 10").store;
        let entity = StoreFixture::entity();
        let res = run(&mut store, &entity, ":hp").unwrap();

        assert!(matches!(res.messages[0].level, MessageLevel::Info));
        assert_eq!(store.load_entity(&entity).unwrap().replacements, "hp = 10");
    }

    #[test]
    fn test_change_without_target_is_ignored() {
        let mut store = StoreFixture::new().with_variables("hp=10").store;
        let entity = StoreFixture::entity();

        for formula in [":", ":+3", ":{nothing}-1"] {
            let res = run(&mut store, &entity, formula).unwrap();
            assert_eq!(res.route, Some(Route::Ignored));
            assert!(res.change.is_none());
            assert!(matches!(res.messages[0].level, MessageLevel::Warning));
        }
        assert_eq!(store.load_entity(&entity).unwrap().replacements, "hp=10");
    }

    #[test]
    fn test_chat_prefix_is_stripped() {
        let mut store = StoreFixture::new().with_variables("hp=10").store;
        let entity = StoreFixture::entity();

        let res = run(&mut store, &entity, "/bcd 2d6").unwrap();
        assert_eq!(res.route, Some(Route::Roll("2d6".to_string())));

        run(&mut store, &entity, "/bcdice :hp-1").unwrap();
        assert_eq!(store.load_entity(&entity).unwrap().replacements, "hp=9");
    }

    #[test]
    fn test_run_inline() {
        let mut store = StoreFixture::new().with_variables("hp=10\nstr=2").store;
        let entity = StoreFixture::entity();
        let text = "Swing [[/bcd 1d20+{str}]] and pay [[/bcd :hp-1]]";

        let results = run_inline(&mut store, &entity, text).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].route, Some(Route::Roll("1d20+2".to_string())));
        assert!(results[1].change.is_some());
        assert_eq!(store.load_entity(&entity).unwrap().replacements, "hp=9\nstr=2");
        assert!(run_inline(&mut store, &entity, "no rolls here").unwrap().is_empty());
    }

    #[test]
    fn test_table_command() {
        let mut store = StoreFixture::new().with_table("loot", "1D6\n1:Gold").store;
        let entity = StoreFixture::entity();
        let res = run(&mut store, &entity, "LOOT").unwrap();
        assert_eq!(res.route, Some(Route::Table("1D6\n1:Gold".to_string())));
    }

    #[test]
    fn test_run_macro() {
        let fixture = StoreFixture::new()
            .with_variables("str=2")
            .with_macros(&[("Sword", "1d20+{str}")]);
        let mut store = fixture.store;
        let entity = StoreFixture::entity();
        let id = store.load_entity(&entity).unwrap().tabs.tabs[0].headers[0].macros[0].id;

        let res = run_macro(&mut store, &entity, id).unwrap();
        assert_eq!(res.route, Some(Route::Roll("1d20+2".to_string())));
        assert!(run_macro(&mut store, &entity, Uuid::new_v4()).is_err());
    }
}
