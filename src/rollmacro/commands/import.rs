use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::importer::{import_text, ImportConfig};
use crate::model::EntityId;
use crate::store::DataStore;

/// Import `raw_text` as a new tab for `entity`.
///
/// Without an explicit `config` the entity's last import settings are reused,
/// then `fallback`. The settings used are remembered on the entity. With
/// `split_variables`, the extracted variable lines replace the entity's
/// variable text.
pub fn run<S: DataStore>(
    store: &mut S,
    entity: &EntityId,
    tab_name: &str,
    raw_text: &str,
    config: Option<ImportConfig>,
    fallback: &ImportConfig,
    split_variables: bool,
) -> Result<CmdResult> {
    let mut data = store.load_entity(entity)?;
    let config = config
        .or_else(|| data.import_settings.clone())
        .unwrap_or_else(|| fallback.clone());

    let outcome = import_text(tab_name, raw_text, &config, split_variables);
    let headers = outcome.tab.headers.len();
    let macros = outcome.tab.macro_count();
    let tab_id = data.tabs.push_tab(outcome.tab);

    let mut result = CmdResult::default();
    if split_variables {
        data.replacements = outcome.extracted_variables;
        result.add_message(CmdMessage::info("Variables replaced by imported lines"));
    }
    data.import_settings = Some(config);
    store.save_entity(entity, &data)?;

    result.add_message(CmdMessage::success(format!(
        "Imported tab {}: {} header(s), {} macro(s)",
        tab_name, headers, macros
    )));
    Ok(result.with_created_ids(vec![tab_id]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::MacroOrder;
    use crate::store::memory::fixtures::StoreFixture;

    fn colon_config() -> ImportConfig {
        ImportConfig {
            macro_splitter: ":".to_string(),
            ..ImportConfig::default()
        }
    }

    #[test]
    fn test_import_appends_tab_and_remembers_settings() {
        let mut store = StoreFixture::new().with_macros(&[("Old", "1d6")]).store;
        let entity = StoreFixture::entity();

        let res = run(
            &mut store,
            &entity,
            "Imported",
            "■Header1=\nA:1d20\nB:2d6",
            Some(colon_config()),
            &ImportConfig::default(),
            false,
        )
        .unwrap();

        let data = store.load_entity(&entity).unwrap();
        assert_eq!(data.tabs.tabs.len(), 2);
        assert_eq!(data.tabs.tabs[1].id, res.created_ids[0]);
        assert_eq!(data.tabs.tabs[1].macro_count(), 2);
        assert_eq!(data.import_settings, Some(colon_config()));
    }

    #[test]
    fn test_import_reuses_entity_settings() {
        let mut store = StoreFixture::new().store;
        let entity = StoreFixture::entity();
        let mut right = colon_config();
        right.macro_order = MacroOrder::Right;
        let fallback = ImportConfig::default();

        run(&mut store, &entity, "A", "", Some(right), &fallback, false).unwrap();
        run(&mut store, &entity, "B", "■H=\n1d20:Hit", None, &fallback, false).unwrap();

        let data = store.load_entity(&entity).unwrap();
        let m = &data.tabs.tabs[1].headers[0].macros[0];
        assert_eq!((m.display.as_str(), m.formula.as_str()), ("Hit", "1d20"));
    }

    #[test]
    fn test_split_variables_replaces_store_text() {
        let mut store = StoreFixture::new().with_variables("old=1").store;
        let entity = StoreFixture::entity();
        let text = "// str=3\n■H=\nHit:1d20+{str}";

        run(&mut store, &entity, "T", text, Some(colon_config()), &ImportConfig::default(), true)
            .unwrap();
        assert_eq!(store.load_entity(&entity).unwrap().replacements, "str=3");
    }
}
