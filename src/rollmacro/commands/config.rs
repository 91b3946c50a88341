use crate::commands::{CmdMessage, CmdResult};
use crate::config::RollmacroConfig;
use crate::error::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

pub fn run(dir: &Path, action: ConfigAction) -> Result<CmdResult> {
    match action {
        ConfigAction::ShowAll => {
            let config = RollmacroConfig::load(dir)?;
            Ok(CmdResult::default().with_config(config))
        }
        ConfigAction::ShowKey(key) => {
            let config = RollmacroConfig::load(dir)?;
            let mut result = CmdResult::default();
            match config.get(&key) {
                Some(val) => result.add_message(CmdMessage::info(val)),
                None => {
                    result.add_message(CmdMessage::error(format!("Unknown config key: {}", key)))
                }
            }
            Ok(result)
        }
        ConfigAction::Set(key, value) => {
            let mut config = RollmacroConfig::load(dir)?;
            if let Err(e) = config.set(&key, &value) {
                let mut res = CmdResult::default();
                res.add_message(CmdMessage::error(e.to_string()));
                return Ok(res);
            }
            config.save(dir)?;
            let display_val = config.get(&key).unwrap_or_else(|| value.clone());
            let mut result = CmdResult::default().with_config(config);
            result.add_message(CmdMessage::success(format!(
                "{} set to {}",
                key, display_val
            )));
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use tempfile::tempdir;

    #[test]
    fn test_set_then_show() {
        let dir = tempdir().unwrap();
        run(
            dir.path(),
            ConfigAction::Set("game-system".to_string(), "Cthulhu7th".to_string()),
        )
        .unwrap();

        let res = run(dir.path(), ConfigAction::ShowKey("game-system".to_string())).unwrap();
        assert_eq!(res.messages[0].content, "Cthulhu7th");

        let res = run(dir.path(), ConfigAction::ShowAll).unwrap();
        assert_eq!(res.config.unwrap().game_system, "Cthulhu7th");
    }

    #[test]
    fn test_invalid_set_reports_error_without_saving() {
        let dir = tempdir().unwrap();
        let res = run(
            dir.path(),
            ConfigAction::Set("normal-color".to_string(), "grey".to_string()),
        )
        .unwrap();
        assert_eq!(res.messages[0].level, MessageLevel::Error);
        assert!(!dir.path().join("config.json").exists());
    }

    #[test]
    fn test_unknown_key() {
        let dir = tempdir().unwrap();
        let res = run(dir.path(), ConfigAction::ShowKey("nope".to_string())).unwrap();
        assert_eq!(res.messages[0].level, MessageLevel::Error);
    }
}
