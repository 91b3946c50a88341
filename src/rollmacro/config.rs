use crate::error::{Result, RollmacroError};
use crate::importer::{ImportConfig, MacroOrder};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";

pub const DEFAULT_SERVER: &str = "https://bcdice.onlinesession.app/v2";
pub const DEFAULT_GAME_SYSTEM: &str = "DiceBot";
pub const DEFAULT_SUCCESS_COLOR: &str = "#2e6dff";
pub const DEFAULT_FAILURE_COLOR: &str = "#ff0077";
pub const DEFAULT_NORMAL_COLOR: &str = "#555555";

// Used when a stored color does not parse.
const FALLBACK_SUCCESS_COLOR: &str = "#2667ff";
const FALLBACK_FAILURE_COLOR: &str = "#ff0077";
const FALLBACK_NORMAL_COLOR: &str = "#555555";

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("color regex must compile")
});

pub const KEYS: [&str; 13] = [
    "server",
    "game-system",
    "success-color",
    "failure-color",
    "normal-color",
    "result-output",
    "roller-persistence",
    "formula-persistence",
    "header-start",
    "header-end",
    "macro-order",
    "macro-splitter",
    "variable-marker",
];

/// Host settings, stored in `config.json` in the data directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RollmacroConfig {
    pub server: String,
    pub game_system: String,
    pub success_color: String,
    pub failure_color: String,
    pub normal_color: String,
    /// Show only the final value of a roll instead of the full text.
    pub result_output: bool,
    /// Keep the roller window open between rolls.
    pub roller_persistence: bool,
    /// Keep the last formula in the roller input.
    pub formula_persistence: bool,
    pub import: ImportConfig,
    /// Sheet sync rules, see [`crate::sync::parse_rules`].
    pub sync_rules: String,
}

impl Default for RollmacroConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            game_system: DEFAULT_GAME_SYSTEM.to_string(),
            success_color: DEFAULT_SUCCESS_COLOR.to_string(),
            failure_color: DEFAULT_FAILURE_COLOR.to_string(),
            normal_color: DEFAULT_NORMAL_COLOR.to_string(),
            result_output: false,
            roller_persistence: true,
            formula_persistence: false,
            import: ImportConfig::default(),
            sync_rules: String::new(),
        }
    }
}

pub fn is_valid_color(color: &str) -> bool {
    HEX_COLOR_RE.is_match(color)
}

fn color_or<'a>(color: &'a str, fallback: &'a str) -> &'a str {
    if is_valid_color(color) {
        color
    } else {
        fallback
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(RollmacroError::Validation(format!(
            "{} expects true or false, got {}",
            key, value
        ))),
    }
}

impl RollmacroConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: RollmacroConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    pub fn success_color(&self) -> &str {
        color_or(&self.success_color, FALLBACK_SUCCESS_COLOR)
    }

    pub fn failure_color(&self) -> &str {
        color_or(&self.failure_color, FALLBACK_FAILURE_COLOR)
    }

    pub fn normal_color(&self) -> &str {
        color_or(&self.normal_color, FALLBACK_NORMAL_COLOR)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "server" => self.server.clone(),
            "game-system" => self.game_system.clone(),
            "success-color" => self.success_color.clone(),
            "failure-color" => self.failure_color.clone(),
            "normal-color" => self.normal_color.clone(),
            "result-output" => self.result_output.to_string(),
            "roller-persistence" => self.roller_persistence.to_string(),
            "formula-persistence" => self.formula_persistence.to_string(),
            "header-start" => self.import.header_marker.start.clone(),
            "header-end" => self.import.header_marker.end.clone(),
            "macro-order" => self.import.macro_order.to_string(),
            "macro-splitter" => self.import.macro_splitter.clone(),
            "variable-marker" => self.import.variable_marker.clone(),
            _ => return None,
        };
        Some(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "server" => self.server = value.trim_end_matches('/').to_string(),
            "game-system" => self.game_system = value.to_string(),
            "success-color" | "failure-color" | "normal-color" => {
                if !is_valid_color(value) {
                    return Err(RollmacroError::Validation(format!(
                        "Invalid color: {} (expected #rgb or #rrggbb)",
                        value
                    )));
                }
                let slot = match key {
                    "success-color" => &mut self.success_color,
                    "failure-color" => &mut self.failure_color,
                    _ => &mut self.normal_color,
                };
                *slot = value.to_string();
            }
            "result-output" => self.result_output = parse_bool(key, value)?,
            "roller-persistence" => self.roller_persistence = parse_bool(key, value)?,
            "formula-persistence" => self.formula_persistence = parse_bool(key, value)?,
            "header-start" => self.import.header_marker.start = value.to_string(),
            "header-end" => self.import.header_marker.end = value.to_string(),
            "macro-order" => self.import.macro_order = value.parse::<MacroOrder>()?,
            "macro-splitter" => self.import.macro_splitter = value.to_string(),
            "variable-marker" => self.import.variable_marker = value.to_string(),
            _ => {
                return Err(RollmacroError::Validation(format!(
                    "Unknown config key: {}",
                    key
                )))
            }
        }
        Ok(())
    }
}
