//! # Macro Text Importer
//!
//! Turns a pasted block of free-form macro text into one [`Tab`]:
//!
//! ```text
//! // str=3                 <- variable line (variable marker `//`)
//! ■Attacks=                <- header (start marker `■`, end trim `=`)
//! Sword:1d20+{str}         <- macro, display `Sword`, formula `1d20+{str}`
//! ■Saves=
//! 2d6                      <- no splitter on the line: display == formula
//! ```
//!
//! Every marker is configurable through [`ImportConfig`]. Variable lines never
//! become macros; with `split_variables` they are also collected (marker
//! stripped) so the caller can store them as the entity's variables.

use crate::error::{Result, RollmacroError};
use crate::model::{Header, Macro, Tab};
use crate::variables::normalize_delimiters;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderMarker {
    pub start: String,
    pub end: String,
}

impl Default for HeaderMarker {
    fn default() -> Self {
        Self {
            start: "■".to_string(),
            end: "=".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacroOrder {
    /// `display<splitter>formula`
    #[default]
    Left,
    /// `formula<splitter>display`
    Right,
}

impl fmt::Display for MacroOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroOrder::Left => write!(f, "left"),
            MacroOrder::Right => write!(f, "right"),
        }
    }
}

impl FromStr for MacroOrder {
    type Err = RollmacroError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(MacroOrder::Left),
            "right" => Ok(MacroOrder::Right),
            other => Err(RollmacroError::Validation(format!(
                "Unknown macro order: {} (expected left or right)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplacementDelimiters {
    pub left: String,
    pub right: String,
}

impl Default for ReplacementDelimiters {
    fn default() -> Self {
        Self {
            left: "{".to_string(),
            right: "}".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportConfig {
    pub header_marker: HeaderMarker,
    pub macro_order: MacroOrder,
    pub macro_splitter: String,
    pub variable_marker: String,
    pub replacement_delimiters: ReplacementDelimiters,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            header_marker: HeaderMarker::default(),
            macro_order: MacroOrder::Left,
            macro_splitter: String::new(),
            variable_marker: "//".to_string(),
            replacement_delimiters: ReplacementDelimiters::default(),
        }
    }
}

impl ImportConfig {
    fn is_variable_line(&self, line: &str) -> bool {
        !self.variable_marker.is_empty() && line.trim().starts_with(&self.variable_marker)
    }

    fn strip_variable_marker<'a>(&self, line: &'a str) -> &'a str {
        let trimmed = line.trim();
        trimmed
            .strip_prefix(self.variable_marker.as_str())
            .unwrap_or(trimmed)
            .trim_start()
    }

    fn header_name<'a>(&self, line: &'a str) -> Option<&'a str> {
        let start = &self.header_marker.start;
        if start.is_empty() {
            return None;
        }
        let rest = line.trim_start().strip_prefix(start.as_str())?;
        let end = &self.header_marker.end;
        let name = match rest.find(end.as_str()) {
            Some(pos) if !end.is_empty() => &rest[..pos],
            _ => rest,
        };
        Some(name.trim())
    }

    fn parse_macro(&self, line: &str) -> Macro {
        let line = line.trim();
        let split = if self.macro_splitter.is_empty() {
            None
        } else {
            line.split_once(self.macro_splitter.as_str())
        };

        let (display, formula) = match split {
            Some((first, second)) => {
                let (first, second) = (first.trim(), second.trim());
                let (display, formula) = match self.macro_order {
                    MacroOrder::Left => (first, second),
                    MacroOrder::Right => (second, first),
                };
                match (display.is_empty(), formula.is_empty()) {
                    (true, false) => (formula, formula),
                    (false, true) => (display, display),
                    _ => (display, formula),
                }
            }
            None => (line, line),
        };

        let formula = normalize_delimiters(
            formula,
            &self.replacement_delimiters.left,
            &self.replacement_delimiters.right,
        );
        Macro::new(display, formula)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub tab: Tab,
    pub extracted_variables: String,
}

/// Parse `raw_text` into a tab named `tab_name`.
pub fn import_text(
    tab_name: &str,
    raw_text: &str,
    config: &ImportConfig,
    split_variables: bool,
) -> ImportOutcome {
    let lines: Vec<&str> = raw_text.lines().collect();

    let extracted_variables = if split_variables {
        lines
            .iter()
            .filter(|line| config.is_variable_line(line))
            .map(|line| config.strip_variable_marker(line))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        String::new()
    };

    let mut tab = Tab::new(tab_name);
    for line in lines.iter().filter(|line| !config.is_variable_line(line)) {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(name) = config.header_name(line) {
            tab.headers.push(Header::new(name));
            continue;
        }
        if tab.headers.is_empty() {
            tab.headers.push(Header::new(""));
        }
        if let Some(header) = tab.headers.last_mut() {
            header.macros.push(config.parse_macro(line));
        }
    }

    tracing::debug!(
        tab = tab_name,
        headers = tab.headers.len(),
        macros = tab.macro_count(),
        "imported macro text"
    );

    ImportOutcome {
        tab,
        extracted_variables,
    }
}
