//! # Roll Dispatch
//!
//! What happens to a formula once the user hits "roll":
//!
//! 1. Variables are expanded against the entity's store.
//! 2. A leading `:` makes it a change command ([`crate::variables::change`]).
//!    One without a target key is dropped.
//! 3. A formula that equals an original table's command rolls that table.
//! 4. Anything else is normalized to half-width and sent to the dice roller.
//!
//! The roller itself lives behind [`DiceRoller`]; this crate ships no network
//! client. [`send`] hands a routed formula to it, and [`RollResponse`] mirrors
//! the JSON the roller answers with.

use crate::error::{Result, RollmacroError};
use crate::tables::{find_by_command, OriginalTable};
use crate::variables::{apply_change, ChangeOutcome, VariableStore};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const CHAT_COMMANDS: [&str; 2] = ["/bcdice", "/bcd"];

const RESULT_SEPARATOR: &str = "＞ ";

static INLINE_ROLL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[/bcd (.*?)\]\]").expect("inline roll pattern is valid"));

/// Returns the formula of a `/bcd <formula>` or `/bcdice <formula>` chat message.
pub fn parse_chat_command(message: &str) -> Option<&str> {
    let message = message.trim_start();
    CHAT_COMMANDS.iter().find_map(|cmd| {
        let rest = message.strip_prefix(cmd)?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let formula = rest.trim();
        (!formula.is_empty()).then_some(formula)
    })
}

/// Formulas of every `[[/bcd …]]` literal in `text`, in order.
pub fn inline_rolls(text: &str) -> Vec<String> {
    INLINE_ROLL_RE
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|formula| !formula.is_empty())
        .collect()
}

/// Map full-width ASCII variants and the ideographic space to plain ASCII.
pub fn to_half_width(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            '\u{3000}' => ' ',
            _ => c,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// A change command was applied; the caller persists `updated_text`.
    Change(ChangeOutcome),
    /// The formula named an original table; carries the table text.
    Table(String),
    /// Send this formula to the roller.
    Roll(String),
    /// A `:` command with no target key. Nothing is changed or rolled.
    Ignored,
}

pub fn route(formula: &str, store_text: &str, tables: &[OriginalTable]) -> Route {
    let expanded = VariableStore::parse(store_text).expand(formula);
    let expanded = expanded.trim();

    if expanded.starts_with(':') {
        return match apply_change(expanded, store_text) {
            Some(outcome) => Route::Change(outcome),
            None => Route::Ignored,
        };
    }

    if let Some(table) = find_by_command(tables, expanded) {
        tracing::debug!(command = %table.command, "formula matched an original table");
        return Route::Table(table.table.clone());
    }

    Route::Roll(to_half_width(expanded))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandResult {
    pub sides: u32,
    pub value: u32,
}

/// A roller answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollResponse {
    pub ok: bool,
    pub text: String,
    pub secret: bool,
    pub success: bool,
    pub failure: bool,
    pub critical: bool,
    pub fumble: bool,
    pub rands: Vec<RandResult>,
}

impl RollResponse {
    pub fn from_json(json: &str) -> Result<Self> {
        let response: RollResponse = serde_json::from_str(json)?;
        if !response.ok {
            return Err(RollmacroError::Api(format!(
                "Roller rejected the command: {}",
                response.text
            )));
        }
        Ok(response)
    }

    pub fn outcome(&self) -> Outcome {
        if self.success {
            Outcome::Success
        } else if self.failure {
            Outcome::Failure
        } else {
            Outcome::Normal
        }
    }

    /// The final value of the roll, i.e. the text after the last `＞ `.
    pub fn result_value(&self) -> &str {
        match self.text.rfind(RESULT_SEPARATOR) {
            Some(pos) => self.text[pos + RESULT_SEPARATOR.len()..].trim(),
            None => self.text.trim(),
        }
    }
}

/// Seam to the remote dice service.
pub trait DiceRoller {
    fn roll(&self, system: &str, command: &str) -> Result<RollResponse>;

    fn roll_table(&self, table: &str) -> Result<RollResponse>;
}

/// Hand a routed formula to `roller`. Changes, ignored commands and empty
/// formulas never reach it.
pub fn send(route: &Route, system: &str, roller: &dyn DiceRoller) -> Result<Option<RollResponse>> {
    let response = match route {
        Route::Roll(command) if !command.is_empty() => roller.roll(system, command)?,
        Route::Table(table) => roller.roll_table(table)?,
        _ => return Ok(None),
    };
    if !response.ok {
        return Err(RollmacroError::Api(format!(
            "Roller rejected the command: {}",
            response.text
        )));
    }
    tracing::debug!(text = %response.text, "roll answered");
    Ok(Some(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Answers every request with a canned response and records what it was asked.
    struct StubRoller {
        response: RollResponse,
        calls: RefCell<Vec<String>>,
    }

    impl StubRoller {
        fn answering(text: &str, ok: bool) -> Self {
            Self {
                response: RollResponse {
                    ok,
                    text: text.to_string(),
                    ..RollResponse::default()
                },
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl DiceRoller for StubRoller {
        fn roll(&self, system: &str, command: &str) -> Result<RollResponse> {
            self.calls.borrow_mut().push(format!("{}:{}", system, command));
            Ok(self.response.clone())
        }

        fn roll_table(&self, table: &str) -> Result<RollResponse> {
            self.calls.borrow_mut().push(format!("table:{}", table));
            Ok(self.response.clone())
        }
    }

    fn table(command: &str, text: &str) -> OriginalTable {
        OriginalTable {
            id: "t1".to_string(),
            command: command.to_string(),
            table: text.to_string(),
        }
    }

    #[test]
    fn test_parse_chat_command() {
        assert_eq!(parse_chat_command("/bcd 2d6"), Some("2d6"));
        assert_eq!(parse_chat_command("/bcdice 1d20+3 "), Some("1d20+3"));
        assert_eq!(parse_chat_command("/bcdx 2d6"), None);
        assert_eq!(parse_chat_command("/bcd"), None);
        assert_eq!(parse_chat_command("hello"), None);
    }

    #[test]
    fn test_inline_rolls() {
        let text = "Attack [[/bcd 1d20+5]] then [[/bcd 2d6]] damage";
        assert_eq!(inline_rolls(text), vec!["1d20+5", "2d6"]);
        assert!(inline_rolls("[[1d20]]").is_empty());
    }

    #[test]
    fn test_to_half_width() {
        assert_eq!(to_half_width("２Ｄ６＋１"), "2D6+1");
        assert_eq!(to_half_width("ＣＣ<=５０\u{3000}技能"), "CC<=50 技能");
        assert_eq!(to_half_width("1d20"), "1d20");
    }

    #[test]
    fn test_route_expands_then_rolls() {
        let route = route("１d20+{str}", "str=3", &[]);
        assert_eq!(route, Route::Roll("1d20+3".to_string()));
    }

    #[test]
    fn test_route_change_command() {
        match route(":hp-{dmg}", "hp=10\ndmg=4", &[]) {
            Route::Change(outcome) => {
                assert_eq!(outcome.updated_text, "hp=6\ndmg=4");
            }
            other => panic!("Expected change, got {:?}", other),
        }
    }

    #[test]
    fn test_route_drops_change_without_target() {
        assert_eq!(route(":", "hp=1", &[]), Route::Ignored);
        assert_eq!(route(" :+3", "hp=1", &[]), Route::Ignored);
        assert_eq!(route(":{missing}+3", "hp=1", &[]), Route::Ignored);
    }

    #[test]
    fn test_route_variable_expanding_to_change() {
        match route("{heal}", "hp=1\nheal=:hp+5", &[]) {
            Route::Change(outcome) => assert_eq!(outcome.result.key, "hp"),
            other => panic!("Expected change, got {:?}", other),
        }
    }

    #[test]
    fn test_route_table_is_case_insensitive() {
        let tables = vec![table("Loot", "1D6\n1:Gold\n2:Sword")];
        assert_eq!(
            route("loot", "", &tables),
            Route::Table("1D6\n1:Gold\n2:Sword".to_string())
        );
    }

    #[test]
    fn test_response_outcome_and_value() {
        let json = r#"{"ok":true,"text":"(2D6>=7) ＞ 9[4,5] ＞ 9 ＞ 成功","success":true,
            "rands":[{"sides":6,"value":4},{"sides":6,"value":5}]}"#;
        let response = RollResponse::from_json(json).unwrap();
        assert_eq!(response.outcome(), Outcome::Success);
        assert_eq!(response.result_value(), "成功");
        assert_eq!(response.rands.len(), 2);
        assert!(!response.secret);
    }

    #[test]
    fn test_response_without_separator() {
        let response = RollResponse {
            ok: true,
            text: " 12 ".to_string(),
            ..RollResponse::default()
        };
        assert_eq!(response.result_value(), "12");
        assert_eq!(response.outcome(), Outcome::Normal);
    }

    #[test]
    fn test_send_dispatches_by_route() {
        let roller = StubRoller::answering("(2D6) ＞ 7", true);
        let response = send(&Route::Roll("2D6".to_string()), "DiceBot", &roller).unwrap();
        assert_eq!(response.unwrap().result_value(), "7");

        send(&Route::Table("1D6\n1:Gold".to_string()), "DiceBot", &roller).unwrap();
        assert!(send(&Route::Ignored, "DiceBot", &roller).unwrap().is_none());
        assert!(send(&Route::Roll(String::new()), "DiceBot", &roller).unwrap().is_none());

        assert_eq!(
            *roller.calls.borrow(),
            vec!["DiceBot:2D6".to_string(), "table:1D6\n1:Gold".to_string()]
        );
    }

    #[test]
    fn test_send_rejects_failed_roll() {
        let roller = StubRoller::answering("unsupported command", false);
        let err = send(&Route::Roll("xyz".to_string()), "DiceBot", &roller);
        assert!(matches!(err, Err(RollmacroError::Api(_))));
    }

    #[test]
    fn test_rejected_response_is_api_error() {
        let err = RollResponse::from_json(r#"{"ok":false,"reason":"unsupported command"}"#);
        assert!(matches!(err, Err(RollmacroError::Api(_))));
    }
}
