//! Change commands: `:key<op>value`.
//!
//! A formula starting with `:` does not go to the roller. It edits the variable
//! table instead:
//!
//! | command     | effect                                                     |
//! |-------------|------------------------------------------------------------|
//! | `:hp`       | creates `hp=0` if missing, otherwise reports the value     |
//! | `:hp=20`    | literal assignment, the right side is never evaluated      |
//! | `:hp+3`     | numeric add (`-3` subtracts)                               |
//! | `:hp*2`     | concatenates `10*2`, which evaluates to `20`               |
//! | `:atk+1d6`  | concatenates `1d20+1d6`, which stays a string              |
//!
//! The table is rewritten by line position: only the line holding the target
//! entry (the last one, matching last-wins lookup) is replaced, or a new line is
//! appended. Every other line comes back byte for byte.

use super::arith::{evaluate, format_number, parse_number};
use super::VariableStore;
use serde::Serialize;
use std::fmt;

const OPERATORS: [char; 5] = ['+', '-', '*', '/', '='];

/// The value a change command produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VarValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Number(n) => write!(f, "{}", format_number(*n)),
            VarValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeResult {
    pub key: String,
    pub previous: Option<String>,
    pub new: VarValue,
}

impl ChangeResult {
    /// True when the command left the stored value as it was.
    pub fn is_unchanged(&self) -> bool {
        self.previous.as_deref() == Some(self.new.to_string().as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeOutcome {
    pub updated_text: String,
    pub result: ChangeResult,
}

/// Apply a change command to the raw variable text.
///
/// Returns `None` when the command has no target key; callers treat that as a
/// no-op.
pub fn apply_change(command: &str, raw_text: &str) -> Option<ChangeOutcome> {
    let body = command.strip_prefix(':').unwrap_or(command);
    let (target, expr) = match body.find(&OPERATORS[..]) {
        Some(idx) => (&body[..idx], Some(&body[idx..])),
        None => (body, None),
    };
    let key = target.trim();
    if key.is_empty() {
        tracing::debug!(command, "change command without a target key ignored");
        return None;
    }

    let mut store = VariableStore::parse(raw_text);
    let entry = store
        .find_entry(key)
        .map(|(idx, value)| (idx, value.to_string()));
    let previous = entry.as_ref().map(|(_, value)| value.as_str());
    let new = compute(previous, expr);

    let result = ChangeResult {
        key: key.to_string(),
        previous: previous.map(str::to_string),
        new,
    };

    if !result.is_unchanged() {
        let line = format!("{}={}", key, result.new);
        match &entry {
            Some((idx, _)) => store.replace_line(*idx, &line),
            None => store.push_line(&line),
        }
    }

    tracing::debug!(
        key = %result.key,
        previous = ?result.previous,
        new = %result.new,
        "variable changed"
    );

    Some(ChangeOutcome {
        updated_text: store.to_text(),
        result,
    })
}

fn compute(previous: Option<&str>, expr: Option<&str>) -> VarValue {
    let previous = previous.filter(|value| !value.is_empty());
    let Some(expr) = expr else {
        return match previous {
            Some(value) => VarValue::Text(value.to_string()),
            None => VarValue::Number(0.0),
        };
    };

    if let Some(rhs) = expr.strip_prefix('=') {
        return VarValue::Text(rhs.to_string());
    }

    let previous = previous.unwrap_or("");
    if let (Some(a), Some(b)) = (parse_number(previous), parse_number(expr)) {
        return VarValue::Number(a + b);
    }

    let joined = format!("{}{}", previous, expr);
    match evaluate(&joined) {
        Some(value) => VarValue::Number(value),
        None => VarValue::Text(joined),
    }
}
