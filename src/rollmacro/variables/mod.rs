//! # Variable Store
//!
//! Each entity carries a flat table of variables, edited by hand as plain text:
//!
//! ```text
//! # combat
//! hp=10
//! atk=1d20+{str}
//! str=3
//! ```
//!
//! Lines whose trimmed form starts with `#` are comments, blank lines are ignored,
//! and every other line of the form `key=value` is an entry. Keys may repeat; lookup
//! is last-wins.
//!
//! [`VariableStore`] never re-serializes the table. It keeps every raw line as it
//! was written so that the change engine ([`change`]) can rewrite a single line by
//! position and leave comments, spacing and ordering untouched.
//!
//! The other engines living here:
//! - [`expand`]: `{token}` substitution used before a formula reaches the roller
//! - [`change`]: `:key<op>value` commands that mutate the table
//! - [`arith`]: the small arithmetic evaluator backing the change engine

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

pub mod arith;
pub mod change;
pub mod expand;

pub use change::{apply_change, ChangeOutcome, ChangeResult, VarValue};
pub use expand::{expand, expand_table, normalize_delimiters};

/// Splits at the first `=` so values like `2D6>=7` stay intact.
static ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([^=]+?)\s*=\s*(.*?)\s*$").expect("entry regex must compile"));

/// Classification of a single raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Entry { key: String, value: String },
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoreLine {
    raw: String,
    kind: LineKind,
}

impl StoreLine {
    fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            kind: classify(raw),
        }
    }
}

fn classify(raw: &str) -> LineKind {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with('#') {
        return LineKind::Comment;
    }
    match ENTRY_RE.captures(raw.trim_end_matches('\r')) {
        Some(caps) => {
            let key = caps[1].trim();
            if key.is_empty() {
                LineKind::Other
            } else {
                LineKind::Entry {
                    key: key.to_string(),
                    value: caps[2].to_string(),
                }
            }
        }
        None => LineKind::Other,
    }
}

/// A parsed variable table that still remembers its raw text line by line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableStore {
    lines: Vec<StoreLine>,
}

impl VariableStore {
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        Self {
            lines: text.split('\n').map(StoreLine::new).collect(),
        }
    }

    /// Entries visible to lookup, in source order. Entries with an empty value
    /// are not variables yet and are skipped.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| match &line.kind {
            LineKind::Entry { key, value } if !value.is_empty() => {
                Some((key.as_str(), value.as_str()))
            }
            _ => None,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries()
            .filter(|(k, _)| *k == key)
            .last()
            .map(|(_, v)| v)
    }

    /// Last-wins lookup map.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.entries()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Distinct keys with their last-wins value, ordered by first appearance.
    pub fn ordered(&self) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = Vec::new();
        for (key, value) in self.entries() {
            match out.iter_mut().find(|(k, _)| k == key) {
                Some(slot) => slot.1 = value.to_string(),
                None => out.push((key.to_string(), value.to_string())),
            }
        }
        out
    }

    /// Line index and value of the last entry line for `key`, including entries
    /// whose value is still empty.
    pub fn find_entry(&self, key: &str) -> Option<(usize, &str)> {
        self.lines
            .iter()
            .enumerate()
            .rev()
            .find_map(|(idx, line)| match &line.kind {
                LineKind::Entry { key: k, value } if k == key => Some((idx, value.as_str())),
                _ => None,
            })
    }

    /// Replace a line, keeping its `\r` if the text uses CRLF endings.
    pub fn replace_line(&mut self, idx: usize, raw: &str) {
        if let Some(line) = self.lines.get_mut(idx) {
            let raw = if line.raw.ends_with('\r') && !raw.ends_with('\r') {
                format!("{}\r", raw)
            } else {
                raw.to_string()
            };
            *line = StoreLine::new(&raw);
        }
    }

    /// Append a line, keeping a trailing newline in place if the text had one.
    pub fn push_line(&mut self, raw: &str) {
        let crlf = self.uses_crlf();
        let raw = if crlf { format!("{}\r", raw) } else { raw.to_string() };
        match self.lines.last().map(|last| last.raw.is_empty()) {
            Some(true) => {
                let idx = self.lines.len() - 1;
                self.lines.insert(idx, StoreLine::new(&raw));
            }
            Some(false) if crlf => {
                let idx = self.lines.len() - 1;
                self.lines[idx].raw.push('\r');
                self.lines.push(StoreLine::new(raw.trim_end_matches('\r')));
            }
            _ => self.lines.push(StoreLine::new(&raw)),
        }
    }

    fn uses_crlf(&self) -> bool {
        self.lines.iter().any(|line| line.raw.ends_with('\r'))
    }

    pub fn line_kinds(&self) -> impl Iterator<Item = &LineKind> {
        self.lines.iter().map(|line| &line.kind)
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.raw.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn expand(&self, formula: &str) -> String {
        expand(formula, &self.to_map())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_entries() {
        let store = VariableStore::parse("hp=10\nmp = 5\n");
        assert_eq!(store.get("hp"), Some("10"));
        assert_eq!(store.get("mp"), Some("5"));
        assert_eq!(store.get("sp"), None);
    }

    #[test]
    fn test_comment_lines_are_ignored() {
        let store = VariableStore::parse("# comment = value\n  #hp=3\nhp=1");
        assert_eq!(store.get("# comment"), None);
        assert_eq!(store.get("#hp"), None);
        assert_eq!(store.to_map().len(), 1);
        assert_eq!(store.get("hp"), Some("1"));
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let store = VariableStore::parse("\n\n  \nhp=1\n\n");
        assert_eq!(store.entries().count(), 1);
    }

    #[test]
    fn test_last_wins_lookup() {
        let store = VariableStore::parse("hp=1\nhp=2");
        assert_eq!(store.get("hp"), Some("2"));
        assert_eq!(store.ordered(), vec![("hp".to_string(), "2".to_string())]);
    }

    #[test]
    fn test_value_keeps_comparison_operators() {
        let store = VariableStore::parse("check=1d20>=10");
        assert_eq!(store.get("check"), Some("1d20>=10"));
    }

    #[test]
    fn test_empty_value_is_not_a_variable() {
        let store = VariableStore::parse("hp=");
        assert_eq!(store.get("hp"), None);
        assert_eq!(store.find_entry("hp"), Some((0, "")));
    }

    #[test]
    fn test_non_entry_lines_classified_other() {
        let store = VariableStore::parse("just text\n=5");
        let kinds: Vec<_> = store.line_kinds().cloned().collect();
        assert_eq!(kinds, vec![LineKind::Other, LineKind::Other]);
    }

    #[test]
    fn test_to_text_preserves_raw_lines() {
        let raw = "# header\n  hp = 10  \n\nmp=5\n";
        assert_eq!(VariableStore::parse(raw).to_text(), raw);
    }

    #[test]
    fn test_push_line_before_trailing_newline() {
        let mut store = VariableStore::parse("a=1\n");
        store.push_line("b=2");
        assert_eq!(store.to_text(), "a=1\nb=2\n");

        let mut empty = VariableStore::parse("");
        empty.push_line("b=2");
        assert_eq!(empty.to_text(), "b=2");
    }

    #[test]
    fn test_crlf_endings_survive_rewrites() {
        let mut store = VariableStore::parse("hp=10\r\nmp=5\r\n");
        store.replace_line(0, "hp=7");
        store.push_line("sp=1");
        assert_eq!(store.to_text(), "hp=7\r\nmp=5\r\nsp=1\r\n");

        let mut unterminated = VariableStore::parse("hp=10\r\nmp=5");
        unterminated.push_line("sp=1");
        assert_eq!(unterminated.to_text(), "hp=10\r\nmp=5\r\nsp=1");
        assert_eq!(unterminated.get("mp"), Some("5"));
    }
}
