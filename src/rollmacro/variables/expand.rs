//! `{token}` substitution.
//!
//! A formula such as `1d20+{atk}` is expanded against the variable table before it
//! is handed to the roller. Values may reference other variables, so expansion is
//! recursive. Missing variables become empty strings.
//!
//! Cycles (`a={b}`, `b={a}`, or `a={a}`) never loop: a token that is already being
//! expanded on the current path resolves to an empty string, and so does a token
//! that was already substituted in an earlier pass over the same text. Every pass
//! therefore either consumes a variable that was not visited before or makes the
//! text strictly shorter, which bounds the number of passes.

use super::VariableStore;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("token regex must compile"));

/// Expand every `{token}` in `formula` against `vars`.
pub fn expand(formula: &str, vars: &HashMap<String, String>) -> String {
    let mut path = Vec::new();
    Expander { vars }.expand_text(formula, &mut path)
}

/// Pre-expand every variable of the table against the others.
///
/// Each key starts with only itself marked as visited, so a self-reference
/// collapses to an empty string.
pub fn expand_table(store: &VariableStore) -> Vec<(String, String)> {
    let vars = store.to_map();
    let expander = Expander { vars: &vars };
    store
        .ordered()
        .into_iter()
        .map(|(key, value)| {
            let mut path = vec![key.clone()];
            let expanded = expander.expand_text(&value, &mut path);
            (key, expanded)
        })
        .collect()
}

/// Rewrite tokens written with custom delimiters (e.g. `[[hp]]`) as `{hp}`.
pub fn normalize_delimiters(text: &str, left: &str, right: &str) -> String {
    if left.is_empty() || right.is_empty() || (left == "{" && right == "}") {
        return text.to_string();
    }
    let pattern = format!(r"{}\s*(.+?)\s*{}", regex::escape(left), regex::escape(right));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(text, "{$1}").into_owned(),
        Err(_) => text.to_string(),
    }
}

struct Expander<'a> {
    vars: &'a HashMap<String, String>,
}

impl Expander<'_> {
    fn expand_text(&self, text: &str, path: &mut Vec<String>) -> String {
        let mut out = text.to_string();
        let mut visited: HashSet<String> = HashSet::new();

        while TOKEN_RE.is_match(&out) {
            let mut substituted: Vec<String> = Vec::new();
            let next = TOKEN_RE
                .replace_all(&out, |caps: &Captures| {
                    let token = caps[1].trim();
                    if token.is_empty()
                        || visited.contains(token)
                        || path.iter().any(|p| p == token)
                    {
                        return String::new();
                    }
                    substituted.push(token.to_string());
                    match self.vars.get(token) {
                        Some(value) => {
                            path.push(token.to_string());
                            let expanded = self.expand_text(value, path);
                            path.pop();
                            expanded
                        }
                        None => String::new(),
                    }
                })
                .into_owned();
            visited.extend(substituted);
            out = next;
        }

        out
    }
}
