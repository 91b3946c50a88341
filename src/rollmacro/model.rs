use crate::importer::ImportConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_TAB_NAME: &str = "New Tab";
pub const DEFAULT_HEADER_NAME: &str = "New Header";
pub const DEFAULT_MACRO_DISPLAY: &str = "New Macro";
pub const DEFAULT_MACRO_FORMULA: &str = "1D20";

/// The entity (character, token, user) a macro library belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macro {
    // Older blobs carry no ids; they get fresh ones on load.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub display: String,
    #[serde(rename = "macro")]
    pub formula: String,
}

impl Macro {
    pub fn new(display: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            display: display.into(),
            formula: formula.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub macros: Vec<Macro>,
}

impl Header {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            open: true,
            macros: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub headers: Vec<Header>,
}

impl Tab {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            headers: Vec::new(),
        }
    }

    pub fn macro_count(&self) -> usize {
        self.headers.iter().map(|h| h.macros.len()).sum()
    }
}

/// Tab → header → macro hierarchy. Operations live in [`crate::tree`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacroTree {
    pub tabs: Vec<Tab>,
}

/// Everything persisted for one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroData {
    #[serde(default)]
    pub tabs: MacroTree,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_settings: Option<ImportConfig>,
    #[serde(default)]
    pub replacements: String,
}
