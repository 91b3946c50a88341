//! # Commands
//!
//! Business logic, one module per area. Every command takes the store plus the
//! entity it acts on, and returns a [`CmdResult`]: the data a client may want to
//! render, plus [`CmdMessage`]s describing what happened. Commands never print.

use crate::config::RollmacroConfig;
use crate::model::MacroTree;
use crate::roll::{RollResponse, Route};
use crate::sync::SheetUpdate;
use crate::tables::OriginalTable;
use crate::variables::ChangeResult;
use uuid::Uuid;

pub mod config;
pub mod import;
pub mod roll;
pub mod sync;
pub mod tables;
pub mod tree;
pub mod variables;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Ids of nodes a command created.
    pub created_ids: Vec<Uuid>,
    pub tree: Option<MacroTree>,
    /// `(key, value)` pairs in store order.
    pub variables: Vec<(String, String)>,
    pub route: Option<Route>,
    /// The roller's answer, when the formula was sent on.
    pub response: Option<RollResponse>,
    pub change: Option<ChangeResult>,
    pub tables: Vec<OriginalTable>,
    pub sheet_updates: Vec<SheetUpdate>,
    pub config: Option<RollmacroConfig>,
    /// Free-form text output (backups, raw variable text).
    pub output: Option<String>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_created_ids(mut self, ids: Vec<Uuid>) -> Self {
        self.created_ids = ids;
        self
    }

    pub fn with_tree(mut self, tree: MacroTree) -> Self {
        self.tree = Some(tree);
        self
    }

    pub fn with_variables(mut self, variables: Vec<(String, String)>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.route = Some(route);
        self
    }

    pub fn with_response(mut self, response: Option<RollResponse>) -> Self {
        self.response = response;
        self
    }

    pub fn with_tables(mut self, tables: Vec<OriginalTable>) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_sheet_updates(mut self, updates: Vec<SheetUpdate>) -> Self {
        self.sheet_updates = updates;
        self
    }

    pub fn with_config(mut self, config: RollmacroConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }
}
