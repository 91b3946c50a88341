//! # Macro Tree Operations
//!
//! Every node of the tree is addressed by its stable id. Positions in the vectors
//! are display order only, so a UI that holds on to an id keeps pointing at the
//! same node after siblings are added or removed.

use crate::error::{Result, RollmacroError};
use crate::model::{
    Header, Macro, MacroTree, Tab, DEFAULT_HEADER_NAME, DEFAULT_MACRO_DISPLAY,
    DEFAULT_MACRO_FORMULA, DEFAULT_TAB_NAME,
};
use uuid::Uuid;

impl MacroTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn push_tab(&mut self, tab: Tab) -> Uuid {
        let id = tab.id;
        self.tabs.push(tab);
        id
    }

    pub fn add_tab(&mut self, name: Option<&str>) -> Uuid {
        self.push_tab(Tab::new(name.unwrap_or(DEFAULT_TAB_NAME)))
    }

    pub fn rename_tab(&mut self, tab_id: Uuid, name: &str) -> Result<()> {
        self.tab_mut(tab_id)?.name = name.to_string();
        Ok(())
    }

    pub fn delete_tab(&mut self, tab_id: Uuid) -> Result<Tab> {
        let pos = self
            .tabs
            .iter()
            .position(|t| t.id == tab_id)
            .ok_or(RollmacroError::NodeNotFound(tab_id))?;
        Ok(self.tabs.remove(pos))
    }

    pub fn add_header(&mut self, tab_id: Uuid, name: Option<&str>) -> Result<Uuid> {
        let header = Header::new(name.unwrap_or(DEFAULT_HEADER_NAME));
        let id = header.id;
        self.tab_mut(tab_id)?.headers.push(header);
        Ok(id)
    }

    pub fn delete_header(&mut self, header_id: Uuid) -> Result<Header> {
        for tab in &mut self.tabs {
            if let Some(pos) = tab.headers.iter().position(|h| h.id == header_id) {
                return Ok(tab.headers.remove(pos));
            }
        }
        Err(RollmacroError::NodeNotFound(header_id))
    }

    /// Flip a header's open state and return the new state.
    pub fn toggle_header(&mut self, header_id: Uuid) -> Result<bool> {
        let header = self.header_mut(header_id)?;
        header.open = !header.open;
        Ok(header.open)
    }

    pub fn add_macro(
        &mut self,
        header_id: Uuid,
        display: Option<&str>,
        formula: Option<&str>,
    ) -> Result<Uuid> {
        let m = Macro::new(
            display.unwrap_or(DEFAULT_MACRO_DISPLAY),
            formula.unwrap_or(DEFAULT_MACRO_FORMULA),
        );
        let id = m.id;
        self.header_mut(header_id)?.macros.push(m);
        Ok(id)
    }

    pub fn update_macro(
        &mut self,
        macro_id: Uuid,
        display: Option<&str>,
        formula: Option<&str>,
    ) -> Result<&Macro> {
        let m = self.macro_mut(macro_id)?;
        if let Some(display) = display {
            m.display = display.to_string();
        }
        if let Some(formula) = formula {
            m.formula = formula.to_string();
        }
        Ok(&*m)
    }

    pub fn delete_macro(&mut self, macro_id: Uuid) -> Result<Macro> {
        for header in self.tabs.iter_mut().flat_map(|t| t.headers.iter_mut()) {
            if let Some(pos) = header.macros.iter().position(|m| m.id == macro_id) {
                return Ok(header.macros.remove(pos));
            }
        }
        Err(RollmacroError::NodeNotFound(macro_id))
    }

    pub fn find_macro(&self, macro_id: Uuid) -> Result<&Macro> {
        self.tabs
            .iter()
            .flat_map(|t| t.headers.iter())
            .flat_map(|h| h.macros.iter())
            .find(|m| m.id == macro_id)
            .ok_or(RollmacroError::NodeNotFound(macro_id))
    }

    pub fn macro_formula(&self, macro_id: Uuid) -> Result<&str> {
        self.find_macro(macro_id).map(|m| m.formula.as_str())
    }

    pub fn tab(&self, tab_id: Uuid) -> Result<&Tab> {
        self.tabs
            .iter()
            .find(|t| t.id == tab_id)
            .ok_or(RollmacroError::NodeNotFound(tab_id))
    }

    fn tab_mut(&mut self, tab_id: Uuid) -> Result<&mut Tab> {
        self.tabs
            .iter_mut()
            .find(|t| t.id == tab_id)
            .ok_or(RollmacroError::NodeNotFound(tab_id))
    }

    fn header_mut(&mut self, header_id: Uuid) -> Result<&mut Header> {
        self.tabs
            .iter_mut()
            .flat_map(|t| t.headers.iter_mut())
            .find(|h| h.id == header_id)
            .ok_or(RollmacroError::NodeNotFound(header_id))
    }

    fn macro_mut(&mut self, macro_id: Uuid) -> Result<&mut Macro> {
        self.tabs
            .iter_mut()
            .flat_map(|t| t.headers.iter_mut())
            .flat_map(|h| h.macros.iter_mut())
            .find(|m| m.id == macro_id)
            .ok_or(RollmacroError::NodeNotFound(macro_id))
    }
}
