//! Mobile navigation menu.
//!
//! Three independent click rules: the toggle flips the menu, any nav link
//! closes it, and any click outside the header closes it. Links and the
//! toggle live inside the header, so the outside rule never competes with
//! them.

use tracing::debug;

use super::{require_id, set_class};
use crate::config::MenuConfig;
use crate::dom::{Document, NodeId};
use crate::error::FolioResult;
use crate::events::Reaction;

#[derive(Debug, Clone)]
pub struct MobileMenu {
    toggle: NodeId,
    panel: NodeId,
    open: bool,
    config: MenuConfig,
}

impl MobileMenu {
    pub fn bind<D: Document>(doc: &mut D, config: &MenuConfig) -> FolioResult<Self> {
        let toggle = require_id(doc, &config.toggle_id)?;
        let panel = require_id(doc, &config.panel_id)?;
        let menu = Self {
            toggle,
            panel,
            open: doc.has_class(panel, &config.active_class),
            config: config.clone(),
        };
        menu.render(doc);
        Ok(menu)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn on_click<D: Document>(&mut self, doc: &mut D, target: NodeId) -> Reaction {
        let before = self.open;

        if doc.contains(self.toggle, target) {
            self.open = !self.open;
        }
        if doc.closest(target, &self.config.nav_links).is_some() {
            self.open = false;
        }
        if doc.closest(target, &self.config.header).is_none() {
            self.open = false;
        }

        if self.open != before {
            debug!(open = self.open, "Menu state changed");
        }
        self.render(doc);
        Reaction::none()
    }

    pub fn close<D: Document>(&mut self, doc: &mut D) {
        self.open = false;
        self.render(doc);
    }

    /// Panel and toggle markers always agree
    fn render<D: Document>(&self, doc: &mut D) {
        set_class(doc, self.panel, &self.config.active_class, self.open);
        set_class(doc, self.toggle, &self.config.active_class, self.open);
    }
}
