//! Terms and privacy modal.
//!
//! ```text
//!            open
//!   Hidden ───────► Shown
//!     ▲               │ close | agree | decline | backdrop | escape
//!     └───────────────┘
//! ```
//!
//! Nothing but `open` leaves Hidden. `agree` also ticks the acceptance
//! checkbox; `decline` asks the engine to clear the contact form.

use serde::Serialize;
use tracing::{debug, warn};

use super::{require_id, set_class};
use crate::config::ModalConfig;
use crate::dom::{Document, NodeId};
use crate::error::FolioResult;
use crate::events::Reaction;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalState {
    #[default]
    Hidden,
    Shown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalTrigger {
    Open,
    Close,
    Agree,
    Decline,
    Backdrop,
    Escape,
}

impl ModalState {
    /// Next state, or `None` when the trigger is not valid here
    pub fn transition(self, trigger: ModalTrigger) -> Option<ModalState> {
        match (self, trigger) {
            (ModalState::Hidden, ModalTrigger::Open) => Some(ModalState::Shown),
            (ModalState::Hidden, _) => None,
            (ModalState::Shown, ModalTrigger::Open) => None,
            (ModalState::Shown, _) => Some(ModalState::Hidden),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TermsModal {
    trigger: NodeId,
    modal: NodeId,
    close: NodeId,
    agree: NodeId,
    decline: NodeId,
    checkbox: Option<NodeId>,
    state: ModalState,
    config: ModalConfig,
}

impl TermsModal {
    pub fn bind<D: Document>(doc: &mut D, config: &ModalConfig) -> FolioResult<Self> {
        let trigger = require_id(doc, &config.trigger_id)?;
        let modal = require_id(doc, &config.modal_id)?;
        let close = require_id(doc, &config.close_id)?;
        let agree = require_id(doc, &config.agree_id)?;
        let decline = require_id(doc, &config.decline_id)?;
        let checkbox = doc.element_by_id(&config.checkbox_id);
        if checkbox.is_none() {
            warn!(id = %config.checkbox_id, "Terms checkbox missing; agree will only close");
        }

        let state = if doc.has_class(modal, &config.shown_class) {
            ModalState::Shown
        } else {
            ModalState::Hidden
        };
        Ok(Self {
            trigger,
            modal,
            close,
            agree,
            decline,
            checkbox,
            state,
            config: config.clone(),
        })
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    /// Which trigger a click represents, if any
    pub fn classify<D: Document>(&self, doc: &D, target: NodeId) -> Option<ModalTrigger> {
        if doc.contains(self.trigger, target) {
            Some(ModalTrigger::Open)
        } else if doc.contains(self.close, target) {
            Some(ModalTrigger::Close)
        } else if doc.contains(self.agree, target) {
            Some(ModalTrigger::Agree)
        } else if doc.contains(self.decline, target) {
            Some(ModalTrigger::Decline)
        } else if target == self.modal {
            // Only the backdrop itself, never its content panel
            Some(ModalTrigger::Backdrop)
        } else {
            None
        }
    }

    pub fn on_click<D: Document>(&mut self, doc: &mut D, target: NodeId) -> Reaction {
        match self.classify(doc, target) {
            Some(trigger) => self.apply(doc, trigger),
            None => Reaction::none(),
        }
    }

    pub fn on_key<D: Document>(&mut self, doc: &mut D, key: &str) -> Reaction {
        if key == self.config.escape_key {
            self.apply(doc, ModalTrigger::Escape)
        } else {
            Reaction::none()
        }
    }

    pub fn apply<D: Document>(&mut self, doc: &mut D, trigger: ModalTrigger) -> Reaction {
        let mut reaction = if trigger == ModalTrigger::Open {
            Reaction::prevented()
        } else {
            Reaction::none()
        };

        let Some(next) = self.state.transition(trigger) else {
            return reaction;
        };

        match trigger {
            ModalTrigger::Agree => {
                if let Some(checkbox) = self.checkbox {
                    doc.set_checked(checkbox, true);
                }
            }
            ModalTrigger::Decline => reaction.clear_form = true,
            _ => {}
        }

        debug!(?trigger, from = ?self.state, to = ?next, "Modal transition");
        self.state = next;
        set_class(doc, self.modal, &self.config.shown_class, next == ModalState::Shown);
        reaction
    }
}
