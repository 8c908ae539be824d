//! Events fed to the engine and what the engine reports back.

use serde::{Deserialize, Serialize};

use crate::dom::NodeId;
use crate::observer::Geometry;
use crate::rules::form::SubmitOutcome;

/// A discrete UI event delivered by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// Pointer activation; `target` is the innermost element hit
    Click { target: NodeId },
    /// Key press anywhere in the document
    KeyDown { key: String },
    /// Focus left a form control
    Blur { target: NodeId },
    /// Form submission attempt
    Submit { target: NodeId },
    /// Visibility observation for an element
    Visibility { target: NodeId, geometry: Geometry },
    /// Document finished parsing
    ContentLoaded,
}

/// What a single rule group did in response to an event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reaction {
    pub prevent_default: bool,
    /// The contact form must be reset and its errors cleared
    pub clear_form: bool,
    pub submission: Option<SubmitOutcome>,
}

impl Reaction {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn prevented() -> Self {
        Self {
            prevent_default: true,
            ..Self::default()
        }
    }
}

/// A rule group that failed while handling an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupFailure {
    pub group: &'static str,
    pub message: String,
}

/// Combined result of dispatching one event to every bound group
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchOutcome {
    pub default_prevented: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<SubmitOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<GroupFailure>,
}

impl DispatchOutcome {
    pub fn absorb(&mut self, reaction: Reaction) {
        self.default_prevented |= reaction.prevent_default;
        if reaction.submission.is_some() {
            self.submission = reaction.submission;
        }
    }

    pub fn merge(&mut self, other: DispatchOutcome) {
        self.default_prevented |= other.default_prevented;
        if other.submission.is_some() {
            self.submission = other.submission;
        }
        self.failures.extend(other.failures);
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
