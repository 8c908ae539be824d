//! Scripted event replay against a headless engine.
//!
//! A script is a JSON list of steps. Targets are CSS selectors resolved
//! against the engine's document at the time the step runs:
//!
//! ```json
//! [
//!   { "click": "#themeToggle" },
//!   { "input": { "target": "#email", "value": "bad@" } },
//!   { "blur": "#email" },
//!   { "visible": { "target": ".stat h4" } },
//!   { "advance_ms": 2000 },
//!   "content_loaded"
//! ]
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::{Document, NodeId};
use crate::engine::UiEngine;
use crate::error::{FolioError, FolioResult};
use crate::events::{DispatchOutcome, UiEvent};
use crate::observer::Geometry;
use crate::selector::Selector;
use crate::storage::PreferenceStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Click(Selector),
    /// Key press, by key name (`"Escape"`)
    Key(String),
    Blur(Selector),
    /// Type into a control; dispatches nothing
    Input { target: Selector, value: String },
    /// Tick or untick a checkbox; dispatches nothing
    Check { target: Selector, checked: bool },
    Submit(Selector),
    /// Report every match as in view (fully visible unless given)
    Visible {
        target: Selector,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        geometry: Option<Geometry>,
    },
    AdvanceMs(u64),
    ContentLoaded,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json_str(json: &str) -> FolioResult<Self> {
        serde_json::from_str(json).map_err(|e| FolioError::Script(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> FolioResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub step: Step,
    pub outcome: DispatchOutcome,
    #[serde(skip_serializing_if = "is_zero")]
    pub timers_fired: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<StepReport>,
}

impl ReplayReport {
    /// Whether every step ran without a group failure
    pub fn is_clean(&self) -> bool {
        self.steps.iter().all(|s| s.outcome.is_clean())
    }
}

/// Run `script` step by step.
///
/// # Errors
///
/// Returns `FolioError::Script` at the first step whose target matches no
/// element. Steps before it have already been applied.
pub fn replay<D: Document, S: PreferenceStore>(
    engine: &mut UiEngine<D, S>,
    script: &Script,
) -> FolioResult<ReplayReport> {
    let mut report = ReplayReport::default();
    for (index, step) in script.steps.iter().enumerate() {
        let mut outcome = DispatchOutcome::default();
        let mut timers_fired = 0;
        match step {
            Step::Click(target) => {
                let target = resolve(engine, index, target)?;
                outcome = engine.dispatch(UiEvent::Click { target });
            }
            Step::Key(key) => {
                outcome = engine.dispatch(UiEvent::KeyDown { key: key.clone() });
            }
            Step::Blur(target) => {
                let target = resolve(engine, index, target)?;
                outcome = engine.dispatch(UiEvent::Blur { target });
            }
            Step::Input { target, value } => {
                let target = resolve(engine, index, target)?;
                engine.document_mut().set_value(target, value);
            }
            Step::Check { target, checked } => {
                let target = resolve(engine, index, target)?;
                engine.document_mut().set_checked(target, *checked);
            }
            Step::Submit(target) => {
                let target = resolve(engine, index, target)?;
                outcome = engine.dispatch(UiEvent::Submit { target });
            }
            Step::Visible { target, geometry } => {
                let nodes = engine.document().query_all(target);
                if nodes.is_empty() {
                    return Err(unresolved(index, target));
                }
                let geometry = geometry.unwrap_or_else(Geometry::fully_visible);
                for node in nodes {
                    outcome.merge(engine.dispatch(UiEvent::Visibility { target: node, geometry }));
                }
            }
            Step::AdvanceMs(ms) => {
                timers_fired = engine.advance(Duration::from_millis(*ms));
            }
            Step::ContentLoaded => {
                outcome = engine.dispatch(UiEvent::ContentLoaded);
            }
        }
        debug!(index, ?step, prevented = outcome.default_prevented, "Replayed step");
        report.steps.push(StepReport {
            index,
            step: step.clone(),
            outcome,
            timers_fired,
        });
    }
    Ok(report)
}

fn resolve<D: Document, S: PreferenceStore>(
    engine: &UiEngine<D, S>,
    index: usize,
    target: &Selector,
) -> FolioResult<NodeId> {
    engine
        .document()
        .query_first(target)
        .ok_or_else(|| unresolved(index, target))
}

fn unresolved(index: usize, target: &Selector) -> FolioError {
    FolioError::Script(format!("step {}: no element matches {}", index, target))
}
