//! UiEngine - the entry point for the portfolio page's behavior
//!
//! UiEngine binds every rule group against an injected [`Document`] and
//! [`PreferenceStore`], then routes host events to them:
//! - Clicks, key presses, blurs and submits via [`UiEngine::dispatch`]
//! - Visibility observations for reveal and counter animations
//! - Timer ticks via [`UiEngine::advance`] on a virtual clock
//!
//! # Example
//!
//! ```ignore
//! use folio_core::{EngineConfig, MemoryDocument, MemoryPreferences, UiEngine, UiEvent};
//!
//! let doc = MemoryDocument::from_page(&page);
//! let mut engine = UiEngine::new(doc, MemoryPreferences::new(), EngineConfig::default())?;
//!
//! let toggle = engine.document().element_by_id("themeToggle").unwrap();
//! let outcome = engine.dispatch(UiEvent::Click { target: toggle });
//! assert!(outcome.default_prevented);
//! ```

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::dom::{Document, NodeId};
use crate::error::{FolioError, FolioResult};
use crate::events::{DispatchOutcome, GroupFailure, Reaction, UiEvent};
use crate::observer::Geometry;
use crate::rules::counter::StatCounters;
use crate::rules::expand::{ExpandState, ExpandableBlocks};
use crate::rules::filter::{Filter, ProjectFilter, FADE_IN_KEYFRAMES};
use crate::rules::form::{clear_error_displays, ContactForm, Field, FieldStatus};
use crate::rules::menu::MobileMenu;
use crate::rules::modal::{ModalState, TermsModal};
use crate::rules::reveal::{ScrollReveal, SLIDE_UP_KEYFRAMES};
use crate::rules::scroll::SmoothScroll;
use crate::rules::theme::{Theme, ThemeToggle};
use crate::scheduler::Scheduler;
use crate::storage::PreferenceStore;

const THEME: &str = "theme";
const MENU: &str = "menu";
const SCROLL: &str = "scroll";
const MODAL: &str = "modal";
const FILTER: &str = "filter";
const REVEAL: &str = "reveal";
const COUNTERS: &str = "counters";
const FORM: &str = "form";
const EXPAND: &str = "expand";

/// A rule group that could not bind and stays inert
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedGroup {
    pub group: &'static str,
    pub reason: String,
}

/// Keep a bound group, or log and record why it was skipped
fn bind_group<T>(
    group: &'static str,
    result: FolioResult<T>,
    skipped: &mut Vec<SkippedGroup>,
) -> Option<T> {
    match result {
        Ok(bound) => {
            debug!(group, "Rule group bound");
            Some(bound)
        }
        Err(e) => {
            warn!(group, error = %e, "Rule group skipped");
            skipped.push(SkippedGroup {
                group,
                reason: e.to_string(),
            });
            None
        }
    }
}

fn record_failure(outcome: &mut DispatchOutcome, group: &'static str, error: FolioError) {
    warn!(group, error = %error, "Rule group failed");
    outcome.failures.push(GroupFailure {
        group,
        message: error.to_string(),
    });
}

/// The UI reaction engine
///
/// Owns the document, the preference store, and the state of every rule
/// group. Groups are independent: one that fails to bind is inert, and one
/// that fails while handling an event does not stop the others.
pub struct UiEngine<D: Document, S: PreferenceStore> {
    doc: D,
    store: S,
    config: EngineConfig,
    /// Virtual clock driving counter animations; payload is the label
    scheduler: Scheduler<NodeId>,
    skipped: Vec<SkippedGroup>,
    theme: Option<ThemeToggle>,
    menu: Option<MobileMenu>,
    scroll: Option<SmoothScroll>,
    modal: Option<TermsModal>,
    filter: Option<ProjectFilter>,
    reveal: Option<ScrollReveal>,
    counters: Option<StatCounters>,
    /// Counter binding waits for ContentLoaded
    counters_deferred: bool,
    form: Option<ContactForm>,
    expand: Option<ExpandableBlocks>,
}

impl<D: Document, S: PreferenceStore> UiEngine<D, S> {
    /// Bind all rule groups against `doc`
    ///
    /// This will:
    /// - Inject the fade-in and slide-up keyframes
    /// - Apply the stored theme preference
    /// - Bind each group, skipping any whose elements are missing
    /// - Defer counter binding if the document is still loading
    ///
    /// # Errors
    ///
    /// Returns `FolioError::InvalidConfig` if `config` fails validation.
    /// Missing elements are never an error here.
    pub fn new(mut doc: D, store: S, config: EngineConfig) -> FolioResult<Self> {
        config.validate()?;
        info!(loading = doc.is_loading(), "Initializing UiEngine");

        doc.inject_stylesheet(FADE_IN_KEYFRAMES);
        doc.inject_stylesheet(SLIDE_UP_KEYFRAMES);

        let mut skipped = Vec::new();
        let theme = ThemeToggle::bind(&mut doc, &store, &config.theme);
        let theme = bind_group(THEME, theme, &mut skipped);
        let menu = bind_group(MENU, MobileMenu::bind(&mut doc, &config.menu), &mut skipped);
        let scroll = Some(SmoothScroll::bind(&config.scroll));
        let modal = bind_group(MODAL, TermsModal::bind(&mut doc, &config.modal), &mut skipped);
        let filter = ProjectFilter::bind(&mut doc, &config.filter);
        let filter = bind_group(FILTER, filter, &mut skipped);
        let reveal = bind_group(REVEAL, ScrollReveal::bind(&doc, &config.reveal), &mut skipped);
        let form = bind_group(FORM, ContactForm::bind(&mut doc, &config.form), &mut skipped);
        let expand = ExpandableBlocks::bind(&mut doc, &config.expand);
        let expand = bind_group(EXPAND, expand, &mut skipped);

        let counters_deferred = doc.is_loading();
        let counters = if counters_deferred {
            debug!("Document still loading, deferring counters");
            None
        } else {
            bind_group(COUNTERS, StatCounters::bind(&doc, &config.counters), &mut skipped)
        };

        Ok(Self {
            doc,
            store,
            config,
            scheduler: Scheduler::new(),
            skipped,
            theme,
            menu,
            scroll,
            modal,
            filter,
            reveal,
            counters,
            counters_deferred,
            form,
            expand,
        })
    }

    /// Route one host event to every interested group
    pub fn dispatch(&mut self, event: UiEvent) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        match event {
            UiEvent::Click { target } => self.on_click(target, &mut outcome),
            UiEvent::KeyDown { key } => {
                if let Some(modal) = self.modal.as_mut() {
                    let reaction = modal.on_key(&mut self.doc, &key);
                    self.absorb(reaction, &mut outcome);
                }
            }
            UiEvent::Blur { target } => {
                if let Some(form) = self.form.as_mut() {
                    let reaction = form.on_blur(&mut self.doc, target);
                    self.absorb(reaction, &mut outcome);
                }
            }
            UiEvent::Submit { target } => {
                if let Some(form) = self.form.as_mut() {
                    let reaction = form.on_submit(&mut self.doc, target);
                    self.absorb(reaction, &mut outcome);
                }
            }
            UiEvent::Visibility { target, geometry } => self.on_visibility(target, &geometry),
            UiEvent::ContentLoaded => self.on_content_loaded(),
        }
        outcome
    }

    fn on_click(&mut self, target: NodeId, outcome: &mut DispatchOutcome) {
        if let Some(theme) = self.theme.as_mut() {
            match theme.on_click(&mut self.doc, &mut self.store, target) {
                Ok(reaction) => outcome.absorb(reaction),
                Err(e) => {
                    // The visual switch already happened
                    outcome.default_prevented = true;
                    record_failure(outcome, THEME, e);
                }
            }
        }

        if let Some(menu) = self.menu.as_mut() {
            let reaction = menu.on_click(&mut self.doc, target);
            outcome.absorb(reaction);
        }

        if let Some(scroll) = self.scroll.as_ref() {
            if let Some(anchor) = scroll.anchor_for(&self.doc, target) {
                outcome.default_prevented = true;
                if let Err(e) = scroll.scroll_to(&mut self.doc, anchor) {
                    record_failure(outcome, SCROLL, e);
                }
            }
        }

        if let Some(modal) = self.modal.as_mut() {
            let reaction = modal.on_click(&mut self.doc, target);
            self.absorb(reaction, outcome);
        }

        if let Some(filter) = self.filter.as_mut() {
            let reaction = filter.on_click(&mut self.doc, target);
            outcome.absorb(reaction);
        }

        if let Some(expand) = self.expand.as_mut() {
            let reaction = expand.on_click(&mut self.doc, target);
            outcome.absorb(reaction);
        }
    }

    fn on_visibility(&mut self, target: NodeId, geometry: &Geometry) {
        if let Some(reveal) = self.reveal.as_mut() {
            reveal.on_visible(&mut self.doc, target, geometry);
        }
        if let Some(counters) = self.counters.as_mut() {
            counters.on_visible(&mut self.doc, &mut self.scheduler, target, geometry);
        }
    }

    fn on_content_loaded(&mut self) {
        if !self.counters_deferred {
            return;
        }
        self.counters_deferred = false;
        self.counters = bind_group(
            COUNTERS,
            StatCounters::bind(&self.doc, &self.config.counters),
            &mut self.skipped,
        );
    }

    /// Merge a reaction, carrying out any cross-group request it makes
    fn absorb(&mut self, reaction: Reaction, outcome: &mut DispatchOutcome) {
        if reaction.clear_form {
            self.clear_form();
        }
        outcome.absorb(reaction);
    }

    /// Reset the contact form and clear every error display
    pub fn clear_form(&mut self) {
        match self.form.as_mut() {
            Some(form) => form.clear(&mut self.doc),
            None => {
                if let Some(node) = self.doc.element_by_id(&self.config.form.form_id) {
                    self.doc.reset_form(node);
                }
                clear_error_displays(&mut self.doc, &self.config.form);
            }
        }
    }

    /// Move the virtual clock forward, running every timer due on the way.
    /// Returns the number of firings.
    pub fn advance(&mut self, dt: Duration) -> usize {
        let until = self.scheduler.now() + dt;
        let mut fired = 0;
        while let Some(firing) = self.scheduler.pop_due(until) {
            fired += 1;
            match self.counters.as_mut() {
                Some(counters) => counters.on_tick(&mut self.doc, &mut self.scheduler, &firing),
                None => {
                    self.scheduler.cancel(firing.id);
                }
            }
        }
        self.scheduler.advance_clock(until);
        fired
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Timers that will still fire
    pub fn active_timers(&self) -> usize {
        self.scheduler.active_count()
    }

    pub fn skipped_groups(&self) -> &[SkippedGroup] {
        &self.skipped
    }

    pub fn is_bound(&self, group: &str) -> bool {
        match group {
            THEME => self.theme.is_some(),
            MENU => self.menu.is_some(),
            SCROLL => self.scroll.is_some(),
            MODAL => self.modal.is_some(),
            FILTER => self.filter.is_some(),
            REVEAL => self.reveal.is_some(),
            COUNTERS => self.counters.is_some(),
            FORM => self.form.is_some(),
            EXPAND => self.expand.is_some(),
            _ => false,
        }
    }

    pub fn theme(&self) -> Option<Theme> {
        self.theme.as_ref().map(|t| t.theme())
    }

    pub fn menu_open(&self) -> Option<bool> {
        self.menu.as_ref().map(|m| m.is_open())
    }

    pub fn modal_state(&self) -> Option<ModalState> {
        self.modal.as_ref().map(|m| m.state())
    }

    pub fn active_filter(&self) -> Option<&Filter> {
        self.filter.as_ref().map(|f| f.active())
    }

    /// Cards the filter currently shows
    pub fn visible_cards(&self) -> Vec<NodeId> {
        self.filter
            .as_ref()
            .map(|f| f.visible_cards(&self.doc))
            .unwrap_or_default()
    }

    pub fn field_status(&self, field: Field) -> Option<&FieldStatus> {
        self.form.as_ref().map(|f| f.status(field))
    }

    pub fn expand_state(&self, trigger: NodeId) -> Option<ExpandState> {
        self.expand.as_ref().and_then(|e| e.state(trigger))
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    /// Direct document access for host-side edits such as typing into
    /// form controls
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn into_parts(self) -> (D, S) {
        (self.doc, self.store)
    }
}
