//! Folio Core Library
//!
//! The UI reaction engine behind a static portfolio page.
//!
//! ## Overview
//!
//! Every behavior on the page is a direct reaction to a UI event or a
//! visibility observation: theme switching, the mobile menu, smooth
//! in-page scrolling, the terms modal, project filtering, scroll reveal,
//! statistic counters, contact-form validation and read-more blocks. The
//! engine owns the state of each of these rule groups and renders it into
//! an injected [`Document`].
//!
//! ## Core Principles
//!
//! - **State first**: rule groups keep explicit state; the document is a
//!   rendering target
//! - **Independent groups**: a group whose elements are missing stays inert
//!   without affecting the rest
//! - **Headless**: [`MemoryDocument`] and the virtual-clock [`Scheduler`]
//!   run everything without a browser
//!
//! ## Quick Start
//!
//! ```ignore
//! use folio_core::{
//!     replay, EngineConfig, MemoryDocument, MemoryPreferences, PageSpec, Script, UiEngine,
//! };
//!
//! let page = PageSpec::load("demos/portfolio.json")?;
//! let mut engine = UiEngine::new(
//!     MemoryDocument::from_page(&page),
//!     MemoryPreferences::new(),
//!     EngineConfig::default(),
//! )?;
//!
//! let report = replay(&mut engine, &Script::load("demos/script.json")?)?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```

pub mod config;
pub mod dom;
pub mod engine;
pub mod error;
pub mod events;
pub mod observer;
pub mod replay;
pub mod rules;
pub mod scheduler;
pub mod selector;
pub mod storage;

// Re-exports
pub use config::EngineConfig;
pub use dom::{
    Document, ElementSpec, MemoryDocument, NodeId, PageSnapshot, PageSpec, ScrollBehavior,
};
pub use engine::{SkippedGroup, UiEngine};
pub use error::{FolioError, FolioResult};
pub use events::{DispatchOutcome, GroupFailure, UiEvent};
pub use observer::{Geometry, ObserverOptions, RootMargin, VisibilityObserver};
pub use replay::{replay, ReplayReport, Script, Step, StepReport};
pub use rules::expand::ExpandState;
pub use rules::filter::Filter;
pub use rules::form::{validate_field, Field, FieldError, FieldStatus, SubmitOutcome};
pub use rules::modal::ModalState;
pub use rules::theme::Theme;
pub use scheduler::{Scheduler, TaskId};
pub use selector::Selector;
pub use storage::{MemoryPreferences, PreferenceStore, RedbPreferences};
