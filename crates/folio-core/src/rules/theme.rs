//! Light/dark theme toggle with a persisted preference.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{require_id, set_class};
use crate::config::ThemeConfig;
use crate::dom::{Document, NodeId};
use crate::error::{FolioError, FolioResult};
use crate::events::Reaction;
use crate::storage::PreferenceStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Read a stored preference; absent means dark
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("light") => Theme::Light,
            Some("dark") | None => Theme::Dark,
            Some(other) => {
                warn!(value = other, "Unrecognized stored theme, using dark");
                Theme::Dark
            }
        }
    }

    /// Toggle glyph: shows the mode the next activation switches to
    pub fn icon<'a>(&self, config: &'a ThemeConfig) -> &'a str {
        match self {
            Theme::Light => &config.light_icon,
            Theme::Dark => &config.dark_icon,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(FolioError::Serialization(format!(
                "unknown theme {:?} (expected light or dark)",
                other
            ))),
        }
    }
}

/// Theme toggle control bound to the document body
#[derive(Debug, Clone)]
pub struct ThemeToggle {
    toggle: NodeId,
    body: NodeId,
    theme: Theme,
    config: ThemeConfig,
}

impl ThemeToggle {
    /// Bind to the toggle control and apply the stored preference
    /// immediately.
    pub fn bind<D: Document, S: PreferenceStore + ?Sized>(
        doc: &mut D,
        store: &S,
        config: &ThemeConfig,
    ) -> FolioResult<Self> {
        let toggle = require_id(doc, &config.toggle_id)?;
        let stored = match store.get(&config.storage_key) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Failed to read theme preference, using default");
                None
            }
        };

        let toggle = Self {
            toggle,
            body: doc.body(),
            theme: Theme::from_stored(stored.as_deref()),
            config: config.clone(),
        };
        toggle.render(doc);
        debug!(theme = %toggle.theme, "Theme applied");
        Ok(toggle)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn on_click<D: Document, S: PreferenceStore + ?Sized>(
        &mut self,
        doc: &mut D,
        store: &mut S,
        target: NodeId,
    ) -> FolioResult<Reaction> {
        if !doc.contains(self.toggle, target) {
            return Ok(Reaction::none());
        }
        self.toggle(doc, store)?;
        Ok(Reaction::prevented())
    }

    /// Invert the applied theme and persist it.
    ///
    /// The visual switch happens even if persisting fails; the store error
    /// is still returned.
    pub fn toggle<D: Document, S: PreferenceStore + ?Sized>(
        &mut self,
        doc: &mut D,
        store: &mut S,
    ) -> FolioResult<Theme> {
        self.theme = self.theme.toggled();
        self.render(doc);
        debug!(theme = %self.theme, "Theme toggled");
        store.set(&self.config.storage_key, self.theme.as_str())?;
        Ok(self.theme)
    }

    fn render<D: Document>(&self, doc: &mut D) {
        let light = self.theme == Theme::Light;
        set_class(doc, self.body, &self.config.light_class, light);
        set_class(doc, self.toggle, &self.config.toggle_dark_class, !light);
        let markup = format!(
            "<span class=\"{}\">{}</span>",
            self.config.icon_class,
            self.theme.icon(&self.config)
        );
        doc.set_inner_html(self.toggle, &markup);
    }
}
