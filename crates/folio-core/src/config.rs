//! Engine configuration
//!
//! Every id, class, selector and timing constant the rule groups bind with.
//! Defaults reproduce the portfolio page's markup contract, so a page built
//! from the stock templates needs no config file at all.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, FolioResult};
use crate::observer::{ObserverOptions, RootMargin};
use crate::selector::Selector;

fn selector(text: &str) -> Selector {
    // Default selector literals are covered by `test_defaults_parse`
    Selector::parse(text).unwrap_or_else(|_| Selector::class(text))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub theme: ThemeConfig,
    pub menu: MenuConfig,
    pub scroll: ScrollConfig,
    pub modal: ModalConfig,
    pub filter: FilterConfig,
    pub reveal: RevealConfig,
    pub counters: CounterConfig,
    pub form: FormConfig,
    pub expand: ExpandConfig,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> FolioResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| FolioError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> FolioResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject values no rule group can work with
    pub fn validate(&self) -> FolioResult<()> {
        for (name, threshold) in [
            ("reveal.threshold", self.reveal.threshold),
            ("counters.threshold", self.counters.threshold),
        ] {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(FolioError::InvalidConfig(format!(
                    "{} must be within 0..=1, got {}",
                    name, threshold
                )));
            }
        }
        if self.counters.tick_ms == 0 {
            return Err(FolioError::InvalidConfig("counters.tick_ms must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Preference store key
    pub storage_key: String,
    pub toggle_id: String,
    /// Marker on the body while in light mode
    pub light_class: String,
    /// Marker on the toggle while in dark mode
    pub toggle_dark_class: String,
    pub icon_class: String,
    /// Glyph shown while light (offers dark)
    pub light_icon: String,
    /// Glyph shown while dark (offers light)
    pub dark_icon: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: "theme".to_string(),
            toggle_id: "themeToggle".to_string(),
            light_class: "light-mode".to_string(),
            toggle_dark_class: "dark-mode".to_string(),
            icon_class: "theme-icon".to_string(),
            light_icon: "🌙".to_string(),
            dark_icon: "☀️".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub toggle_id: String,
    pub panel_id: String,
    pub active_class: String,
    pub nav_links: Selector,
    /// Clicks outside this region close the menu
    pub header: Selector,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            toggle_id: "menuToggle".to_string(),
            panel_id: "navMenu".to_string(),
            active_class: "active".to_string(),
            nav_links: selector(".nav-link"),
            header: selector("header"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub anchors: Selector,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            anchors: selector("a[href^=\"#\"]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalConfig {
    pub trigger_id: String,
    pub modal_id: String,
    pub close_id: String,
    pub agree_id: String,
    pub decline_id: String,
    /// Terms-acceptance checkbox set by "agree"
    pub checkbox_id: String,
    pub shown_class: String,
    pub escape_key: String,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            trigger_id: "termsBtn".to_string(),
            modal_id: "termsModal".to_string(),
            close_id: "closeTerms".to_string(),
            agree_id: "agreeTerms".to_string(),
            decline_id: "declineTerms".to_string(),
            checkbox_id: "terms".to_string(),
            shown_class: "show".to_string(),
            escape_key: "Escape".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub buttons: Selector,
    pub cards: Selector,
    pub filter_attr: String,
    pub category_attr: String,
    pub active_class: String,
    pub hidden_class: String,
    /// Wildcard filter value
    pub all_value: String,
    pub fade_in: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            buttons: selector(".filter-btn"),
            cards: selector(".project-card"),
            filter_attr: "data-filter".to_string(),
            category_attr: "data-category".to_string(),
            active_class: "active".to_string(),
            hidden_class: "hidden".to_string(),
            all_value: "all".to_string(),
            fade_in: "fadeIn 0.3s ease forwards".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub targets: Selector,
    pub threshold: f64,
    pub root_margin: RootMargin,
    pub animation: String,
}

impl RevealConfig {
    pub fn observer_options(&self) -> ObserverOptions {
        ObserverOptions {
            threshold: self.threshold,
            root_margin: self.root_margin,
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            targets: selector(".project-card, .blog-card"),
            threshold: 0.1,
            root_margin: RootMargin {
                bottom: -100.0,
                ..RootMargin::default()
            },
            animation: "slideUp 0.6s ease forwards".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub labels: Selector,
    pub threshold: f64,
    pub duration_ms: u64,
    pub tick_ms: u64,
    pub suffix: String,
}

impl CounterConfig {
    pub fn observer_options(&self) -> ObserverOptions {
        ObserverOptions {
            threshold: self.threshold,
            root_margin: RootMargin::default(),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            labels: selector(".stat h4"),
            threshold: 0.5,
            duration_ms: 2000,
            tick_ms: 16,
            suffix: "+".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub form_id: String,
    pub terms_id: String,
    /// Error element id is `<field><suffix>`, e.g. `emailError`
    pub error_suffix: String,
    /// Every error display cleared on reset
    pub error_messages: Selector,
    pub shown_class: String,
    pub min_message_len: usize,
    pub required_text: String,
    pub email_text: String,
    pub too_short_text: String,
    pub terms_alert: String,
    pub success_alert: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            form_id: "contactForm".to_string(),
            terms_id: "terms".to_string(),
            error_suffix: "Error".to_string(),
            error_messages: selector(".error-message"),
            shown_class: "show".to_string(),
            min_message_len: 10,
            required_text: "This field is required".to_string(),
            email_text: "Please enter a valid email".to_string(),
            too_short_text: "Message must be at least 10 characters".to_string(),
            terms_alert: "Please agree to the terms and privacy policy".to_string(),
            success_alert: "Thank you for your message! I will get back to you soon.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpandConfig {
    pub triggers: Selector,
    /// Ancestor holding both panes
    pub container: Selector,
    pub excerpt: Selector,
    pub full: Selector,
    pub expanded_attr: String,
    pub expanded_class: String,
    pub more_label: String,
    pub less_label: String,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            triggers: selector(".read-more"),
            container: selector(".blog-content"),
            excerpt: selector(".blog-excerpt"),
            full: selector(".blog-full-content"),
            expanded_attr: "data-expanded".to_string(),
            expanded_class: "expanded".to_string(),
            more_label: "Read More →".to_string(),
            less_label: "Read Less ←".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        for text in [
            ".nav-link",
            "header",
            "a[href^=\"#\"]",
            ".filter-btn",
            ".project-card",
            ".project-card, .blog-card",
            ".stat h4",
            ".error-message",
            ".read-more",
            ".blog-content",
            ".blog-excerpt",
            ".blog-full-content",
        ] {
            assert!(Selector::parse(text).is_ok(), "{}", text);
        }
        let config = EngineConfig::default();
        assert_eq!(config.counters.labels.to_string(), ".stat h4");
        assert_eq!(config.scroll.anchors.to_string(), "a[href^=\"#\"]");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "counters": { "duration_ms": 500 }, "menu": { "header": "nav" } }"#,
        )
        .unwrap();
        assert_eq!(config.counters.duration_ms, 500);
        assert_eq!(config.counters.tick_ms, 16);
        assert_eq!(config.menu.header.to_string(), "nav");
        assert_eq!(config.theme.storage_key, "theme");
    }

    #[test]
    fn test_serialized_config_reloads() {
        let mut config = EngineConfig::default();
        config.filter.cards = Selector::parse(r#".project-card[data-note='say "hi"']"#).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let reloaded = EngineConfig::from_json_str(&json).unwrap();
        assert_eq!(reloaded.filter.cards, config.filter.cards);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "reveal": { "threshold": 1.5 } }"#),
            Err(FolioError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "counters": { "tick_ms": 0 } }"#),
            Err(FolioError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "filter": { "cards": "div > a" } }"#),
            Err(FolioError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.json");
        std::fs::write(&path, r#"{ "theme": { "storage_key": "folio-theme" } }"#).unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.theme.storage_key, "folio-theme");
    }
}
