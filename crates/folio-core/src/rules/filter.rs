//! Project filter: category buttons show/hide project cards.

use serde::Serialize;
use tracing::{debug, warn};

use super::set_class;
use crate::config::FilterConfig;
use crate::dom::{Document, NodeId};
use crate::error::{FolioError, FolioResult};
use crate::events::Reaction;

/// Keyframes referenced by the filter's fade-in effect
pub const FADE_IN_KEYFRAMES: &str = "@keyframes fadeIn {
    from {
        opacity: 0;
        transform: scale(0.9);
    }
    to {
        opacity: 1;
        transform: scale(1);
    }
}";

/// Currently selected category
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Category(String),
}

impl Filter {
    pub fn parse(value: &str, all_value: &str) -> Self {
        if value == all_value {
            Filter::All
        } else {
            Filter::Category(value.to_string())
        }
    }

    pub fn admits(&self, category: Option<&str>) -> bool {
        match self {
            Filter::All => true,
            Filter::Category(selected) => category == Some(selected.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
struct FilterButton {
    node: NodeId,
    filter: Filter,
}

#[derive(Debug, Clone)]
struct ProjectCard {
    node: NodeId,
    category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProjectFilter {
    buttons: Vec<FilterButton>,
    cards: Vec<ProjectCard>,
    active: Filter,
    active_button: NodeId,
    config: FilterConfig,
}

impl ProjectFilter {
    /// Bind to filter buttons and cards.
    ///
    /// The initially active button is the first one marked active, else the
    /// wildcard button, else the first button. Markers and card visibility
    /// are synced to it without animating.
    pub fn bind<D: Document>(doc: &mut D, config: &FilterConfig) -> FolioResult<Self> {
        let buttons: Vec<FilterButton> = doc
            .query_all(&config.buttons)
            .into_iter()
            .filter_map(|node| match doc.attribute(node, &config.filter_attr) {
                Some(value) => Some(FilterButton {
                    node,
                    filter: Filter::parse(&value, &config.all_value),
                }),
                None => {
                    warn!(
                        %node,
                        attr = %config.filter_attr,
                        "Filter button without a category, skipping"
                    );
                    None
                }
            })
            .collect();

        let initial = buttons
            .iter()
            .find(|b| doc.has_class(b.node, &config.active_class))
            .or_else(|| buttons.iter().find(|b| b.filter == Filter::All))
            .or_else(|| buttons.first())
            .cloned()
            .ok_or_else(|| FolioError::missing(config.buttons.to_string()))?;

        let cards = doc
            .query_all(&config.cards)
            .into_iter()
            .map(|node| ProjectCard {
                node,
                category: doc.attribute(node, &config.category_attr),
            })
            .collect();

        let filter = Self {
            buttons,
            cards,
            active: initial.filter,
            active_button: initial.node,
            config: config.clone(),
        };
        filter.render(doc, false);
        Ok(filter)
    }

    pub fn active(&self) -> &Filter {
        &self.active
    }

    pub fn active_button(&self) -> NodeId {
        self.active_button
    }

    pub fn on_click<D: Document>(&mut self, doc: &mut D, target: NodeId) -> Reaction {
        let Some(button) = doc.closest(target, &self.config.buttons) else {
            return Reaction::none();
        };
        if self.select(doc, button) {
            debug!(filter = ?self.active, "Filter selected");
        }
        Reaction::none()
    }

    /// Activate `button`. Returns false if it is not a bound filter button.
    pub fn select<D: Document>(&mut self, doc: &mut D, button: NodeId) -> bool {
        let Some(chosen) = self.buttons.iter().find(|b| b.node == button) else {
            return false;
        };
        self.active = chosen.filter.clone();
        self.active_button = chosen.node;
        self.render(doc, true);
        true
    }

    /// Cards currently shown
    pub fn visible_cards<D: Document>(&self, doc: &D) -> Vec<NodeId> {
        self.cards
            .iter()
            .filter(|card| !doc.has_class(card.node, &self.config.hidden_class))
            .map(|card| card.node)
            .collect()
    }

    fn render<D: Document>(&self, doc: &mut D, animate: bool) {
        for button in &self.buttons {
            set_class(
                doc,
                button.node,
                &self.config.active_class,
                button.node == self.active_button,
            );
        }
        for card in &self.cards {
            let visible = self.active.admits(card.category.as_deref());
            set_class(doc, card.node, &self.config.hidden_class, !visible);
            if visible && animate {
                doc.set_style(card.node, "animation", &self.config.fade_in);
            }
        }
    }
}
