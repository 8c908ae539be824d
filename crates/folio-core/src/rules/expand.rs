//! Read more / read less blocks.
//!
//! Each trigger owns one block: the nearest container around it holding an
//! excerpt pane and a full pane. Exactly one pane is displayed at a time.

use serde::Serialize;
use tracing::{debug, warn};

use super::set_class;
use crate::config::ExpandConfig;
use crate::dom::{Document, NodeId};
use crate::error::{FolioError, FolioResult};
use crate::events::Reaction;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpandState {
    #[default]
    Collapsed,
    Expanded,
}

impl ExpandState {
    pub fn toggled(self) -> Self {
        match self {
            ExpandState::Collapsed => ExpandState::Expanded,
            ExpandState::Expanded => ExpandState::Collapsed,
        }
    }

    fn from_attr(value: Option<&str>) -> Self {
        if value == Some("true") {
            ExpandState::Expanded
        } else {
            ExpandState::Collapsed
        }
    }
}

#[derive(Debug, Clone)]
struct Block {
    trigger: NodeId,
    excerpt: NodeId,
    full: NodeId,
    state: ExpandState,
}

#[derive(Debug, Clone)]
pub struct ExpandableBlocks {
    blocks: Vec<Block>,
    config: ExpandConfig,
}

impl ExpandableBlocks {
    /// Bind every trigger that has both panes; others are skipped. Initial
    /// state comes from the trigger's expanded attribute and is rendered
    /// immediately.
    pub fn bind<D: Document>(doc: &mut D, config: &ExpandConfig) -> FolioResult<Self> {
        let mut blocks = Vec::new();
        for trigger in doc.query_all(&config.triggers) {
            let panes = doc.closest(trigger, &config.container).and_then(|container| {
                let excerpt = doc.query_within(container, &config.excerpt).into_iter().next()?;
                let full = doc.query_within(container, &config.full).into_iter().next()?;
                Some((excerpt, full))
            });
            let Some((excerpt, full)) = panes else {
                warn!(%trigger, "Read-more trigger without excerpt/full panes, skipping");
                continue;
            };
            blocks.push(Block {
                trigger,
                excerpt,
                full,
                state: ExpandState::from_attr(
                    doc.attribute(trigger, &config.expanded_attr).as_deref(),
                ),
            });
        }
        if blocks.is_empty() {
            return Err(FolioError::missing(config.triggers.to_string()));
        }

        let expand = Self {
            blocks,
            config: config.clone(),
        };
        for block in &expand.blocks {
            expand.render(doc, block);
        }
        Ok(expand)
    }

    pub fn state(&self, trigger: NodeId) -> Option<ExpandState> {
        self.blocks.iter().find(|b| b.trigger == trigger).map(|b| b.state)
    }

    pub fn triggers(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.blocks.iter().map(|b| b.trigger)
    }

    pub fn on_click<D: Document>(&mut self, doc: &mut D, target: NodeId) -> Reaction {
        let Some(index) = self.blocks.iter().position(|b| doc.contains(b.trigger, target)) else {
            return Reaction::none();
        };
        let state = self.blocks[index].state.toggled();
        self.blocks[index].state = state;
        debug!(trigger = %self.blocks[index].trigger, ?state, "Block toggled");
        self.render(doc, &self.blocks[index]);
        Reaction::prevented()
    }

    fn render<D: Document>(&self, doc: &mut D, block: &Block) {
        let expanded = block.state == ExpandState::Expanded;
        let (shown, hidden) = if expanded {
            (block.full, block.excerpt)
        } else {
            (block.excerpt, block.full)
        };
        doc.set_style(shown, "display", "block");
        doc.set_style(hidden, "display", "none");

        let label = if expanded {
            &self.config.less_label
        } else {
            &self.config.more_label
        };
        doc.set_text(block.trigger, label);
        let flag = if expanded { "true" } else { "false" };
        doc.set_attribute(block.trigger, &self.config.expanded_attr, flag);
        set_class(doc, block.trigger, &self.config.expanded_class, expanded);
    }
}
