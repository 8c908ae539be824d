//! Scroll reveal: cards slide up the first time they come into view.

use tracing::debug;

use crate::config::RevealConfig;
use crate::dom::{Document, NodeId};
use crate::error::{FolioError, FolioResult};
use crate::observer::{Geometry, VisibilityObserver};

pub const SLIDE_UP_KEYFRAMES: &str = "@keyframes slideUp {
    from {
        opacity: 0;
        transform: translateY(30px);
    }
    to {
        opacity: 1;
        transform: translateY(0);
    }
}";

#[derive(Debug, Clone)]
pub struct ScrollReveal {
    observer: VisibilityObserver,
    animation: String,
}

impl ScrollReveal {
    pub fn bind<D: Document>(doc: &D, config: &RevealConfig) -> FolioResult<Self> {
        let targets = doc.query_all(&config.targets);
        if targets.is_empty() {
            return Err(FolioError::missing(config.targets.to_string()));
        }
        let mut observer = VisibilityObserver::new(config.observer_options());
        for node in targets {
            observer.observe(node);
        }
        Ok(Self {
            observer,
            animation: config.animation.clone(),
        })
    }

    /// Elements still waiting for their first reveal
    pub fn pending(&self) -> usize {
        self.observer.observed_count()
    }

    pub fn is_pending(&self, node: NodeId) -> bool {
        self.observer.is_observing(node)
    }

    /// Reveal `target` if the observation puts it in view. Each element is
    /// revealed at most once. Returns whether it was revealed now.
    pub fn on_visible<D: Document>(
        &mut self,
        doc: &mut D,
        target: NodeId,
        geometry: &Geometry,
    ) -> bool {
        if !self.observer.triggers(target, geometry) {
            return false;
        }
        doc.set_style(target, "animation", &self.animation);
        self.observer.unobserve(target);
        debug!(%target, remaining = self.pending(), "Revealed");
        true
    }
}
