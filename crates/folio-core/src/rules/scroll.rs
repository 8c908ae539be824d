//! Smooth scrolling for in-page anchors.

use tracing::debug;

use crate::config::ScrollConfig;
use crate::dom::{Document, NodeId, ScrollBehavior};
use crate::error::{FolioError, FolioResult};
use crate::selector::Selector;

#[derive(Debug, Clone)]
pub struct SmoothScroll {
    anchors: Selector,
}

impl SmoothScroll {
    pub fn bind(config: &ScrollConfig) -> Self {
        Self {
            anchors: config.anchors.clone(),
        }
    }

    /// The fragment anchor a click lands on, if any. A claimed click always
    /// has its default jump suppressed, whether or not the target resolves.
    pub fn anchor_for<D: Document>(&self, doc: &D, target: NodeId) -> Option<NodeId> {
        doc.closest(target, &self.anchors)
    }

    /// Smooth-scroll to the element named by `anchor`'s fragment.
    ///
    /// A bare `#` names nothing and is a no-op. A fragment with no matching
    /// element is a `FragmentNotFound` error and nothing scrolls.
    pub fn scroll_to<D: Document>(
        &self,
        doc: &mut D,
        anchor: NodeId,
    ) -> FolioResult<Option<NodeId>> {
        let href = doc.attribute(anchor, "href").unwrap_or_default();
        let fragment = href.strip_prefix('#').unwrap_or_default();
        if fragment.is_empty() {
            return Ok(None);
        }
        let destination = doc
            .element_by_id(fragment)
            .ok_or_else(|| FolioError::FragmentNotFound(href.clone()))?;

        doc.scroll_into_view(destination, ScrollBehavior::Smooth);
        debug!(%href, %destination, "Smooth scroll");
        Ok(Some(destination))
    }
}
