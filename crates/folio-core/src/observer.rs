//! Viewport visibility observation
//!
//! A host reports element geometry relative to the viewport; the observer
//! decides whether that counts as "in view" under its threshold and root
//! margin. Only the vertical axis is modelled.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::dom::NodeId;

/// Grows (positive) or shrinks (negative) the viewport edges, in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverOptions {
    /// Fraction of the element that must be inside the root
    pub threshold: f64,
    pub root_margin: RootMargin,
}

/// Element placement as seen by the host at observation time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Element top edge relative to the viewport top
    pub top: f64,
    pub height: f64,
    pub viewport_height: f64,
}

impl Geometry {
    /// An element sitting entirely inside an 800px viewport
    pub fn fully_visible() -> Self {
        Self {
            top: 0.0,
            height: 100.0,
            viewport_height: 800.0,
        }
    }

    /// An element entirely below the fold
    pub fn below_fold() -> Self {
        Self {
            top: 1000.0,
            height: 100.0,
            viewport_height: 800.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VisibilityObserver {
    options: ObserverOptions,
    observed: BTreeSet<NodeId>,
}

impl VisibilityObserver {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            observed: BTreeSet::new(),
        }
    }

    pub fn options(&self) -> ObserverOptions {
        self.options
    }

    pub fn observe(&mut self, node: NodeId) {
        self.observed.insert(node);
    }

    /// Returns whether the node was being observed
    pub fn unobserve(&mut self, node: NodeId) -> bool {
        self.observed.remove(&node)
    }

    pub fn is_observing(&self, node: NodeId) -> bool {
        self.observed.contains(&node)
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    /// Fraction of the element inside the margin-adjusted viewport
    pub fn intersection_ratio(&self, geometry: &Geometry) -> f64 {
        let margin = self.options.root_margin;
        let root_top = -margin.top;
        let root_bottom = geometry.viewport_height + margin.bottom;

        if geometry.height <= 0.0 {
            // Zero-height elements count as fully in view when inside the root
            let inside = (root_top..=root_bottom).contains(&geometry.top);
            return if inside { 1.0 } else { 0.0 };
        }

        let element_bottom = geometry.top + geometry.height;
        let overlap = element_bottom.min(root_bottom) - geometry.top.max(root_top);
        if overlap <= 0.0 {
            return 0.0;
        }
        (overlap / geometry.height).min(1.0)
    }

    pub fn is_intersecting(&self, geometry: &Geometry) -> bool {
        let ratio = self.intersection_ratio(geometry);
        ratio > 0.0 && ratio >= self.options.threshold
    }

    /// True when `node` is observed and `geometry` puts it in view
    pub fn triggers(&self, node: NodeId, geometry: &Geometry) -> bool {
        self.is_observing(node) && self.is_intersecting(geometry)
    }
}
