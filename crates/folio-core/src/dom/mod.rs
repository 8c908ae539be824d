//! Document abstraction the engine renders into.
//!
//! The engine never owns page structure. It binds to elements through the
//! [`Document`] trait and pushes its state into them as classes, attributes,
//! text and inline styles. A browser host implements the primitives over the
//! real DOM; [`MemoryDocument`] implements them over an arena tree for
//! headless use and tests.

mod memory;

pub use memory::{ElementSpec, MemoryDocument, NodeSnapshot, PageSnapshot, PageSpec, ScrollRecord};

use serde::{Deserialize, Serialize};

use crate::selector::Selector;

/// Opaque handle to an element in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// How `scroll_into_view` should move the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Element-level primitives over a rendered page.
///
/// Query helpers (`matches`, `query_all`, `closest`, ...) are provided on top
/// of the structural primitives and the [`Selector`] engine. Hosts with a
/// native query engine may override them.
pub trait Document {
    /// The `<body>` element
    fn body(&self) -> NodeId;

    /// All attached elements in document order
    fn elements(&self) -> Vec<NodeId>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Lowercase tag name
    fn tag(&self, node: NodeId) -> String;

    fn has_class(&self, node: NodeId, class: &str) -> bool;
    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    /// Text content of the element and its descendants
    fn text(&self, node: NodeId) -> String;
    /// Replace all content with plain text
    fn set_text(&mut self, node: NodeId, text: &str);
    /// Replace all content with markup
    fn set_inner_html(&mut self, node: NodeId, markup: &str);

    /// Inline style property, if set
    fn style(&self, node: NodeId, property: &str) -> Option<String>;
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    /// Current value of a form control
    fn value(&self, node: NodeId) -> String;
    fn set_value(&mut self, node: NodeId, value: &str);
    fn checked(&self, node: NodeId) -> bool;
    fn set_checked(&mut self, node: NodeId, checked: bool);
    /// Restore every control inside `form` to its default state
    fn reset_form(&mut self, form: NodeId);

    fn scroll_into_view(&mut self, node: NodeId, behavior: ScrollBehavior);
    /// Blocking user notice
    fn alert(&mut self, message: &str);
    /// Append a stylesheet to the document head
    fn inject_stylesheet(&mut self, css: &str);
    /// Whether the document is still parsing (content not yet loaded)
    fn is_loading(&self) -> bool;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|node| self.attribute(*node, "id").as_deref() == Some(id))
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        selector.matches(self, node)
    }

    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|node| self.matches(*node, selector))
            .collect()
    }

    fn query_first(&self, selector: &Selector) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|node| self.matches(*node, selector))
    }

    /// Matching descendants of `root` (excluding `root`)
    fn query_within(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.query_all(selector)
            .into_iter()
            .filter(|node| *node != root && self.contains(root, *node))
            .collect()
    }

    /// Nearest inclusive ancestor matching `selector`
    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if self.matches(candidate, selector) {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }

    /// Inclusive containment: a node contains itself
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.parent(candidate);
        }
        false
    }
}
