//! Arena-backed [`Document`] for headless hosting.
//!
//! Nodes live in a `Vec` and are never freed; replacing an element's content
//! detaches its children, which then drop out of [`Document::elements`].
//! Side effects with no structural footprint (alerts, scrolls, stylesheet
//! injection) are recorded so callers can assert on them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Document, NodeId, ScrollBehavior};
use crate::error::{FolioError, FolioResult};

/// Declarative element description, used both by the builder API and by
/// JSON page fixtures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

/// A whole page fixture: the `<body>` subtree plus load state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    /// Start in the loading state (content-loaded not yet fired)
    #[serde(default)]
    pub loading: bool,
    pub body: ElementSpec,
}

impl PageSpec {
    pub fn from_json_str(json: &str) -> FolioResult<Self> {
        serde_json::from_str(json).map_err(|e| FolioError::Serialization(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> FolioResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// A recorded `scroll_into_view` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScrollRecord {
    pub target: NodeId,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    /// Own text, not counting children
    text: String,
    inner_html: Option<String>,
    styles: BTreeMap<String, String>,
    value: String,
    checked: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn from_spec(spec: &ElementSpec, parent: Option<NodeId>) -> Self {
        let mut attributes = spec.attrs.clone();
        if let Some(id) = &spec.id {
            attributes.insert("id".to_string(), id.clone());
        }
        let value = attributes.get("value").cloned().unwrap_or_default();
        let checked = attributes.contains_key("checked");
        let mut classes: Vec<String> = Vec::new();
        for class in &spec.classes {
            if !classes.contains(class) {
                classes.push(class.clone());
            }
        }
        Self {
            tag: spec.tag.to_ascii_lowercase(),
            attributes,
            classes,
            text: spec.text.clone(),
            inner_html: None,
            styles: BTreeMap::new(),
            value,
            checked,
            parent,
            children: Vec::new(),
        }
    }
}

/// Headless document tree
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    loading: bool,
    alerts: Vec<String>,
    scrolls: Vec<ScrollRecord>,
    stylesheets: Vec<String>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Empty, fully loaded document containing only `<body>`
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::from_spec(&ElementSpec::new("body"), None)],
            loading: false,
            alerts: Vec::new(),
            scrolls: Vec::new(),
            stylesheets: Vec::new(),
        }
    }

    pub fn from_page(page: &PageSpec) -> Self {
        let mut doc = Self::new();
        let body = doc.body();
        // Body attributes come from the fixture root
        doc.nodes[body.index()] = Node::from_spec(&page.body, None);
        for child in &page.body.children {
            doc.append(body, child.clone());
        }
        doc.loading = page.loading;
        doc
    }

    /// Append `spec` (and its children) under `parent`, returning the new node
    pub fn append(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        // An unknown parent leaves the new subtree detached
        let parent = match self.nodes.get_mut(parent.index()) {
            Some(node) => {
                node.children.push(id);
                Some(parent)
            }
            None => None,
        };
        self.nodes.push(Node::from_spec(&spec, parent));
        for child in spec.children {
            self.append(id, child);
        }
        id
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn scrolls(&self) -> &[ScrollRecord] {
        &self.scrolls
    }

    pub fn stylesheets(&self) -> &[String] {
        &self.stylesheets
    }

    /// Class list in insertion order
    pub fn classes(&self, node: NodeId) -> &[String] {
        self.node(node).map_or(&[], |n| n.classes.as_slice())
    }

    /// Markup last written with `set_inner_html`, if any
    pub fn inner_html(&self, node: NodeId) -> Option<&str> {
        self.node(node)?.inner_html.as_deref()
    }

    /// Ids outside the arena behave as detached, empty elements
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            body: self.snapshot_node(self.body()),
            alerts: self.alerts.clone(),
            scrolls: self.scrolls.clone(),
            stylesheets: self.stylesheets.len(),
        }
    }

    fn snapshot_node(&self, id: NodeId) -> NodeSnapshot {
        let node = &self.nodes[id.index()];
        NodeSnapshot {
            node: id,
            tag: node.tag.clone(),
            classes: node.classes.clone(),
            attrs: node.attributes.clone(),
            text: node.text.clone(),
            styles: node.styles.clone(),
            value: node.value.clone(),
            checked: node.checked,
            children: node
                .children
                .iter()
                .map(|child| self.snapshot_node(*child))
                .collect(),
        }
    }

    fn detach_children(&mut self, id: NodeId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        for child in std::mem::take(&mut node.children) {
            if let Some(child) = self.node_mut(child) {
                child.parent = None;
            }
        }
    }

    fn collect(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let Some(node) = self.node(id) else {
            return;
        };
        out.push(id);
        for child in &node.children {
            self.collect(*child, out);
        }
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        out.push_str(&node.text);
        for child in &node.children {
            self.collect_text(*child, out);
        }
    }
}

/// Serializable view of a node subtree
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub node: NodeId,
    pub tag: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub checked: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

/// Serializable view of the whole document and its side-effect logs
#[derive(Debug, Clone, Serialize)]
pub struct PageSnapshot {
    pub body: NodeSnapshot,
    pub alerts: Vec<String>,
    pub scrolls: Vec<ScrollRecord>,
    pub stylesheets: usize,
}

/// Drop `<...>` tags, keeping text
fn strip_markup(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

impl Document for MemoryDocument {
    fn body(&self) -> NodeId {
        NodeId::new(0)
    }

    fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.collect(self.body(), &mut out);
        out
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    fn tag(&self, node: NodeId) -> String {
        self.node(node).map(|n| n.tag.clone()).unwrap_or_default()
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node(node)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(node) = self.node_mut(node) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(node) = self.node_mut(node) {
            node.classes.retain(|c| c != class);
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.node(node)?.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(node) = self.node_mut(node) {
            node.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        self.detach_children(node);
        if let Some(node) = self.node_mut(node) {
            node.text = text.to_string();
            node.inner_html = None;
        }
    }

    fn set_inner_html(&mut self, node: NodeId, markup: &str) {
        self.detach_children(node);
        if let Some(node) = self.node_mut(node) {
            node.text = strip_markup(markup);
            node.inner_html = Some(markup.to_string());
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.node(node)?.styles.get(property).cloned()
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(node) = self.node_mut(node) {
            node.styles.insert(property.to_string(), value.to_string());
        }
    }

    fn value(&self, node: NodeId) -> String {
        self.node(node).map(|n| n.value.clone()).unwrap_or_default()
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(node) = self.node_mut(node) {
            node.value = value.to_string();
        }
    }

    fn checked(&self, node: NodeId) -> bool {
        self.node(node).is_some_and(|n| n.checked)
    }

    fn set_checked(&mut self, node: NodeId, checked: bool) {
        if let Some(node) = self.node_mut(node) {
            node.checked = checked;
        }
    }

    fn reset_form(&mut self, form: NodeId) {
        let mut controls = Vec::new();
        self.collect(form, &mut controls);
        for id in controls {
            let Some(node) = self.node_mut(id) else {
                continue;
            };
            if matches!(node.tag.as_str(), "input" | "textarea" | "select") {
                node.value = node.attributes.get("value").cloned().unwrap_or_default();
                node.checked = node.attributes.contains_key("checked");
            }
        }
    }

    fn scroll_into_view(&mut self, node: NodeId, behavior: ScrollBehavior) {
        self.scrolls.push(ScrollRecord {
            target: node,
            behavior,
        });
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn inject_stylesheet(&mut self, css: &str) {
        self.stylesheets.push(css.to_string());
    }

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|node| {
                self.node(*node)
                    .and_then(|n| n.attributes.get("id"))
                    .is_some_and(|value| value == id)
            })
    }
}
