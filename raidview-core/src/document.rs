//! In-memory report document
//!
//! The report generator emits a tree of elements, each carrying read-only
//! data attributes. This module holds that tree in an arena and exposes the
//! small set of mutations the view layer needs: show/hide, move-to-end,
//! text/value updates, classes, inline style and scroll requests.
//!
//! Global invariants enforced:
//! - Detached elements keep their id; elements dropped by `remove_children`
//!   return their slots to a free list that `create_element` reuses
//! - Child order is explicit and only changes through `append_child`/`detach`
//! - Queries walk the tree in document order

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Handle to an element in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementId(usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Layout box of an element, in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// A single element of the document
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub text: String,
    pub value: String,
    pub hidden: bool,
    pub disabled: bool,
    pub style: BTreeMap<String, String>,
    pub rect: Rect,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

/// Arena-backed element tree
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
    root: ElementId,
    free: Vec<ElementId>,
    last_scrolled: Option<ElementId>,
    scroll_count: usize,
}

/// Serialized document as emitted by the report generator
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocumentSpec {
    root: NodeSpec,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeSpec {
    #[serde(default = "default_tag")]
    tag: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    class: Vec<String>,
    #[serde(default)]
    data: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    rect: Option<Rect>,
    #[serde(default)]
    children: Vec<NodeSpec>,
}

fn default_tag() -> String {
    "div".to_string()
}

/// Attribute values are strings in the document; `null` keeps its literal form
fn attr_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with a `body` root
    pub fn new() -> Self {
        let root = Element {
            tag: "body".to_string(),
            ..Element::default()
        };
        Document {
            elements: vec![root],
            root: ElementId(0),
            free: Vec::new(),
            last_scrolled: None,
            scroll_count: 0,
        }
    }

    /// Parse a document from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: DocumentSpec =
            serde_json::from_str(json).context("failed to parse report document")?;
        let mut doc = Document {
            elements: Vec::new(),
            root: ElementId(0),
            free: Vec::new(),
            last_scrolled: None,
            scroll_count: 0,
        };
        doc.root = doc.insert_node(spec.root, None);
        Ok(doc)
    }

    /// Load a document from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report document: {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("invalid document: {}", path.display()))
    }

    fn insert_node(&mut self, node: NodeSpec, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            tag: node.tag,
            id: node.id,
            classes: node.class,
            attrs: node
                .data
                .iter()
                .map(|(k, v)| (k.clone(), attr_string(v)))
                .collect(),
            text: node.text,
            value: node.value,
            hidden: node.hidden,
            disabled: node.disabled,
            style: BTreeMap::new(),
            rect: node.rect.unwrap_or_default(),
            parent,
            children: Vec::new(),
        });
        for child in node.children {
            let child_id = self.insert_node(child, Some(id));
            self.elements[id.0].children.push(child_id);
        }
        id
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Number of arena slots, including recycled ones
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    fn element_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.elements[id.0]
    }

    /// Create a detached element, reusing a freed slot when one is available
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        let element = Element {
            tag: tag.to_string(),
            ..Element::default()
        };
        if let Some(id) = self.free.pop() {
            self.elements[id.0] = element;
            return id;
        }
        let id = ElementId(self.elements.len());
        self.elements.push(element);
        id
    }

    /// Move `child` to the end of `parent`'s children, detaching it first
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        self.detach(child);
        self.element_mut(child).parent = Some(parent);
        self.element_mut(parent).children.push(child);
    }

    /// Remove an element from its parent; it stays in the arena
    pub fn detach(&mut self, id: ElementId) {
        if let Some(parent) = self.element_mut(id).parent.take() {
            self.element_mut(parent).children.retain(|c| *c != id);
        }
    }

    /// Drop every child subtree of an element.
    ///
    /// Ids of the removed elements must not be used afterwards; their slots
    /// are handed out again by `create_element`.
    pub fn remove_children(&mut self, id: ElementId) {
        let mut pending = std::mem::take(&mut self.element_mut(id).children);
        while let Some(child) = pending.pop() {
            let element = self.element_mut(child);
            element.parent = None;
            pending.append(&mut element.children);
            self.free.push(child);
        }
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).parent
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.element(id).children
    }

    /// True when the element is reachable from the root
    pub fn is_attached(&self, id: ElementId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.element(current).parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// All attached elements in document order
    fn walk(&self, from: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.element(id).children.iter().rev().copied());
        }
        out
    }

    /// First attached element with the given `id` attribute
    pub fn by_id(&self, dom_id: &str) -> Option<ElementId> {
        self.walk(self.root)
            .into_iter()
            .find(|id| self.element(*id).id.as_deref() == Some(dom_id))
    }

    /// Attached elements carrying `class`, in document order
    pub fn by_class(&self, class: &str) -> Vec<ElementId> {
        self.descendants_by_class(self.root, class)
    }

    /// Descendants of `id` (excluding itself) carrying `class`
    pub fn descendants_by_class(&self, id: ElementId, class: &str) -> Vec<ElementId> {
        self.walk(id)
            .into_iter()
            .skip(1)
            .filter(|el| self.has_class(*el, class))
            .collect()
    }

    /// Concatenated text of an element and all its descendants
    pub fn text_content(&self, id: ElementId) -> String {
        self.walk(id)
            .into_iter()
            .map(|el| self.element(el).text.as_str())
            .collect::<Vec<_>>()
            .concat()
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.element(id).classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) {
        if !self.has_class(id, class) {
            self.element_mut(id).classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        self.element_mut(id).classes.retain(|c| c != class);
    }

    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.element(id).attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, id: ElementId, name: &str, value: &str) {
        self.element_mut(id)
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    pub fn set_dom_id(&mut self, id: ElementId, dom_id: &str) {
        self.element_mut(id).id = Some(dom_id.to_string());
    }

    pub fn text(&self, id: ElementId) -> &str {
        &self.element(id).text
    }

    pub fn set_text(&mut self, id: ElementId, text: &str) {
        self.element_mut(id).text = text.to_string();
    }

    pub fn value(&self, id: ElementId) -> &str {
        &self.element(id).value
    }

    pub fn set_value(&mut self, id: ElementId, value: &str) {
        self.element_mut(id).value = value.to_string();
    }

    pub fn is_hidden(&self, id: ElementId) -> bool {
        self.element(id).hidden
    }

    pub fn set_hidden(&mut self, id: ElementId, hidden: bool) {
        self.element_mut(id).hidden = hidden;
    }

    pub fn is_disabled(&self, id: ElementId) -> bool {
        self.element(id).disabled
    }

    pub fn set_disabled(&mut self, id: ElementId, disabled: bool) {
        self.element_mut(id).disabled = disabled;
    }

    pub fn style(&self, id: ElementId, property: &str) -> Option<&str> {
        self.element(id).style.get(property).map(String::as_str)
    }

    pub fn set_style(&mut self, id: ElementId, property: &str, value: &str) {
        self.element_mut(id)
            .style
            .insert(property.to_string(), value.to_string());
    }

    pub fn rect(&self, id: ElementId) -> Rect {
        self.element(id).rect
    }

    /// Record a request to scroll an element into view
    pub fn scroll_into_view(&mut self, id: ElementId) {
        self.last_scrolled = Some(id);
        self.scroll_count += 1;
    }

    /// Most recent scroll request, if any
    pub fn last_scrolled(&self) -> Option<ElementId> {
        self.last_scrolled
    }

    pub fn scroll_count(&self) -> usize {
        self.scroll_count
    }

    /// Visible children of `id`, in order
    pub fn visible_children(&self, id: ElementId) -> Vec<ElementId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| !self.is_hidden(*c))
            .collect()
    }
}
