//! In-memory host tree.
//!
//! An arena of element, text and shadow-root nodes with parent links. A
//! shadow root hangs off its host element instead of being one of its
//! children: queries and tree walks over the host's light tree never enter
//! it, which is what isolates a component's internal markup.

pub mod html;

use std::fmt;

use crate::event::ListenerTable;

/// Handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Marks a host element as an instance of a registered component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentBinding {
    pub component: String,
    /// Name of the custom event emitted for clicks inside the instance.
    pub event_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub shadow_root: Option<NodeId>,
    pub binding: Option<ComponentBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
    ShadowRoot { host: NodeId },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Element selector for [`Document::query_selector_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<'a> {
    /// Elements with this tag name.
    Tag(&'a str),
    /// Elements carrying this attribute, whatever its value.
    Attribute(&'a str),
}

impl Selector<'_> {
    fn matches(&self, element: &Element) -> bool {
        match self {
            Selector::Tag(tag) => element.tag == *tag,
            Selector::Attribute(name) => element.attributes.iter().any(|(k, _)| k == name),
        }
    }
}

/// The host page: node arena plus registered event listeners.
pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
    pub(crate) listeners: ListenerTable,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document with a `body` element as its root.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            body: NodeId(0),
            listeners: ListenerTable::default(),
        };
        doc.body = doc.create_element("body");
        doc
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(Element {
            tag: tag.to_string(),
            attributes: Vec::new(),
            shadow_root: None,
            binding: None,
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Nodes allocated so far, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old) = self.nodes[child.0].parent.take() {
            self.nodes[old.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Set or replace an attribute. No-op on non-element nodes.
    pub fn set_attribute(&mut self, id: NodeId, key: &str, value: &str) {
        if let Some(element) = self.element_mut(id) {
            match element.attributes.iter_mut().find(|(k, _)| k == key) {
                Some(slot) => slot.1 = value.to_string(),
                None => element.attributes.push((key.to_string(), value.to_string())),
            }
        }
    }

    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        self.element(id)?
            .attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attach an open shadow root to `host`, or return the existing one.
    pub fn attach_shadow(&mut self, host: NodeId) -> NodeId {
        if let Some(existing) = self.shadow_root(host) {
            return existing;
        }
        let root = self.push(NodeKind::ShadowRoot { host });
        if let Some(element) = self.element_mut(host) {
            element.shadow_root = Some(root);
        }
        root
    }

    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.element(host)?.shadow_root
    }

    /// Host element of a shadow root.
    pub fn host(&self, shadow_root: NodeId) -> Option<NodeId> {
        match self.nodes[shadow_root.0].kind {
            NodeKind::ShadowRoot { host } => Some(host),
            _ => None,
        }
    }

    pub fn binding(&self, id: NodeId) -> Option<&ComponentBinding> {
        self.element(id)?.binding.as_ref()
    }

    pub(crate) fn set_binding(&mut self, id: NodeId, binding: ComponentBinding) {
        if let Some(element) = self.element_mut(id) {
            element.binding = Some(binding);
        }
    }

    /// Concatenated text of all descendant text nodes (light tree only).
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let NodeKind::Text(text) = &self.nodes[id.0].kind {
            out.push_str(text);
        }
        for child in &self.nodes[id.0].children {
            self.collect_text(*child, out);
        }
    }

    /// Matching descendants of `root` in document order. Shadow roots of
    /// descendants are not entered.
    pub fn query_selector_all(&self, root: NodeId, selector: Selector<'_>) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(element) = self.element(id) {
                if selector.matches(element) {
                    found.push(id);
                }
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        found
    }

    pub fn query_selector(&self, root: NodeId, selector: Selector<'_>) -> Option<NodeId> {
        self.query_selector_all(root, selector).into_iter().next()
    }

    /// Deep-copy `id` and its light-tree descendants into a detached subtree.
    /// Shadow roots and component bindings are not copied.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let kind = match &self.nodes[id.0].kind {
            NodeKind::Element(element) => NodeKind::Element(Element {
                tag: element.tag.clone(),
                attributes: element.attributes.clone(),
                shadow_root: None,
                binding: None,
            }),
            other => other.clone(),
        };
        let copy = self.push(kind);
        let children = self.nodes[id.0].children.clone();
        for child in children {
            let child_copy = self.clone_subtree(child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// The slotted light-DOM child a `<slot>` inside a shadow tree resolves
    /// to, matched by name.
    pub fn assigned_element(&self, slot: NodeId) -> Option<NodeId> {
        let name = self.attribute(slot, "name")?;
        let mut cursor = slot;
        let host = loop {
            if let Some(host) = self.host(cursor) {
                break host;
            }
            cursor = self.parent(cursor)?;
        };
        self.children(host)
            .iter()
            .copied()
            .find(|child| self.attribute(*child, "slot") == Some(name))
    }

    /// Whether `id` is reachable from the body, crossing shadow boundaries.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut cursor = id;
        loop {
            if cursor == self.body {
                return true;
            }
            cursor = match self.parent(cursor).or_else(|| self.host(cursor)) {
                Some(next) => next,
                None => return false,
            };
        }
    }
}
