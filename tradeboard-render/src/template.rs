//! Templates and the template registry.
//!
//! A template is a named forest of element and text nodes. Template
//! libraries are JSON objects mapping a template name to its content:
//!
//! ```json
//! {
//!   "user-welcome": [
//!     { "tag": "p", "children": ["Welcome back, ", { "tag": "slot" }] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::dom::{Document, NodeId};
use crate::error::RenderError;

/// Marks the element of a parent template that child rows are appended to.
pub const PARENT_ANCHOR: &str = "data-parent";
/// Marks the row element of a child template that is cloned per row.
pub const CHILD_ANCHOR: &str = "data-child";

/// Suffix naming a grid component's row template.
pub const CHILD_SUFFIX: &str = "-child";

pub fn child_template_name(component: &str) -> String {
    format!("{component}{CHILD_SUFFIX}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateNode {
    Text(String),
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attributes: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<TemplateNode>,
    },
}

impl TemplateNode {
    pub fn element(tag: &str) -> Self {
        TemplateNode::Element {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: &str) -> Self {
        TemplateNode::Text(text.to_string())
    }

    /// An unnamed `<slot>`; projection names it.
    pub fn slot() -> Self {
        Self::element("slot")
    }

    pub fn attr(mut self, key: &str, value: &str) -> Self {
        if let TemplateNode::Element { attributes, .. } = &mut self {
            attributes.insert(key.to_string(), value.to_string());
        }
        self
    }

    pub fn child(mut self, node: TemplateNode) -> Self {
        if let TemplateNode::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    pub fn children<I: IntoIterator<Item = TemplateNode>>(mut self, nodes: I) -> Self {
        if let TemplateNode::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    /// First node of this subtree, itself included, carrying `attribute`.
    pub fn find_marked(&self, attribute: &str) -> Option<&TemplateNode> {
        match self {
            TemplateNode::Text(_) => None,
            TemplateNode::Element {
                attributes,
                children,
                ..
            } => {
                if attributes.contains_key(attribute) {
                    return Some(self);
                }
                children.iter().find_map(|child| child.find_marked(attribute))
            }
        }
    }

    /// Names of the `<slot>`s below this node in document order, `None` for
    /// unnamed ones. The node itself is not included.
    pub fn inner_slots(&self) -> Vec<Option<&str>> {
        let mut slots = Vec::new();
        if let TemplateNode::Element { children, .. } = self {
            for child in children {
                child.collect_slots(&mut slots);
            }
        }
        slots
    }

    fn collect_slots<'a>(&'a self, slots: &mut Vec<Option<&'a str>>) {
        if let TemplateNode::Element {
            tag,
            attributes,
            children,
        } = self
        {
            if tag == "slot" {
                slots.push(attributes.get("name").map(String::as_str));
            }
            for child in children {
                child.collect_slots(slots);
            }
        }
    }

    /// Build a detached copy of this subtree.
    pub(crate) fn build(&self, doc: &mut Document) -> NodeId {
        match self {
            TemplateNode::Text(text) => doc.create_text(text),
            TemplateNode::Element {
                tag,
                attributes,
                children,
            } => {
                let node = doc.create_element(tag);
                for (key, value) in attributes {
                    doc.set_attribute(node, key, value);
                }
                for child in children {
                    let built = child.build(doc);
                    doc.append_child(node, built);
                }
                node
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub content: Vec<TemplateNode>,
}

impl Template {
    pub fn new(name: &str, content: Vec<TemplateNode>) -> Self {
        Self {
            name: name.to_string(),
            content,
        }
    }

    /// Build a fresh copy of the content as the last children of `parent`.
    pub fn instantiate_into(&self, doc: &mut Document, parent: NodeId) {
        for node in &self.content {
            let built = node.build(doc);
            doc.append_child(parent, built);
        }
    }

    /// Slot names of the content in document order, `None` for unnamed slots.
    pub fn slots(&self) -> Vec<Option<&str>> {
        let mut slots = Vec::new();
        for node in &self.content {
            node.collect_slots(&mut slots);
        }
        slots
    }

    pub fn find_marked(&self, attribute: &str) -> Option<&TemplateNode> {
        self.content.iter().find_map(|node| node.find_marked(attribute))
    }
}

/// Templates by name. Registering a name twice replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Template>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, template: Template) {
        if self.templates.contains_key(&template.name) {
            log::debug!("replacing template '{}'", template.name);
        }
        self.templates.insert(template.name.clone(), template);
    }

    pub fn resolve(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        let library: BTreeMap<String, Vec<TemplateNode>> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for (name, content) in library {
            registry.register(Template { name, content });
        }
        Ok(registry)
    }

    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        let json = std::fs::read_to_string(path).map_err(|source| RenderError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_json(&json)?;
        log::info!("loaded {} templates from {}", registry.len(), path.display());
        Ok(registry)
    }

    /// Add every template of `other`, replacing same-named ones.
    pub fn extend(&mut self, other: TemplateRegistry) {
        for (_, template) in other.templates {
            self.register(template);
        }
    }
}
