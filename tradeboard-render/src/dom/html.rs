//! HTML serialisation of the host tree.
//!
//! Shadow roots are written as declarative shadow DOM
//! (`<template shadowrootmode="open">`) at the start of their host, so the
//! output can be opened directly in a browser.

use super::{Document, NodeId, NodeKind};

impl Document {
    /// Serialise `id` and everything below it, shadow trees included.
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    /// Deterministic BLAKE3 hash of the serialised subtree.
    ///
    /// Two subtrees with the same fingerprint have the same tags, attributes,
    /// text, and shadow content.
    pub fn fingerprint(&self, id: NodeId) -> String {
        blake3::hash(self.to_html(id).as_bytes()).to_hex().to_string()
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match &self.node(id).kind {
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::ShadowRoot { .. } => self.write_children(id, out),
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (key, value) in &element.attributes {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(value));
                    out.push('"');
                }
                out.push('>');
                if let Some(shadow) = element.shadow_root {
                    out.push_str("<template shadowrootmode=\"open\">");
                    self.write_children(shadow, out);
                    out.push_str("</template>");
                }
                self.write_children(id, out);
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }

    fn write_children(&self, id: NodeId, out: &mut String) {
        for child in self.children(id) {
            self.write_html(*child, out);
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
