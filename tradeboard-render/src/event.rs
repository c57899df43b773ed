//! Event dispatch over the host tree, and the component interaction contract.
//!
//! Dispatch runs a target phase followed by a bubble phase along the
//! *composed path*: slotted light-DOM nodes route through the `<slot>` they
//! are assigned to, and a shadow root hands over to its host only for
//! composed events. Listeners outside a shadow tree see the event retargeted
//! to that tree's host.
//!
//! Component instances never install listeners of their own. When a click
//! passes through the shadow root of a bound host, dispatch re-emits it from
//! the host as a bubbling, composed custom event named by the host's
//! [`ComponentBinding`](crate::dom::ComponentBinding), carrying the original
//! click and the instance's shadow root.

use crate::dom::{Document, NodeId, NodeKind, Selector};

pub const CLICK: &str = "click";

/// An event as seen by one listener.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    /// Dispatch target, retargeted for the listener's tree.
    pub target: NodeId,
    /// Node whose listener is running.
    pub current_target: NodeId,
    pub bubbles: bool,
    pub composed: bool,
    pub detail: Option<Box<EventDetail>>,
}

/// Payload of a component event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDetail {
    /// The click as seen inside the instance, targeting the clicked leaf.
    pub original_event: Event,
    /// The instance's shadow root.
    pub fragment: NodeId,
}

/// Options for [`Document::dispatch_event`].
#[derive(Debug, Clone)]
pub struct EventInit {
    pub name: String,
    pub bubbles: bool,
    pub composed: bool,
    pub detail: Option<EventDetail>,
}

impl EventInit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bubbles: false,
            composed: false,
            detail: None,
        }
    }

    pub fn bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    pub fn composed(mut self, composed: bool) -> Self {
        self.composed = composed;
        self
    }

    pub fn detail(mut self, detail: EventDetail) -> Self {
        self.detail = Some(detail);
        self
    }
}

type Callback = Box<dyn FnMut(&Event)>;

struct Listener {
    node: NodeId,
    name: String,
    callback: Callback,
}

#[derive(Default)]
pub(crate) struct ListenerTable {
    entries: Vec<Listener>,
}

impl ListenerTable {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn invoke(&mut self, event: &Event) -> usize {
        let mut calls = 0;
        for listener in self
            .entries
            .iter_mut()
            .filter(|l| l.node == event.current_target && l.name == event.name)
        {
            (listener.callback)(event);
            calls += 1;
        }
        calls
    }
}

impl Document {
    /// Register `callback` for events named `name` reaching `node`.
    pub fn add_event_listener<F>(&mut self, node: NodeId, name: &str, callback: F)
    where
        F: FnMut(&Event) + 'static,
    {
        self.listeners.entries.push(Listener {
            node,
            name: name.to_string(),
            callback: Box::new(callback),
        });
    }

    /// Simulate a user click on `target`. Returns the number of listener
    /// invocations, component events included.
    pub fn click(&mut self, target: NodeId) -> usize {
        self.dispatch_event(target, EventInit::new(CLICK).bubbles(true).composed(true))
    }

    /// Dispatch an event from `target`. Returns the number of listener
    /// invocations, including those of component events it triggered.
    pub fn dispatch_event(&mut self, target: NodeId, init: EventInit) -> usize {
        let path = self.event_path(target, init.bubbles, init.composed);
        let detail = init.detail.map(Box::new);
        let mut calls = 0;

        for node in path {
            let event = Event {
                name: init.name.clone(),
                target: self.retarget(target, node),
                current_target: node,
                bubbles: init.bubbles,
                composed: init.composed,
                detail: detail.clone(),
            };
            calls += self.listeners.invoke(&event);

            if event.name == CLICK {
                calls += self.emit_component_event(node, event);
            }
        }
        calls
    }

    fn emit_component_event(&mut self, node: NodeId, click: Event) -> usize {
        let Some(host) = self.host(node) else {
            return 0;
        };
        let Some(binding) = self.binding(host) else {
            return 0;
        };
        let init = EventInit::new(binding.event_name.clone())
            .bubbles(true)
            .composed(true)
            .detail(EventDetail {
                original_event: click,
                fragment: node,
            });
        self.dispatch_event(host, init)
    }

    fn event_path(&self, target: NodeId, bubbles: bool, composed: bool) -> Vec<NodeId> {
        let mut path = vec![target];
        if !bubbles {
            return path;
        }
        let mut cursor = target;
        while let Some(next) = self.event_parent(cursor, composed) {
            path.push(next);
            cursor = next;
        }
        path
    }

    fn event_parent(&self, node: NodeId, composed: bool) -> Option<NodeId> {
        if let Some(parent) = self.parent(node) {
            if let Some(shadow) = self.shadow_root(parent) {
                if let Some(slot) = self.assigned_slot(node, shadow) {
                    return Some(slot);
                }
            }
            return Some(parent);
        }
        match self.node(node).kind {
            NodeKind::ShadowRoot { host } if composed => Some(host),
            _ => None,
        }
    }

    fn assigned_slot(&self, node: NodeId, shadow: NodeId) -> Option<NodeId> {
        let name = self.attribute(node, "slot")?;
        self.query_selector_all(shadow, Selector::Tag("slot"))
            .into_iter()
            .find(|slot| self.attribute(*slot, "name") == Some(name))
    }

    /// Topmost ancestor of `node` within its own tree.
    fn tree_root(&self, node: NodeId) -> NodeId {
        let mut cursor = node;
        while let Some(parent) = self.parent(cursor) {
            cursor = parent;
        }
        cursor
    }

    fn is_shadow_including_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current).or_else(|| self.host(current));
        }
        false
    }

    /// Hide shadow-internal targets from listeners outside that shadow tree.
    fn retarget(&self, target: NodeId, listener: NodeId) -> NodeId {
        let mut target = target;
        loop {
            let root = self.tree_root(target);
            match self.host(root) {
                Some(host) if !self.is_shadow_including_ancestor(root, listener) => target = host,
                _ => return target,
            }
        }
    }
}
