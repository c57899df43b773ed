//! Tradeboard rendering: projects view models into component instances on
//! an in-memory host tree.
//!
//! Each component instance is a host element with an isolated shadow tree
//! built from its template. View-model cells become light children of the
//! host, each assigned to a named `<slot>` in the shadow tree. Clicks inside
//! an instance are re-emitted as one custom event per component, which is
//! the only way components learn about each other.

pub mod builtin;
pub mod component;
pub mod context;
pub mod dom;
pub mod error;
pub mod event;
pub mod page;
pub mod slot;
pub mod template;

pub use component::{ComponentDefinition, ComponentRegistry};
pub use context::RenderContext;
pub use dom::{ComponentBinding, Document, NodeId, NodeKind, Selector};
pub use error::{ErrorKind, PageError, RenderError, RowRef};
pub use event::{Event, EventDetail, EventInit, CLICK};
pub use page::{heading_date, Page, PageOutcome};
pub use slot::{bind_slot, DEFAULT_ELEMENT};
pub use template::{Template, TemplateNode, TemplateRegistry};
