//! Template projection.
//!
//! A [`RenderContext`] owns the templates and component definitions for one
//! page-render pass and projects view models into component instances:
//!
//! - **flat** models bind each cell to the slot carrying its name; a name the
//!   template does not declare is given to the next unnamed slot;
//! - **grid** models fill the parent template's slots with the parent row and
//!   append one copy of the `{component}-child` row per child row to the
//!   parent's `data-parent` element. Row slots get names unique within the
//!   instance, so every bound element lands in exactly one cell even though
//!   table rows cannot host slots of their own.
//!
//! Bound elements are light children of the instance host. Slot names are
//! unique within an instance. Templates, anchors, arity and names are all
//! checked before the first node is allocated, and the instance is appended
//! to the destination last: a failed projection leaves the document as it
//! was.

use std::collections::BTreeSet;
use tradeboard_core::{Cell, ComponentModel, FieldLabels, GridModel};

use crate::builtin;
use crate::component::{ComponentDefinition, ComponentRegistry};
use crate::dom::{Document, NodeId, Selector};
use crate::error::{RenderError, RowRef};
use crate::slot::bind_slot;
use crate::template::{
    child_template_name, Template, TemplateNode, TemplateRegistry, CHILD_ANCHOR, PARENT_ANCHOR,
};

#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    pub templates: TemplateRegistry,
    pub components: ComponentRegistry,
}

impl RenderContext {
    pub fn new(templates: TemplateRegistry) -> Self {
        Self {
            templates,
            components: ComponentRegistry::new(),
        }
    }

    /// Built-in dashboard templates with every dashboard component registered.
    pub fn dashboard() -> Self {
        Self::dashboard_with(TemplateRegistry::new())
    }

    /// Like [`RenderContext::dashboard`], with `overrides` replacing built-in
    /// templates of the same name.
    pub fn dashboard_with(overrides: TemplateRegistry) -> Self {
        let mut templates = builtin::templates();
        templates.extend(overrides);
        let mut ctx = Self::new(templates);
        for name in builtin::COMPONENTS {
            // Built-in templates cover every dashboard component.
            if let Err(e) = ctx.register_component(name) {
                log::warn!("{e}");
            }
        }
        ctx
    }

    /// Register `name` as a component emitting events under its own name.
    pub fn register_component(&mut self, name: &str) -> Result<&ComponentDefinition, RenderError> {
        self.components.define(&self.templates, name, None)
    }

    pub fn register_component_with_event(
        &mut self,
        name: &str,
        event_name: &str,
    ) -> Result<&ComponentDefinition, RenderError> {
        self.components.define(&self.templates, name, Some(event_name))
    }

    /// Project `model` into a new instance of `component` appended to
    /// `destination`. Returns the instance host.
    pub fn project(
        &self,
        doc: &mut Document,
        component: &str,
        destination: NodeId,
        model: &ComponentModel,
        labels: Option<&FieldLabels>,
    ) -> Result<NodeId, RenderError> {
        let definition = self
            .components
            .get(component)
            .ok_or_else(|| RenderError::ComponentNotRegistered(component.to_string()))?;

        let plan = match model {
            ComponentModel::Flat(cells) => {
                Plan::Flat(plan_flat(component, &definition.template, cells, labels)?)
            }
            ComponentModel::Grid(grid) => {
                self.plan_grid(component, &definition.template, grid, labels)?
            }
        };

        let host = doc.create_element(component);
        doc.set_binding(host, definition.binding());
        let shadow = doc.attach_shadow(host);
        definition.template.instantiate_into(doc, shadow);
        let bound = plan.apply(doc, host, shadow);

        doc.append_child(destination, host);
        log::debug!("projected {component} {host} with {bound} bound elements");
        Ok(host)
    }

    fn plan_grid<'a>(
        &'a self,
        component: &str,
        template: &Template,
        grid: &'a GridModel,
        labels: Option<&FieldLabels>,
    ) -> Result<Plan<'a>, RenderError> {
        let child_name = child_template_name(component);
        let child = self
            .templates
            .resolve(&child_name)
            .ok_or_else(|| RenderError::ChildTemplateNotFound {
                component: component.to_string(),
                child: child_name.clone(),
            })?;

        if template.find_marked(PARENT_ANCHOR).is_none() {
            return Err(RenderError::MissingAnchor {
                template: component.to_string(),
                attribute: PARENT_ANCHOR,
            });
        }
        let row = child
            .find_marked(CHILD_ANCHOR)
            .ok_or_else(|| RenderError::MissingAnchor {
                template: child_name.clone(),
                attribute: CHILD_ANCHOR,
            })?;

        let mut names = SlotNames::new(component);

        check_arity(component, RowRef::Parent, template.slots().len(), grid.parent.len(), false)?;
        let mut parent = Vec::with_capacity(grid.parent.len());
        for (i, cell) in grid.parent.iter().enumerate() {
            let name = labels
                .and_then(|l| l.parent(i))
                .map_or_else(|| i.to_string(), str::to_string);
            names.claim(&name)?;
            parent.push(Bound {
                name,
                slot: Some(i),
                cell,
            });
        }

        let row_slots = row.inner_slots().len();
        let mut rows = Vec::with_capacity(grid.child.len());
        for (j, cells) in grid.child.iter().enumerate() {
            check_arity(component, RowRef::Child(j), row_slots, cells.len(), true)?;
            let mut bound = Vec::with_capacity(cells.len());
            for (k, cell) in cells.iter().enumerate() {
                let name = labels
                    .and_then(|l| l.child(j, k))
                    .map_or_else(|| format!("{j}-{k}"), str::to_string);
                names.claim(&name)?;
                bound.push(Bound {
                    name,
                    slot: Some(k),
                    cell,
                });
            }
            rows.push(bound);
        }

        Ok(Plan::Grid { parent, row, rows })
    }
}

/// One cell and the slot it is bound under.
struct Bound<'a> {
    name: String,
    /// Position of the slot among the slots of its template or row. `None`
    /// leaves the element unassigned.
    slot: Option<usize>,
    cell: &'a Cell,
}

/// A checked projection, applied once nothing can fail any more.
enum Plan<'a> {
    Flat(Vec<Bound<'a>>),
    Grid {
        parent: Vec<Bound<'a>>,
        row: &'a TemplateNode,
        rows: Vec<Vec<Bound<'a>>>,
    },
}

impl Plan<'_> {
    /// Bind every cell into the freshly instantiated `shadow` of `host`.
    /// Returns the number of bound elements.
    fn apply(&self, doc: &mut Document, host: NodeId, shadow: NodeId) -> usize {
        let slots = doc.query_selector_all(shadow, Selector::Tag("slot"));
        match self {
            Plan::Flat(cells) => fill(doc, host, &slots, cells),
            Plan::Grid { parent, row, rows } => {
                let mut bound = fill(doc, host, &slots, parent);
                let Some(anchor) = doc.query_selector(shadow, Selector::Attribute(PARENT_ANCHOR))
                else {
                    return bound;
                };
                for cells in rows {
                    let copy = row.build(doc);
                    let slots = doc.query_selector_all(copy, Selector::Tag("slot"));
                    bound += fill(doc, host, &slots, cells);
                    doc.append_child(anchor, copy);
                }
                bound
            }
        }
    }
}

fn plan_flat<'a>(
    component: &str,
    template: &Template,
    cells: &'a [Cell],
    labels: Option<&FieldLabels>,
) -> Result<Vec<Bound<'a>>, RenderError> {
    let declared = template.slots();
    let mut unnamed = declared
        .iter()
        .enumerate()
        .filter(|(_, name)| name.is_none())
        .map(|(i, _)| i);
    let mut names = SlotNames::new(component);

    let mut bound = Vec::with_capacity(cells.len());
    for (i, cell) in cells.iter().enumerate() {
        let name = labels
            .and_then(|l| l.flat(i))
            .map_or_else(|| i.to_string(), str::to_string);
        names.claim(&name)?;
        let slot = declared
            .iter()
            .position(|existing| *existing == Some(name.as_str()))
            .or_else(|| unnamed.next());
        bound.push(Bound { name, slot, cell });
    }
    Ok(bound)
}

/// Name each cell's slot and append the element bound to it to `host`.
fn fill(doc: &mut Document, host: NodeId, slots: &[NodeId], cells: &[Bound<'_>]) -> usize {
    for bound in cells {
        if let Some(slot) = bound.slot.and_then(|i| slots.get(i)) {
            doc.set_attribute(*slot, "name", &bound.name);
        }
        let element = bind_slot(doc, &bound.name, bound.cell);
        doc.append_child(host, element);
    }
    cells.len()
}

/// Slot names already taken in one instance.
struct SlotNames<'c> {
    component: &'c str,
    taken: BTreeSet<String>,
}

impl<'c> SlotNames<'c> {
    fn new(component: &'c str) -> Self {
        Self {
            component,
            taken: BTreeSet::new(),
        }
    }

    fn claim(&mut self, name: &str) -> Result<(), RenderError> {
        if !self.taken.insert(name.to_string()) {
            return Err(RenderError::DuplicateSlot {
                component: self.component.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

/// Child rows must fill every slot; a parent row may leave trailing slots
/// to their fallback content.
fn check_arity(
    component: &str,
    row: RowRef,
    expected: usize,
    found: usize,
    exact: bool,
) -> Result<(), RenderError> {
    if found > expected || (exact && found != expected) {
        return Err(RenderError::ArityMismatch {
            component: component.to_string(),
            row,
            expected,
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{Template, TemplateNode};

    fn table_context() -> RenderContext {
        let mut templates = TemplateRegistry::new();
        templates.register(Template::new(
            "prices",
            vec![
                TemplateNode::element("h2").child(TemplateNode::slot()),
                TemplateNode::element("table").child(
                    TemplateNode::element("tbody").attr(PARENT_ANCHOR, ""),
                ),
            ],
        ));
        templates.register(Template::new(
            "prices-child",
            vec![TemplateNode::element("tr")
                .attr(CHILD_ANCHOR, "")
                .child(TemplateNode::element("td").child(TemplateNode::slot()))
                .child(TemplateNode::element("td").child(TemplateNode::slot()))],
        ));
        let mut ctx = RenderContext::new(templates);
        ctx.register_component("prices").unwrap();
        ctx
    }

    fn prices() -> ComponentModel {
        GridModel::new(
            vec!["Prices".into()],
            vec![vec!["SPX".into(), "4384".into()], vec!["NDX".into(), "14733".into()]],
        )
        .into()
    }

    #[test]
    fn grid_rows_are_appended_to_parent_anchor() {
        let ctx = table_context();
        let mut doc = Document::new();
        let body = doc.body();
        let host = ctx.project(&mut doc, "prices", body, &prices(), None).unwrap();

        let shadow = doc.shadow_root(host).unwrap();
        let tbody = doc.query_selector(shadow, Selector::Tag("tbody")).unwrap();
        assert_eq!(doc.children(tbody).len(), 2);

        let names: Vec<&str> = doc
            .query_selector_all(shadow, Selector::Tag("slot"))
            .into_iter()
            .filter_map(|slot| doc.attribute(slot, "name"))
            .collect();
        assert_eq!(names, ["0", "0-0", "0-1", "1-0", "1-1"]);
        assert_eq!(doc.children(host).len(), 5);
    }

    #[test]
    fn labels_name_slots() {
        let ctx = table_context();
        let mut doc = Document::new();
        let body = doc.body();
        let labels = FieldLabels::Grid {
            parent: vec!["title".into()],
            child: vec![vec!["symbol".into(), String::new()]],
        };
        let host = ctx
            .project(&mut doc, "prices", body, &prices(), Some(&labels))
            .unwrap();
        let names: Vec<&str> = doc
            .children(host)
            .iter()
            .filter_map(|el| doc.attribute(*el, "slot"))
            .collect();
        assert_eq!(names, ["title", "symbol", "0-1", "1-0", "1-1"]);
    }

    #[test]
    fn short_child_row_is_shape_error() {
        let ctx = table_context();
        let mut doc = Document::new();
        let body = doc.body();
        let model = GridModel::new(vec![], vec![vec!["SPX".into()]]).into();
        let err = ctx
            .project(&mut doc, "prices", body, &model, None)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::ArityMismatch {
                row: RowRef::Child(0),
                expected: 2,
                found: 1,
                ..
            }
        ));
        assert!(doc.children(body).is_empty());
    }

    #[test]
    fn flat_model_may_leave_trailing_slots_empty() {
        let ctx = table_context();
        let mut doc = Document::new();
        let body = doc.body();
        let host = ctx
            .project(&mut doc, "prices", body, &ComponentModel::flat(Vec::<Cell>::new()), None)
            .unwrap();
        assert!(doc.children(host).is_empty());
    }

    fn card_context() -> RenderContext {
        let mut templates = TemplateRegistry::new();
        templates.register(Template::new(
            "card",
            vec![
                TemplateNode::element("h1").child(TemplateNode::slot().attr("name", "title")),
                TemplateNode::element("p").child(TemplateNode::slot().attr("name", "body")),
                TemplateNode::element("footer").child(TemplateNode::slot()),
            ],
        ));
        let mut ctx = RenderContext::new(templates);
        ctx.register_component("card").unwrap();
        ctx
    }

    #[test]
    fn flat_cells_bind_to_declared_slot_names() {
        let ctx = card_context();
        let mut doc = Document::new();
        let body = doc.body();
        let labels = FieldLabels::Flat(vec!["body".into(), "title".into()]);
        let model = ComponentModel::flat(["BODY TEXT", "TITLE TEXT"]);
        let host = ctx.project(&mut doc, "card", body, &model, Some(&labels)).unwrap();

        let shadow = doc.shadow_root(host).unwrap();
        let h1 = doc.query_selector(shadow, Selector::Tag("h1")).unwrap();
        let title = doc.query_selector(h1, Selector::Tag("slot")).unwrap();
        assert_eq!(doc.attribute(title, "name"), Some("title"));
        let element = doc.assigned_element(title).unwrap();
        assert_eq!(doc.text_content(element), "TITLE TEXT");

        let footer = doc.query_selector(shadow, Selector::Tag("footer")).unwrap();
        let spare = doc.query_selector(footer, Selector::Tag("slot")).unwrap();
        assert_eq!(doc.attribute(spare, "name"), None);
    }

    #[test]
    fn undeclared_flat_names_take_the_next_unnamed_slot() {
        let ctx = card_context();
        let mut doc = Document::new();
        let body = doc.body();
        let labels = FieldLabels::Flat(vec!["title".into(), "signature".into()]);
        let model = ComponentModel::flat(["Hello", "Sam", "extra"]);
        let host = ctx.project(&mut doc, "card", body, &model, Some(&labels)).unwrap();

        let shadow = doc.shadow_root(host).unwrap();
        let names: Vec<&str> = doc
            .query_selector_all(shadow, Selector::Tag("slot"))
            .into_iter()
            .filter_map(|slot| doc.attribute(slot, "name"))
            .collect();
        assert_eq!(names, ["title", "body", "signature"]);

        // The third cell finds no slot and stays unassigned on the host.
        assert_eq!(doc.children(host).len(), 3);
        let extra = doc.children(host)[2];
        assert_eq!(doc.attribute(extra, "slot"), Some("2"));
        let placed: Vec<NodeId> = doc
            .query_selector_all(shadow, Selector::Tag("slot"))
            .into_iter()
            .filter_map(|slot| doc.assigned_element(slot))
            .collect();
        assert!(!placed.contains(&extra));
    }

    #[test]
    fn colliding_labels_are_shape_errors() {
        let ctx = table_context();
        let mut doc = Document::new();
        let body = doc.body();
        let nodes = doc.node_count();
        let labels = FieldLabels::Grid {
            parent: vec![],
            child: vec![vec!["0".into()]],
        };
        let err = ctx
            .project(&mut doc, "prices", body, &prices(), Some(&labels))
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::DuplicateSlot { ref name, .. } if name == "0"
        ));
        assert_eq!(err.kind(), crate::ErrorKind::Shape);
        assert_eq!(doc.node_count(), nodes);

        let ctx = card_context();
        let labels = FieldLabels::Flat(vec!["1".into()]);
        let err = ctx
            .project(&mut doc, "card", body, &ComponentModel::flat(["a", "b"]), Some(&labels))
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::DuplicateSlot { ref name, .. } if name == "1"
        ));
        assert!(doc.children(body).is_empty());
    }

    #[test]
    fn grid_rows_allocate_no_scratch_nodes() {
        let ctx = table_context();
        let mut doc = Document::new();
        let body = doc.body();
        let before = doc.node_count();
        ctx.project(&mut doc, "prices", body, &prices(), None).unwrap();

        // host + shadow, h2/slot + table/tbody, two rows of tr/td/slot/td/slot,
        // five bound elements with one text node each.
        assert_eq!(doc.node_count() - before, 2 + 4 + 2 * 5 + 5 * 2);
    }

    #[test]
    fn unregistered_component_is_lookup_error() {
        let ctx = table_context();
        let mut doc = Document::new();
        let body = doc.body();
        let err = ctx
            .project(&mut doc, "prices-child", body, &prices(), None)
            .unwrap_err();
        assert!(matches!(err, RenderError::ComponentNotRegistered(_)));
    }

    #[test]
    fn missing_parent_anchor_is_configuration_error() {
        let mut templates = TemplateRegistry::new();
        templates.register(Template::new("plain", vec![TemplateNode::slot()]));
        templates.register(Template::new(
            "plain-child",
            vec![TemplateNode::element("tr").attr(CHILD_ANCHOR, "")],
        ));
        let mut ctx = RenderContext::new(templates);
        ctx.register_component("plain").unwrap();

        let mut doc = Document::new();
        let body = doc.body();
        let model = GridModel::new(vec![], vec![]).into();
        let err = ctx.project(&mut doc, "plain", body, &model, None).unwrap_err();
        assert!(matches!(
            err,
            RenderError::MissingAnchor {
                attribute: PARENT_ANCHOR,
                ..
            }
        ));
    }
}
