use tradeboard_core::Cell;

use crate::dom::{Document, NodeId};

/// Element wrapping plain-text cells.
pub const DEFAULT_ELEMENT: &str = "data";

/// Build the detached element that fills the slot called `name`.
///
/// A rich cell names its own tag and attributes; plain text is wrapped in a
/// [`DEFAULT_ELEMENT`]. The `slot` attribute always comes first. Attribute
/// values are taken as-is: a rich cell attribute called `slot` overrides the
/// assigned name and the element will not be placed.
pub fn bind_slot(doc: &mut Document, name: &str, cell: &Cell) -> NodeId {
    let element = match cell {
        Cell::Text(_) => doc.create_element(DEFAULT_ELEMENT),
        Cell::Rich(rich) => doc.create_element(&rich.element),
    };
    doc.set_attribute(element, "slot", name);
    if let Cell::Rich(rich) = cell {
        for (key, value) in rich.attributes.iter() {
            doc.set_attribute(element, key, value);
        }
    }

    let value = cell.value();
    if !value.is_empty() {
        let text = doc.create_text(value);
        doc.append_child(element, text);
    }
    element
}
