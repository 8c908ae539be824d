//! Rule groups of the UI reaction engine.
//!
//! Each group binds independently against the document and owns its own
//! state. Groups never read one another's state; the engine routes events to
//! every bound group and merges their [`Reaction`](crate::events::Reaction)s.

pub mod counter;
pub mod expand;
pub mod filter;
pub mod form;
pub mod menu;
pub mod modal;
pub mod reveal;
pub mod scroll;
pub mod theme;

use crate::dom::{Document, NodeId};
use crate::error::{FolioError, FolioResult};

/// Resolve a required element by id
pub(crate) fn require_id<D: Document + ?Sized>(doc: &D, id: &str) -> FolioResult<NodeId> {
    doc.element_by_id(id)
        .ok_or_else(|| FolioError::missing(format!("#{}", id)))
}

/// Add or remove `class` so its presence equals `on`
pub(crate) fn set_class<D: Document + ?Sized>(doc: &mut D, node: NodeId, class: &str, on: bool) {
    if on {
        doc.add_class(node, class);
    } else {
        doc.remove_class(node, class);
    }
}
