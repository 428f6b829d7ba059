//! Collaborator interfaces between the engine and the diagram model.
//!
//! The engine never owns the diagram elements. It reads them through a
//! [`ModelAccessor`] and learns about edits through [`Notification`]s, which are
//! the only triggers for cache invalidation.
//!
//! [`SequenceModel`] is an in-memory implementation of the accessor used when
//! no external model is plugged in, and by the test suites.

mod store;

pub use store::{ElementSpec, SequenceModel};

use std::fmt;

use cadence_core::{event::EventKind, geometry::Bounds, identifier::Id};

/// Read access to the element hierarchy of one diagram.
///
/// Geometry is reported in absolute diagram coordinates. Implementations must
/// answer consistently for the duration of a query; mutating the model while a
/// query runs on another thread is the implementation's own responsibility.
pub trait ModelAccessor: Send + Sync {
    /// Identity of the diagram root. The root has no kind and no geometry.
    fn root(&self) -> Id;

    /// Kind of an element, `None` if the model does not know it.
    fn kind(&self, id: Id) -> Option<EventKind>;

    /// Absolute bounds of an element.
    fn geometry(&self, id: Id) -> Option<Bounds>;

    /// Ordered children of an element or of the root.
    fn children(&self, id: Id) -> Vec<Id>;

    /// Hierarchical parent; the root for top-level elements, `None` when the
    /// element is detached.
    fn parent(&self, id: Id) -> Option<Id>;

    /// Semantic object represented by the element, `None` for decorations.
    fn semantic_target(&self, id: Id) -> Option<Id>;

    /// Monotonic creation stamp, unique per element.
    fn creation_order(&self, id: Id) -> u64;

    /// `(source, target)` endpoints of a message.
    fn edge_ends(&self, id: Id) -> Option<(Id, Id)>;
}

/// Edit notifications understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    ElementAdded(Id),
    ElementRemoved(Id),
    ElementReparented(Id),
    /// Position or size of the element changed; hierarchy untouched.
    RangeChanged(Id),
}

impl Notification {
    /// The element the notification is about.
    pub fn element(&self) -> Id {
        match self {
            Notification::ElementAdded(id)
            | Notification::ElementRemoved(id)
            | Notification::ElementReparented(id)
            | Notification::RangeChanged(id) => *id,
        }
    }

    /// Whether the hierarchy itself changed.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Notification::RangeChanged(_))
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::ElementAdded(id) => write!(f, "added {id}"),
            Notification::ElementRemoved(id) => write!(f, "removed {id}"),
            Notification::ElementReparented(id) => write!(f, "reparented {id}"),
            Notification::RangeChanged(id) => write!(f, "range changed {id}"),
        }
    }
}
