//! Semantic ordering of event starts and finishes.
//!
//! The graphical ordering is the ground truth for "what happens before what" in
//! a sequence diagram. It is a flat list of [`EventEnd`]s maintained by the
//! owning model, independent of where the elements are currently drawn. Pixel
//! positions may temporarily disagree with it while the user drags things
//! around; this list does not.
//!
//! # Example
//!
//! ```
//! # use cadence_core::identifier::Id;
//! # use cadence_core::ordering::{
//! #     EndKind, EventEnd, GraphicalOrdering, GraphicalOrderingProvider, SingleEventEnd,
//! # };
//! let call = Id::new("sem_call");
//! let exec = Id::new("sem_exec");
//!
//! let ordering = GraphicalOrdering::new(vec![
//!     EventEnd::Single(SingleEventEnd::new(Id::new("send"), call, EndKind::Start)),
//!     EventEnd::compound(
//!         Id::new("receive"),
//!         vec![
//!             SingleEventEnd::new(Id::new("receive_msg"), call, EndKind::Finish),
//!             SingleEventEnd::new(Id::new("exec_start"), exec, EndKind::Start),
//!         ],
//!     ),
//! ]);
//!
//! let ends = ordering.event_ends();
//! assert_eq!(ends.iter().filter(|end| end.involves(call)).count(), 2);
//! assert_eq!(ends.iter().filter(|end| end.involves(exec)).count(), 1);
//! ```

use std::fmt;

use crate::identifier::Id;

/// Whether an end opens or closes its semantic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndKind {
    Start,
    Finish,
}

impl fmt::Display for EndKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndKind::Start => write!(f, "start"),
            EndKind::Finish => write!(f, "finish"),
        }
    }
}

/// One end of exactly one semantic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SingleEventEnd {
    semantic_end: Id,
    semantic_event: Id,
    kind: EndKind,
}

impl SingleEventEnd {
    /// Create an end of `semantic_event` identified by `semantic_end`.
    pub fn new(semantic_end: Id, semantic_event: Id, kind: EndKind) -> Self {
        Self {
            semantic_end,
            semantic_event,
            kind,
        }
    }

    /// Identity of the end itself.
    pub fn semantic_end(&self) -> Id {
        self.semantic_end
    }

    /// Semantic event this end belongs to.
    pub fn semantic_event(&self) -> Id {
        self.semantic_event
    }

    pub fn kind(&self) -> EndKind {
        self.kind
    }
}

/// An entry of the graphical ordering.
///
/// A compound end groups single ends that happen at the same logical instant.
/// The typical case is a synchronous call: the reception of the message and the
/// start of the execution it triggers share one compound end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventEnd {
    Single(SingleEventEnd),
    Compound {
        semantic_end: Id,
        ends: Vec<SingleEventEnd>,
    },
}

impl EventEnd {
    /// Convenience constructor for [`EventEnd::Compound`].
    pub fn compound(semantic_end: Id, ends: Vec<SingleEventEnd>) -> Self {
        Self::Compound { semantic_end, ends }
    }

    /// Identity of this entry.
    pub fn semantic_end(&self) -> Id {
        match self {
            EventEnd::Single(single) => single.semantic_end(),
            EventEnd::Compound { semantic_end, .. } => *semantic_end,
        }
    }

    /// The single ends carried by this entry; one for a single end.
    pub fn single_ends(&self) -> &[SingleEventEnd] {
        match self {
            EventEnd::Single(single) => std::slice::from_ref(single),
            EventEnd::Compound { ends, .. } => ends,
        }
    }

    /// Semantic events touched by this entry, in declaration order.
    pub fn semantic_events(&self) -> impl Iterator<Item = Id> + '_ {
        self.single_ends().iter().map(SingleEventEnd::semantic_event)
    }

    /// Checks whether this entry is an end of `semantic_event`.
    pub fn involves(&self, semantic_event: Id) -> bool {
        self.semantic_events().any(|event| event == semantic_event)
    }

    /// Returns the kind of the end this entry carries for `semantic_event`.
    pub fn kind_for(&self, semantic_event: Id) -> Option<EndKind> {
        self.single_ends()
            .iter()
            .find(|end| end.semantic_event() == semantic_event)
            .map(SingleEventEnd::kind)
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, EventEnd::Compound { .. })
    }
}

/// Source of the event-end sequence of a diagram.
///
/// The engine only reads from the provider; keeping the sequence consistent with
/// the model is the provider's business.
pub trait GraphicalOrderingProvider: Send + Sync {
    /// The ordered event ends of the diagram.
    fn event_ends(&self) -> Vec<EventEnd>;
}

/// In-memory graphical ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphicalOrdering {
    ends: Vec<EventEnd>,
}

impl GraphicalOrdering {
    /// Create an ordering from its entries, first to last.
    pub fn new(ends: Vec<EventEnd>) -> Self {
        Self { ends }
    }

    /// Borrow the entries in order.
    pub fn ends(&self) -> &[EventEnd] {
        &self.ends
    }
}

impl GraphicalOrderingProvider for GraphicalOrdering {
    fn event_ends(&self) -> Vec<EventEnd> {
        self.ends().to_vec()
    }
}
