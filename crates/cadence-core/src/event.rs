//! Sequence diagram element kinds and event records.
//!
//! The element hierarchy of a sequence diagram is represented as a closed set of
//! kinds ([`EventKind`]) over one shared record shape ([`SequenceEvent`]).
//! Behaviour that differs per kind is expressed through pattern matching on the
//! kind rather than through a type hierarchy.
//!
//! # Hierarchy
//!
//! ```text
//! Diagram (root)
//!  ├─ InstanceRole
//!  │   └─ Lifeline
//!  │       ├─ Execution / State (nested arbitrarily)
//!  │       └─ EndOfLife
//!  ├─ CombinedFragment
//!  │   └─ Operand
//!  ├─ InteractionUse
//!  ├─ ObservationPoint
//!  ├─ LostMessageEnd
//!  └─ Message (edge between two endpoints)
//! ```

use std::fmt;

use crate::{
    geometry::{Bounds, Range},
    identifier::Id,
};

/// The kind of a sequence diagram element.
///
/// The abstract families of the sequence metamodel are exposed as predicates:
/// [`EventKind::is_node_event`] for executions and states, and
/// [`EventKind::is_frame`] for combined fragments and interaction uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Header box of a participant; not positioned on the time axis.
    InstanceRole,
    /// Vertical life span of a participant.
    Lifeline,
    /// Message between two endpoints.
    Message,
    /// Execution occurrence on a lifeline.
    Execution,
    /// State invariant on a lifeline.
    State,
    /// Combined fragment frame (alt, loop, opt, ...).
    CombinedFragment,
    /// Reference to another interaction.
    InteractionUse,
    /// Section of a combined fragment.
    Operand,
    /// Punctual observation marker.
    ObservationPoint,
    /// Free end of a lost or found message.
    LostMessageEnd,
    /// Destruction marker terminating a lifeline.
    EndOfLife,
}

impl EventKind {
    /// All kinds, in declaration order.
    pub const ALL: [EventKind; 11] = [
        EventKind::InstanceRole,
        EventKind::Lifeline,
        EventKind::Message,
        EventKind::Execution,
        EventKind::State,
        EventKind::CombinedFragment,
        EventKind::InteractionUse,
        EventKind::Operand,
        EventKind::ObservationPoint,
        EventKind::LostMessageEnd,
        EventKind::EndOfLife,
    ];

    /// Executions and states: node events hosted on a lifeline.
    pub fn is_node_event(self) -> bool {
        matches!(self, EventKind::Execution | EventKind::State)
    }

    /// Combined fragments and interaction uses.
    pub fn is_frame(self) -> bool {
        matches!(self, EventKind::CombinedFragment | EventKind::InteractionUse)
    }

    /// Kinds that take part in the diagram timeline.
    ///
    /// Everything except lifelines and instance roles, which span the whole
    /// diagram rather than delimiting a moment of it.
    pub fn is_delimited(self) -> bool {
        !matches!(self, EventKind::Lifeline | EventKind::InstanceRole)
    }

    /// Kinds that can host other events and therefore act as a parent event:
    /// lifelines, node events, operands and frames.
    pub fn is_container_event(self) -> bool {
        matches!(self, EventKind::Lifeline | EventKind::Operand)
            || self.is_node_event()
            || self.is_frame()
    }
}

impl From<EventKind> for &'static str {
    fn from(val: EventKind) -> Self {
        match val {
            EventKind::InstanceRole => "instance_role",
            EventKind::Lifeline => "lifeline",
            EventKind::Message => "message",
            EventKind::Execution => "execution",
            EventKind::State => "state",
            EventKind::CombinedFragment => "combined_fragment",
            EventKind::InteractionUse => "interaction_use",
            EventKind::Operand => "operand",
            EventKind::ObservationPoint => "observation_point",
            EventKind::LostMessageEnd => "lost_message_end",
            EventKind::EndOfLife => "end_of_life",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Snapshot of one diagram element as seen by the ordering engine.
///
/// A `SequenceEvent` is a read-only copy: mutating the model afterwards does not
/// change it. `range` is derived from `bounds`; for messages it spans the
/// vertical distance between the two anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceEvent {
    id: Id,
    kind: EventKind,
    bounds: Bounds,
    range: Range,
    parent: Option<Id>,
    children: Vec<Id>,
    semantic_target: Option<Id>,
    creation_order: u64,
}

impl SequenceEvent {
    /// Create a new event record.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Id,
        kind: EventKind,
        bounds: Bounds,
        range: Range,
        parent: Option<Id>,
        children: Vec<Id>,
        semantic_target: Option<Id>,
        creation_order: u64,
    ) -> Self {
        Self {
            id,
            kind,
            bounds,
            range,
            parent,
            children,
            semantic_target,
            creation_order,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Absolute bounds of the element.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Vertical range of the element.
    pub fn range(&self) -> Range {
        self.range
    }

    /// Hierarchical parent, `None` for elements directly under the root.
    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    /// Ordered children of the element.
    pub fn children(&self) -> &[Id] {
        &self.children
    }

    /// Semantic object represented by the element, absent for decorative
    /// elements.
    pub fn semantic_target(&self) -> Option<Id> {
        self.semantic_target
    }

    /// Monotonic creation stamp used as the last ordering tie-break.
    pub fn creation_order(&self) -> u64 {
        self.creation_order
    }
}

impl fmt::Display for SequenceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind, self.id, self.range)
    }
}
