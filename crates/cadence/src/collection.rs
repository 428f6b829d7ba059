//! Per-kind collections of the diagram aggregator.

use std::fmt;

use cadence_core::event::EventKind;

/// A family of elements the diagram can enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    InstanceRoles,
    Lifelines,
    Messages,
    Executions,
    States,
    /// Executions and states together.
    AbstractNodeEvents,
    /// Combined fragments and interaction uses.
    Frames,
    CombinedFragments,
    InteractionUses,
    Operands,
    ObservationPoints,
    LostMessageEnds,
    EndOfLifes,
    /// Every element with a meaningful vertical range.
    DelimitedEvents,
}

/// Where discovery looks for the members of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    /// Direct children of the root.
    TopLevel,
    /// The whole hierarchy below the root.
    Anywhere,
    /// Children of the instance roles.
    InstanceRoleChildren,
    /// Children of the lifelines.
    LifelineChildren,
}

impl Collection {
    pub const ALL: [Collection; 14] = [
        Collection::InstanceRoles,
        Collection::Lifelines,
        Collection::Messages,
        Collection::Executions,
        Collection::States,
        Collection::AbstractNodeEvents,
        Collection::Frames,
        Collection::CombinedFragments,
        Collection::InteractionUses,
        Collection::Operands,
        Collection::ObservationPoints,
        Collection::LostMessageEnds,
        Collection::EndOfLifes,
        Collection::DelimitedEvents,
    ];

    /// Whether an element of `kind` belongs to this collection.
    pub fn contains_kind(self, kind: EventKind) -> bool {
        match self {
            Collection::InstanceRoles => kind == EventKind::InstanceRole,
            Collection::Lifelines => kind == EventKind::Lifeline,
            Collection::Messages => kind == EventKind::Message,
            Collection::Executions => kind == EventKind::Execution,
            Collection::States => kind == EventKind::State,
            Collection::AbstractNodeEvents => kind.is_node_event(),
            Collection::Frames => kind.is_frame(),
            Collection::CombinedFragments => kind == EventKind::CombinedFragment,
            Collection::InteractionUses => kind == EventKind::InteractionUse,
            Collection::Operands => kind == EventKind::Operand,
            Collection::ObservationPoints => kind == EventKind::ObservationPoint,
            Collection::LostMessageEnds => kind == EventKind::LostMessageEnd,
            Collection::EndOfLifes => kind == EventKind::EndOfLife,
            Collection::DelimitedEvents => kind.is_delimited(),
        }
    }

    pub(crate) fn scope(self) -> Scope {
        match self {
            Collection::InstanceRoles
            | Collection::Frames
            | Collection::CombinedFragments
            | Collection::InteractionUses
            | Collection::ObservationPoints
            | Collection::LostMessageEnds => Scope::TopLevel,
            Collection::Lifelines => Scope::InstanceRoleChildren,
            Collection::EndOfLifes => Scope::LifelineChildren,
            Collection::Messages
            | Collection::Executions
            | Collection::States
            | Collection::AbstractNodeEvents
            | Collection::Operands
            | Collection::DelimitedEvents => Scope::Anywhere,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collection::InstanceRoles => "instance_roles",
            Collection::Lifelines => "lifelines",
            Collection::Messages => "messages",
            Collection::Executions => "executions",
            Collection::States => "states",
            Collection::AbstractNodeEvents => "abstract_node_events",
            Collection::Frames => "frames",
            Collection::CombinedFragments => "combined_fragments",
            Collection::InteractionUses => "interaction_uses",
            Collection::Operands => "operands",
            Collection::ObservationPoints => "observation_points",
            Collection::LostMessageEnds => "lost_message_ends",
            Collection::EndOfLifes => "end_of_lifes",
            Collection::DelimitedEvents => "delimited_events",
        };
        write!(f, "{name}")
    }
}
