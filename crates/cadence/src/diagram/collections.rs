//! Per-kind collections and the ordered timeline.

use std::sync::Arc;

use indexmap::IndexSet;
use log::{debug, trace};

use cadence_core::{geometry::Bounds, identifier::Id};

use super::SequenceDiagram;
use crate::{
    cache::{EventSet, IdList},
    collection::{Collection, Scope},
    model::ModelAccessor,
};

impl<M: ModelAccessor> SequenceDiagram<M> {
    /// Members of `collection` sorted by [`crate::OrderKey`], without
    /// duplicates.
    pub fn collection(&self, collection: Collection) -> EventSet {
        let caches = self.caches();
        caches
            .ordered()
            .get_or_compute(caches.collection_tier(), collection, || {
                let mut ids = self.discover(collection).to_vec();
                caches.record_sort();
                self.range_index().sort(&mut ids);
                trace!(collection:%, count = ids.len(); "Sorted collection");
                Arc::new(ids.into_iter().collect::<IndexSet<_>>())
            })
    }

    pub fn all_instance_roles(&self) -> EventSet {
        self.collection(Collection::InstanceRoles)
    }

    pub fn all_lifelines(&self) -> EventSet {
        self.collection(Collection::Lifelines)
    }

    pub fn all_messages(&self) -> EventSet {
        self.collection(Collection::Messages)
    }

    pub fn all_executions(&self) -> EventSet {
        self.collection(Collection::Executions)
    }

    pub fn all_states(&self) -> EventSet {
        self.collection(Collection::States)
    }

    /// Executions and states.
    pub fn all_abstract_node_events(&self) -> EventSet {
        self.collection(Collection::AbstractNodeEvents)
    }

    /// Combined fragments and interaction uses.
    pub fn all_frames(&self) -> EventSet {
        self.collection(Collection::Frames)
    }

    pub fn all_combined_fragments(&self) -> EventSet {
        self.collection(Collection::CombinedFragments)
    }

    pub fn all_interaction_uses(&self) -> EventSet {
        self.collection(Collection::InteractionUses)
    }

    pub fn all_operands(&self) -> EventSet {
        self.collection(Collection::Operands)
    }

    pub fn all_observation_points(&self) -> EventSet {
        self.collection(Collection::ObservationPoints)
    }

    pub fn all_lost_message_ends(&self) -> EventSet {
        self.collection(Collection::LostMessageEnds)
    }

    pub fn all_end_of_lifes(&self) -> EventSet {
        self.collection(Collection::EndOfLifes)
    }

    /// The whole timeline: every element with a meaningful vertical range, in
    /// the total order of the diagram.
    pub fn all_ordered_delimited_sequence_events(&self) -> EventSet {
        self.collection(Collection::DelimitedEvents)
    }

    /// Instance roles from left to right. Roles sharing an x coordinate keep
    /// their timeline order.
    pub fn sorted_instance_roles(&self) -> Vec<Id> {
        let mut roles: Vec<Id> = self.all_instance_roles().iter().copied().collect();
        roles.sort_by(|a, b| {
            let x = |id: &Id| self.model().geometry(*id).map_or(f32::MAX, Bounds::min_x);
            x(a).total_cmp(&x(b))
        });
        roles
    }

    /// Lifelines whose bounds intersect `area` and whose vertical range covers
    /// the top of `area`, in timeline order.
    pub fn graphically_covered_lifelines(&self, area: Bounds) -> Vec<Id> {
        let index = self.range_index();
        self.all_lifelines()
            .iter()
            .copied()
            .filter(|lifeline| {
                let Some(bounds) = self.model().geometry(*lifeline) else {
                    return false;
                };
                bounds.intersects(&area)
                    && index
                        .raw_range(*lifeline)
                        .is_ok_and(|range| range.includes(area.min_y()))
            })
            .collect()
    }

    /// Unsorted members of `collection`, memoized separately from the ordered
    /// view so that a vertical move does not require walking the model again.
    pub(crate) fn discover(&self, collection: Collection) -> IdList {
        let caches = self.caches();
        caches
            .discovered()
            .get_or_compute(caches.collection_tier(), collection, || {
                caches.record_discovery();
                let ids = self.walk(collection);
                debug!(collection:%, count = ids.len(); "Discovered collection");
                Arc::from(ids)
            })
    }

    fn walk(&self, collection: Collection) -> Vec<Id> {
        let model = self.model();
        let keep = |id: &Id| {
            model
                .kind(*id)
                .is_some_and(|kind| collection.contains_kind(kind))
        };

        match collection.scope() {
            Scope::TopLevel => model.children(model.root()).into_iter().filter(keep).collect(),
            Scope::Anywhere => self.descendants(model.root()).into_iter().filter(keep).collect(),
            Scope::InstanceRoleChildren => self
                .discover(Collection::InstanceRoles)
                .iter()
                .flat_map(|role| model.children(*role))
                .filter(keep)
                .collect(),
            Scope::LifelineChildren => self
                .discover(Collection::Lifelines)
                .iter()
                .flat_map(|lifeline| model.children(*lifeline))
                .filter(keep)
                .collect(),
        }
    }

    /// Every element below `id`, depth first, parents before children.
    fn descendants(&self, id: Id) -> Vec<Id> {
        let model = self.model();
        let mut found = IndexSet::new();
        let mut stack: Vec<Id> = model.children(id).into_iter().rev().collect();

        while let Some(current) = stack.pop() {
            if found.insert(current) {
                stack.extend(model.children(current).into_iter().rev());
            }
        }
        found.into_iter().collect()
    }
}
