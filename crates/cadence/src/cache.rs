//! Memoization for one diagram session.
//!
//! The store is owned by the diagram it serves; nothing is shared between
//! sessions. It holds three groups of memos, each behind its own toggle:
//!
//! - collections: per-kind discovery results and their ordered counterparts;
//! - structural tier: relations that only depend on the hierarchy;
//! - range tier: relations that depend on vertical positions.
//!
//! Disabling a group clears it and turns every lookup into a recomputation.

mod memo;

pub(crate) use memo::{Memo, Tier};

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use indexmap::IndexSet;
use log::debug;

use cadence_core::{event::EventKind, geometry::Range, identifier::Id};

use crate::{collection::Collection, config::CacheConfig, model::Notification};

/// Shared immutable list of element ids.
pub type IdList = Arc<[Id]>;

/// Shared ordered set of element ids, sorted by [`crate::OrderKey`].
pub type EventSet = Arc<IndexSet<Id>>;

/// Snapshot of the cache counters of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    discovery_traversals: usize,
    sort_passes: usize,
    structural_generation: u64,
    range_generation: u64,
    collection_generation: u64,
}

impl CacheStats {
    /// Number of discovery walks performed over the model.
    pub fn discovery_traversals(&self) -> usize {
        self.discovery_traversals
    }

    /// Number of times a discovered collection was sorted.
    pub fn sort_passes(&self) -> usize {
        self.sort_passes
    }

    pub fn structural_generation(&self) -> u64 {
        self.structural_generation
    }

    pub fn range_generation(&self) -> u64 {
        self.range_generation
    }

    pub fn collection_generation(&self) -> u64 {
        self.collection_generation
    }
}

#[derive(Debug, Default)]
pub(crate) struct CacheStore {
    collections: Tier,
    structural: Tier,
    range: Tier,

    discovered: Memo<Collection, IdList>,
    ordered: Memo<Collection, EventSet>,

    coverage: Memo<Id, IdList>,
    start_compound_message: Memo<Id, Option<Id>>,
    end_compound_message: Memo<Id, Option<Id>>,
    hierarchical_parent: Memo<Id, Option<Id>>,

    ranges: Memo<Id, Range>,
    sub_events: Memo<Id, IdList>,
    parent_event: Memo<Id, Option<Id>>,
    parent_operand: Memo<Id, Option<Id>>,

    discovery_traversals: AtomicUsize,
    sort_passes: AtomicUsize,
}

impl CacheStore {
    pub(crate) fn new(config: CacheConfig) -> Self {
        Self {
            collections: Tier::new(config.collections()),
            structural: Tier::new(config.structural()),
            range: Tier::new(config.range()),
            ..Self::default()
        }
    }

    pub(crate) fn collection_tier(&self) -> &Tier {
        &self.collections
    }

    pub(crate) fn structural_tier(&self) -> &Tier {
        &self.structural
    }

    pub(crate) fn range_tier(&self) -> &Tier {
        &self.range
    }

    pub(crate) fn discovered(&self) -> &Memo<Collection, IdList> {
        &self.discovered
    }

    pub(crate) fn ordered(&self) -> &Memo<Collection, EventSet> {
        &self.ordered
    }

    pub(crate) fn coverage(&self) -> &Memo<Id, IdList> {
        &self.coverage
    }

    pub(crate) fn start_compound_message(&self) -> &Memo<Id, Option<Id>> {
        &self.start_compound_message
    }

    pub(crate) fn end_compound_message(&self) -> &Memo<Id, Option<Id>> {
        &self.end_compound_message
    }

    pub(crate) fn hierarchical_parent(&self) -> &Memo<Id, Option<Id>> {
        &self.hierarchical_parent
    }

    pub(crate) fn ranges(&self) -> &Memo<Id, Range> {
        &self.ranges
    }

    pub(crate) fn sub_events(&self) -> &Memo<Id, IdList> {
        &self.sub_events
    }

    pub(crate) fn parent_event(&self) -> &Memo<Id, Option<Id>> {
        &self.parent_event
    }

    pub(crate) fn parent_operand(&self) -> &Memo<Id, Option<Id>> {
        &self.parent_operand
    }

    pub(crate) fn record_discovery(&self) {
        self.discovery_traversals.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sort(&self) {
        self.sort_passes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            discovery_traversals: self.discovery_traversals.load(Ordering::Relaxed),
            sort_passes: self.sort_passes.load(Ordering::Relaxed),
            structural_generation: self.structural.generation(),
            range_generation: self.range.generation(),
            collection_generation: self.collections.generation(),
        }
    }

    /// Toggle the collection caches. Any toggle drops their contents.
    pub(crate) fn set_collections_enabled(&self, enabled: bool) {
        let previous = self.collections.set_enabled(enabled);
        debug!(previous, enabled; "Collection caches toggled");
        self.clear_collections();
    }

    pub(crate) fn set_structural_enabled(&self, enabled: bool) {
        if self.structural.set_enabled(enabled) != enabled {
            debug!(enabled; "Structural cache toggled");
            self.clear_structural();
        }
    }

    pub(crate) fn set_range_enabled(&self, enabled: bool) {
        if self.range.set_enabled(enabled) != enabled {
            debug!(enabled; "Range cache toggled");
            self.clear_range();
        }
    }

    pub(crate) fn clear_all(&self) {
        self.clear_collections();
        self.clear_structural();
        self.clear_range();
    }

    pub(crate) fn clear_collections(&self) {
        self.collections.bump();
        self.discovered.clear();
        self.ordered.clear();
    }

    /// Drop the sorted collections only, keeping discovery results.
    pub(crate) fn clear_ordered(&self) {
        self.collections.bump();
        self.ordered.clear();
    }

    pub(crate) fn clear_structural(&self) {
        self.structural.bump();
        self.coverage.clear();
        self.start_compound_message.clear();
        self.end_compound_message.clear();
        self.hierarchical_parent.clear();
    }

    pub(crate) fn clear_range(&self) {
        self.range.bump();
        self.ranges.clear();
        self.sub_events.clear();
        self.parent_event.clear();
        self.parent_operand.clear();
    }

    /// Invalidate whatever `notification` may have made stale.
    ///
    /// `kind` is the kind of the element the notification is about, when the
    /// model still knows it.
    pub(crate) fn invalidate(&self, notification: Notification, kind: Option<EventKind>) {
        if notification.is_structural() {
            self.clear_all();
            return;
        }

        self.clear_range();
        self.clear_ordered();

        // Coverage of an area depends on its own bounds and on lifeline bounds.
        match kind {
            Some(EventKind::Lifeline | EventKind::InstanceRole) | None => {
                self.structural.bump();
                self.coverage.clear();
            }
            Some(_) => self.coverage.remove(notification.element()),
        }
    }
}
