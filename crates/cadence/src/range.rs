//! Vertical ranges and the total order over sequence events.
//!
//! Every element positioned on the time axis has a [`Range`] derived from its
//! absolute geometry, and an [`OrderKey`] that places it in the single total
//! order used by every sorted query of the engine:
//!
//! ```text
//! (range.lower, depth (deepest first), creation order)
//! ```
//!
//! The depth tie-break puts nested events before their containers when both
//! start at the same y: a message leaving the top of an execution sorts before
//! that execution.

use std::{cmp::Ordering, collections::HashSet};

use log::trace;

use cadence_core::{event::EventKind, geometry::Range, identifier::Id};

use crate::{
    cache::CacheStore,
    error::{CadenceError, Result},
    model::ModelAccessor,
};

/// Composite sort key giving the deterministic total order over events.
///
/// # Examples
///
/// ```
/// # use cadence::OrderKey;
/// let container = OrderKey::new(0.0, 1, 0);
/// let nested = OrderKey::new(0.0, 2, 5);
/// let later = OrderKey::new(2.0, 1, 1);
///
/// assert!(nested < container);
/// assert!(container < later);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct OrderKey {
    start: f32,
    depth: usize,
    creation_order: u64,
}

impl OrderKey {
    pub fn new(start: f32, depth: usize, creation_order: u64) -> Self {
        Self {
            start,
            depth,
            creation_order,
        }
    }

    /// Lower bound of the event range.
    pub fn start(&self) -> f32 {
        self.start
    }

    /// Number of hierarchy levels between the event and the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn creation_order(&self) -> u64 {
        self.creation_order
    }
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .total_cmp(&other.start)
            .then_with(|| other.depth.cmp(&self.depth))
            .then_with(|| self.creation_order.cmp(&other.creation_order))
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OrderKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderKey {}

/// Range and order computations over one model, backed by the range cache.
pub(crate) struct RangeIndex<'a, M: ModelAccessor> {
    model: &'a M,
    caches: &'a CacheStore,
}

impl<'a, M: ModelAccessor> RangeIndex<'a, M> {
    pub(crate) fn new(model: &'a M, caches: &'a CacheStore) -> Self {
        Self { model, caches }
    }

    /// Range of an attached element.
    ///
    /// # Errors
    ///
    /// `UnknownElement` if the model has no geometry for `id`, `NotAttached` if
    /// the element cannot be reached from the root.
    pub(crate) fn vertical_range(&self, id: Id) -> Result<Range> {
        let range = self.raw_range(id)?;
        if !self.is_attached(id) {
            return Err(CadenceError::NotAttached(id));
        }
        Ok(range)
    }

    /// Range of an element regardless of attachment, memoized in the range tier.
    pub(crate) fn raw_range(&self, id: Id) -> Result<Range> {
        self.caches.ranges().get_or_try_compute(self.caches.range_tier(), id, || {
            trace!(element:% = id; "Computing vertical range");
            self.model
                .geometry(id)
                .map(|bounds| bounds.vertical_range())
                .ok_or(CadenceError::UnknownElement(id))
        })
    }

    /// Whether the parent chain of `id` reaches the root.
    pub(crate) fn is_attached(&self, id: Id) -> bool {
        self.ancestors(id).is_some()
    }

    /// Ancestors of `id` from its parent up to, excluding, the root. `None` when
    /// the chain never reaches the root.
    pub(crate) fn ancestors(&self, id: Id) -> Option<Vec<Id>> {
        let root = self.model.root();
        if id == root {
            return Some(Vec::new());
        }
        self.model.kind(id)?;

        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.model.parent(id)?;
        while current != root {
            if !seen.insert(current) {
                return None;
            }
            chain.push(current);
            current = self.model.parent(current)?;
        }
        Some(chain)
    }

    /// Depth of an attached element; direct children of the root have depth 1.
    ///
    /// Messages hang off the root but take the depth of their source endpoint
    /// plus one, so that they order relative to the element they leave from.
    pub(crate) fn depth(&self, id: Id) -> Result<usize> {
        let hierarchy_depth = self
            .ancestors(id)
            .map(|chain| chain.len() + 1)
            .ok_or(CadenceError::NotAttached(id))?;

        if self.model.kind(id) != Some(EventKind::Message) {
            return Ok(hierarchy_depth);
        }
        let source_depth = self
            .model
            .edge_ends(id)
            .and_then(|(source, _)| self.ancestors(source))
            .map_or(0, |chain| chain.len() + 1);
        Ok(hierarchy_depth.max(source_depth + 1))
    }

    pub(crate) fn order_key(&self, id: Id) -> Result<OrderKey> {
        let range = self.vertical_range(id)?;
        let depth = self.depth(id)?;
        Ok(OrderKey::new(
            range.lower(),
            depth,
            self.model.creation_order(id),
        ))
    }

    /// Sort ids by [`OrderKey`]. Elements that have no key (detached or
    /// unknown) keep their relative order at the end.
    pub(crate) fn sort(&self, ids: &mut [Id]) {
        ids.sort_by_cached_key(|id| {
            self.order_key(*id)
                .ok()
                .map_or(SortSlot::Last, SortSlot::Key)
        });
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortSlot {
    Key(OrderKey),
    Last,
}
