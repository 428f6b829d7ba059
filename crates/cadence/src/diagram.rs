//! The diagram aggregator.
//!
//! [`SequenceDiagram`] answers every query of the engine for one diagram: flat
//! per-kind collections, the ordered timeline, event ends and the derived
//! relations between events. Answers are memoized according to the cache
//! toggles of the session and stay correct as long as every edit of the model
//! is reported through [`SequenceDiagram::handle_notification`] (or made through
//! the edit methods available when the model is a [`SequenceModel`]).

mod collections;
mod relations;

use std::fmt;

use log::{debug, info, trace};

use cadence_core::{
    event::SequenceEvent,
    geometry::{Bounds, Range},
    identifier::Id,
    ordering::{EventEnd, GraphicalOrdering, GraphicalOrderingProvider},
};

use crate::{
    cache::{CacheStats, CacheStore},
    config::CacheConfig,
    error::{CadenceError, Result},
    model::{ElementSpec, ModelAccessor, Notification, SequenceModel},
    range::{OrderKey, RangeIndex},
};

/// Query engine over one sequence diagram.
///
/// Queries take `&self` and may run concurrently from several threads. Edits of
/// the in-memory model take `&mut self`.
///
/// # Examples
///
/// ```
/// # use cadence::{SequenceDiagram, event::EventKind, geometry::Bounds, identifier::Id};
/// # use cadence::model::ElementSpec;
/// let mut diagram: SequenceDiagram = SequenceDiagram::default();
/// let root = diagram.root();
///
/// diagram
///     .add_element(Id::new("a"), root, ElementSpec::new(EventKind::InstanceRole, Bounds::new(0.0, 0.0, 50.0, 20.0)))
///     .unwrap();
/// diagram
///     .add_element(Id::new("a_life"), Id::new("a"), ElementSpec::new(EventKind::Lifeline, Bounds::new(20.0, 20.0, 10.0, 300.0)))
///     .unwrap();
///
/// assert_eq!(diagram.all_lifelines().len(), 1);
/// assert!(diagram.all_messages().is_empty());
/// ```
pub struct SequenceDiagram<M = SequenceModel> {
    model: M,
    ordering: Box<dyn GraphicalOrderingProvider>,
    caches: CacheStore,
}

impl Default for SequenceDiagram<SequenceModel> {
    fn default() -> Self {
        Self::new(SequenceModel::default())
    }
}

impl<M: fmt::Debug> fmt::Debug for SequenceDiagram<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceDiagram")
            .field("model", &self.model)
            .field("caches", &self.caches.stats())
            .finish_non_exhaustive()
    }
}

impl<M: ModelAccessor> SequenceDiagram<M> {
    /// Create a diagram over `model` with every cache disabled and an empty
    /// graphical ordering.
    pub fn new(model: M) -> Self {
        Self::with_cache_config(model, CacheConfig::default())
    }

    /// Create a diagram whose cache toggles start as `config` says.
    pub fn with_cache_config(model: M, config: CacheConfig) -> Self {
        debug!(
            collections = config.collections(),
            structural = config.structural(),
            range = config.range();
            "Creating sequence diagram"
        );
        Self {
            model,
            ordering: Box::new(GraphicalOrdering::default()),
            caches: CacheStore::new(config),
        }
    }

    /// Replace the graphical ordering provider.
    pub fn with_ordering(self, ordering: impl GraphicalOrderingProvider + 'static) -> Self {
        self.with_boxed_ordering(Box::new(ordering))
    }

    pub(crate) fn with_boxed_ordering(
        mut self,
        ordering: Box<dyn GraphicalOrderingProvider>,
    ) -> Self {
        self.ordering = ordering;
        self.caches.clear_structural();
        self
    }

    /// Replace the graphical ordering provider, dropping the relations derived
    /// from the previous one.
    pub fn set_ordering(&mut self, ordering: impl GraphicalOrderingProvider + 'static) {
        self.ordering = Box::new(ordering);
        self.caches.clear_structural();
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn root(&self) -> Id {
        self.model.root()
    }

    /// Enable or disable the collection caches.
    ///
    /// Every toggle, including a redundant one, clears the collection caches, so
    /// turning caching back on never serves results computed before.
    pub fn use_cache(&self, enabled: bool) {
        info!(enabled; "Collection caching toggled");
        self.caches.set_collections_enabled(enabled);
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.caches.collection_tier().is_enabled()
    }

    /// Enable or disable memoization of hierarchy-derived relations.
    pub fn set_structural_cache_enabled(&self, enabled: bool) {
        self.caches.set_structural_enabled(enabled);
    }

    /// Enable or disable memoization of range-derived relations.
    pub fn set_range_cache_enabled(&self, enabled: bool) {
        self.caches.set_range_enabled(enabled);
    }

    /// Drop every memoized result.
    pub fn clear_all_caches(&self) {
        debug!("Clearing all caches");
        self.caches.clear_all();
    }

    /// Drop the sorted collections and range-derived relations, keeping the
    /// discovery results and the hierarchy-derived relations.
    ///
    /// Meant for edits that only move elements vertically.
    pub fn clear_ordered_caches(&self) {
        debug!("Clearing ordered caches");
        self.caches.clear_ordered();
        self.caches.clear_range();
    }

    /// Invalidate what an edit of the model made stale.
    ///
    /// Must be called once the model reflects the edit and before any further
    /// query.
    pub fn handle_notification(&self, notification: Notification) {
        let kind = self.model.kind(notification.element());
        debug!(notification:%, kind:?; "Handling model notification");
        self.caches.invalidate(notification, kind);
    }

    /// Snapshot of the cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.caches.stats()
    }

    /// Read-only snapshot of an attached element.
    ///
    /// # Errors
    ///
    /// `UnknownElement` for ids the model does not know, `NotAttached` for
    /// elements whose parent chain does not reach the root.
    pub fn event(&self, id: Id) -> Result<SequenceEvent> {
        let kind = self.model.kind(id).ok_or(CadenceError::UnknownElement(id))?;
        let bounds = self.bounds(id)?;
        let range = self.vertical_range(id)?;

        Ok(SequenceEvent::new(
            id,
            kind,
            bounds,
            range,
            self.model.parent(id),
            self.model.children(id),
            self.model.semantic_target(id),
            self.model.creation_order(id),
        ))
    }

    /// Vertical range of an attached element.
    ///
    /// # Errors
    ///
    /// Same as [`SequenceDiagram::event`].
    pub fn vertical_range(&self, id: Id) -> Result<Range> {
        self.range_index().vertical_range(id)
    }

    /// Position of an attached element in the total order of the diagram.
    ///
    /// # Errors
    ///
    /// Same as [`SequenceDiagram::event`].
    pub fn order_key(&self, id: Id) -> Result<OrderKey> {
        self.range_index().order_key(id)
    }

    /// Whether the parent chain of `id` reaches the root.
    pub fn is_attached(&self, id: Id) -> bool {
        self.range_index().is_attached(id)
    }

    /// The entries of the graphical ordering that carry an end of the semantic
    /// object represented by `id`, in sequence order.
    ///
    /// Elements without a semantic target (pure decorations, unknown ids) have
    /// no ends.
    pub fn find_ends(&self, id: Id) -> Vec<EventEnd> {
        let Some(semantic) = self.model.semantic_target(id) else {
            trace!(element:% = id; "No semantic target, no ends");
            return Vec::new();
        };

        self.ordering
            .event_ends()
            .into_iter()
            .filter(|end| end.involves(semantic))
            .collect()
    }

    pub(crate) fn range_index(&self) -> RangeIndex<'_, M> {
        RangeIndex::new(&self.model, &self.caches)
    }

    pub(crate) fn caches(&self) -> &CacheStore {
        &self.caches
    }

    fn bounds(&self, id: Id) -> Result<Bounds> {
        self.model
            .geometry(id)
            .ok_or(CadenceError::UnknownElement(id))
    }
}

/// Edits of the in-memory model. Each one dispatches its notification before
/// returning.
impl SequenceDiagram<SequenceModel> {
    /// Insert an element as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// See [`SequenceModel::add`].
    pub fn add_element(&mut self, id: Id, parent: Id, spec: ElementSpec) -> Result<()> {
        let notification = self.model.add(id, parent, spec)?;
        self.handle_notification(notification);
        Ok(())
    }

    /// Remove an element together with its subtree.
    ///
    /// # Errors
    ///
    /// See [`SequenceModel::remove`].
    pub fn remove_element(&mut self, id: Id) -> Result<()> {
        let notification = self.model.remove(id)?;
        self.handle_notification(notification);
        Ok(())
    }

    /// Unlink an element from its parent, keeping it in the model.
    ///
    /// # Errors
    ///
    /// See [`SequenceModel::detach`].
    pub fn detach_element(&mut self, id: Id) -> Result<()> {
        let notification = self.model.detach(id)?;
        self.handle_notification(notification);
        Ok(())
    }

    /// Move an element under a new parent.
    ///
    /// # Errors
    ///
    /// See [`SequenceModel::reparent`].
    pub fn reparent_element(&mut self, id: Id, new_parent: Id) -> Result<()> {
        let notification = self.model.reparent(id, new_parent)?;
        self.handle_notification(notification);
        Ok(())
    }

    /// Move or resize an element.
    ///
    /// # Errors
    ///
    /// See [`SequenceModel::set_bounds`].
    pub fn set_bounds(&mut self, id: Id, bounds: Bounds) -> Result<()> {
        let notification = self.model.set_bounds(id, bounds)?;
        self.handle_notification(notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cadence_core::{
        event::EventKind,
        ordering::{EndKind, SingleEventEnd},
    };

    use super::*;

    pub(super) fn spec(kind: EventKind, x: f32, y: f32, w: f32, h: f32) -> ElementSpec {
        ElementSpec::new(kind, Bounds::new(x, y, w, h))
    }

    /// Two participants, an execution on the second one and a call into it.
    pub(super) fn call_diagram() -> SequenceDiagram {
        let mut diagram: SequenceDiagram = SequenceDiagram::default();
        let root = diagram.root();

        for (role, x) in [("a", 0.0), ("b", 100.0)] {
            let life = Id::new(&format!("{role}_life"));
            let role_spec = spec(EventKind::InstanceRole, x, 0.0, 50.0, 20.0);
            let life_spec = spec(EventKind::Lifeline, x + 20.0, 20.0, 10.0, 300.0);
            diagram.add_element(Id::new(role), root, role_spec).unwrap();
            diagram.add_element(life, Id::new(role), life_spec).unwrap();
        }
        diagram
            .add_element(
                Id::new("exec"),
                Id::new("b_life"),
                spec(EventKind::Execution, 115.0, 60.0, 20.0, 80.0)
                    .with_semantic_target(Id::new("sem_exec")),
            )
            .unwrap();
        diagram
            .add_element(
                Id::new("call"),
                root,
                spec(EventKind::Message, 25.0, 60.0, 90.0, 0.0)
                    .with_edge(Id::new("a_life"), Id::new("exec"))
                    .with_semantic_target(Id::new("sem_call")),
            )
            .unwrap();
        diagram
    }

    #[test]
    fn test_event_snapshot() {
        let diagram = call_diagram();
        let event = diagram.event(Id::new("exec")).unwrap();

        assert_eq!(event.kind(), EventKind::Execution);
        assert_eq!(event.range(), Range::new(60.0, 140.0));
        assert_eq!(event.parent(), Some(Id::new("b_life")));
        assert_eq!(event.semantic_target(), Some(Id::new("sem_exec")));
        assert!(event.children().is_empty());
    }

    #[test]
    fn test_event_errors() {
        let mut diagram = call_diagram();
        assert!(matches!(
            diagram.event(Id::new("nowhere")),
            Err(CadenceError::UnknownElement(_))
        ));

        diagram.detach_element(Id::new("b_life")).unwrap();
        assert!(matches!(
            diagram.event(Id::new("exec")),
            Err(CadenceError::NotAttached(_))
        ));
        assert!(!diagram.is_attached(Id::new("exec")));
    }

    #[test]
    fn test_find_ends_filters_by_semantic_target() {
        let ordering = GraphicalOrdering::new(vec![
            EventEnd::Single(SingleEventEnd::new(
                Id::new("call_send"),
                Id::new("sem_call"),
                EndKind::Start,
            )),
            EventEnd::compound(
                Id::new("call_receive"),
                vec![
                    SingleEventEnd::new(Id::new("call_recv"), Id::new("sem_call"), EndKind::Finish),
                    SingleEventEnd::new(Id::new("exec_start"), Id::new("sem_exec"), EndKind::Start),
                ],
            ),
            EventEnd::Single(SingleEventEnd::new(
                Id::new("exec_finish"),
                Id::new("sem_exec"),
                EndKind::Finish,
            )),
        ]);
        let diagram = call_diagram().with_ordering(ordering);

        let call_ends = diagram.find_ends(Id::new("call"));
        assert_eq!(call_ends.len(), 2);
        assert_eq!(call_ends[0].semantic_end(), Id::new("call_send"));

        let exec_ends = diagram.find_ends(Id::new("exec"));
        assert_eq!(exec_ends.len(), 2);
        assert!(exec_ends[0].is_compound());
    }

    #[test]
    fn test_find_ends_without_semantic_target() {
        let diagram = call_diagram();
        assert!(diagram.find_ends(Id::new("a_life")).is_empty());
        assert!(diagram.find_ends(Id::new("unknown")).is_empty());
    }

    #[test]
    fn test_use_cache_toggle() {
        let diagram = call_diagram();
        assert!(!diagram.is_cache_enabled());

        diagram.use_cache(true);
        assert!(diagram.is_cache_enabled());

        diagram.use_cache(false);
        assert!(!diagram.is_cache_enabled());
    }

    #[test]
    fn test_edits_invalidate_before_returning() {
        let mut diagram = call_diagram();
        diagram.use_cache(true);
        diagram.set_range_cache_enabled(true);

        assert_eq!(diagram.vertical_range(Id::new("exec")).unwrap(), Range::new(60.0, 140.0));

        diagram
            .set_bounds(Id::new("exec"), Bounds::new(115.0, 80.0, 20.0, 80.0))
            .unwrap();
        assert_eq!(diagram.vertical_range(Id::new("exec")).unwrap(), Range::new(80.0, 160.0));
    }
}
