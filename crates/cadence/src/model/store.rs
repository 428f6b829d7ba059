//! In-memory element store implementing [`ModelAccessor`].

use indexmap::IndexMap;
use log::trace;

use cadence_core::{event::EventKind, geometry::Bounds, identifier::Id};

use super::{ModelAccessor, Notification};
use crate::error::{CadenceError, Result};

/// Description of an element to insert into a [`SequenceModel`].
///
/// # Examples
///
/// ```
/// # use cadence::model::ElementSpec;
/// # use cadence::event::EventKind;
/// # use cadence::geometry::Bounds;
/// # use cadence::identifier::Id;
/// let call = ElementSpec::new(EventKind::Message, Bounds::new(5.0, 40.0, 90.0, 0.0))
///     .with_edge(Id::new("client_lifeline"), Id::new("server_exec"))
///     .with_semantic_target(Id::new("call"));
/// assert_eq!(call.kind(), EventKind::Message);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSpec {
    kind: EventKind,
    bounds: Bounds,
    semantic_target: Option<Id>,
    edge: Option<(Id, Id)>,
}

impl ElementSpec {
    pub fn new(kind: EventKind, bounds: Bounds) -> Self {
        Self {
            kind,
            bounds,
            semantic_target: None,
            edge: None,
        }
    }

    /// Set the semantic object represented by the element.
    pub fn with_semantic_target(mut self, target: Id) -> Self {
        self.semantic_target = Some(target);
        self
    }

    /// Set the endpoints of a message.
    pub fn with_edge(mut self, source: Id, target: Id) -> Self {
        self.edge = Some((source, target));
        self
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

#[derive(Debug, Clone)]
struct ElementRecord {
    spec: ElementSpec,
    parent: Option<Id>,
    children: Vec<Id>,
    creation_order: u64,
}

/// In-memory sequence diagram model.
///
/// Elements live in an insertion-ordered table. Every edit returns the
/// [`Notification`] a listening engine has to receive; editing through
/// [`SequenceDiagram`](crate::SequenceDiagram) dispatches it automatically.
#[derive(Debug, Clone)]
pub struct SequenceModel {
    root: Id,
    root_children: Vec<Id>,
    elements: IndexMap<Id, ElementRecord>,
    next_creation_order: u64,
}

impl Default for SequenceModel {
    fn default() -> Self {
        Self::new(Id::new("diagram"))
    }
}

impl SequenceModel {
    /// Create an empty model whose root is `root`.
    pub fn new(root: Id) -> Self {
        Self {
            root,
            root_children: Vec::new(),
            elements: IndexMap::new(),
            next_creation_order: 0,
        }
    }

    /// Number of elements, attached or not.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: Id) -> bool {
        self.elements.contains_key(&id)
    }

    /// Insert a new element as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Fails if `id` is already used, if the parent is unknown, or if a message
    /// is added without endpoints.
    pub fn add(&mut self, id: Id, parent: Id, spec: ElementSpec) -> Result<Notification> {
        if id == self.root || self.elements.contains_key(&id) {
            return Err(CadenceError::InvalidEdit(format!("element `{id}` already exists")));
        }
        if spec.kind == EventKind::Message && spec.edge.is_none() {
            return Err(CadenceError::InvalidEdit(format!(
                "message `{id}` has no endpoints"
            )));
        }
        self.children_mut(parent)?.push(id);

        let creation_order = self.next_creation_order;
        self.next_creation_order += 1;
        self.elements.insert(
            id,
            ElementRecord {
                spec,
                parent: Some(parent),
                children: Vec::new(),
                creation_order,
            },
        );

        trace!(element:% = id, parent:% = parent; "Element added");
        Ok(Notification::ElementAdded(id))
    }

    /// Delete an element and its whole subtree.
    ///
    /// # Errors
    ///
    /// Fails if the element is unknown.
    pub fn remove(&mut self, id: Id) -> Result<Notification> {
        self.unlink(id)?;

        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(record) = self.elements.shift_remove(&current) {
                pending.extend(record.children);
            }
        }

        trace!(element:% = id; "Element removed");
        Ok(Notification::ElementRemoved(id))
    }

    /// Unlink an element from its parent while keeping it, and its subtree, in
    /// the store. Detached elements are invisible to collection queries.
    ///
    /// # Errors
    ///
    /// Fails if the element is unknown.
    pub fn detach(&mut self, id: Id) -> Result<Notification> {
        self.unlink(id)?;
        trace!(element:% = id; "Element detached");
        Ok(Notification::ElementRemoved(id))
    }

    /// Move an element, with its subtree, under a new parent.
    ///
    /// # Errors
    ///
    /// Fails if either element is unknown or if the move would create a cycle.
    pub fn reparent(&mut self, id: Id, new_parent: Id) -> Result<Notification> {
        if !self.elements.contains_key(&id) {
            return Err(CadenceError::UnknownElement(id));
        }
        if self.is_in_subtree(new_parent, id) {
            return Err(CadenceError::InvalidEdit(format!(
                "cannot move `{id}` under its own descendant `{new_parent}`"
            )));
        }
        // Validate the target before unlinking so a failed edit leaves no trace.
        self.children_mut(new_parent)?;
        self.unlink(id)?;
        self.children_mut(new_parent)?.push(id);
        if let Some(record) = self.elements.get_mut(&id) {
            record.parent = Some(new_parent);
        }

        trace!(element:% = id, parent:% = new_parent; "Element reparented");
        Ok(Notification::ElementReparented(id))
    }

    /// Replace the bounds of an element.
    ///
    /// # Errors
    ///
    /// Fails if the element is unknown.
    pub fn set_bounds(&mut self, id: Id, bounds: Bounds) -> Result<Notification> {
        let record = self
            .elements
            .get_mut(&id)
            .ok_or(CadenceError::UnknownElement(id))?;
        record.spec.bounds = bounds;

        trace!(element:% = id; "Element bounds changed");
        Ok(Notification::RangeChanged(id))
    }

    fn children_mut(&mut self, parent: Id) -> Result<&mut Vec<Id>> {
        if parent == self.root {
            return Ok(&mut self.root_children);
        }
        self.elements
            .get_mut(&parent)
            .map(|record| &mut record.children)
            .ok_or(CadenceError::UnknownElement(parent))
    }

    /// Remove `id` from its parent's children and clear its parent link.
    fn unlink(&mut self, id: Id) -> Result<()> {
        let record = self
            .elements
            .get_mut(&id)
            .ok_or(CadenceError::UnknownElement(id))?;
        let Some(parent) = record.parent.take() else {
            return Ok(());
        };
        if let Ok(siblings) = self.children_mut(parent) {
            siblings.retain(|child| *child != id);
        }
        Ok(())
    }

    /// Whether `candidate` is `ancestor` or one of its descendants.
    fn is_in_subtree(&self, candidate: Id, ancestor: Id) -> bool {
        let mut current = Some(candidate);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.elements.get(&id).and_then(|record| record.parent);
        }
        false
    }
}

impl ModelAccessor for SequenceModel {
    fn root(&self) -> Id {
        self.root
    }

    fn kind(&self, id: Id) -> Option<EventKind> {
        self.elements.get(&id).map(|record| record.spec.kind)
    }

    fn geometry(&self, id: Id) -> Option<Bounds> {
        self.elements.get(&id).map(|record| record.spec.bounds)
    }

    fn children(&self, id: Id) -> Vec<Id> {
        if id == self.root {
            return self.root_children.clone();
        }
        self.elements
            .get(&id)
            .map(|record| record.children.clone())
            .unwrap_or_default()
    }

    fn parent(&self, id: Id) -> Option<Id> {
        self.elements.get(&id).and_then(|record| record.parent)
    }

    fn semantic_target(&self, id: Id) -> Option<Id> {
        self.elements
            .get(&id)
            .and_then(|record| record.spec.semantic_target)
    }

    fn creation_order(&self, id: Id) -> u64 {
        self.elements
            .get(&id)
            .map_or(u64::MAX, |record| record.creation_order)
    }

    fn edge_ends(&self, id: Id) -> Option<(Id, Id)> {
        self.elements.get(&id).and_then(|record| record.spec.edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(kind: EventKind, y: f32, height: f32) -> ElementSpec {
        ElementSpec::new(kind, Bounds::new(0.0, y, 10.0, height))
    }

    fn model_with_lifeline() -> SequenceModel {
        let mut model = SequenceModel::default();
        let root = model.root();
        model
            .add(Id::new("role"), root, node(EventKind::InstanceRole, 0.0, 20.0))
            .unwrap();
        model
            .add(Id::new("life"), Id::new("role"), node(EventKind::Lifeline, 20.0, 200.0))
            .unwrap();
        model
    }

    #[test]
    fn test_add_links_parent_and_children() {
        let mut model = model_with_lifeline();
        let notification = model
            .add(Id::new("exec"), Id::new("life"), node(EventKind::Execution, 40.0, 30.0))
            .unwrap();

        assert_eq!(notification, Notification::ElementAdded(Id::new("exec")));
        assert_eq!(model.children(Id::new("life")), vec![Id::new("exec")]);
        assert_eq!(model.parent(Id::new("exec")), Some(Id::new("life")));
        assert_eq!(model.parent(Id::new("role")), Some(model.root()));
        assert_eq!(model.children(model.root()), vec![Id::new("role")]);
        assert_eq!(model.kind(Id::new("exec")), Some(EventKind::Execution));
    }

    #[test]
    fn test_creation_order_is_monotonic() {
        let model = model_with_lifeline();
        assert!(model.creation_order(Id::new("role")) < model.creation_order(Id::new("life")));
        assert_eq!(model.creation_order(Id::new("ghost")), u64::MAX);
    }

    #[test]
    fn test_add_rejects_duplicates_and_unknown_parent() {
        let mut model = model_with_lifeline();

        let duplicate = model.add(Id::new("life"), model.root(), node(EventKind::Lifeline, 0.0, 1.0));
        assert!(matches!(duplicate, Err(CadenceError::InvalidEdit(_))));

        let orphan = model.add(Id::new("x"), Id::new("nowhere"), node(EventKind::State, 0.0, 1.0));
        assert!(matches!(orphan, Err(CadenceError::UnknownElement(_))));
        assert!(!model.contains(Id::new("x")));
    }

    #[test]
    fn test_add_message_requires_edge() {
        let mut model = model_with_lifeline();
        let root = model.root();

        let result = model.add(Id::new("m"), root, node(EventKind::Message, 50.0, 0.0));
        assert!(matches!(result, Err(CadenceError::InvalidEdit(_))));

        let spec = node(EventKind::Message, 50.0, 0.0).with_edge(Id::new("life"), Id::new("life"));
        model.add(Id::new("m"), root, spec).unwrap();
        assert_eq!(model.edge_ends(Id::new("m")), Some((Id::new("life"), Id::new("life"))));
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut model = model_with_lifeline();
        model
            .add(Id::new("exec"), Id::new("life"), node(EventKind::Execution, 40.0, 30.0))
            .unwrap();

        let notification = model.remove(Id::new("role")).unwrap();

        assert_eq!(notification, Notification::ElementRemoved(Id::new("role")));
        assert!(model.is_empty());
        assert!(model.children(model.root()).is_empty());
    }

    #[test]
    fn test_detach_keeps_element() {
        let mut model = model_with_lifeline();
        model.detach(Id::new("life")).unwrap();

        assert!(model.contains(Id::new("life")));
        assert_eq!(model.parent(Id::new("life")), None);
        assert!(model.children(Id::new("role")).is_empty());
    }

    #[test]
    fn test_reparent_moves_subtree() {
        let mut model = model_with_lifeline();
        model
            .add(Id::new("outer"), Id::new("life"), node(EventKind::Execution, 30.0, 100.0))
            .unwrap();
        model
            .add(Id::new("inner"), Id::new("life"), node(EventKind::Execution, 40.0, 10.0))
            .unwrap();

        let notification = model.reparent(Id::new("inner"), Id::new("outer")).unwrap();

        assert_eq!(notification, Notification::ElementReparented(Id::new("inner")));
        assert_eq!(model.children(Id::new("life")), vec![Id::new("outer")]);
        assert_eq!(model.children(Id::new("outer")), vec![Id::new("inner")]);
        assert_eq!(model.parent(Id::new("inner")), Some(Id::new("outer")));
    }

    #[test]
    fn test_reparent_rejects_cycles() {
        let mut model = model_with_lifeline();

        let result = model.reparent(Id::new("role"), Id::new("life"));

        assert!(matches!(result, Err(CadenceError::InvalidEdit(_))));
        assert_eq!(model.parent(Id::new("life")), Some(Id::new("role")));
    }

    #[test]
    fn test_set_bounds() {
        let mut model = model_with_lifeline();
        let bounds = Bounds::new(5.0, 25.0, 10.0, 300.0);

        let notification = model.set_bounds(Id::new("life"), bounds).unwrap();

        assert_eq!(notification, Notification::RangeChanged(Id::new("life")));
        assert_eq!(model.geometry(Id::new("life")), Some(bounds));
        assert!(model.set_bounds(Id::new("ghost"), bounds).is_err());
    }
}
