//! Ordering and query behavior over small hand-built diagrams.

use std::sync::Arc;

use cadence::{
    CadenceError, SequenceDiagram,
    event::EventKind,
    geometry::{Bounds, Range},
    identifier::Id,
    model::{ElementSpec, ModelAccessor},
};

fn spec(kind: EventKind, x: f32, y: f32, w: f32, h: f32) -> ElementSpec {
    ElementSpec::new(kind, Bounds::new(x, y, w, h))
}

fn ids(names: &[&str]) -> Vec<Id> {
    names.iter().map(|name| Id::new(name)).collect()
}

/// A fragment over `(0,5)` at depth 1, its operand over `(0,3)` at depth 2 and
/// an observation point at `2` at depth 1.
fn nested_start_diagram() -> SequenceDiagram {
    let mut diagram: SequenceDiagram = SequenceDiagram::default();
    let root = diagram.root();

    diagram
        .add_element(Id::new("outer"), root, spec(EventKind::CombinedFragment, 0.0, 0.0, 100.0, 5.0))
        .unwrap();
    diagram
        .add_element(Id::new("inner"), Id::new("outer"), spec(EventKind::Operand, 0.0, 0.0, 100.0, 3.0))
        .unwrap();
    diagram
        .add_element(Id::new("mark"), root, spec(EventKind::ObservationPoint, 10.0, 2.0, 4.0, 0.0))
        .unwrap();
    diagram
}

#[test]
fn test_deeper_event_first_on_equal_start() {
    let diagram = nested_start_diagram();

    assert_eq!(diagram.vertical_range(Id::new("outer")).unwrap(), Range::new(0.0, 5.0));
    assert_eq!(diagram.order_key(Id::new("inner")).unwrap().depth(), 2);
    assert_eq!(diagram.order_key(Id::new("mark")).unwrap().depth(), 1);

    let timeline: Vec<Id> = diagram
        .all_ordered_delimited_sequence_events()
        .iter()
        .copied()
        .collect();
    assert_eq!(timeline, ids(&["inner", "outer", "mark"]));
}

#[test]
fn test_ordering_does_not_depend_on_insertion_order() {
    let mut diagram: SequenceDiagram = SequenceDiagram::default();
    let root = diagram.root();

    diagram
        .add_element(Id::new("late"), root, spec(EventKind::ObservationPoint, 0.0, 2.0, 4.0, 0.0))
        .unwrap();
    diagram
        .add_element(Id::new("frame"), root, spec(EventKind::InteractionUse, 0.0, 0.0, 50.0, 5.0))
        .unwrap();

    let timeline: Vec<Id> = diagram
        .all_ordered_delimited_sequence_events()
        .iter()
        .copied()
        .collect();
    assert_eq!(timeline, ids(&["frame", "late"]));
}

#[test]
fn test_equal_keys_fall_back_to_creation_order() {
    let mut diagram: SequenceDiagram = SequenceDiagram::default();
    let root = diagram.root();
    for name in ["first", "second", "third"] {
        diagram
            .add_element(Id::new(name), root, spec(EventKind::LostMessageEnd, 0.0, 10.0, 4.0, 4.0))
            .unwrap();
    }

    let ends: Vec<Id> = diagram.all_lost_message_ends().iter().copied().collect();
    assert_eq!(ends, ids(&["first", "second", "third"]));
}

#[test]
fn test_successive_queries_are_identical() {
    let diagram = nested_start_diagram();

    for cached in [false, true] {
        diagram.use_cache(cached);
        let first = diagram.all_ordered_delimited_sequence_events();
        let second = diagram.all_ordered_delimited_sequence_events();
        assert_eq!(first, second);

        let first = diagram.all_messages();
        let second = diagram.all_messages();
        assert_eq!(first, second);
    }
}

#[test]
fn test_cached_snapshots_are_shared() {
    let diagram = nested_start_diagram();
    diagram.use_cache(true);

    let first = diagram.all_frames();
    let second = diagram.all_frames();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_detached_elements() {
    let mut diagram = nested_start_diagram();
    diagram.detach_element(Id::new("outer")).unwrap();

    assert!(diagram.model().contains(Id::new("inner")));
    assert!(diagram.all_operands().is_empty());
    assert!(diagram.all_frames().is_empty());
    assert!(matches!(
        diagram.vertical_range(Id::new("inner")),
        Err(CadenceError::NotAttached(id)) if id == Id::new("inner")
    ));
    assert!(matches!(
        diagram.order_key(Id::new("outer")),
        Err(CadenceError::NotAttached(_))
    ));

    diagram.reparent_element(Id::new("outer"), diagram.root()).unwrap();
    assert_eq!(diagram.all_operands().len(), 1);
    assert!(diagram.vertical_range(Id::new("inner")).is_ok());
}

#[test]
fn test_find_ends_of_decoration_is_empty() {
    let diagram = nested_start_diagram();

    assert_eq!(diagram.model().semantic_target(Id::new("mark")), None);
    assert!(diagram.find_ends(Id::new("mark")).is_empty());
}

#[test]
fn test_ranges_of_consistent_model_nest() {
    let diagram = nested_start_diagram();

    for event in diagram.all_ordered_delimited_sequence_events().iter().copied() {
        let range = diagram.vertical_range(event).unwrap();
        assert!(range.lower() <= range.upper());

        for child in diagram.model().children(event) {
            let child_range = diagram.vertical_range(child).unwrap();
            assert!(range.includes_range(child_range), "{child} escapes {event}");
        }
    }
}
