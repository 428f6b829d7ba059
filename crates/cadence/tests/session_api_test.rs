//! Integration tests for the SessionBuilder API and configuration loading.

use std::io::Write;

use tempfile::NamedTempFile;

use cadence::{
    SequenceDiagram, SessionBuilder,
    config::{AppConfig, CacheConfig, load_config},
    event::EventKind,
    geometry::Bounds,
    identifier::Id,
    model::{ElementSpec, ModelAccessor, SequenceModel},
    ordering::{EndKind, EventEnd, GraphicalOrdering, SingleEventEnd},
};

fn two_lifelines() -> SequenceModel {
    let mut model = SequenceModel::default();
    let root = model.root();
    for (role, x) in [("client", 0.0), ("server", 200.0)] {
        let life = Id::new(&format!("{role}_life"));
        model
            .add(
                Id::new(role),
                root,
                ElementSpec::new(EventKind::InstanceRole, Bounds::new(x, 0.0, 80.0, 30.0)),
            )
            .unwrap();
        model
            .add(
                life,
                Id::new(role),
                ElementSpec::new(EventKind::Lifeline, Bounds::new(x + 35.0, 30.0, 10.0, 400.0)),
            )
            .unwrap();
    }
    model
        .add(
            Id::new("hello"),
            root,
            ElementSpec::new(EventKind::Message, Bounds::new(40.0, 80.0, 200.0, 0.0))
                .with_edge(Id::new("client_life"), Id::new("server_life"))
                .with_semantic_target(Id::new("sem_hello")),
        )
        .unwrap();
    model
}

#[test]
fn test_default_session_has_caches_off() {
    let diagram = SessionBuilder::default().build(two_lifelines());

    assert!(!diagram.is_cache_enabled());
    assert_eq!(diagram.all_lifelines().len(), 2);
    assert_eq!(diagram.all_messages().len(), 1);
}

#[test]
fn test_session_from_config() {
    let config = AppConfig::new(CacheConfig::new(true, false, false));
    let diagram = SessionBuilder::new(config).build(two_lifelines());

    assert!(diagram.is_cache_enabled());
    diagram.all_messages();
    diagram.all_messages();
    assert_eq!(diagram.cache_stats().discovery_traversals(), 1);
}

#[test]
fn test_session_with_ordering() {
    let ordering = GraphicalOrdering::new(vec![
        EventEnd::Single(SingleEventEnd::new(
            Id::new("hello_send"),
            Id::new("sem_hello"),
            EndKind::Start,
        )),
        EventEnd::Single(SingleEventEnd::new(
            Id::new("hello_receive"),
            Id::new("sem_hello"),
            EndKind::Finish,
        )),
    ]);
    let diagram = SessionBuilder::default()
        .with_ordering(ordering)
        .build(two_lifelines());

    let ends = diagram.find_ends(Id::new("hello"));
    assert_eq!(ends.len(), 2);
    assert_eq!(ends[1].kind_for(Id::new("sem_hello")), Some(EndKind::Finish));
}

#[test]
fn test_session_from_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[cache]\ncollections = true\nrange = true").unwrap();

    let config = load_config(Some(file.path())).unwrap();
    let diagram = SessionBuilder::new(config).build(two_lifelines());

    assert!(diagram.is_cache_enabled());
}

#[test]
fn test_sorted_instance_roles() {
    let diagram = SequenceDiagram::new(two_lifelines());
    assert_eq!(
        diagram.sorted_instance_roles(),
        vec![Id::new("client"), Id::new("server")]
    );
}
