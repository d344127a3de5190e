//! Integration tests for asgraph
//!
//! These tests drive the store, traversal, codecs and converter together
//! through the public crate APIs.

use asgraph::{Config, SpecialNodes, asg_to_graph};
use asgraph_asg::{
    AsgError, AttrKind, EdgeKind, Factory, Header, NodeId, NodeKind, Preorder, SubtreeCollector,
    TraceVisitor, Value,
};
use asgraph_graph::{EdgeType, Graph, MergeOptions};
use std::path::Path;

struct Ids {
    package: NodeId,
    class: NodeId,
    outer: NodeId,
    inner: NodeId,
    param: NodeId,
    int_type: NodeId,
}

/// `app { Main { outer { inner overrides outer }, outer(x: int) } }`
fn build() -> (Factory, Ids) {
    let mut f = Factory::with_header(Header::for_language("java"));
    let package = f.create_node(NodeKind::Package);
    f.set_name(package, "app").unwrap();
    let class = f.create_node(NodeKind::Class);
    f.set_name(class, "Main").unwrap();
    f.set_attr(class, AttrKind::IsAbstract, Value::Bool(true)).unwrap();
    let outer = f.create_node(NodeKind::Method);
    f.set_name(outer, "outer").unwrap();
    let inner = f.create_node(NodeKind::Method);
    f.set_name(inner, "inner").unwrap();
    let param = f.create_node(NodeKind::Parameter);
    f.set_name(param, "x").unwrap();
    let int_type = f.create_node(NodeKind::Type);
    f.set_str(int_type, AttrKind::Spelling, "int").unwrap();

    f.add_edge(package, EdgeKind::ScopeHasMember, class).unwrap();
    f.add_edge(class, EdgeKind::ScopeHasMember, outer).unwrap();
    f.add_edge(outer, EdgeKind::ScopeHasMember, inner).unwrap();
    f.add_edge(outer, EdgeKind::MethodHasParameter, param).unwrap();
    f.set_edge(param, EdgeKind::ParameterHasType, int_type).unwrap();
    f.add_edge(inner, EdgeKind::MethodOverrides, outer).unwrap();

    let ids = Ids {
        package,
        class,
        outer,
        inner,
        param,
        int_type,
    };
    (f, ids)
}

fn collect(f: &Factory, preorder: &Preorder, start: NodeId) -> Vec<NodeId> {
    let mut collector = SubtreeCollector::default();
    preorder.run_from(f, start, &mut collector).unwrap();
    collector.into_ids()
}

#[test]
fn test_asg_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.asg");
    let (f, ids) = build();
    f.save(&path).unwrap();

    let mut loaded = Factory::load(&path).unwrap();
    assert_eq!(loaded.count_by_kind(), f.count_by_kind());
    assert_eq!(loaded.header().language(), Some("java"));

    let class = loaded.get_ref(ids.class).unwrap();
    assert_eq!(class.name(), Some("Main"));
    assert_eq!(class.attr(AttrKind::IsAbstract), Some(Value::Bool(true)));
    assert_eq!(class.parent(), Some(ids.package));
    assert_eq!(loaded.get_ref(ids.inner).unwrap().parent(), Some(ids.outer));

    let err = loaded
        .set_edge(ids.param, EdgeKind::ParameterHasType, ids.int_type)
        .unwrap_err();
    assert!(matches!(err, AsgError::EdgeAlreadySet { .. }));
}

#[test]
fn test_containment_cycle_terminates() {
    let (f, ids) = build();
    let expected = vec![ids.outer, ids.inner, ids.param];

    let safe = Preorder::new().safe_mode(true);
    assert_eq!(collect(&f, &safe, ids.outer), expected);

    // reference edges are never recursed into, so this still ends
    let unsafe_walk = Preorder::new().safe_mode(false);
    assert_eq!(collect(&f, &unsafe_walk, ids.outer), expected);
}

#[test]
fn test_dump_trace() {
    let (f, ids) = build();
    let mut trace = TraceVisitor::default();
    Preorder::new()
        .safe_mode(true)
        .run_from(&f, ids.package, &mut trace)
        .unwrap();
    insta::assert_snapshot!(trace.output(), @r#"
    Package#1 "app"
      Class#2 "Main"
        Method#3 "outer"
          Method#4 "inner"
            overrides -> #3
          Parameter#5 "x"
            hasType -> #6
    "#);
}

#[test]
fn test_filtered_save_drops_subtree() {
    let dir = tempfile::tempdir().unwrap();
    let (mut f, ids) = build();
    f.set_filtered(ids.outer).unwrap();
    assert!(f.is_filtered(ids.inner));
    assert!(!f.is_filtered(ids.int_type));

    let filter_path = dir.path().join("app.filter");
    f.save_filter(&filter_path).unwrap();
    let asg_path = dir.path().join("app.asg");
    f.save(&asg_path).unwrap();

    let loaded = Factory::load(&asg_path).unwrap();
    assert!(!loaded.exists(ids.outer));
    assert!(!loaded.exists(ids.param));
    assert!(loaded.exists(ids.int_type));
    assert_eq!(loaded.get_ref(ids.class).unwrap().edges(EdgeKind::ScopeHasMember).count(), 0);

    let (mut fresh, _) = build();
    fresh.load_filter(&filter_path).unwrap();
    assert_eq!(fresh.filter().count(), 3);
    fresh.set_not_filtered(ids.inner).unwrap();
    assert!(!fresh.is_filtered(ids.inner));
    assert!(!fresh.is_filtered(ids.outer));
    assert!(fresh.is_filtered(ids.param));
}

#[test]
fn test_convert_and_reload_graph() {
    let dir = tempfile::tempdir().unwrap();
    let (f, _) = build();
    let graph = asg_to_graph(&f).unwrap();
    let path = dir.path().join("app.graph");
    graph.save_binary(&path).unwrap();

    let loaded = Graph::load_binary(&path).unwrap();
    assert_eq!(loaded.header_info("Language"), Some("java"));
    assert_eq!(loaded.node_count(), 6);
    // four containment edges with pairs, hasType, overrides
    assert_eq!(loaded.edge_count(), 10);

    let inner = loaded.find_node("L4").unwrap();
    let outer = loaded.find_node("L3").unwrap();
    let up = loaded.find_out_edges(inner, &[EdgeType::reverse("hasMember")]);
    assert_eq!(up.len(), 1);
    assert_eq!(loaded.edge_target(up[0]), Some(outer));
    assert_eq!(loaded.find_nodes_by_type("Method"), vec![outer, inner]);
}

#[test]
fn test_metrics_graph_merges_into_converted_graph() {
    let dir = tempfile::tempdir().unwrap();
    let (f, _) = build();
    let mut graph = asg_to_graph(&f).unwrap();

    let mut metrics = Graph::new();
    metrics.set_header_info("metrics", "loc");
    let outer = metrics.create_node("L3", "Method").unwrap();
    let caller = metrics.create_node("X", "Method").unwrap();
    let loc = metrics.int_attribute("loc", "metric", 4);
    metrics.add_node_attribute(outer, loc).unwrap();
    metrics.create_directed_edge(caller, outer, "calls", false).unwrap();
    let path = dir.path().join("metrics.graph");
    metrics.save_binary(&path).unwrap();

    graph.merge_binary(&path, &MergeOptions::default()).unwrap();
    assert_eq!(graph.node_count(), 7);
    assert_eq!(graph.edge_count(), 11);
    assert_eq!(graph.header_info("Language"), Some("java"));
    assert_eq!(graph.header_info("metrics"), Some("loc"));

    let outer = graph.find_node("L3").unwrap();
    let rendered: Vec<String> = graph
        .node_attributes(outer)
        .unwrap()
        .iter()
        .map(|a| a.render(graph.strings()))
        .collect();
    assert_eq!(rendered.last().map(String::as_str), Some("loc[metric]=4"));
    assert_eq!(graph.node_type(outer), Some("Method"));
}

#[test]
fn test_calls_example_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calls.graph");
    let mut g = Graph::new();
    g.create_node("m1", "Method").unwrap();
    g.create_node("m2", "Method").unwrap();
    g.create_directed_edge_by_uid("m1", "m2", "calls", false).unwrap();
    g.save_binary(&path).unwrap();

    let loaded = Graph::load_binary(&path).unwrap();
    let m1 = loaded.find_node("m1").unwrap();
    let m2 = loaded.find_node("m2").unwrap();
    let calls = loaded.find_out_edges(m1, &[EdgeType::directional("calls")]);
    assert_eq!(calls.len(), 1);
    assert_eq!(loaded.edge_target(calls[0]), Some(m2));
}

#[test]
fn test_config_drives_traversal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("asgraph.toml");
    std::fs::write(
        &path,
        "[traversal]\nspecial_nodes = \"visit-referenced-only\"\nmax_depth = 8\n",
    )
    .unwrap();
    let config = Config::load(Some(Path::new(&path))).unwrap();
    assert_eq!(config.traversal.special_nodes, SpecialNodes::VisitReferencedOnly);

    let (f, ids) = build();
    let ids_seen = collect(&f, &config.traversal.preorder(), ids.outer);
    assert_eq!(ids_seen, vec![ids.outer, ids.inner, ids.param, ids.int_type]);

    let shallow = Config::from_toml("[traversal]\nmax_depth = 1\n", &path).unwrap();
    let mut collector = SubtreeCollector::default();
    let err = shallow
        .traversal
        .preorder()
        .run_from(&f, ids.package, &mut collector)
        .unwrap_err();
    assert!(matches!(err, AsgError::DepthLimit(1)));
}
