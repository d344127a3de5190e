//! Unit tests for asgraph-graph

use crate::*;
use asgraph_core::{BinaryWriter, StrTable};

fn calls() -> Vec<EdgeType> {
    vec![EdgeType::directional("calls")]
}

/// Sorted one-line description of every node and out-edge.
fn describe(g: &Graph) -> Vec<String> {
    let mut lines = Vec::new();
    for n in g.nodes() {
        let attrs: Vec<String> = g
            .node_attributes(n)
            .unwrap()
            .iter()
            .map(|a| a.render(g.strings()))
            .collect();
        lines.push(format!("{}:{} {:?}", g.uid(n).unwrap(), g.node_type(n).unwrap(), attrs));
        for e in g.out_edges(n) {
            let ty = g.edge_type(e).unwrap();
            let attrs: Vec<String> = g
                .edge_attributes(e)
                .unwrap()
                .iter()
                .map(|a| a.render(g.strings()))
                .collect();
            let paired = if g.has_reverse_pair(e) { " paired" } else { "" };
            lines.push(format!(
                "  {} -{}-> {}{} {:?}",
                g.uid(n).unwrap(),
                ty,
                g.uid(g.edge_target(e).unwrap()).unwrap(),
                paired,
                attrs
            ));
        }
    }
    lines.sort();
    lines
}

fn to_bytes(g: &Graph) -> Vec<u8> {
    let mut bytes = Vec::new();
    codec::save_to(g, &mut bytes).unwrap();
    bytes
}

// ── Nodes ────────────────────────────────────────────────

#[test]
fn test_create_node_rejects_duplicates() {
    let mut g = Graph::new();
    let m1 = g.create_node("m1", "Method").unwrap();
    assert!(matches!(
        g.create_node("m1", "Class"),
        Err(GraphError::NodeAlreadyExists(uid)) if uid == "m1"
    ));
    assert!(matches!(g.create_node("", "Method"), Err(GraphError::EmptyUid)));
    assert_eq!(g.find_node("m1"), Some(m1));
    assert_eq!(g.node_type(m1), Some("Method"));
    assert_eq!(g.find_node("nope"), None);
    assert_eq!(g.node_count(), 1);
}

#[test]
fn test_find_nodes_by_type() {
    let mut g = Graph::new();
    let a = g.create_node("a", "Method").unwrap();
    g.create_node("b", "Class").unwrap();
    let c = g.create_node("c", "Method").unwrap();
    assert_eq!(g.find_nodes_by_type("Method"), vec![a, c]);
    assert!(g.find_nodes_by_type("Package").is_empty());

    g.set_node_type(c, "Class").unwrap();
    assert_eq!(g.find_nodes_by_type("Class").len(), 2);
    assert_eq!(g.delete_nodes_by_type("Class"), 2);
    assert_eq!(g.node_count(), 1);
}

// ── Edges ────────────────────────────────────────────────

#[test]
fn test_reverse_pairing() {
    let mut g = Graph::new();
    let m1 = g.create_node("m1", "Method").unwrap();
    let m2 = g.create_node("m2", "Method").unwrap();
    let e = g.create_directed_edge_by_uid("m1", "m2", "overrides", true).unwrap();

    let r = g.reverse_pair(e).unwrap();
    assert_eq!(g.edge_type(r), Some(EdgeType::reverse("overrides")));
    assert_eq!(g.edge_endpoints(r), Some((m2, m1)));
    assert_eq!(g.reverse_pair(r), Some(e));
    assert_eq!(g.edge_count(), 2);

    let plain = g.create_directed_edge(m1, m2, "calls", false).unwrap();
    assert_eq!(g.reverse_pair(plain), None);
}

#[test]
fn test_edge_to_missing_node_fails() {
    let mut g = Graph::new();
    g.create_node("m1", "Method").unwrap();
    assert!(matches!(
        g.create_directed_edge_by_uid("m1", "ghost", "calls", false),
        Err(GraphError::NoSuchNode(uid)) if uid == "ghost"
    ));
}

#[test]
fn test_bidirected_edge_halves() {
    let mut g = Graph::new();
    let a = g.create_node("a", "File").unwrap();
    let b = g.create_node("b", "File").unwrap();
    let e = g.create_bidirected_edge(a, b, "clone").unwrap();
    let p = g.reverse_pair(e).unwrap();
    assert_eq!(g.edge_type(p), Some(EdgeType::bidirectional("clone")));
    assert_eq!(g.edge_endpoints(p), Some((b, a)));
}

#[test]
fn test_delete_edge_takes_pair() {
    let mut g = Graph::new();
    let a = g.create_node("a", "Method").unwrap();
    let b = g.create_node("b", "Method").unwrap();
    let e = g.create_directed_edge(a, b, "overrides", true).unwrap();
    g.create_directed_edge(a, b, "calls", false).unwrap();
    g.create_directed_edge(b, a, "calls", false).unwrap();

    assert!(g.delete_edge(e));
    assert!(!g.delete_edge(e));
    assert_eq!(g.edge_count(), 2);
    assert_eq!(g.delete_edges_of_type(&EdgeType::directional("calls")), 2);
    assert_eq!(g.edge_count(), 0);

    g.create_directed_edge(a, b, "calls", true).unwrap();
    g.create_directed_edge(a, b, "uses", false).unwrap();
    assert_eq!(g.delete_edges_between(a, b), 2);
    assert_eq!(g.edge_count(), 0);
}

#[test]
fn test_find_out_edges_by_type() {
    let mut g = Graph::new();
    let m1 = g.create_node("m1", "Method").unwrap();
    let m2 = g.create_node("m2", "Method").unwrap();
    let m3 = g.create_node("m3", "Method").unwrap();
    let c1 = g.create_directed_edge(m1, m2, "calls", false).unwrap();
    g.create_directed_edge(m1, m3, "overrides", true).unwrap();
    let c2 = g.create_directed_edge(m1, m3, "calls", false).unwrap();

    assert_eq!(g.find_out_edges(m1, &calls()), vec![c1, c2]);
    assert_eq!(g.find_out_edges(m3, &[EdgeType::reverse("overrides")]).len(), 1);
    assert!(g.find_out_edges(m1, &[EdgeType::directional("unknown")]).is_empty());
}

// ── Delete ───────────────────────────────────────────────

#[test]
fn test_cascading_delete() {
    let mut g = Graph::new();
    let a = g.create_node("A", "Package").unwrap();
    let b = g.create_node("B", "Class").unwrap();
    let c = g.create_node("C", "Method").unwrap();
    g.create_directed_edge(a, b, "contains", true).unwrap();
    g.create_directed_edge(b, c, "contains", true).unwrap();

    assert!(g.delete_node(a));
    assert_eq!(g.node_count(), 0);
    assert_eq!(g.edge_count(), 0);
    assert!(!g.node_exists("B"));
    assert!(!g.delete_node(a));
}

#[test]
fn test_delete_keeps_shared_targets() {
    let mut g = Graph::new();
    let a = g.create_node("A", "Method").unwrap();
    let b = g.create_node("B", "Method").unwrap();
    let c = g.create_node("C", "Method").unwrap();
    let d = g.create_node("D", "Method").unwrap();
    g.create_directed_edge(a, c, "calls", false).unwrap();
    g.create_directed_edge(b, c, "calls", false).unwrap();
    g.create_directed_edge(a, d, "calls", false).unwrap();

    g.delete_node(a);
    assert!(g.node_exists("B"));
    assert!(g.node_exists("C"));
    assert!(!g.node_exists("D"));
    assert_eq!(g.in_edges(c).len(), 1);
    assert!(g.node(b).is_some());
    assert!(g.node(d).is_none());
}

#[test]
fn test_delete_takes_unreachable_cycles() {
    let mut g = Graph::new();
    let a = g.create_node("A", "Package").unwrap();
    let b = g.create_node("B", "Class").unwrap();
    let c = g.create_node("C", "Class").unwrap();
    g.create_directed_edge(a, b, "uses", false).unwrap();
    g.create_directed_edge(b, c, "uses", false).unwrap();
    g.create_directed_edge(c, b, "uses", false).unwrap();

    assert!(g.delete_node(a));
    assert_eq!(g.node_count(), 0);
    assert_eq!(g.edge_count(), 0);
}

#[test]
fn test_delete_keeps_cycles_reachable_from_outside() {
    let mut g = Graph::new();
    let a = g.create_node("A", "Package").unwrap();
    let b = g.create_node("B", "Class").unwrap();
    let c = g.create_node("C", "Class").unwrap();
    let d = g.create_node("D", "Class").unwrap();
    let x = g.create_node("X", "Package").unwrap();
    g.create_directed_edge(a, b, "uses", true).unwrap();
    g.create_directed_edge(b, c, "uses", false).unwrap();
    g.create_directed_edge(c, b, "uses", false).unwrap();
    g.create_directed_edge(a, d, "uses", false).unwrap();
    g.create_directed_edge(x, c, "uses", false).unwrap();

    g.delete_node(a);
    assert!(g.node(b).is_some());
    assert!(g.node(c).is_some());
    assert!(g.node(d).is_none());
    assert_eq!(g.node_count(), 3);
    assert!(g.in_edges(b).iter().all(|&e| g.edge_source(e) == Some(c)));
}

#[test]
fn test_edge_order_survives_deletes() {
    let mut g = Graph::new();
    let a = g.create_node("A", "Method").unwrap();
    let b = g.create_node("B", "Method").unwrap();
    let c = g.create_node("C", "Method").unwrap();
    let d = g.create_node("D", "Method").unwrap();
    let ab = g.create_directed_edge(a, b, "calls", false).unwrap();
    g.create_directed_edge(a, c, "calls", false).unwrap();
    g.delete_edge(ab);
    g.create_directed_edge(a, d, "calls", false).unwrap();

    let targets: Vec<NodeId> = g.out_edges(a).into_iter().filter_map(|e| g.edge_target(e)).collect();
    assert_eq!(targets, vec![c, d]);
    assert!(g.edge(ab).is_none());

    let round = codec::load_from(to_bytes(&g).as_slice()).unwrap();
    let a = round.find_node("A").unwrap();
    let uids: Vec<&str> = round
        .out_edges(a)
        .into_iter()
        .filter_map(|e| round.edge_target(e).and_then(|t| round.uid(t)))
        .collect();
    assert_eq!(uids, vec!["C", "D"]);
}

#[test]
fn test_stale_node_handle_stays_dead() {
    let mut g = Graph::new();
    g.create_node("A", "Method").unwrap();
    let x = g.create_node("X", "Method").unwrap();
    assert!(g.delete_node(x));
    let y = g.create_node("Y", "Method").unwrap();

    assert_ne!(x, y);
    assert!(g.node(x).is_none());
    assert_eq!(g.uid(x), None);
    assert!(!g.delete_node(x));
    assert!(g.create_directed_edge(y, x, "calls", false).is_err());
    assert_eq!(g.uid(y), Some("Y"));
    assert_eq!(g.nodes().count(), 2);
}

#[test]
fn test_roots_and_leaves() {
    let mut g = Graph::new();
    let a = g.create_node("a", "Method").unwrap();
    let b = g.create_node("b", "Method").unwrap();
    let c = g.create_node("c", "Method").unwrap();
    g.create_directed_edge(a, b, "calls", true).unwrap();
    g.create_directed_edge(b, c, "calls", false).unwrap();
    assert_eq!(g.roots(&calls()), vec![a]);
    assert_eq!(g.leaves(&calls()), vec![c]);
    assert_eq!(g.roots(&[EdgeType::reverse("calls")]), vec![b, c]);
}

// ── Traversal ────────────────────────────────────────────

#[derive(Default)]
struct Trace(Vec<String>);

impl GraphVisitor for Trace {
    fn visit_node(&mut self, g: &Graph, node: NodeId) {
        self.0.push(format!("node {}", g.uid(node).unwrap()));
    }
    fn visit_node_end(&mut self, g: &Graph, node: NodeId) {
        self.0.push(format!("end {}", g.uid(node).unwrap()));
    }
    fn visit_edge(&mut self, g: &Graph, edge: EdgeId) {
        let (from, to) = g.edge_endpoints(edge).unwrap();
        self.0.push(format!("edge {}->{}", g.uid(from).unwrap(), g.uid(to).unwrap()));
    }
}

/// a -> b, a -> c, b -> d, c -> d, d -> a over "calls"; a -> e over "contains".
fn diamond() -> (Graph, NodeId) {
    let mut g = Graph::new();
    for uid in ["a", "b", "c", "d", "e"] {
        g.create_node(uid, "Method").unwrap();
    }
    for (from, to) in [("a", "b"), ("a", "c"), ("b", "d"), ("c", "d"), ("d", "a")] {
        g.create_directed_edge_by_uid(from, to, "calls", false).unwrap();
    }
    g.create_directed_edge_by_uid("a", "e", "contains", false).unwrap();
    let a = g.find_node("a").unwrap();
    (g, a)
}

#[test]
fn test_bfs_over_cycle() {
    let (g, a) = diamond();
    let mut trace = Trace::default();
    assert_eq!(g.bfs(a, &calls(), &mut trace).unwrap(), 4);
    insta::assert_snapshot!(trace.0.join("\n"), @r"
    node a
    edge a->b
    edge a->c
    node b
    edge b->d
    node c
    edge c->d
    node d
    edge d->a
    ");
}

#[test]
fn test_dfs_orders() {
    let (g, a) = diamond();
    let nodes_only = |order: DfsOrder| {
        let mut trace = Trace::default();
        g.dfs(a, &calls(), order, &mut trace).unwrap();
        trace
            .0
            .into_iter()
            .filter(|l| l.starts_with("node"))
            .map(|l| l.trim_start_matches("node ").to_owned())
            .collect::<Vec<_>>()
            .join(" ")
    };
    assert_eq!(nodes_only(DfsOrder::Pre), "a b d c");
    assert_eq!(nodes_only(DfsOrder::Post), "d b c a");

    let mut trace = Trace::default();
    g.dfs(a, &calls(), DfsOrder::Both, &mut trace).unwrap();
    insta::assert_snapshot!(trace.0.join("\n"), @r"
    node a
    edge a->b
    node b
    edge b->d
    node d
    edge d->a
    end d
    end b
    edge a->c
    node c
    edge c->d
    end c
    end a
    ");
}

#[test]
fn test_traversal_respects_edge_types() {
    let (g, a) = diamond();
    let mut trace = Trace::default();
    let reached = g
        .dfs_preorder(a, &[EdgeType::directional("contains")], &mut trace)
        .unwrap();
    assert_eq!(reached, 2);
    assert_eq!(trace.0, vec!["node a", "edge a->e", "node e"]);

    let missing = NodeId(99);
    assert!(matches!(g.bfs(missing, &calls(), &mut trace), Err(GraphError::NoSuchNode(_))));
}

// ── Codec ────────────────────────────────────────────────

#[test]
fn test_calls_edge_survives_serialization() {
    let mut g = Graph::new();
    g.create_node("m1", "Method").unwrap();
    g.create_node("m2", "Method").unwrap();
    g.create_directed_edge_by_uid("m1", "m2", "calls", false).unwrap();

    let loaded = codec::load_from(to_bytes(&g).as_slice()).unwrap();
    let m2 = loaded.find_node("m2").unwrap();
    let m1 = loaded.find_node("m1").unwrap();
    let calls = loaded.find_out_edges(m1, &calls());
    assert_eq!(calls.len(), 1);
    assert_eq!(loaded.edge_target(calls[0]), Some(m2));
    assert_eq!(loaded.node_type(m2), Some("Method"));
}

#[test]
fn test_round_trip_keeps_pairs_attributes_and_header() {
    let mut g = Graph::new();
    g.set_header_info("tool", "asgraph");
    g.set_header_info("language", "java");
    let a = g.create_node("a", "Class").unwrap();
    let b = g.create_node("b", "Class").unwrap();
    let c = g.create_node("c", "Method").unwrap();

    let loc = g.int_attribute("loc", "metric", 40);
    g.add_node_attribute(a, loc).unwrap();
    let mut extra = g.composite_attribute("extra", "");
    let ratio = g.float_attribute("ratio", "", 0.25);
    extra.children_mut().unwrap().add(ratio);
    g.add_node_attribute(b, extra).unwrap();

    let e = g.create_directed_edge(c, a, "uses", true).unwrap();
    let weight = g.int_attribute("weight", "", 3);
    g.add_edge_attribute(e, weight).unwrap();
    let back = g.reverse_pair(e).unwrap();
    let note = g.string_attribute("note", "", "back");
    g.add_edge_attribute(back, note).unwrap();
    g.create_bidirected_edge(a, b, "clone").unwrap();

    let loaded = codec::load_from(to_bytes(&g).as_slice()).unwrap();
    assert_eq!(describe(&loaded), describe(&g));
    assert_eq!(loaded.edge_count(), 4);
    assert_eq!(loaded.header_info("language"), Some("java"));
    let header: Vec<(&str, &str)> = loaded.header_entries().collect();
    assert_eq!(header, vec![("tool", "asgraph"), ("language", "java")]);
}

#[test]
fn test_dangling_target_aborts_load() {
    let mut strings = StrTable::new();
    let a = strings.set("a");
    let ty = strings.set("T");
    let calls = strings.set("calls");
    let ghost = strings.set("ghost");

    let mut w = BinaryWriter::new(Vec::new());
    strings.save(&mut w).unwrap();
    w.write(0u32).unwrap();
    w.write(a.0).unwrap();
    w.write(ty.0).unwrap();
    w.write(0u32).unwrap();
    w.write(calls.0).unwrap();
    w.write(Direction::Directional as u32).unwrap();
    w.write(ghost.0).unwrap();
    w.write_bool(false).unwrap();
    w.write(0u32).unwrap();
    for _ in 0..5 {
        w.write(0u32).unwrap();
    }
    let bytes = w.into_inner();

    let err = codec::load_from(bytes.as_slice()).unwrap_err();
    assert!(matches!(err, GraphError::IoFailure(asgraph_core::CodecError::Malformed(_))));
}

#[test]
fn test_unknown_attribute_key_aborts_load() {
    let mut g = Graph::new();
    let a = g.create_node("a", "Class").unwrap();
    let stray = asgraph_core::Key(777);
    g.add_node_attribute(a, asgraph_core::Attribute::int(stray, asgraph_core::Key::EMPTY, 5))
        .unwrap();

    let err = codec::load_from(to_bytes(&g).as_slice()).unwrap_err();
    assert!(matches!(
        err,
        GraphError::IoFailure(asgraph_core::CodecError::UnknownString(k)) if k == stray
    ));
}

#[test]
fn test_save_binary_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calls.graph");
    let (g, _) = diamond();
    g.save_binary(&path).unwrap();

    let loaded = Graph::load_binary(&path).unwrap();
    assert_eq!(loaded.node_count(), 5);
    assert_eq!(loaded.edge_count(), 6);
    assert_eq!(describe(&loaded), describe(&g));
}

#[test]
fn test_header_info() {
    let mut g = Graph::new();
    g.set_header_info("k", "v1");
    g.set_header_info("k", "v2");
    assert_eq!(g.header_info("k"), Some("v2"));
    assert!(g.remove_header_info("k"));
    assert!(!g.remove_header_info("k"));
    assert_eq!(g.header_info("k"), None);
}

// ── Merge ────────────────────────────────────────────────

fn rendered(g: &Graph, attrs: Option<&asgraph_core::AttributeList>) -> Vec<String> {
    attrs.unwrap().iter().map(|a| a.render(g.strings())).collect()
}

/// a(loc=10, owner="x") -calls-> b, with weight=1 on the edge.
fn base() -> Graph {
    let mut g = Graph::new();
    g.set_header_info("tool", "asgraph");
    let a = g.create_node("a", "Class").unwrap();
    let b = g.create_node("b", "Class").unwrap();
    let loc = g.int_attribute("loc", "", 10);
    let owner = g.string_attribute("owner", "", "x");
    g.add_node_attribute(a, loc).unwrap();
    g.add_node_attribute(a, owner).unwrap();
    let e = g.create_directed_edge(a, b, "calls", false).unwrap();
    let weight = g.int_attribute("weight", "", 1);
    g.add_edge_attribute(e, weight).unwrap();
    g
}

/// Same uids in another string table, plus node c and a paired `uses`.
fn incoming() -> Graph {
    let mut g = Graph::new();
    g.intern("padding");
    g.set_header_info("tool", "other");
    g.set_header_info("language", "java");
    let c = g.create_node("c", "Method").unwrap();
    let b = g.create_node("b", "Class").unwrap();
    let a = g.create_node("a", "Class").unwrap();
    let loc = g.int_attribute("loc", "", 5);
    let x = g.string_attribute("owner", "", "x");
    let y = g.string_attribute("owner", "", "y");
    for attr in [loc, x, y] {
        g.add_node_attribute(a, attr).unwrap();
    }
    let e = g.create_directed_edge(a, b, "calls", false).unwrap();
    let weight = g.int_attribute("weight", "", 2);
    g.add_edge_attribute(e, weight).unwrap();
    let uses = g.create_directed_edge(a, c, "uses", true).unwrap();
    let back = g.reverse_pair(uses).unwrap();
    let note = g.string_attribute("note", "", "back");
    g.add_edge_attribute(back, note).unwrap();
    g
}

#[test]
fn test_merge_unions_attributes_and_adds_missing() {
    let mut g = base();
    g.merge(&incoming(), &MergeOptions::default()).unwrap();

    let a = g.find_node("a").unwrap();
    let c = g.find_node("c").unwrap();
    assert_eq!(rendered(&g, g.node_attributes(a)), vec!["loc=15", r#"owner="x""#, r#"owner="y""#]);
    assert_eq!(g.node_type(c), Some("Method"));
    assert_eq!(g.node_count(), 3);
    assert_eq!(g.edge_count(), 3);

    let calls = g.find_out_edges(a, &calls());
    assert_eq!(calls.len(), 1);
    assert_eq!(rendered(&g, g.edge_attributes(calls[0])), vec!["weight=3"]);
    let uses = g.find_out_edges(a, &[EdgeType::directional("uses")]);
    let back = g.reverse_pair(uses[0]).unwrap();
    assert_eq!(rendered(&g, g.edge_attributes(back)), vec![r#"note="back""#]);

    assert_eq!(g.header_info("tool"), Some("other"));
    assert_eq!(g.header_info("language"), Some("java"));
}

#[test]
fn test_merge_modes() {
    let rule = |mode, text, numeric| MergeOptions {
        nodes: AttributeMerge { mode, text, numeric },
        edges: AttributeMerge::default(),
    };

    let mut g = base();
    g.merge(&incoming(), &rule(MergeMode::DropNew, TextMerge::AddAll, NumericMerge::AddAll))
        .unwrap();
    let a = g.find_node("a").unwrap();
    assert_eq!(rendered(&g, g.node_attributes(a)), vec!["loc=10", r#"owner="x""#]);

    let mut g = base();
    g.merge(&incoming(), &rule(MergeMode::DropOld, TextMerge::AddAll, NumericMerge::AddAll))
        .unwrap();
    let a = g.find_node("a").unwrap();
    assert_eq!(rendered(&g, g.node_attributes(a)), vec!["loc=5", r#"owner="x""#, r#"owner="y""#]);

    let mut g = base();
    g.merge(&incoming(), &rule(MergeMode::Union, TextMerge::DropOld, NumericMerge::DropNew))
        .unwrap();
    let a = g.find_node("a").unwrap();
    assert_eq!(rendered(&g, g.node_attributes(a)), vec!["loc=10", r#"owner="y""#]);

    let mut g = base();
    g.merge(&incoming(), &rule(MergeMode::Union, TextMerge::AddAll, NumericMerge::DropOld))
        .unwrap();
    let a = g.find_node("a").unwrap();
    assert_eq!(
        rendered(&g, g.node_attributes(a)),
        vec![r#"owner="x""#, "loc=5", r#"owner="x""#, r#"owner="y""#]
    );
}

#[test]
fn test_merge_upgrades_edge_shape() {
    let mut g = Graph::new();
    let a = g.create_node("a", "Class").unwrap();
    let b = g.create_node("b", "Class").unwrap();
    let link = g.create_directed_edge(a, b, "link", false).unwrap();
    let uses = g.create_directed_edge(a, b, "uses", false).unwrap();

    let mut other = Graph::new();
    other.create_node("a", "Class").unwrap();
    other.create_node("b", "Class").unwrap();
    other.create_directed_edge_by_uid("a", "b", "uses", true).unwrap();
    let (oa, ob) = (other.find_node("a").unwrap(), other.find_node("b").unwrap());
    other.create_bidirected_edge(oa, ob, "link").unwrap();

    g.merge(&other, &MergeOptions::default()).unwrap();
    assert_eq!(g.edge_count(), 4);
    assert_eq!(g.edge_type(link), Some(EdgeType::bidirectional("link")));
    let half = g.reverse_pair(link).unwrap();
    assert_eq!(g.edge_endpoints(half), Some((b, a)));
    let back = g.reverse_pair(uses).unwrap();
    assert_eq!(g.edge_type(back), Some(EdgeType::reverse("uses")));
}

#[test]
fn test_merge_binary_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("incoming.graph");
    incoming().save_binary(&path).unwrap();

    let mut from_file = base();
    from_file.merge_binary(&path, &MergeOptions::default()).unwrap();
    let mut in_memory = base();
    in_memory.merge(&incoming(), &MergeOptions::default()).unwrap();
    assert_eq!(describe(&from_file), describe(&in_memory));

    let missing = dir.path().join("missing.graph");
    assert!(matches!(
        base().merge_binary(&missing, &MergeOptions::default()),
        Err(GraphError::IoFailure(_))
    ));
}

#[test]
fn test_copy_graph_renumbers() {
    let mut g = incoming();
    let c = g.find_node("c").unwrap();
    g.delete_nodes_by_type("Method");
    assert!(g.node(c).is_none());

    let copy = g.copy_graph().unwrap();
    assert_eq!(describe(&copy), describe(&g));
    assert_eq!(copy.nodes().collect::<Vec<_>>(), vec![NodeId(0), NodeId(1)]);
    assert_eq!(copy.header_info("language"), Some("java"));
    assert_eq!(copy.edge_count(), g.edge_count());
}
