//! CLI command implementations

use anyhow::Context;
use asgraph::{Config, asg_to_graph};
use asgraph_asg::{AsgStat, Factory, NodeId, TraceVisitor, VisitorSet};
use asgraph_graph::{Graph, MergeOptions};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

fn load_asg(path: &Path) -> anyhow::Result<Factory> {
    let factory = Factory::load(path).with_context(|| format!("cannot load ASG {}", path.display()))?;
    tracing::info!("Loaded {} nodes from {}", factory.len(), path.display());
    Ok(factory)
}

pub fn stat(path: &Path, config: &Config) -> anyhow::Result<()> {
    let factory = load_asg(path)?;
    let mut stat = AsgStat::default();
    config
        .traversal
        .preorder()
        .run(&factory, &mut stat)
        .context("traversal failed")?;

    print!("{}", stat.render());
    println!("max depth: {}", stat.max_depth);
    Ok(())
}

pub fn dump(path: &Path, start: Option<u32>, config: &Config) -> anyhow::Result<()> {
    let factory = load_asg(path)?;
    let preorder = config.traversal.preorder();
    let mut trace = TraceVisitor::default();
    let mut stat = AsgStat::default();
    let mut both = VisitorSet::new().with(&mut trace).with(&mut stat);
    let stats = match start {
        Some(id) => preorder
            .run_from(&factory, NodeId(id), &mut both)
            .with_context(|| format!("cannot walk from node {id}"))?,
        None => preorder.run(&factory, &mut both).context("traversal failed")?,
    };

    print!("{}", trace.output());
    tracing::info!(
        "Visited {} nodes from {} roots, {} edges, max depth {}",
        stats.visited,
        stats.roots,
        stat.edge_total(),
        stat.max_depth
    );
    Ok(())
}

pub fn convert(asg: &Path, out: &Path) -> anyhow::Result<()> {
    let factory = load_asg(asg)?;
    let graph = asg_to_graph(&factory).context("conversion failed")?;
    graph
        .save_binary(out)
        .with_context(|| format!("cannot write graph {}", out.display()))?;

    tracing::info!(
        "Wrote {} nodes, {} edges to {}",
        graph.node_count(),
        graph.edge_count(),
        out.display()
    );
    Ok(())
}

pub fn info(path: &Path) -> anyhow::Result<()> {
    let graph = Graph::load_binary(path).with_context(|| format!("cannot load graph {}", path.display()))?;

    for (key, value) in graph.header_entries() {
        println!("{key}: {value}");
    }
    println!("nodes: {}", graph.node_count());
    println!("edges: {}", graph.edge_count());

    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    for node in graph.nodes() {
        if let Some(ty) = graph.node_type(node) {
            *by_type.entry(ty).or_insert(0) += 1;
        }
    }
    for (ty, count) in by_type {
        println!("  {ty}: {count}");
    }
    Ok(())
}

pub fn merge(graphs: &[PathBuf], out: &Path) -> anyhow::Result<()> {
    let (base, rest) = graphs.split_first().context("no graphs to merge")?;
    let mut merged =
        Graph::load_binary(base).with_context(|| format!("cannot load graph {}", base.display()))?;
    let options = MergeOptions::default();
    for path in rest {
        merged
            .merge_binary(path, &options)
            .with_context(|| format!("cannot merge graph {}", path.display()))?;
    }
    merged
        .save_binary(out)
        .with_context(|| format!("cannot write graph {}", out.display()))?;

    tracing::info!(
        "Merged {} graphs into {} nodes, {} edges",
        graphs.len(),
        merged.node_count(),
        merged.edge_count()
    );
    Ok(())
}

pub fn filter(asg: &Path, node: u32, out: &Path) -> anyhow::Result<()> {
    let mut factory = load_asg(asg)?;
    factory
        .set_filtered(NodeId(node))
        .with_context(|| format!("cannot filter node {node}"))?;
    factory
        .save_filter(out)
        .with_context(|| format!("cannot write filter {}", out.display()))?;

    println!("filtered {} of {} nodes", factory.filter().count(), factory.len());
    Ok(())
}
