use bubbles::community::{CommunityDetection, GirvanNewman, Hierarchical, Louvain};
use bubbles::{Pipeline, PipelineConfig};
use petgraph::graph::UnGraph;
use rand::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=info shows per-algorithm summaries.
    env_logger::init();

    // Planted partition: 6 groups of 15 nodes, dense inside, sparse across.
    let (groups, size) = (6usize, 15usize);
    let mut rng = StdRng::seed_from_u64(42);
    let mut graph = UnGraph::<usize, ()>::new_undirected();
    let nodes: Vec<_> = (0..groups * size).map(|i| graph.add_node(i)).collect();
    for u in 0..nodes.len() {
        for v in (u + 1)..nodes.len() {
            let p = if u / size == v / size { 0.4 } else { 0.01 };
            if rng.random_bool(p) {
                graph.add_edge(nodes[u], nodes[v], ());
            }
        }
    }
    println!(
        "n_nodes={} n_edges={}",
        graph.node_count(),
        graph.edge_count()
    );

    // One composition, inspected step by step.
    let run = Hierarchical::new(Louvain::new(), GirvanNewman::new()).run(&graph)?;
    println!(
        "louvain+girvan_newman: base={} quotient=({} nodes, {} edges) final={}",
        run.base.community_count(),
        run.quotient_nodes,
        run.quotient_edges,
        run.partition.community_count()
    );
    let direct = Louvain::new().detect(&graph)?;
    println!("louvain alone: {} communities", direct.community_count());

    // The whole batch, configured the way a caller would from a file.
    let config = PipelineConfig::from_yaml_str(
        r#"
algorithms:
  - louvain
  - leiden
  - asyn_lpa
  - hierarchical_greedy
  - hierarchical_girvan
  - walktrap
seed: 7
min_bubble_size: 10
"#,
    )?;
    let report = Pipeline::new(config).run(&graph);

    println!("{}", serde_json::to_string_pretty(&report.comparison())?);
    for (name, kind) in report.failures() {
        println!("skipped {name}: {kind}");
    }
    if let Some(agreement) = report.agreement("louvain", "hierarchical_greedy") {
        println!(
            "louvain vs hierarchical_greedy: nmi={:.3} ari={:.3}",
            agreement.nmi, agreement.ari
        );
    }
    if let Some(run) = report.get("leiden") {
        println!("{}", serde_json::to_string_pretty(&run.bubbles)?);
    }

    Ok(())
}
