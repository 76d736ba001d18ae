use bubbles::community::{
    select_best_cut, Algorithm, CommunityDetection, GirvanNewman, GreedyModularity, Hierarchical,
    LabelPropagation, Leiden, Louvain, GN_MAX_ITERATIONS,
};
use bubbles::metrics::{
    bubble_metrics, modularity, partition_stats, weighted_conductance, MIN_BUBBLE_SIZE,
};
use bubbles::{ErrorKind, Partition, Pipeline, PipelineConfig, QuotientGraph, QuotientWeighting};
use petgraph::graph::{NodeIndex, UnGraph};
use proptest::prelude::*;
use std::cell::Cell;

fn graph_from(n: usize, edges: &[(usize, usize)]) -> UnGraph<(), ()> {
    let mut g = UnGraph::<(), ()>::new_undirected();
    for _ in 0..n {
        let _ = g.add_node(());
    }
    for &(a, b) in edges {
        let _ = g.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
    }
    g
}

/// Three 12-cliques in a chain, one bridge edge between neighbours.
fn clique_chain() -> UnGraph<(), ()> {
    let mut edges = Vec::new();
    for c in 0..3 {
        let base = 12 * c;
        for u in 0..12 {
            for v in (u + 1)..12 {
                edges.push((base + u, base + v));
            }
        }
    }
    edges.push((11, 12));
    edges.push((23, 24));
    graph_from(36, &edges)
}

#[test]
fn quotient_counts_crossing_edges() {
    // A = {0, 1, 2}, B = {3, 4}
    let g = graph_from(5, &[(0, 3), (1, 3), (2, 4), (0, 1)]);
    let p = Partition::new(vec![0, 0, 0, 1, 1]);
    let q = QuotientGraph::build(&g, &p, QuotientWeighting::Count).unwrap();
    assert_eq!(q.node_count(), 2);
    assert_eq!(q.edge_count(), 1);
    assert_eq!(q.weight_between(0, 1), Some(3.0));
    assert_eq!(q.weight_between(0, 0), None);
}

#[test]
fn every_registered_detector_covers_the_graph() {
    let g = clique_chain();
    for name in [
        "louvain",
        "leiden",
        "label_propagation",
        "asyn_lpa",
        "greedy_modularity",
        "girvan_newman",
        "hierarchical_greedy",
        "hierarchical_girvan",
        "hierarchical:leiden+louvain",
    ] {
        let p = Algorithm::from_name(name).unwrap().detect(&g).unwrap();
        assert!(p.covers(&g), "{name}");
    }
}

#[test]
fn hierarchical_coarsens_planted_cliques() {
    let g = clique_chain();
    for meta in ["greedy_modularity", "girvan_newman"] {
        let run = Hierarchical::new(Louvain::new(), Algorithm::from_name(meta).unwrap())
            .run(&g)
            .unwrap();
        assert_eq!(run.base.community_count(), 3, "{meta}");
        // The quotient is the path A - B - C with unit weights.
        assert_eq!((run.quotient_nodes, run.quotient_edges), (3, 2));
        assert!(run.partition.community_count() < 3, "{meta}");
        for clique in 0..3 {
            let first = run.partition.labels()[12 * clique];
            assert!(run.partition.labels()[12 * clique..12 * (clique + 1)]
                .iter()
                .all(|&l| l == first));
        }

        let bubbles = bubble_metrics(&g, &run.base, MIN_BUBBLE_SIZE).unwrap();
        assert_eq!(bubbles.len(), 3);
        assert!(bubbles.iter().all(|b| b.size == 12 && b.internal_density == 1.0));
        // Outer cliques: 1 cut edge over volume 133; middle: 2 over 134.
        assert!(weighted_conductance(&bubbles) < 0.02);
    }
}

#[test]
fn four_ring_has_no_bubbles() {
    let g = graph_from(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
    let p = Partition::new(vec![0, 0, 1, 1]);
    assert!(bubble_metrics(&g, &p, MIN_BUBBLE_SIZE).unwrap().is_empty());
    let stats = partition_stats(&p);
    assert_eq!(stats.num_communities, 2);
    assert_eq!(stats.avg_community_size, 2.0);
}

#[test]
fn best_cut_search_is_bounded() {
    let evaluated = Cell::new(0usize);
    let candidates = (0..25).map(|i| Ok(Partition::new(vec![i])));
    let best = select_best_cut(candidates, GN_MAX_ITERATIONS, |p| {
        evaluated.set(evaluated.get() + 1);
        // Peaks at 15 within the window, higher values only beyond it.
        let i = p.labels()[0] as f64;
        Some(if i < 20.0 { -(i - 15.0).abs() } else { 100.0 })
    })
    .unwrap();
    assert_eq!(evaluated.get(), GN_MAX_ITERATIONS);
    assert_eq!(best.labels(), &[15]);
}

#[test]
fn girvan_newman_matches_its_own_best_split() {
    let g = clique_chain();
    let direct = GirvanNewman::new().detect(&g).unwrap();
    let manual = select_best_cut(GirvanNewman::splits(&g), GN_MAX_ITERATIONS, |p| {
        modularity(&g, p)
    })
    .unwrap();
    assert_eq!(direct, manual);
}

#[test]
fn batch_reports_failures_and_successes() {
    let config = PipelineConfig::from_yaml_str(
        "algorithms: [louvain, unknown_algo, hierarchical_greedy]\nmin_bubble_size: 12\n",
    )
    .unwrap();
    let report = Pipeline::new(config).run(&clique_chain());
    assert_eq!(report.failures(), vec![("unknown_algo", ErrorKind::InvalidParameter)]);
    let rows = report.comparison();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].num_communities, 3);
    assert_eq!(rows[1].algorithm, "hierarchical:louvain+greedy_modularity");
    assert!(rows[1].num_communities <= rows[0].num_communities);
    assert_eq!(report.get("louvain").unwrap().bubbles.len(), 3);
}

fn arb_graph() -> impl Strategy<Value = UnGraph<(), ()>> {
    (2usize..40).prop_flat_map(|n| {
        proptest::collection::vec((0..n, 0..n), 0..(4 * n)).prop_map(move |pairs| {
            let edges: Vec<(usize, usize)> = pairs.into_iter().filter(|(a, b)| a != b).collect();
            graph_from(n, &edges)
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn coarsening_is_monotone(g in arb_graph(), seed in 0u64..500) {
        let runs = vec![
            Hierarchical::new(Louvain::new(), GreedyModularity::new()).run(&g),
            Hierarchical::new(Leiden::new().with_seed(seed), GirvanNewman::new()).run(&g),
            Hierarchical::new(LabelPropagation::new().with_seed(seed), Louvain::new()).run(&g),
        ];
        for run in runs {
            let run = run.unwrap();
            prop_assert!(run.base.covers(&g));
            prop_assert!(run.partition.covers(&g));
            prop_assert_eq!(run.quotient_nodes, run.base.community_count());
            prop_assert!(run.partition.community_count() <= run.base.community_count());
        }
    }

    #[test]
    fn conductance_stays_in_unit_interval(g in arb_graph(), labels in proptest::collection::vec(0..5usize, 40)) {
        prop_assume!(g.edge_count() > 0);
        let p = Partition::new(labels[..g.node_count()].to_vec());
        for b in bubble_metrics(&g, &p, 1).unwrap() {
            prop_assert!((0.0..=1.0).contains(&b.conductance));
        }
    }
}

#[test]
fn empty_graph_error_passes_through() {
    let g = graph_from(0, &[]);
    let err = Hierarchical::new(Louvain::new(), Louvain::new())
        .detect(&g)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidGraphInput);
}
