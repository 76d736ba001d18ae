//! Agreement between two partitions of the same node set.
//!
//! | Metric | Range | Identical | Properties |
//! |--------|-------|-----------|------------|
//! | [`nmi`] | [0, 1] | 1 | Normalized mutual information |
//! | [`ari`] | [-1, 1] | 1 | Adjusted Rand Index, 0 = chance |
//!
//! Both ignore the actual label values: a relabelled copy of a partition
//! scores 1. Partitions of different lengths (or empty ones) score 0.
//!
//! # References
//!
//! - Hubert & Arabie (1985). "Comparing partitions" (ARI)
//! - Strehl & Ghosh (2002). "Cluster ensembles" (NMI)

use crate::partition::Partition;
use std::collections::HashMap;

/// Normalized Mutual Information between two partitions.
///
/// ```text
/// NMI(U, V) = 2 * I(U; V) / (H(U) + H(V))
/// ```
///
/// # Example
///
/// ```rust
/// use bubbles::metrics::nmi;
/// use bubbles::Partition;
///
/// let a = Partition::new(vec![0, 0, 1, 1]);
/// let b = Partition::new(vec![7, 7, 3, 3]);
/// assert!((nmi(&a, &b) - 1.0).abs() < 1e-9);
/// ```
pub fn nmi(a: &Partition, b: &Partition) -> f64 {
    let (a, b) = (a.labels(), b.labels());
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let n_f = a.len() as f64;
    let joint = contingency_table(a, b);
    let count_a = label_counts(a);
    let count_b = label_counts(b);

    let h_a = entropy(&count_a, n_f);
    let h_b = entropy(&count_b, n_f);

    let mut mi = 0.0;
    for (&(la, lb), &count) in &joint {
        let p_joint = count as f64 / n_f;
        let p_a = count_a.get(&la).copied().unwrap_or(0) as f64 / n_f;
        let p_b = count_b.get(&lb).copied().unwrap_or(0) as f64 / n_f;
        if p_a > 0.0 && p_b > 0.0 {
            mi += p_joint * (p_joint / (p_a * p_b)).ln();
        }
    }

    let denom = h_a + h_b;
    if denom > 0.0 {
        2.0 * mi / denom
    } else {
        // Both constant
        1.0
    }
}

/// Adjusted Rand Index between two partitions.
///
/// The chance-corrected Rand Index: 0 for independent labelings, 1 for
/// identical ones.
pub fn ari(a: &Partition, b: &Partition) -> f64 {
    let (a, b) = (a.labels(), b.labels());
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    if a.len() == 1 {
        return 1.0;
    }

    let joint = contingency_table(a, b);
    let sum_comb_ij: f64 = joint.values().map(|&c| comb2(c) as f64).sum();
    let sum_comb_a: f64 = label_counts(a).values().map(|&c| comb2(c) as f64).sum();
    let sum_comb_b: f64 = label_counts(b).values().map(|&c| comb2(c) as f64).sum();
    let comb_n = comb2(a.len()) as f64;

    // ARI = (index - expected) / (max - expected)
    let expected = sum_comb_a * sum_comb_b / comb_n;
    let max_index = (sum_comb_a + sum_comb_b) / 2.0;

    let denom = max_index - expected;
    if denom.abs() < 1e-10 {
        return 1.0;
    }

    (sum_comb_ij - expected) / denom
}

fn contingency_table(a: &[usize], b: &[usize]) -> HashMap<(usize, usize), usize> {
    let mut table = HashMap::new();
    for (&la, &lb) in a.iter().zip(b) {
        *table.entry((la, lb)).or_insert(0) += 1;
    }
    table
}

fn label_counts(labels: &[usize]) -> HashMap<usize, usize> {
    let mut counts = HashMap::new();
    for &l in labels {
        *counts.entry(l).or_insert(0) += 1;
    }
    counts
}

fn entropy(counts: &HashMap<usize, usize>, n: f64) -> f64 {
    counts
        .values()
        .map(|&c| {
            let p = c as f64 / n;
            if p > 0.0 {
                -p * p.ln()
            } else {
                0.0
            }
        })
        .sum()
}

fn comb2(n: usize) -> usize {
    if n < 2 {
        0
    } else {
        n * (n - 1) / 2
    }
}
