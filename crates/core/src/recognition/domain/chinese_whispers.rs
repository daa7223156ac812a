//! Chinese-Whispers label propagation over a proximity graph.
//!
//! Nodes are embedding indices; an edge joins two nodes strictly closer
//! than the threshold. Every connected node starts with its own label and
//! repeatedly adopts the most common label among its neighbours. Nodes
//! without any edge never take part and end up as singleton clusters.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::recognition::domain::embedding::{matched, Embedding};
use crate::recognition::domain::face_grouper::FaceGrouper;

pub const DEFAULT_MAX_PASSES: usize = 100;

/// Result of label propagation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Labels {
    /// Compact label per node, `None` for nodes with no edges.
    pub assignments: Vec<Option<usize>>,
    /// Number of distinct labels in `assignments`.
    pub num_labels: usize,
}

/// Undirected edges `(i, j)` with `i < j` between embeddings that match.
pub fn proximity_edges(embeddings: &[Embedding], threshold: f32) -> Vec<(usize, usize)> {
    let mut edges = Vec::new();
    for i in 0..embeddings.len() {
        for j in (i + 1)..embeddings.len() {
            if matched(&embeddings[i], &embeddings[j], threshold) {
                edges.push((i, j));
            }
        }
    }
    edges
}

/// Propagate labels over `edges` for up to `max_passes` passes, stopping
/// early once a pass changes nothing.
///
/// Nodes are visited in a fresh random order each pass. When several labels
/// are equally common among a node's neighbours, the smallest wins.
pub fn propagate_labels(
    num_nodes: usize,
    edges: &[(usize, usize)],
    max_passes: usize,
    rng: &mut impl Rng,
) -> Labels {
    let mut neighbours: Vec<Vec<usize>> = vec![Vec::new(); num_nodes];
    for &(i, j) in edges {
        if i == j {
            continue;
        }
        neighbours[i].push(j);
        neighbours[j].push(i);
    }

    let mut labels: Vec<usize> = (0..num_nodes).collect();
    let mut order: Vec<usize> = (0..num_nodes)
        .filter(|&n| !neighbours[n].is_empty())
        .collect();

    for pass in 0..max_passes {
        order.shuffle(rng);
        let mut changed = false;
        for &node in &order {
            let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
            for &n in &neighbours[node] {
                *counts.entry(labels[n]).or_default() += 1;
            }
            // BTreeMap iterates labels ascending, so the first maximum is the smallest label.
            let best = counts
                .iter()
                .fold(None, |best: Option<(usize, usize)>, (&label, &count)| match best {
                    Some((_, c)) if c >= count => best,
                    _ => Some((label, count)),
                })
                .map(|(label, _)| label);
            if let Some(label) = best {
                if label != labels[node] {
                    labels[node] = label;
                    changed = true;
                }
            }
        }
        if !changed {
            log::debug!("Label propagation converged after {} pass(es)", pass + 1);
            break;
        }
    }

    // Compact to 0..k in order of first appearance.
    let mut remap: BTreeMap<usize, usize> = BTreeMap::new();
    let mut order_seen = Vec::new();
    for n in 0..num_nodes {
        if !neighbours[n].is_empty() && !remap.contains_key(&labels[n]) {
            remap.insert(labels[n], order_seen.len());
            order_seen.push(labels[n]);
        }
    }
    let assignments = (0..num_nodes)
        .map(|n| (!neighbours[n].is_empty()).then(|| remap[&labels[n]]))
        .collect();

    Labels {
        assignments,
        num_labels: order_seen.len(),
    }
}

/// Turn propagation labels into index groups: one group per label, then
/// one singleton per unlabelled node.
pub fn into_clusters(labels: &Labels) -> Vec<Vec<usize>> {
    let mut clusters: Vec<Vec<usize>> = vec![Vec::new(); labels.num_labels];
    let mut isolated = Vec::new();
    for (node, label) in labels.assignments.iter().enumerate() {
        match label {
            Some(l) => clusters[*l].push(node),
            None => isolated.push(vec![node]),
        }
    }
    clusters.extend(isolated);
    clusters
}

/// [`FaceGrouper`] running Chinese Whispers at a fixed distance threshold.
pub struct ChineseWhispersGrouper {
    threshold: f32,
    max_passes: usize,
    seed: Option<u64>,
}

impl ChineseWhispersGrouper {
    pub fn new(threshold: f32, seed: Option<u64>) -> Self {
        Self {
            threshold,
            max_passes: DEFAULT_MAX_PASSES,
            seed,
        }
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }
}

impl FaceGrouper for ChineseWhispersGrouper {
    fn group(&self, embeddings: &[Embedding]) -> Vec<Vec<usize>> {
        let edges = proximity_edges(embeddings, self.threshold);
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let labels = propagate_labels(embeddings.len(), &edges, self.max_passes, &mut rng);
        let clusters = into_clusters(&labels);
        log::debug!(
            "Grouped {} face(s) into {} cluster(s) from {} edge(s)",
            embeddings.len(),
            clusters.len(),
            edges.len()
        );
        clusters
    }
}
