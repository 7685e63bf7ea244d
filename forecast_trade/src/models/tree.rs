//! Regression tree used as the forest's base estimator

use crate::features::FEATURE_COUNT;
use rand::seq::SliceRandom;
use rand::Rng;

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    /// Maximum depth, unbounded when `None`
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs before it may be split
    pub min_samples_split: usize,
    /// Minimum samples each child of a split must keep
    pub min_samples_leaf: usize,
    /// Features evaluated per split
    pub max_features: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: FEATURE_COUNT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct BestSplit {
    feature: usize,
    threshold: f64,
    score: f64,
}

/// CART regression tree minimising squared error
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Grow a tree over the rows listed in `sample`.
    ///
    /// `sample` may repeat indices (bootstrap draws); repeats count as
    /// separate observations. Callers guarantee `sample` is non-empty and
    /// every index is within `x` and `y`.
    pub fn fit<R: Rng + ?Sized>(
        x: &[[f64; FEATURE_COUNT]],
        y: &[f64],
        sample: Vec<usize>,
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut pending = vec![(0usize, sample, 0usize)];
        let mut features: Vec<usize> = (0..FEATURE_COUNT).collect();
        let max_features = params.max_features.clamp(1, FEATURE_COUNT);

        while let Some((slot, indices, depth)) = pending.pop() {
            let value = mean(y, &indices);

            let depth_reached = params.max_depth.map_or(false, |max| depth >= max);
            if depth_reached
                || indices.len() < params.min_samples_split.max(2)
                || indices.len() < 2 * params.min_samples_leaf.max(1)
                || is_pure(y, &indices)
            {
                nodes[slot] = Node::Leaf { value };
                continue;
            }

            features.shuffle(rng);
            let best = features[..max_features]
                .iter()
                .filter_map(|&feature| best_split(x, y, &indices, feature, params))
                .fold(None, |best: Option<BestSplit>, candidate| match best {
                    Some(b) if b.score >= candidate.score => Some(b),
                    _ => Some(candidate),
                });

            let Some(best) = best else {
                nodes[slot] = Node::Leaf { value };
                continue;
            };

            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = indices
                .into_iter()
                .partition(|&i| x[i][best.feature] <= best.threshold);

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf { value: 0.0 });
            nodes.push(Node::Leaf { value: 0.0 });
            nodes[slot] = Node::Split {
                feature: best.feature,
                threshold: best.threshold,
                left,
                right,
            };

            pending.push((right, right_rows, depth + 1));
            pending.push((left, left_rows, depth + 1));
        }

        Self { nodes }
    }

    /// Predict the target for one feature vector
    pub fn predict(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[feature] <= threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Length of the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            match self.nodes[idx] {
                Node::Leaf { .. } => deepest = deepest.max(depth),
                Node::Split { left, right, .. } => {
                    stack.push((left, depth + 1));
                    stack.push((right, depth + 1));
                }
            }
        }
        deepest
    }
}

fn mean(y: &[f64], indices: &[usize]) -> f64 {
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

fn is_pure(y: &[f64], indices: &[usize]) -> bool {
    let first = y[indices[0]];
    indices.iter().all(|&i| y[i] == first)
}

/// Best threshold on one feature, scored by `sum_l^2 / n_l + sum_r^2 / n_r`,
/// which orders splits the same way as the reduction in squared error.
fn best_split(
    x: &[[f64; FEATURE_COUNT]],
    y: &[f64],
    indices: &[usize],
    feature: usize,
    params: &TreeParams,
) -> Option<BestSplit> {
    let mut sorted = indices.to_vec();
    sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

    let n = sorted.len();
    let min_leaf = params.min_samples_leaf.max(1);
    let total: f64 = sorted.iter().map(|&i| y[i]).sum();

    let mut best: Option<BestSplit> = None;
    let mut left_sum = 0.0;

    for pos in 1..n {
        left_sum += y[sorted[pos - 1]];

        let lower = x[sorted[pos - 1]][feature];
        let upper = x[sorted[pos]][feature];
        if pos < min_leaf || n - pos < min_leaf || upper <= lower {
            continue;
        }

        let right_sum = total - left_sum;
        let score = left_sum * left_sum / pos as f64 + right_sum * right_sum / (n - pos) as f64;

        if best.map_or(true, |b| score > b.score) {
            let mut threshold = lower + (upper - lower) / 2.0;
            if threshold >= upper || !threshold.is_finite() {
                threshold = lower;
            }
            best = Some(BestSplit {
                feature,
                threshold,
                score,
            });
        }
    }

    best
}
