//! Random-forest regressor: bootstrap-sampled CART trees whose outputs are
//! averaged.
//!
//! Trees are stored as flat node arenas so a fitted forest serializes to
//! plain JSON. Every tree's RNG is derived from [`ForestParams::seed`], so
//! the same seed and data always produce the same forest.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Hyper-parameters for [`RandomForest::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    /// `None` grows each tree until its leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` means all of them.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

impl ForestParams {
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidParams`] for a zero tree count, a
    /// split minimum below 2, a zero leaf minimum, or a `max_features`
    /// outside `1..=n_features`.
    pub fn validate(&self, n_features: usize) -> Result<(), PipelineError> {
        if self.n_trees == 0 {
            return Err(PipelineError::InvalidParams(
                "n_trees must be at least 1".to_string(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(PipelineError::InvalidParams(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(PipelineError::InvalidParams(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if let Some(k) = self.max_features {
            if k == 0 || k > n_features {
                return Err(PipelineError::InvalidParams(format!(
                    "max_features must be between 1 and {n_features}, got {k}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        value: f64,
    },
    /// Rows with `row[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A single CART regression tree. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    #[must_use]
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Longest root-to-leaf path, counted in splits.
    ///
    /// Children always sit after their parent, so one backward pass sees
    /// every child before the split that points at it.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        for (idx, node) in self.nodes.iter().enumerate().rev() {
            if let Node::Split { left, right, .. } = node {
                let below = |child: &usize| depths.get(*child).copied().unwrap_or(0);
                let depth = 1 + below(left).max(below(right));
                depths[idx] = depth;
            }
        }
        depths.first().copied().unwrap_or(0)
    }

    /// Checks that every split uses a valid feature and points forward at
    /// existing nodes. Forward-only links rule out cycles, so traversal
    /// always reaches a leaf.
    fn is_well_formed(&self, n_features: usize) -> bool {
        !self.nodes.is_empty()
            && self.nodes.iter().enumerate().all(|(idx, node)| match node {
                Node::Leaf { value } => value.is_finite(),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    *feature < n_features
                        && threshold.is_finite()
                        && (idx + 1..self.nodes.len()).contains(left)
                        && (idx + 1..self.nodes.len()).contains(right)
                }
            })
    }
}

/// Candidate split found while growing a node.
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    score: f64,
}

struct TreeBuilder<'a, R> {
    x: &'a [R],
    y: &'a [f64],
    params: &'a ForestParams,
    n_features: usize,
    nodes: Vec<Node>,
}

impl<R: AsRef<[f64]>> TreeBuilder<'_, R> {
    /// Grows the subtree for `samples` and returns its node index.
    fn grow(&mut self, samples: Vec<usize>, depth: usize, rng: &mut StdRng) -> usize {
        let node_id = self.nodes.len();
        let value = mean(samples.iter().map(|&i| self.y[i]));
        self.nodes.push(Node::Leaf { value });

        let depth_exhausted = self.params.max_depth.is_some_and(|max| depth >= max);
        if depth_exhausted
            || samples.len() < self.params.min_samples_split
            || samples.len() < 2 * self.params.min_samples_leaf
            || is_pure(samples.iter().map(|&i| self.y[i]))
        {
            return node_id;
        }

        let Some(split) = self.best_split(&samples, rng) else {
            return node_id;
        };

        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| self.x[i].as_ref()[split.feature] <= split.threshold);

        let left = self.grow(left_samples, depth + 1, rng);
        let right = self.grow(right_samples, depth + 1, rng);
        self.nodes[node_id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_id
    }

    /// Finds the split that minimises the children's summed squared error.
    ///
    /// Minimising SSE is equivalent to maximising
    /// `sum_left² / n_left + sum_right² / n_right`, which avoids a second pass.
    /// Ties keep the first candidate seen.
    #[allow(clippy::cast_precision_loss)]
    fn best_split(&self, samples: &[usize], rng: &mut StdRng) -> Option<SplitCandidate> {
        let features: Vec<usize> = match self.params.max_features {
            Some(k) if k < self.n_features => {
                let mut picked = rand::seq::index::sample(rng, self.n_features, k).into_vec();
                picked.sort_unstable();
                picked
            }
            _ => (0..self.n_features).collect(),
        };

        let n = samples.len();
        let min_leaf = self.params.min_samples_leaf;
        let total_sum: f64 = samples.iter().map(|&i| self.y[i]).sum();
        let mut best: Option<SplitCandidate> = None;
        let mut column: Vec<(f64, f64)> = Vec::with_capacity(n);

        for feature in features {
            column.clear();
            column.extend(
                samples
                    .iter()
                    .map(|&i| (self.x[i].as_ref()[feature], self.y[i])),
            );
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            for pos in 1..n {
                left_sum += column[pos - 1].1;
                let (prev, next) = (column[pos - 1].0, column[pos].0);
                if prev >= next || pos < min_leaf || n - pos < min_leaf {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let score = left_sum * left_sum / pos as f64
                    + right_sum * right_sum / (n - pos) as f64;

                if best.as_ref().is_none_or(|b| score > b.score) {
                    let mut threshold = prev + (next - prev) / 2.0;
                    // Rounding can land the midpoint on `next`; fall back so
                    // `next` still goes right.
                    if threshold >= next {
                        threshold = prev;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        score,
                    });
                }
            }
        }

        best
    }
}

/// Averaged ensemble of [`RegressionTree`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    /// Fits `params.n_trees` trees, each on a bootstrap sample of the rows.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InsufficientData`] for an empty training set,
    /// [`PipelineError::InvalidParams`] for bad parameters, ragged rows, a
    /// length mismatch between `x` and `y`, or non-finite values.
    pub fn fit<R: AsRef<[f64]>>(
        x: &[R],
        y: &[f64],
        params: &ForestParams,
    ) -> Result<Self, PipelineError> {
        if x.is_empty() {
            return Err(PipelineError::InsufficientData {
                rows: 0,
                required: 1,
            });
        }
        if x.len() != y.len() {
            return Err(PipelineError::InvalidParams(format!(
                "feature rows ({}) and targets ({}) differ in length",
                x.len(),
                y.len()
            )));
        }

        let n_features = x[0].as_ref().len();
        if n_features == 0 || x.iter().any(|row| row.as_ref().len() != n_features) {
            return Err(PipelineError::InvalidParams(
                "feature rows must be non-empty and of equal length".to_string(),
            ));
        }
        if x.iter().any(|row| row.as_ref().iter().any(|v| !v.is_finite()))
            || y.iter().any(|v| !v.is_finite())
        {
            return Err(PipelineError::InvalidParams(
                "features and targets must be finite".to_string(),
            ));
        }
        params.validate(n_features)?;

        let n = x.len();
        let mut seeder = StdRng::seed_from_u64(params.seed);
        let trees = (0..params.n_trees)
            .map(|_| {
                let mut rng = StdRng::seed_from_u64(seeder.random::<u64>());
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
                let mut builder = TreeBuilder {
                    x,
                    y,
                    params,
                    n_features,
                    nodes: Vec::new(),
                };
                builder.grow(bootstrap, 0, &mut rng);
                RegressionTree {
                    nodes: builder.nodes,
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            trees = trees.len(),
            rows = n,
            mean_nodes = trees.iter().map(RegressionTree::node_count).sum::<usize>() / trees.len(),
            "fitted random forest"
        );

        Ok(Self { n_features, trees })
    }

    /// Mean of every tree's prediction for `row`.
    ///
    /// `row` must have [`Self::n_features`] entries.
    #[must_use]
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        debug_assert_eq!(row.len(), self.n_features);
        mean(self.trees.iter().map(|tree| tree.predict_row(row)))
    }

    #[must_use]
    pub fn predict<R: AsRef<[f64]>>(&self, x: &[R]) -> Vec<f64> {
        x.iter().map(|row| self.predict_row(row.as_ref())).collect()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// `true` if the forest is safe to evaluate: at least one tree, and
    /// every node reference in range. Guards deserialized artifacts.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.n_features > 0
            && !self.trees.is_empty()
            && self
                .trees
                .iter()
                .all(|tree| tree.is_well_formed(self.n_features))
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn is_pure(mut values: impl Iterator<Item = f64>) -> bool {
    match values.next() {
        Some(first) => values.all(|v| (v - first).abs() <= f64::EPSILON * first.abs().max(1.0)),
        None => true,
    }
}
