//! # Forest Module
//!
//! A random forest classifier built from `linfa-trees` decision trees.
//!
//! Each tree is fitted on a bootstrap sample of the rows and a random subset
//! of the feature columns, using its own seeded RNG. Trees are fitted in
//! parallel but every tree's RNG depends only on `(seed, tree index)`, so the
//! fitted forest is identical across runs for the same data.
//!
//! Prediction is a majority vote. Vote tallies are integers and kept in a
//! `BTreeMap`, so ties always resolve to the lowest class.
//!
//! Inside a tree, `linfa-trees` picks a node's class from a `HashMap` of
//! weighted class counts, and also prunes on those picks. Rows of the lowest
//! class therefore carry a slightly larger weight, so an equal count never
//! reaches that lookup and the same seed always grows the same trees.

use crate::dataset::TrainingSet;
use linfa::prelude::*;
use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Default number of trees, matching the usual random forest default.
pub const DEFAULT_TREES: usize = 100;

/// Default base seed.
pub const DEFAULT_SEED: u64 = 42;

/// Row weight for class 0. Other classes weigh 1.0.
const LOWEST_CLASS_WEIGHT: f32 = 1.0001;

/// How many feature columns each tree sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaxFeatures {
    /// Every feature.
    #[default]
    All,
    /// Integer square root of the feature count.
    Sqrt,
    /// A fixed count, capped at the feature count.
    Fixed(usize),
}

impl MaxFeatures {
    fn resolve(self, n_features: usize) -> usize {
        match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => n_features.isqrt(),
            MaxFeatures::Fixed(n) => n.min(n_features),
        }
        .max(1)
    }
}

impl fmt::Display for MaxFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxFeatures::All => f.write_str("all"),
            MaxFeatures::Sqrt => f.write_str("sqrt"),
            MaxFeatures::Fixed(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for MaxFeatures {
    type Err = ForestError;

    /// Accepts `all`, `sqrt`, or a positive column count.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(MaxFeatures::All),
            "sqrt" => Ok(MaxFeatures::Sqrt),
            other => match other.parse::<usize>() {
                Ok(n) if n > 0 => Ok(MaxFeatures::Fixed(n)),
                _ => Err(ForestError::MaxFeatures(s.to_string())),
            },
        }
    }
}

/// Hyperparameters for [`RandomForest`] fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub max_features: MaxFeatures,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_TREES,
            max_depth: None,
            max_features: MaxFeatures::default(),
            seed: DEFAULT_SEED,
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum ForestError {
    #[error("cannot fit a forest on an empty dataset")]
    EmptyDataset,

    #[error("forest must contain at least one tree")]
    ZeroTrees,

    #[error("expected {expected} features, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("tree fitting failed: {0}")]
    Fit(String),

    #[error("forest has no fitted trees")]
    NotFitted,

    #[error("max features must be 'all', 'sqrt' or a positive count, found '{0}'")]
    MaxFeatures(String),
}

// =============================================================================
// FITTING
// =============================================================================

impl ForestParams {
    /// Default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of trees.
    #[must_use]
    pub fn n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    /// Limit tree depth. `None` grows trees until leaves are pure.
    #[must_use]
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the per-tree feature subset size.
    #[must_use]
    pub fn max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the base seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fit a forest on `set`.
    pub fn fit(&self, set: &TrainingSet) -> Result<RandomForest, ForestError> {
        if self.n_trees == 0 {
            return Err(ForestError::ZeroTrees);
        }
        if set.is_empty() || set.feature_count() == 0 {
            return Err(ForestError::EmptyDataset);
        }

        let n_features = set.feature_count();
        let subset_size = self.max_features.resolve(n_features);

        let members = (0..self.n_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(tree_idx as u64));
                self.fit_member(set, subset_size, &mut rng)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RandomForest {
            members,
            n_features,
        })
    }

    fn fit_member(
        &self,
        set: &TrainingSet,
        subset_size: usize,
        rng: &mut ChaCha8Rng,
    ) -> Result<Member, ForestError> {
        let n_samples = set.len();
        let n_features = set.feature_count();

        // Bootstrap sample, with replacement
        let rows: Vec<usize> = (0..n_samples)
            .map(|_| rng.random_range(0..n_samples))
            .collect();

        let mut features = if subset_size >= n_features {
            (0..n_features).collect::<Vec<_>>()
        } else {
            rand::seq::index::sample(rng, n_features, subset_size).into_vec()
        };
        features.sort_unstable();

        let records = set
            .records
            .select(Axis(0), &rows)
            .select(Axis(1), &features);
        let targets = set.targets.select(Axis(0), &rows);
        let weights = targets
            .iter()
            .map(|&class| if class == 0 { LOWEST_CLASS_WEIGHT } else { 1.0 })
            .collect::<Array1<f32>>();

        let tree = DecisionTree::params()
            .max_depth(self.max_depth)
            .fit(&Dataset::new(records, targets).with_weights(weights))
            .map_err(|e| ForestError::Fit(e.to_string()))?;

        Ok(Member { features, tree })
    }
}

// =============================================================================
// RANDOM FOREST
// =============================================================================

/// One tree and the feature columns it was trained on.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Member {
    features: Vec<usize>,
    tree: DecisionTree<f64, usize>,
}

/// A fitted, immutable forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    members: Vec<Member>,
    n_features: usize,
}

impl RandomForest {
    /// Number of fitted trees.
    pub fn n_trees(&self) -> usize {
        self.members.len()
    }

    /// Width of the feature vectors this forest accepts.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Per-class vote counts for a single feature row.
    pub fn votes(&self, row: &[f64]) -> Result<BTreeMap<usize, usize>, ForestError> {
        let matrix = Array1::from_vec(row.to_vec()).insert_axis(Axis(0));
        let mut tallies = self.tally(&matrix)?;
        tallies.pop().ok_or(ForestError::NotFitted)
    }

    /// Majority class for a single row and the percentage of trees that chose it.
    pub fn classify(&self, row: &[f64]) -> Result<(usize, u8), ForestError> {
        let votes = self.votes(row)?;
        decide(&votes).ok_or(ForestError::NotFitted)
    }

    /// Majority class for every row of `records`.
    pub fn predict_rows(&self, records: &Array2<f64>) -> Result<Vec<usize>, ForestError> {
        self.tally(records)?
            .iter()
            .map(|votes| decide(votes).map(|(class, _)| class))
            .collect::<Option<Vec<_>>>()
            .ok_or(ForestError::NotFitted)
    }

    /// Percentage of rows in `set` the forest classifies correctly.
    pub fn accuracy_percent(&self, set: &TrainingSet) -> Result<u8, ForestError> {
        if set.is_empty() {
            return Err(ForestError::EmptyDataset);
        }
        let predicted = self.predict_rows(&set.records)?;
        let correct = predicted
            .iter()
            .zip(set.targets.iter())
            .filter(|(p, t)| p == t)
            .count();
        Ok(percent(correct, set.len()))
    }

    fn tally(&self, records: &Array2<f64>) -> Result<Vec<BTreeMap<usize, usize>>, ForestError> {
        if self.members.is_empty() {
            return Err(ForestError::NotFitted);
        }
        if records.ncols() != self.n_features {
            return Err(ForestError::DimensionMismatch {
                expected: self.n_features,
                found: records.ncols(),
            });
        }

        let mut tallies = vec![BTreeMap::new(); records.nrows()];
        for member in &self.members {
            let view = records.select(Axis(1), &member.features);
            let classes: Array1<usize> = member.tree.predict(&view);
            for (tally, class) in tallies.iter_mut().zip(classes.iter()) {
                *tally.entry(*class).or_insert(0usize) += 1;
            }
        }
        Ok(tallies)
    }
}

/// Winning class and its vote share. Ties go to the lowest class.
fn decide(votes: &BTreeMap<usize, usize>) -> Option<(usize, u8)> {
    let total: usize = votes.values().sum();
    let mut best: Option<(usize, usize)> = None;
    for (&class, &count) in votes {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((class, count));
        }
    }
    best.map(|(class, count)| (class, percent(count, total)))
}

fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    (part.saturating_mul(100) / whole).min(100) as u8
}

// =============================================================================
// TESTS
// =============================================================================
