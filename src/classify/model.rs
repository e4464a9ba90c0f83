//! The pretrained span classifier.
//!
//! The shipped model is a tree ensemble exported node-by-node: each tree is a
//! set of parallel arrays (`children_left`, `children_right`, `feature`,
//! `threshold`, `value`) where `-1` children mark a leaf and `value` holds
//! per-class weights at every node. Prediction averages the normalized leaf
//! distributions of all trees and takes the arg-max.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::features::FEATURE_COUNT;

/// One fully encoded model input row.
pub type ModelInput = [f64; FEATURE_COUNT];

/// A classifier mapping encoded rows to class indices.
///
/// Implementations must be pure: the same rows always give the same classes.
pub trait SpanModel: Send + Sync {
    /// Predict one class index per row.
    fn predict(&self, rows: &[ModelInput]) -> Result<Vec<usize>>;

    /// Number of classes this model can emit.
    fn n_classes(&self) -> usize;
}

const LEAF: i64 = -1;

/// A single decision tree in array form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights, `value[node][class]`
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    /// Check array shapes and that every path terminates in a leaf.
    fn validate(&self, index: usize, n_classes: usize) -> Result<()> {
        let invalid = |msg: String| Error::ModelArtifact(format!("tree {}: {}", index, msg));
        let n = self.node_count();
        if n == 0 {
            return Err(invalid("no nodes".into()));
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(invalid("node arrays differ in length".into()));
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if self.value[node].len() != n_classes {
                return Err(invalid(format!(
                    "node {} has {} class weights, expected {}",
                    node,
                    self.value[node].len(),
                    n_classes
                )));
            }
            match (left, right) {
                (LEAF, LEAF) => {
                    if self.value[node].iter().all(|w| *w <= 0.0) {
                        return Err(invalid(format!("leaf {} has no positive weight", node)));
                    }
                }
                (LEAF, _) | (_, LEAF) => {
                    return Err(invalid(format!("node {} has a single child", node)));
                }
                _ => {
                    // Children must point forward so every walk reaches a leaf.
                    for child in [left, right] {
                        if child <= node as i64 || child >= n as i64 {
                            return Err(invalid(format!(
                                "node {} has out-of-order child {}",
                                node, child
                            )));
                        }
                    }
                    let feature = self.feature[node];
                    if feature < 0 || feature >= FEATURE_COUNT as i64 {
                        return Err(invalid(format!(
                            "node {} splits on unknown feature {}",
                            node, feature
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf_for(&self, row: &ModelInput) -> usize {
        let mut node = 0usize;
        loop {
            let left = self.children_left[node];
            if left == LEAF {
                return node;
            }
            let feature = self.feature[node] as usize;
            node = if row[feature] <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }

    fn accumulate(&self, row: &ModelInput, probabilities: &mut [f64]) {
        let weights = &self.value[self.leaf_for(row)];
        let total: f64 = weights.iter().sum();
        for (p, w) in probabilities.iter_mut().zip(weights) {
            *p += w / total;
        }
    }
}

/// An averaged ensemble of decision trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

impl TreeEnsemble {
    /// Build and validate an ensemble.
    pub fn new(n_classes: usize, trees: Vec<DecisionTree>) -> Result<Self> {
        let model = Self { n_classes, trees };
        model.validate()?;
        Ok(model)
    }

    /// Parse and validate the JSON artifact.
    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json)
            .map_err(|e| Error::ModelArtifact(format!("classifier: {}", e)))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.n_classes == 0 {
            return Err(Error::ModelArtifact("classifier has no classes".into()));
        }
        if self.trees.is_empty() {
            return Err(Error::ModelArtifact("classifier has no trees".into()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i, self.n_classes)?;
        }
        Ok(())
    }

    /// Averaged class probabilities for one row.
    pub fn predict_proba(&self, row: &ModelInput) -> Vec<f64> {
        let mut probabilities = vec![0.0; self.n_classes];
        for tree in &self.trees {
            tree.accumulate(row, &mut probabilities);
        }
        let count = self.trees.len() as f64;
        probabilities.iter_mut().for_each(|p| *p /= count);
        probabilities
    }
}

impl SpanModel for TreeEnsemble {
    fn predict(&self, rows: &[ModelInput]) -> Result<Vec<usize>> {
        Ok(rows
            .iter()
            .map(|row| argmax(&self.predict_proba(row)))
            .collect())
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }
}

/// Index of the largest value; the first one wins ties.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
