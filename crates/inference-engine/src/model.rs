//! Regression Models

use crate::artifact::Model;
use crate::InferenceError;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ordinary linear model: `intercept + x · coefficients`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearRegressor {
    fn predict(&self, features: &Array2<f64>) -> Vec<f64> {
        let coefficients = ArrayView1::from(self.coefficients.as_slice());
        features
            .dot(&coefficients)
            .iter()
            .map(|v| v + self.intercept)
            .collect()
    }
}

/// Node of a regression tree. Children are indices into the tree's node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Go left when `x[feature] <= threshold`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Single regression tree, root at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn evaluate(&self, row: ArrayView1<'_, f64>) -> Result<f64, InferenceError> {
        let mut index = 0;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = row.get(*feature).ok_or_else(|| {
                        InferenceError::InferenceFailed(format!(
                            "split on feature {} outside {} inputs",
                            feature,
                            row.len()
                        ))
                    })?;
                    index = if *x <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(InferenceError::InferenceFailed(format!(
                        "tree node {} does not exist",
                        index
                    )))
                }
            }
        }
        Err(InferenceError::InferenceFailed(
            "tree does not terminate in a leaf".to_string(),
        ))
    }
}

/// How tree outputs combine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Aggregation {
    /// Average of tree outputs (random forest)
    Mean,
    /// `base_score + learning_rate * sum` of tree outputs (gradient boosting)
    Sum { base_score: f64, learning_rate: f64 },
}

/// Ensemble of regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub n_features: usize,
    pub trees: Vec<RegressionTree>,
    pub aggregation: Aggregation,
}

impl TreeEnsemble {
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<f64>, InferenceError> {
        if self.trees.is_empty() {
            return Err(InferenceError::InferenceFailed(
                "ensemble has no trees".to_string(),
            ));
        }

        features
            .rows()
            .into_iter()
            .map(|row| {
                let total = self
                    .trees
                    .iter()
                    .map(|tree| tree.evaluate(row))
                    .sum::<Result<f64, _>>()?;
                Ok(match self.aggregation {
                    Aggregation::Mean => total / self.trees.len() as f64,
                    Aggregation::Sum {
                        base_score,
                        learning_rate,
                    } => base_score + learning_rate * total,
                })
            })
            .collect()
    }
}

/// Persisted regression model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Regressor {
    Linear(LinearRegressor),
    TreeEnsemble(TreeEnsemble),
}

impl Regressor {
    /// Number of input features the model was fitted on
    pub fn n_features(&self) -> usize {
        match self {
            Regressor::Linear(m) => m.coefficients.len(),
            Regressor::TreeEnsemble(m) => m.n_features,
        }
    }
}

impl Model for Regressor {
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<f64>, InferenceError> {
        if features.ncols() != self.n_features() {
            return Err(InferenceError::InvalidInputShape {
                expected: self.n_features(),
                actual: features.ncols(),
            });
        }

        debug!("{} predicting {} rows", self.name(), features.nrows());
        match self {
            Regressor::Linear(m) => Ok(m.predict(features)),
            Regressor::TreeEnsemble(m) => m.predict(features),
        }
    }

    fn name(&self) -> &str {
        match self {
            Regressor::Linear(_) => "LinearRegression",
            Regressor::TreeEnsemble(TreeEnsemble {
                aggregation: Aggregation::Mean,
                ..
            }) => "RandomForestRegressor",
            Regressor::TreeEnsemble(_) => "GradientBoostingRegressor",
        }
    }
}
