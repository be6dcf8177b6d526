use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// One scalar feature value, as produced by flattening a validated record.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

/// Flattened record handed to a scorer: feature name -> scalar value.
pub type FeatureMap = BTreeMap<String, FeatureValue>;

/// A fitted binary classifier loaded from an artifact file.
///
/// Implementations are immutable after deserialization and safe for
/// concurrent read-only use from every server worker.
#[typetag::serde(tag = "type")]
pub trait Scorer: Send + Sync + std::fmt::Debug {
    /// Probability mass assigned to the positive class, in [0.0, 1.0].
    fn positive_probability(&self, features: &FeatureMap) -> f64;

    fn kind(&self) -> &'static str;
}

/// Logistic regression over one-hot encoded text features and raw numerics.
///
/// Text features look up the weight keyed `name=value`; numeric features
/// multiply the weight keyed `name`. Keys absent from the weight table
/// (e.g. a category never seen during training) contribute nothing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinearPipeline {
    pub weights: BTreeMap<String, f64>,
    pub intercept: f64,
}

impl LinearPipeline {
    fn margin(&self, features: &FeatureMap) -> f64 {
        let mut z = self.intercept;
        for (name, value) in features {
            match value {
                FeatureValue::Text(text) => {
                    if let Some(weight) = self.weights.get(&format!("{}={}", name, text)) {
                        z += weight;
                    }
                }
                FeatureValue::Number(x) => {
                    if let Some(weight) = self.weights.get(name) {
                        z += weight * x;
                    }
                }
            }
        }
        z
    }
}

#[typetag::serde]
impl Scorer for LinearPipeline {
    fn positive_probability(&self, features: &FeatureMap) -> f64 {
        sigmoid(self.margin(features))
    }

    fn kind(&self) -> &'static str {
        "linear_pipeline"
    }
}

/// Ignores its input and always answers with the same probability.
/// Shipped as the smoke-test artifact type.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConstantBaseline {
    pub probability: f64,
}

#[typetag::serde]
impl Scorer for ConstantBaseline {
    fn positive_probability(&self, _features: &FeatureMap) -> f64 {
        self.probability
    }

    fn kind(&self) -> &'static str {
        "constant_baseline"
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Deserializes a scorer from the artifact at `path`.
///
/// Called once at startup; any failure here is fatal to the process.
pub fn load_scorer(path: &Path) -> anyhow::Result<Box<dyn Scorer>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read model artifact {}", path.display()))?;
    let scorer: Box<dyn Scorer> = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to decode model artifact {}", path.display()))?;
    Ok(scorer)
}
