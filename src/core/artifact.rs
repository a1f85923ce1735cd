//! JSON-serialised classifier artifact.
//!
//! The artifact carries its own input schema (`feature_names`), its class values
//! and an output convention, so the rest of the crate never looks inside the
//! model itself.

use crate::domain::model::{Feature, FeatureVector, RawOutput};
use crate::domain::ports::Classifier;
use crate::utils::error::{PredictError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub name: String,
    #[serde(default)]
    pub version: String,
    pub feature_names: Vec<String>,
    /// Class values, negative class first.
    pub classes: Vec<RawOutput>,
    #[serde(default)]
    pub output: OutputConvention,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    pub model: ModelSpec,
}

fn default_threshold() -> f64 {
    0.5
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputConvention {
    /// Emit the predicted class value from `classes`.
    #[default]
    Label,
    /// Emit the positive-class probability.
    Probability,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    LogisticRegression {
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default)]
        scaler: Option<StandardScaler>,
    },
    DecisionTree {
        nodes: Vec<TreeNode>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Flat tree node. Node 0 is the root; children always follow their parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        probability: f64,
    },
}

impl ClassifierArtifact {
    /// 解析並檢查 artifact；任何問題都視為載入失敗
    pub fn from_bytes(bytes: &[u8], path: &str) -> Result<Self> {
        let artifact: ClassifierArtifact =
            serde_json::from_slice(bytes).map_err(|e| PredictError::ArtifactLoadError {
                path: path.to_string(),
                message: format!("not a valid classifier artifact: {}", e),
            })?;

        artifact
            .check_consistency()
            .map_err(|message| PredictError::ArtifactLoadError {
                path: path.to_string(),
                message,
            })?;

        Ok(artifact)
    }

    pub fn model_kind(&self) -> &'static str {
        match self.model {
            ModelSpec::LogisticRegression { .. } => "logistic_regression",
            ModelSpec::DecisionTree { .. } => "decision_tree",
        }
    }

    fn check_consistency(&self) -> std::result::Result<(), String> {
        let width = self.feature_names.len();
        if width == 0 {
            return Err("feature_names is empty".to_string());
        }
        if self.classes.len() != 2 {
            return Err(format!("expected exactly 2 classes, found {}", self.classes.len()));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(format!("threshold {} is outside [0, 1]", self.threshold));
        }

        match &self.model {
            ModelSpec::LogisticRegression {
                coefficients,
                intercept,
                scaler,
            } => {
                if coefficients.len() != width {
                    return Err(format!(
                        "{} coefficients for {} features",
                        coefficients.len(),
                        width
                    ));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err("non-finite model parameter".to_string());
                }
                if let Some(scaler) = scaler {
                    if scaler.mean.len() != width || scaler.scale.len() != width {
                        return Err("scaler length does not match feature count".to_string());
                    }
                    if scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                        return Err("scaler contains a zero or non-finite scale".to_string());
                    }
                }
            }
            ModelSpec::DecisionTree { nodes } => {
                if nodes.is_empty() {
                    return Err("decision tree has no nodes".to_string());
                }
                for (index, node) in nodes.iter().enumerate() {
                    match node {
                        TreeNode::Split {
                            feature,
                            left,
                            right,
                            ..
                        } => {
                            if *feature >= width {
                                return Err(format!("node {} splits on unknown feature {}", index, feature));
                            }
                            for child in [*left, *right] {
                                if child <= index || child >= nodes.len() {
                                    return Err(format!("node {} has invalid child {}", index, child));
                                }
                            }
                        }
                        TreeNode::Leaf { probability } => {
                            if !(0.0..=1.0).contains(probability) {
                                return Err(format!("leaf {} probability {} outside [0, 1]", index, probability));
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// The artifact's schema must list the ten measurements in input order.
    fn check_input_shape(&self) -> Result<()> {
        if self.feature_names.len() != Feature::ALL.len() {
            return Err(PredictError::InferenceError {
                message: format!(
                    "model expects {} features but the input has {}",
                    self.feature_names.len(),
                    Feature::ALL.len()
                ),
            });
        }

        for (position, (name, expected)) in self.feature_names.iter().zip(Feature::ALL).enumerate() {
            match name.parse::<Feature>() {
                Ok(feature) if feature == expected => {}
                _ => {
                    return Err(PredictError::InferenceError {
                        message: format!(
                            "model expects '{}' at position {}, input provides '{}'",
                            name, position, expected
                        ),
                    })
                }
            }
        }
        Ok(())
    }

    fn positive_probability(&self, x: &[f64]) -> f64 {
        match &self.model {
            ModelSpec::LogisticRegression {
                coefficients,
                intercept,
                scaler,
            } => {
                let z = coefficients
                    .iter()
                    .enumerate()
                    .map(|(i, w)| {
                        let value = match scaler {
                            Some(s) => (x[i] - s.mean[i]) / s.scale[i],
                            None => x[i],
                        };
                        w * value
                    })
                    .sum::<f64>()
                    + intercept;
                1.0 / (1.0 + (-z).exp())
            }
            ModelSpec::DecisionTree { nodes } => {
                let mut index = 0;
                loop {
                    match &nodes[index] {
                        TreeNode::Split {
                            feature,
                            threshold,
                            left,
                            right,
                        } => {
                            index = if x[*feature] <= *threshold { *left } else { *right };
                        }
                        TreeNode::Leaf { probability } => return *probability,
                    }
                }
            }
        }
    }
}

impl Classifier for ClassifierArtifact {
    fn predict(&self, features: &FeatureVector) -> Result<RawOutput> {
        self.check_input_shape()?;

        let probability = self.positive_probability(features.as_slice());
        if !probability.is_finite() {
            return Err(PredictError::InferenceError {
                message: "model produced a non-finite score".to_string(),
            });
        }

        Ok(match self.output {
            OutputConvention::Probability => RawOutput::Probability(probability),
            OutputConvention::Label => {
                let class = usize::from(probability >= self.threshold);
                self.classes[class].clone()
            }
        })
    }

    fn describe(&self) -> String {
        format!(
            "{} v{} ({}, {} features)",
            self.name,
            self.version,
            self.model_kind(),
            self.feature_names.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature_names() -> Vec<String> {
        Feature::ALL.iter().map(|f| f.name().to_string()).collect()
    }

    fn stump(output: OutputConvention, classes: Vec<RawOutput>) -> ClassifierArtifact {
        // concave_points_mean > 0.05 → 惡性
        ClassifierArtifact {
            name: "stump".to_string(),
            version: "1".to_string(),
            feature_names: feature_names(),
            classes,
            output,
            threshold: 0.5,
            model: ModelSpec::DecisionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature: Feature::ConcavePointsMean.index(),
                        threshold: 0.05,
                        left: 1,
                        right: 2,
                    },
                    TreeNode::Leaf { probability: 0.1 },
                    TreeNode::Leaf { probability: 0.9 },
                ],
            },
        }
    }

    fn with_concave_points(value: f64) -> FeatureVector {
        let mut values = [0.0; 10];
        values.copy_from_slice(FeatureVector::default().as_slice());
        values[Feature::ConcavePointsMean.index()] = value;
        FeatureVector::new(values).unwrap()
    }

    #[test]
    fn test_tree_emits_class_labels() {
        let artifact = stump(
            OutputConvention::Label,
            vec![RawOutput::Label("B".into()), RawOutput::Label("M".into())],
        );
        assert_eq!(
            artifact.predict(&with_concave_points(0.02)).unwrap(),
            RawOutput::Label("B".into())
        );
        assert_eq!(
            artifact.predict(&with_concave_points(0.12)).unwrap(),
            RawOutput::Label("M".into())
        );
    }

    #[test]
    fn test_tree_emits_probability() {
        let artifact = stump(
            OutputConvention::Probability,
            vec![RawOutput::Code(0), RawOutput::Code(1)],
        );
        assert_eq!(
            artifact.predict(&with_concave_points(0.12)).unwrap(),
            RawOutput::Probability(0.9)
        );
    }

    #[test]
    fn test_logistic_regression_uses_scaler() {
        let mut coefficients = vec![0.0; 10];
        coefficients[Feature::RadiusMean.index()] = 2.0;
        let artifact = ClassifierArtifact {
            name: "lr".to_string(),
            version: "1".to_string(),
            feature_names: feature_names(),
            classes: vec![RawOutput::Code(0), RawOutput::Code(1)],
            output: OutputConvention::Label,
            threshold: 0.5,
            model: ModelSpec::LogisticRegression {
                coefficients,
                intercept: 0.0,
                scaler: Some(StandardScaler {
                    mean: vec![14.0; 10],
                    scale: vec![3.5; 10],
                }),
            },
        };

        // radius 14 → z = 0 → p = 0.5 → positive class at the threshold
        assert_eq!(artifact.predict(&FeatureVector::default()).unwrap(), RawOutput::Code(1));

        let mut values = [0.0; 10];
        values.copy_from_slice(FeatureVector::default().as_slice());
        values[0] = 10.0;
        assert_eq!(
            artifact.predict(&FeatureVector::new(values).unwrap()).unwrap(),
            RawOutput::Code(0)
        );
    }

    #[test]
    fn test_schema_mismatch_is_inference_error() {
        let mut artifact = stump(
            OutputConvention::Label,
            vec![RawOutput::Code(0), RawOutput::Code(1)],
        );
        artifact.feature_names.swap(0, 1);
        let err = artifact.predict(&FeatureVector::default()).unwrap_err();
        assert!(matches!(err, PredictError::InferenceError { .. }));

        artifact.feature_names.truncate(5);
        let err = artifact.predict(&FeatureVector::default()).unwrap_err();
        assert!(matches!(err, PredictError::InferenceError { .. }));
    }

    #[test]
    fn test_from_bytes_rejects_corrupt_artifacts() {
        let err = ClassifierArtifact::from_bytes(b"\x00\x01 not json", "model.json").unwrap_err();
        assert!(matches!(err, PredictError::ArtifactLoadError { .. }));

        let cyclic = serde_json::json!({
            "name": "cyclic",
            "feature_names": feature_names(),
            "classes": [0, 1],
            "model": {
                "kind": "decision_tree",
                "nodes": [
                    {"type": "split", "feature": 0, "threshold": 1.0, "left": 0, "right": 1},
                    {"type": "leaf", "probability": 0.5}
                ]
            }
        });
        let bytes = serde_json::to_vec(&cyclic).unwrap();
        let err = ClassifierArtifact::from_bytes(&bytes, "model.json").unwrap_err();
        assert!(err.to_string().contains("invalid child"));
    }

    #[test]
    fn test_from_bytes_reads_defaults() {
        let doc = serde_json::json!({
            "name": "lr",
            "feature_names": feature_names(),
            "classes": ["B", "M"],
            "model": {
                "kind": "logistic_regression",
                "coefficients": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                "intercept": -1.0
            }
        });
        let artifact =
            ClassifierArtifact::from_bytes(&serde_json::to_vec(&doc).unwrap(), "lr.json").unwrap();
        assert_eq!(artifact.output, OutputConvention::Label);
        assert_eq!(artifact.threshold, 0.5);
        assert_eq!(artifact.predict(&FeatureVector::default()).unwrap(), RawOutput::Label("B".into()));
    }
}
