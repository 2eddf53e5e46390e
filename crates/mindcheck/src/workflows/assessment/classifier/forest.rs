use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use super::super::domain::{FeatureName, FeatureVector, FEATURE_COUNT};
use super::{ClassProbability, ClassifierError, RiskClassifier, RiskLevel};

/// Failures while loading the exported forest. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("unable to read classifier artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("classifier artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("classifier was trained on features {found:?}, expected {expected:?}")]
    FeatureMismatch {
        expected: Vec<&'static str>,
        found: Vec<String>,
    },
    #[error("classifier artifact declares no classes")]
    NoClasses,
    #[error("classifier artifact class '{0}' is not a known risk label")]
    UnknownClass(String),
    #[error("classifier artifact lists class '{0}' more than once")]
    DuplicateClass(RiskLevel),
    #[error("classifier artifact contains no trees")]
    NoTrees,
    #[error("tree {tree} has no nodes")]
    EmptyTree { tree: usize },
    #[error("tree {tree} node {node} has an invalid split")]
    InvalidSplit { tree: usize, node: usize },
    #[error("tree {tree} node {node} has an invalid leaf distribution")]
    InvalidLeaf { tree: usize, node: usize },
}

#[derive(Debug, Deserialize)]
struct ForestArtifact {
    features: Vec<String>,
    classes: Vec<String>,
    trees: Vec<TreeArtifact>,
}

#[derive(Debug, Deserialize)]
struct TreeArtifact {
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Walks from the root; `x <= threshold` goes left. Children always sit after
    /// their parent, so the walk terminates.
    fn leaf_for(&self, features: &[f64]) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }
}

/// Random-forest classifier exported by the offline training job.
///
/// Class probabilities are the mean of each tree's normalized leaf distribution,
/// matching soft voting in the training library.
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    classes: Vec<RiskLevel>,
    trees: Vec<DecisionTree>,
}

impl ForestClassifier {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let classifier = Self::from_reader(BufReader::new(file))?;

        info!(
            path = %path.display(),
            trees = classifier.trees.len(),
            classes = ?classifier.classes,
            "loaded risk classifier"
        );

        Ok(classifier)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArtifactError> {
        let artifact: ForestArtifact = serde_json::from_reader(reader)?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: ForestArtifact) -> Result<Self, ArtifactError> {
        let expected: Vec<&'static str> = FeatureName::SCHEMA
            .iter()
            .map(|feature| feature.as_str())
            .collect();
        if artifact.features != expected {
            return Err(ArtifactError::FeatureMismatch {
                expected,
                found: artifact.features,
            });
        }

        if artifact.classes.is_empty() {
            return Err(ArtifactError::NoClasses);
        }
        let mut classes = Vec::with_capacity(artifact.classes.len());
        let mut seen = BTreeSet::new();
        for raw in artifact.classes {
            let class = RiskLevel::from_label(&raw).ok_or(ArtifactError::UnknownClass(raw))?;
            if !seen.insert(class) {
                return Err(ArtifactError::DuplicateClass(class));
            }
            classes.push(class);
        }

        if artifact.trees.is_empty() {
            return Err(ArtifactError::NoTrees);
        }

        let class_count = classes.len();
        let trees = artifact
            .trees
            .into_iter()
            .enumerate()
            .map(|(tree, raw)| validate_tree(tree, raw, class_count))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { classes, trees })
    }

    pub fn classes(&self) -> &[RiskLevel] {
        &self.classes
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

fn validate_tree(
    tree: usize,
    raw: TreeArtifact,
    class_count: usize,
) -> Result<DecisionTree, ArtifactError> {
    if raw.nodes.is_empty() {
        return Err(ArtifactError::EmptyTree { tree });
    }

    let node_count = raw.nodes.len();
    for (node, entry) in raw.nodes.iter().enumerate() {
        match entry {
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                let children_valid = *left > node
                    && *right > node
                    && *left < node_count
                    && *right < node_count;
                if *feature >= FEATURE_COUNT || !threshold.is_finite() || !children_valid {
                    return Err(ArtifactError::InvalidSplit { tree, node });
                }
            }
            TreeNode::Leaf { value } => {
                let weights_valid = value.len() == class_count
                    && value.iter().all(|weight| weight.is_finite() && *weight >= 0.0)
                    && value.iter().sum::<f64>() > 0.0;
                if !weights_valid {
                    return Err(ArtifactError::InvalidLeaf { tree, node });
                }
            }
        }
    }

    Ok(DecisionTree { nodes: raw.nodes })
}

impl RiskClassifier for ForestClassifier {
    fn predict_proba(
        &self,
        features: &FeatureVector,
    ) -> Result<Vec<ClassProbability>, ClassifierError> {
        let mut totals = vec![0.0; self.classes.len()];

        for tree in &self.trees {
            let leaf = tree.leaf_for(features.as_slice());
            let weight: f64 = leaf.iter().sum();
            for (total, value) in totals.iter_mut().zip(leaf) {
                *total += value / weight;
            }
        }

        let tree_count = self.trees.len() as f64;
        Ok(self
            .classes
            .iter()
            .zip(totals)
            .map(|(risk, total)| ClassProbability {
                risk: *risk,
                probability: total / tree_count,
            })
            .collect())
    }
}
