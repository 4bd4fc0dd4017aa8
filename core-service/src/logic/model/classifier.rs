//! Attack Classifier
//!
//! Supervised multi-class model, invoked only for anomalous records.
//! Output index -> category name via the Label Map.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use ort::session::Session;
use parking_lot::Mutex;
use serde::Deserialize;

use super::inference::{load_session, row_tensor};
use crate::logic::error::{ConfigurationError, InferenceError};
use crate::logic::features::AlignedVector;

// ============================================================================
// ATTACK MODEL TRAIT
// ============================================================================

/// Learned vector -> category index function
pub trait AttackModel: Send + Sync {
    fn predict_index(&self, input: &[f32]) -> Result<i64, InferenceError>;

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

// ============================================================================
// LABEL MAP
// ============================================================================

/// On-disk layouts accepted for `attack_labels.json`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LabelFile {
    /// `["BENIGN", "DDoS", ...]`, index = position
    List(Vec<String>),
    /// `{"0": "BENIGN", "1": "DDoS", ...}`
    Map(BTreeMap<String, String>),
}

/// Index <-> category name bijection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    labels: BTreeMap<i64, String>,
}

impl LabelMap {
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        let mut labels = BTreeMap::new();
        let mut names = HashSet::new();

        for (index, name) in pairs {
            let name = name.into();
            if index < 0 {
                return Err(format!("negative label index {}", index));
            }
            if name.trim().is_empty() {
                return Err(format!("empty category name for index {}", index));
            }
            if !names.insert(name.clone()) {
                return Err(format!("category '{}' mapped more than once", name));
            }
            if labels.insert(index, name).is_some() {
                return Err(format!("index {} mapped more than once", index));
            }
        }

        if labels.is_empty() {
            return Err("label map is empty".to_string());
        }

        Ok(Self { labels })
    }

    pub fn from_names<I, S>(names: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_pairs(names.into_iter().enumerate().map(|(i, n)| (i as i64, n)))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let file: LabelFile = serde_json::from_str(&raw).map_err(|e| {
            ConfigurationError::malformed(path, format!("expected a list of names or an index->name object: {}", e))
        })?;

        let map = match file {
            LabelFile::List(names) => Self::from_names(names),
            LabelFile::Map(entries) => {
                let mut pairs = Vec::with_capacity(entries.len());
                for (key, name) in entries {
                    let index: i64 = key
                        .trim()
                        .parse()
                        .map_err(|_| ConfigurationError::malformed(path, format!("label key '{}' is not an integer", key)))?;
                    pairs.push((index, name));
                }
                Self::from_pairs(pairs)
            }
        }
        .map_err(|reason| ConfigurationError::malformed(path, reason))?;

        log::info!("Label map loaded: {} attack categories", map.len());
        Ok(map)
    }

    pub fn name(&self, index: i64) -> Option<&str> {
        self.labels.get(&index).map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Option<i64> {
        self.labels.iter().find(|(_, n)| n.as_str() == name).map(|(i, _)| *i)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Category names in index order
    pub fn categories(&self) -> Vec<String> {
        self.labels.values().cloned().collect()
    }
}

// ============================================================================
// ONNX ATTACK MODEL
// ============================================================================

/// Classifier served by ONNX Runtime.
///
/// Accepts either an integer label output (skl2onnx style) or an f32
/// score tensor `[1, K]`, reduced with argmax.
pub struct OnnxAttackModel {
    session: Mutex<Session>,
    output_name: String,
    source: String,
}

impl OnnxAttackModel {
    pub fn load(model_path: &Path) -> Result<Self, ConfigurationError> {
        let session = load_session(model_path)?;
        let output_name = session.outputs[0].name.clone();

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            source: model_path.display().to_string(),
        })
    }
}

impl AttackModel for OnnxAttackModel {
    fn predict_index(&self, input: &[f32]) -> Result<i64, InferenceError> {
        let input_tensor = row_tensor(input)?;

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError(format!("Inference failed: {}", e)))?;

        let output = outputs.get(&self.output_name)
            .ok_or_else(|| InferenceError("No output".to_string()))?;

        if let Ok((_, labels)) = output.try_extract_tensor::<i64>() {
            return labels.first()
                .copied()
                .ok_or_else(|| InferenceError("Empty label output".to_string()));
        }

        let (_, scores) = output.try_extract_tensor::<f32>()
            .map_err(|e| InferenceError(format!("Extract error: {}", e)))?;

        argmax(scores)
            .map(|i| i as i64)
            .ok_or_else(|| InferenceError("Empty score output".to_string()))
    }

    fn describe(&self) -> String {
        format!("onnx:{}", self.source)
    }
}

/// Index of the largest finite score
fn argmax(scores: &[f32]) -> Option<usize> {
    scores.iter()
        .enumerate()
        .filter(|(_, s)| s.is_finite())
        .max_by(|(_, a), (_, b)| a.total_cmp(*b))
        .map(|(i, _)| i)
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// Model + label map pair
#[derive(Clone)]
pub struct AttackClassifier {
    model: Arc<dyn AttackModel>,
    labels: LabelMap,
}

impl AttackClassifier {
    pub fn new(model: Arc<dyn AttackModel>, labels: LabelMap) -> Self {
        Self { model, labels }
    }

    /// Predict the attack category of an anomalous vector
    pub fn classify_attack(&self, vector: &AlignedVector) -> Result<String, InferenceError> {
        let index = self.model.predict_index(vector.as_slice())?;

        self.labels
            .name(index)
            .map(str::to_string)
            .ok_or_else(|| InferenceError(format!(
                "Classifier index {} outside label map ({} categories)",
                index,
                self.labels.len()
            )))
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    pub fn describe(&self) -> String {
        self.model.describe()
    }
}

impl std::fmt::Debug for AttackClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttackClassifier")
            .field("model", &self.model.describe())
            .field("labels", &self.labels)
            .finish()
    }
}
