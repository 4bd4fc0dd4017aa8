//! Inference Context
//!
//! Owns every loaded artifact for the process lifetime. Constructed once by
//! the entry point, then shared by reference (`Arc`) with every request.
//! Nothing in here is mutated after construction.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    self, BASELINE_MODEL_FILE, CHECKSUMS_FILE, CLASSIFIER_MODEL_FILE, FEATURE_SCHEMA_FILE, LABEL_MAP_FILE,
    THRESHOLD_FILE,
};
use crate::logic::error::ConfigurationError;
use crate::logic::features::{FeatureSchema, LayoutInfo};
use crate::logic::model::{
    AttackClassifier, AttackModel, BaselineModel, ChecksumManifest, DecisionThreshold, LabelMap, OnnxAttackModel,
    OnnxBaseline, ReconstructionScorer,
};

// ============================================================================
// ARTIFACT PATHS
// ============================================================================

/// Where each artifact lives on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub feature_schema: PathBuf,
    pub baseline_model: PathBuf,
    pub threshold: PathBuf,
    pub classifier_model: PathBuf,
    pub label_map: PathBuf,
    /// Optional manifest; verified only when the file exists
    pub checksums: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            feature_schema: dir.join(FEATURE_SCHEMA_FILE),
            baseline_model: dir.join(BASELINE_MODEL_FILE),
            threshold: dir.join(THRESHOLD_FILE),
            classifier_model: dir.join(CLASSIFIER_MODEL_FILE),
            label_map: dir.join(LABEL_MAP_FILE),
            checksums: dir.join(CHECKSUMS_FILE),
        }
    }

    /// `FLOWGUARD_ARTIFACT_DIR` plus per-file overrides
    pub fn from_env() -> Self {
        Self::in_dir(constants::get_artifact_dir()).with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply per-file overrides from a lookup (env vars in production)
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let slots: [(&str, &mut PathBuf); 6] = [
            (constants::ENV_FEATURE_SCHEMA, &mut self.feature_schema),
            (constants::ENV_BASELINE_MODEL, &mut self.baseline_model),
            (constants::ENV_THRESHOLD, &mut self.threshold),
            (constants::ENV_CLASSIFIER_MODEL, &mut self.classifier_model),
            (constants::ENV_LABEL_MAP, &mut self.label_map),
            (constants::ENV_CHECKSUMS, &mut self.checksums),
        ];

        for (key, slot) in slots {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *slot = PathBuf::from(value);
            }
        }

        self
    }

    fn required(&self) -> [&Path; 5] {
        [
            &self.feature_schema,
            &self.threshold,
            &self.label_map,
            &self.baseline_model,
            &self.classifier_model,
        ]
    }

    /// Every required artifact exists; reports all missing paths at once
    pub fn check_present(&self) -> Result<(), ConfigurationError> {
        let missing: Vec<PathBuf> = self
            .required()
            .iter()
            .filter(|p| !p.is_file())
            .map(|p| p.to_path_buf())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError::MissingArtifacts { paths: missing })
        }
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::in_dir(constants::DEFAULT_ARTIFACT_DIR)
    }
}

// ============================================================================
// MODEL METADATA
// ============================================================================

/// What got loaded, for status endpoints and logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    #[serde(flatten)]
    pub layout: LayoutInfo,
    pub threshold: f64,
    pub attack_categories: Vec<String>,
    pub baseline_model: String,
    pub attack_model: String,
    /// File name -> SHA-256 (empty for in-memory contexts)
    pub artifact_digests: BTreeMap<String, String>,
    pub loaded_at: DateTime<Utc>,
}

// ============================================================================
// INFERENCE CONTEXT
// ============================================================================

#[derive(Debug)]
pub struct InferenceContext {
    schema: FeatureSchema,
    scorer: ReconstructionScorer,
    threshold: DecisionThreshold,
    classifier: AttackClassifier,
    metadata: ModelMetadata,
}

impl InferenceContext {
    /// Load every artifact. Any failure is fatal: no partially loaded context exists.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ConfigurationError> {
        log::info!("Loading inference artifacts...");

        paths.check_present()?;

        let manifest = if paths.checksums.is_file() {
            let manifest = ChecksumManifest::load(&paths.checksums)?;
            log::info!("Checksum manifest loaded: {} entries", manifest.len());
            manifest
        } else {
            ChecksumManifest::default()
        };

        let mut digests = BTreeMap::new();
        for path in paths.required() {
            let digest = manifest.verify(path)?;
            digests.insert(file_label(path), digest);
        }

        let schema = FeatureSchema::load(&paths.feature_schema)?;
        let threshold = DecisionThreshold::load(&paths.threshold)?;
        let labels = LabelMap::load(&paths.label_map)?;
        let baseline: Arc<dyn BaselineModel> = Arc::new(OnnxBaseline::load(&paths.baseline_model)?);
        let attack_model: Arc<dyn AttackModel> = Arc::new(OnnxAttackModel::load(&paths.classifier_model)?);

        let mut context = Self::from_parts(schema, baseline, threshold, AttackClassifier::new(attack_model, labels));
        context.metadata.artifact_digests = digests;

        log::info!(
            "Inference context ready: {} features, threshold {:.6}, {} attack categories",
            context.schema.len(),
            context.threshold.value(),
            context.classifier.labels().len()
        );

        Ok(context)
    }

    /// Assemble a context from already-built parts (in-memory models, tests)
    pub fn from_parts(
        schema: FeatureSchema,
        baseline: Arc<dyn BaselineModel>,
        threshold: DecisionThreshold,
        classifier: AttackClassifier,
    ) -> Self {
        let scorer = ReconstructionScorer::new(baseline);

        let metadata = ModelMetadata {
            layout: schema.info(),
            threshold: threshold.value(),
            attack_categories: classifier.labels().categories(),
            baseline_model: scorer.describe(),
            attack_model: classifier.describe(),
            artifact_digests: BTreeMap::new(),
            loaded_at: Utc::now(),
        };

        Self {
            schema,
            scorer,
            threshold,
            classifier,
            metadata,
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn scorer(&self) -> &ReconstructionScorer {
        &self.scorer
    }

    pub fn threshold(&self) -> DecisionThreshold {
        self.threshold
    }

    pub fn classifier(&self) -> &AttackClassifier {
        &self.classifier
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}
