//! Central Configuration Constants
//!
//! Single source of truth for artifact locations and their env overrides.

/// Default artifact directory
pub const DEFAULT_ARTIFACT_DIR: &str = "models";

/// Default artifact file names inside the artifact directory
pub const FEATURE_SCHEMA_FILE: &str = "feature_names.json";
pub const BASELINE_MODEL_FILE: &str = "autoencoder.onnx";
pub const THRESHOLD_FILE: &str = "threshold.json";
pub const CLASSIFIER_MODEL_FILE: &str = "attack_classifier.onnx";
pub const LABEL_MAP_FILE: &str = "attack_labels.json";
pub const CHECKSUMS_FILE: &str = "checksums.json";

/// Environment variables
pub const ENV_ARTIFACT_DIR: &str = "FLOWGUARD_ARTIFACT_DIR";
pub const ENV_FEATURE_SCHEMA: &str = "FLOWGUARD_FEATURE_SCHEMA";
pub const ENV_BASELINE_MODEL: &str = "FLOWGUARD_BASELINE_MODEL";
pub const ENV_THRESHOLD: &str = "FLOWGUARD_THRESHOLD";
pub const ENV_CLASSIFIER_MODEL: &str = "FLOWGUARD_CLASSIFIER_MODEL";
pub const ENV_LABEL_MAP: &str = "FLOWGUARD_LABEL_MAP";
pub const ENV_CHECKSUMS: &str = "FLOWGUARD_CHECKSUMS";

/// Label strings of the external contract
pub const LABEL_BENIGN: &str = "BENIGN";
pub const LABEL_ANOMALY: &str = "ANOMALY";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "FlowGuard";

/// Get artifact directory from environment or use default
pub fn get_artifact_dir() -> String {
    std::env::var(ENV_ARTIFACT_DIR)
        .unwrap_or_else(|_| DEFAULT_ARTIFACT_DIR.to_string())
}
