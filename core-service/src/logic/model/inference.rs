//! Reconstruction Scorer - ONNX Runtime Integration
//!
//! Feeds the aligned vector through the learned encoder/decoder and reduces
//! the reconstruction to one scalar: the mean squared error.
//! Tách riêng model (trait) khỏi scorer để dễ swap model trong test.

use std::path::Path;
use std::sync::Arc;

use ndarray::Array2;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;
use parking_lot::Mutex;

use crate::logic::error::{ConfigurationError, InferenceError};
use crate::logic::features::AlignedVector;

// ============================================================================
// BASELINE MODEL TRAIT
// ============================================================================

/// Learned vector -> vector function (encode + decode).
///
/// Loaded once, shared read-only across all requests.
pub trait BaselineModel: Send + Sync {
    fn reconstruct(&self, input: &[f32]) -> Result<Vec<f32>, InferenceError>;

    /// Short description for status/logs
    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

// ============================================================================
// ONNX SESSION HELPERS
// ============================================================================

/// Build an ONNX Runtime session from file
pub(crate) fn load_session(model_path: &Path) -> Result<Session, ConfigurationError> {
    log::info!("Loading ONNX model from: {}", model_path.display());

    let fail = |reason: String| ConfigurationError::ModelLoad {
        path: model_path.to_path_buf(),
        reason,
    };

    let session = Session::builder()
        .map_err(|e| fail(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| fail(format!("Failed to set optimization: {}", e)))?
        .commit_from_file(model_path)
        .map_err(|e| fail(format!("Failed to load model: {}", e)))?;

    if session.outputs.is_empty() {
        return Err(fail("model defines no outputs".to_string()));
    }

    log::info!("ONNX model loaded successfully");
    Ok(session)
}

/// Wrap a single row as a `[1, N]` f32 tensor
pub(crate) fn row_tensor(input: &[f32]) -> Result<Value, InferenceError> {
    let array = Array2::<f32>::from_shape_vec((1, input.len()), input.to_vec())
        .map_err(|e| InferenceError(format!("Array error: {}", e)))?;

    let tensor = Value::from_array(array)
        .map_err(|e| InferenceError(format!("Tensor error: {}", e)))?;

    Ok(tensor.into_dyn())
}

// ============================================================================
// ONNX BASELINE
// ============================================================================

/// Autoencoder served by ONNX Runtime.
///
/// `Session::run` needs exclusive access, so the session sits behind a mutex.
pub struct OnnxBaseline {
    session: Mutex<Session>,
    output_name: String,
    source: String,
}

impl OnnxBaseline {
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

impl BaselineModel for OnnxBaseline {
    fn reconstruct(&self, input: &[f32]) -> Result<Vec<f32>, InferenceError> {
        let input_tensor = row_tensor(input)?;

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError(format!("Inference failed: {}", e)))?;

        let output = outputs.get(&self.output_name)
            .ok_or_else(|| InferenceError("No output".to_string()))?;

        let (_, data) = output.try_extract_tensor::<f32>()
            .map_err(|e| InferenceError(format!("Extract error: {}", e)))?;

        Ok(data.to_vec())
    }

    fn describe(&self) -> String {
        format!("onnx:{}", self.source)
    }
}

// ============================================================================
// SCORER
// ============================================================================

/// Mean squared error between input and reconstruction across all dimensions.
///
/// Accumulated in f32, the precision the threshold is calibrated at.
/// Widened to f64 only for the return.
pub fn reconstruction_error(input: &[f32], reconstructed: &[f32]) -> Result<f64, InferenceError> {
    if input.is_empty() {
        return Err(InferenceError("Empty input vector".to_string()));
    }

    if reconstructed.len() != input.len() {
        return Err(InferenceError(format!(
            "Shape mismatch: input has {} features, reconstruction has {}",
            input.len(),
            reconstructed.len()
        )));
    }

    let mut mse: f32 = 0.0;
    for (&original, &recon) in input.iter().zip(reconstructed) {
        let diff = original - recon;
        mse += diff * diff;
    }
    mse /= input.len() as f32;

    if !mse.is_finite() {
        return Err(InferenceError("Reconstruction error is not finite".to_string()));
    }

    Ok(mse as f64)
}

/// Applies the Baseline Model and reduces to MSE. Deterministic, no state.
#[derive(Clone)]
pub struct ReconstructionScorer {
    model: Arc<dyn BaselineModel>,
}

impl ReconstructionScorer {
    pub fn new(model: Arc<dyn BaselineModel>) -> Self {
        Self { model }
    }

    pub fn score(&self, vector: &AlignedVector) -> Result<f64, InferenceError> {
        let input = vector.as_slice();
        let reconstructed = self.model.reconstruct(input)?;
        reconstruction_error(input, &reconstructed)
    }

    pub fn describe(&self) -> String {
        self.model.describe()
    }
}

impl std::fmt::Debug for ReconstructionScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconstructionScorer")
            .field("model", &self.model.describe())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{align, FeatureRecord, FeatureSchema};
    use crate::logic::model::onnx_fixtures;
    use tempfile::tempdir;

    /// Reconstructs every input as a constant vector
    struct ConstantModel(f32);

    impl BaselineModel for ConstantModel {
        fn reconstruct(&self, input: &[f32]) -> Result<Vec<f32>, InferenceError> {
            Ok(vec![self.0; input.len()])
        }
    }

    /// Drops the last dimension, like a model exported for another schema
    struct TruncatingModel;

    impl BaselineModel for TruncatingModel {
        fn reconstruct(&self, input: &[f32]) -> Result<Vec<f32>, InferenceError> {
            Ok(input[..input.len() - 1].to_vec())
        }
    }

    fn vector(values: &[(&str, f32)]) -> AlignedVector {
        let schema = FeatureSchema::new(values.iter().map(|(n, _)| *n)).unwrap();
        let record: FeatureRecord = values.iter().map(|(n, v)| (*n, *v)).collect();
        align(&record, &schema).unwrap()
    }

    #[test]
    fn test_mse_formula() {
        let mse = reconstruction_error(&[1.0, 2.0, 3.0, 4.0], &[1.0, 0.0, 3.0, 0.0]).unwrap();
        // (0 + 4 + 0 + 16) / 4
        assert!((mse - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_reconstruction_scores_zero() {
        let mse = reconstruction_error(&[0.25, -1.0], &[0.25, -1.0]).unwrap();
        assert_eq!(mse, 0.0);
    }

    #[test]
    fn test_shape_mismatch_is_inference_error() {
        assert!(reconstruction_error(&[1.0, 2.0], &[1.0]).is_err());
        assert!(reconstruction_error(&[], &[]).is_err());

        let scorer = ReconstructionScorer::new(Arc::new(TruncatingModel));
        let err = scorer.score(&vector(&[("a", 1.0), ("b", 2.0)])).unwrap_err();
        assert!(err.0.contains("Shape mismatch"));
    }

    #[test]
    fn test_non_finite_reconstruction_is_rejected() {
        let scorer = ReconstructionScorer::new(Arc::new(ConstantModel(f32::NAN)));
        assert!(scorer.score(&vector(&[("a", 1.0)])).is_err());
    }

    #[test]
    fn test_scorer_is_deterministic() {
        let scorer = ReconstructionScorer::new(Arc::new(ConstantModel(0.5)));
        let v = vector(&[("a", 1.0), ("b", 0.0), ("c", 0.5)]);

        let first = scorer.score(&v).unwrap();
        let second = scorer.score(&v).unwrap();
        assert_eq!(first, second);
        // (0.25 + 0.25 + 0) / 3, within f32 precision
        assert!((first - 0.5 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_mse_is_accumulated_in_f32() {
        let input = [0.1_f32, 0.2, 0.3];
        let mse = reconstruction_error(&input, &[0.0; 3]).unwrap();

        let expected = (0.1_f32 * 0.1 + 0.2_f32 * 0.2 + 0.3_f32 * 0.3) / 3.0;
        assert_eq!(mse, expected as f64);
    }

    #[test]
    fn test_onnx_baseline_returns_first_output() {
        let dir = tempdir().unwrap();
        let path = onnx_fixtures::write(dir.path(), "autoencoder.onnx", &onnx_fixtures::identity(3));

        let model = OnnxBaseline::load(&path).unwrap();
        assert_eq!(model.reconstruct(&[0.5, -1.0, 2.0]).unwrap(), vec![0.5, -1.0, 2.0]);

        let scorer = ReconstructionScorer::new(Arc::new(model));
        assert_eq!(scorer.score(&vector(&[("a", 1.0), ("b", 2.0), ("c", 3.0)])).unwrap(), 0.0);
        assert!(scorer.describe().ends_with("autoencoder.onnx"));
    }

    #[test]
    fn test_onnx_zero_reconstruction_scores_mean_square() {
        let dir = tempdir().unwrap();
        let path = onnx_fixtures::write(dir.path(), "autoencoder.onnx", &onnx_fixtures::zeros(2));

        let scorer = ReconstructionScorer::new(Arc::new(OnnxBaseline::load(&path).unwrap()));
        // (1 + 9) / 2
        assert_eq!(scorer.score(&vector(&[("a", 1.0), ("b", 3.0)])).unwrap(), 5.0);
    }

    #[test]
    fn test_unreadable_model_is_configuration_error() {
        let dir = tempdir().unwrap();
        let path = onnx_fixtures::write(dir.path(), "autoencoder.onnx", b"not a model");

        let err = OnnxBaseline::load(&path).err().unwrap();
        assert!(matches!(err, ConfigurationError::ModelLoad { .. }));
    }
}
