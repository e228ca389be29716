//! JSON model files
//!
//! A model produced offline is shipped as
//!
//! ```json
//! { "input_size": 64, "output_size": 3, "scale_factor": 1.0,
//!   "weights": [ ... ], "biases": [ ... ] }
//! ```
//!
//! Shape checks are left to [`InferenceEngine::new`], so a malformed file is
//! reported with the same errors as a malformed baked table.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sgate_core::{to_fixed, to_real, InferenceEngine, Model};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelFile {
    pub input_size: usize,
    pub output_size: usize,
    pub scale_factor: f32,
    pub weights: Vec<i8>,
    pub biases: Vec<i8>,
}

impl ModelFile {
    pub fn from_model(model: &Model<'_>) -> Self {
        Self {
            input_size: model.input_size,
            output_size: model.output_size,
            scale_factor: to_real(model.scale_factor),
            weights: model.weights.to_vec(),
            biases: model.biases.to_vec(),
        }
    }

    /// Borrowing view for [`InferenceEngine::new`].
    pub fn model(&self) -> Model<'_> {
        Model::new(
            &self.weights,
            &self.biases,
            self.input_size,
            self.output_size,
            to_fixed(self.scale_factor),
        )
    }

    /// Build an engine over this file's tables.
    pub fn engine(&self) -> anyhow::Result<InferenceEngine<'_>> {
        InferenceEngine::new(self.model()).context("Invalid model")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path).with_context(|| format!("Reading model {}", path.display()))?;
        let file: ModelFile =
            serde_json::from_str(&json).with_context(|| format!("Parsing model {}", path.display()))?;
        info!(
            path = %path.display(),
            inputs = file.input_size,
            outputs = file.output_size,
            "Model loaded"
        );
        Ok(file)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Writing model {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgate_core::{GateError, DEFAULT_MODEL};

    #[test]
    fn test_default_model_survives_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.json");

        ModelFile::from_model(&DEFAULT_MODEL).save(&path).unwrap();
        let loaded = ModelFile::load(&path).unwrap();

        assert_eq!(loaded.model(), DEFAULT_MODEL);
        assert!(loaded.engine().is_ok());
    }

    #[test]
    fn test_oversized_model_rejected_by_engine() {
        let file = ModelFile {
            input_size: 1,
            output_size: 9,
            scale_factor: 1.0,
            weights: vec![1; 9],
            biases: vec![0; 9],
        };
        let err = file.engine().unwrap_err();
        assert_eq!(
            err.downcast_ref::<GateError>(),
            Some(&GateError::TooManyOutputs { configured: 9, max: 8 })
        );
    }

    #[test]
    fn test_weight_out_of_i8_range_fails_to_parse() {
        let json = r#"{"input_size":1,"output_size":1,"scale_factor":1.0,"weights":[200],"biases":[0]}"#;
        assert!(serde_json::from_str::<ModelFile>(json).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ModelFile::load(&dir.path().join("nope.json")).is_err());
    }
}
