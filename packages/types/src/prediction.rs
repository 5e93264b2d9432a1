use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One ranked classifier output.
///
/// The wire names are `className`/`probability`; `label`/`confidence` are
/// accepted when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Prediction {
    #[serde(rename = "className", alias = "label")]
    pub label: String,
    #[serde(rename = "probability", alias = "confidence")]
    pub confidence: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Confidence as a percentage
    pub fn percent(&self) -> f32 {
        self.confidence * 100.0
    }
}

/// Body returned by `POST /predict`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PredictionResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}
