use serde::{Deserialize, Serialize};

/// Class predicted by the model.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prediction {
    #[serde(rename = "normal")]
    Normal,
    /// The server labels the positive class in Portuguese. `"cataract"` is
    /// accepted on input but written back as `"catarata"`, so only the
    /// server's own labels round-trip unchanged.
    #[serde(rename = "catarata", alias = "cataract")]
    Cataract,
}

impl Prediction {
    /// Translation key suffix for this class.
    pub fn key(&self) -> &'static str {
        match self {
            Prediction::Normal => "normal",
            Prediction::Cataract => "cataract",
        }
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Classification returned by `/predict-base64` and `/predict`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub prediction: Prediction,
    /// Softmax probability of the predicted class, in `[0, 1]`
    pub confidence: f64,
    pub class_index: i64,
    pub message: String,
}

impl PredictionResult {
    pub fn is_cataract(&self) -> bool {
        self.prediction == Prediction::Cataract
    }

    /// Confidence as a percentage, e.g. `87.5` for `0.875`.
    pub fn confidence_percent(&self) -> f64 {
        self.confidence * 100.0
    }
}

/// JSON body of a base64 prediction request.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PredictRequest<'a> {
    pub image: &'a str,
}

/// Response of the root endpoint.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ServiceStatus {
    pub status: String,
    pub message: String,
    pub model_loaded: bool,
}

/// Body of the `/health` endpoint.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub model: Option<String>,
}

impl HealthReport {
    /// `true` when the server reports its model as loaded.
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
