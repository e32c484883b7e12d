//! Client for the cataract-detection inference API.

mod client;
mod types;

pub use client::{
    HEALTH_PATH, InferenceClient, PREDICT_BASE64_PATH, PREDICT_UPLOAD_PATH, Predictor,
};
#[cfg(test)]
pub use client::MockPredictor;
pub use types::{HealthReport, PredictRequest, Prediction, PredictionResult, ServiceStatus};
