pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod image;
pub mod presentation;
pub mod runtime;

pub use api::{InferenceClient, Prediction, PredictionResult, Predictor};
pub use error::{ApiError, ClientError, EncodingError};
pub use image::ImageSource;
