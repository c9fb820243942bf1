//! Hugging Face text-classification Data Transfer Objects
//!
//! The endpoint answers in one of two shapes depending on the model and
//! provider version, plus an error object:
//!
//! ```json
//! [[{"label": "POSITIVE", "score": 0.998}, {"label": "NEGATIVE", "score": 0.002}]]
//! [{"label": "POSITIVE", "score": 0.998}, {"label": "NEGATIVE", "score": 0.002}]
//! {"error": "Model is currently loading", "estimated_time": 20.0}
//! ```

use serde::{Deserialize, Serialize};

/// Request body
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationRequest<'a> {
    pub inputs: &'a str,
}

/// One candidate label
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Any of the response shapes
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ClassificationResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
    Error(ApiError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub estimated_time: Option<f64>,
}
