use serde::{Deserialize, Serialize};
use crate::models::domain::{MaterialShare, ScoreOutcome};

/// Response for the compute score endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub label: Option<String>,
    pub score: f64,
    pub materials: Vec<MaterialShare>,
    pub country: String,
}

impl From<ScoreOutcome> for ScoreResponse {
    fn from(outcome: ScoreOutcome) -> Self {
        match outcome.elements {
            Some(elements) => Self {
                label: elements.label,
                score: outcome.score,
                materials: elements.materials,
                country: elements.country,
            },
            None => Self {
                label: None,
                score: outcome.score,
                materials: vec![],
                country: String::new(),
            },
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorResponse>,
}
