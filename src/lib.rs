//! Label Score - clothing label OCR and sustainability scoring service
//!
//! This library reads clothing label images, extracts materials and country
//! of manufacture, and scores the garment against a user's ranked
//! preferences. It also ships the client used to call a deployed instance.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Interpreter, Scorer, ScorePipeline};
pub use error::{LabelError, ScoreError};
pub use models::{LabelMessage, ScoreResponse, Preference, PreferenceRanks};
pub use services::{ScoreClient, ScoreTarget, http_call_url, build_full_route};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        assert_eq!(
            build_full_route("/score", routes::score::Route::POST_COMPUTE_SCORE),
            "/v1/score/post_compute_score"
        );
    }
}
