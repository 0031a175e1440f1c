use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use crate::models::{ErrorResponse, MissingPreference};
use crate::services::{FetchError, OcrError};

/// Errors raised while reading a clothing label
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LabelError {
    #[error("no material found on the label")]
    MaterialNotFound,

    #[error("no country of manufacture found on the label")]
    CountryNotFound,

    #[error("no text found on the label")]
    TextNotFound,

    #[error("material '{0}' has no percentage")]
    MissingMaterialPercentage(String),

    #[error("multiple label errors: {}", join_messages(.0))]
    MultipleLabelErrors(Vec<LabelError>),
}

fn join_messages(errors: &[LabelError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LabelError {
    /// Stable machine-readable code used in HTTP error bodies
    pub fn code(&self) -> &'static str {
        match self {
            LabelError::MaterialNotFound => "material_not_found",
            LabelError::CountryNotFound => "country_not_found",
            LabelError::TextNotFound => "text_not_found",
            LabelError::MissingMaterialPercentage(_) => "missing_material_percentage",
            LabelError::MultipleLabelErrors(_) => "multiple_label_errors",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            LabelError::MaterialNotFound
            | LabelError::CountryNotFound
            | LabelError::TextNotFound
            | LabelError::MissingMaterialPercentage(_)
            | LabelError::MultipleLabelErrors(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let details = match self {
            LabelError::MultipleLabelErrors(errors) => {
                errors.iter().map(LabelError::to_error_response).collect()
            }
            _ => vec![],
        };

        ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            status_code: self.status_code().as_u16(),
            details,
        }
    }
}

/// Errors surfaced by the compute score endpoint
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error(transparent)]
    Label(#[from] LabelError),

    #[error(transparent)]
    MissingPreference(#[from] MissingPreference),

    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    ImageFetch(#[from] FetchError),

    #[error(transparent)]
    Ocr(#[from] OcrError),
}

impl ScoreError {
    fn code(&self) -> &'static str {
        match self {
            ScoreError::Label(err) => err.code(),
            ScoreError::MissingPreference(_) => "missing_preference",
            ScoreError::Validation(_) => "validation_failed",
            ScoreError::ImageFetch(_) => "image_fetch_failed",
            ScoreError::Ocr(_) => "ocr_failed",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            ScoreError::Label(err) => err.to_error_response(),
            _ => ErrorResponse {
                error: self.code().to_string(),
                message: self.to_string(),
                status_code: self.status_code().as_u16(),
                details: vec![],
            },
        }
    }
}

impl ResponseError for ScoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            ScoreError::Label(err) => err.status_code(),
            ScoreError::MissingPreference(_) | ScoreError::Validation(_) => StatusCode::BAD_REQUEST,
            ScoreError::ImageFetch(_) | ScoreError::Ocr(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.to_error_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Preference;

    #[test]
    fn test_label_errors_map_to_unprocessable_entity() {
        let errors = [
            LabelError::MaterialNotFound,
            LabelError::CountryNotFound,
            LabelError::TextNotFound,
            LabelError::MissingMaterialPercentage("wool".to_string()),
            LabelError::MultipleLabelErrors(vec![LabelError::MaterialNotFound]),
        ];

        for err in errors {
            let response = ScoreError::from(err).error_response();
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn test_multiple_label_errors_carry_details() {
        let err = LabelError::MultipleLabelErrors(vec![
            LabelError::MaterialNotFound,
            LabelError::CountryNotFound,
        ]);
        let body = err.to_error_response();

        assert_eq!(body.error, "multiple_label_errors");
        assert_eq!(body.status_code, 422);
        assert_eq!(body.details.len(), 2);
        assert_eq!(body.details[1].error, "country_not_found");
        assert!(body.message.contains("no material found"));
    }

    #[test]
    fn test_missing_preference_is_bad_request() {
        let err = ScoreError::from(MissingPreference(Preference::Animal));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_error_response().error, "missing_preference");
    }
}
