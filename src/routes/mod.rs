// Route exports
pub mod score;

use actix_web::{error, web, HttpRequest, HttpResponse};
use crate::models::ErrorResponse;

pub const API_PREFIX: &str = "/v1";

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(API_PREFIX)
            .route("/health", web::get().to(score::health_check))
            .configure(score::configure),
    );
}

/// JSON extractor settings with errors rendered as [`ErrorResponse`]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(32 * 1024 * 1024)
        .error_handler(handle_json_payload_error)
}

/// Handle JSON payload errors, including undecodable base64 images
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    let body = ErrorResponse {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
        details: vec![],
    };
    error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}
