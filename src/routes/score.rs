use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;
use crate::core::ScorePipeline;
use crate::error::ScoreError;
use crate::models::{HealthResponse, LabelMessage, PreferenceRanks, ScoreResponse};
use crate::services::ImageFetcher;

pub const SCORE_PREFIX: &str = "/score";

/// Routes under [`SCORE_PREFIX`]
pub struct Route;

impl Route {
    pub const POST_COMPUTE_SCORE: &'static str = "/post_compute_score";
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ScorePipeline>,
    pub fetcher: ImageFetcher,
    pub retry_with_google_bounding_polys: bool,
}

/// Configure all score-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(SCORE_PREFIX)
            .route(Route::POST_COMPUTE_SCORE, web::post().to(post_compute_score)),
    );
}

/// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Compute score endpoint
///
/// POST /v1/score/post_compute_score
///
/// Request body:
/// ```json
/// {
///   "images": ["<base64>"],
///   "images_urls": ["https://..."],
///   "images_labels": ["100% cotton made in portugal"],
///   "preferences": ["environment", "societal", "animal", "health"],
///   "user_id": "string"
/// }
/// ```
///
/// URL images are fetched first, in order, then inline images follow.
async fn post_compute_score(
    state: web::Data<AppState>,
    req: web::Json<LabelMessage>,
) -> Result<HttpResponse, ScoreError> {
    let request_id = uuid::Uuid::new_v4();
    let message = req.into_inner();

    if let Err(errors) = message.validate() {
        tracing::info!("[{}] Validation failed for post_compute_score: {}", request_id, errors);
        return Err(errors.into());
    }

    let ranks = PreferenceRanks::from_preferences(&message.preferences)?;

    tracing::info!(
        "[{}] Computing score for user {}: {} urls, {} images, {} labels",
        request_id,
        message.user_id,
        message.images_urls.as_ref().map_or(0, Vec::len),
        message.images.as_ref().map_or(0, Vec::len),
        message.images_labels.as_ref().map_or(0, Vec::len)
    );

    let mut images_bytes = match &message.images_urls {
        Some(urls) => state.fetcher.fetch_all(urls).await.map_err(|e| {
            tracing::error!("[{}] Failed to fetch images: {}", request_id, e);
            e
        })?,
        None => vec![],
    };
    if let Some(images) = message.images {
        images_bytes.extend(images);
    }

    let outcome = state
        .pipeline
        .ocr_and_compute_images_score(
            &ranks,
            message.images_labels.as_deref(),
            &images_bytes,
            state.retry_with_google_bounding_polys,
            true,
        )
        .await
        .map_err(|e| {
            tracing::info!("[{}] Could not score label: {}", request_id, e);
            e
        })?;

    tracing::info!("[{}] Score {} for user {}", request_id, outcome.score, message.user_id);

    Ok(HttpResponse::Ok().json(ScoreResponse::from(outcome)))
}
