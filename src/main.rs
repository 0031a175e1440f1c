use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use label_score::config::Settings;
use label_score::core::{Interpreter, ScorePipeline, Scorer};
use label_score::routes::{self, score::AppState};
use label_score::services::{GoogleVisionOcr, ImageFetcher};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting label score service...");

    let settings = Settings::load().map_err(|e| startup_error("Failed to load configuration", e))?;

    info!("Configuration loaded successfully");

    if settings.ocr.api_key.is_none() {
        error!("No OCR API key configured (GOOGLE_API_KEY), OCR calls will be rejected");
    }

    let ocr = GoogleVisionOcr::new(
        settings.ocr.endpoint.clone(),
        settings.ocr.api_key.clone(),
        Duration::from_secs(settings.ocr.timeout_secs),
    )
    .map_err(|e| startup_error("Failed to create OCR client", e))?;

    let interpreter = Interpreter::new().map_err(|e| startup_error("Failed to build label interpreter", e))?;

    let pipeline = Arc::new(ScorePipeline::new(
        Arc::new(ocr),
        interpreter,
        Scorer::new(),
        settings.compute_score.max_attempts,
    ));

    info!(
        "Pipeline initialized (max attempts: {}, bounding poly retry: {})",
        pipeline.max_attempts(),
        settings.compute_score.retry_with_google_bounding_polys
    );

    let fetcher = ImageFetcher::new(settings.fetch.timeout_secs.map(Duration::from_secs))
        .map_err(|e| startup_error("Failed to create image fetcher", e))?;

    let app_state = AppState {
        pipeline,
        fetcher,
        retry_with_google_bounding_polys: settings.compute_score.retry_with_google_bounding_polys,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
