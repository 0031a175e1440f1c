// Service exports
pub mod identity;
pub mod image_fetcher;
pub mod ocr;
pub mod score_client;

pub use identity::{GoogleIdentity, IdentitySource, IdentityTokenProvider, IdentityError, ServiceAccountKey};
pub use image_fetcher::{ImageFetcher, FetchError};
pub use ocr::{Ocr, OcrMode, OcrError, GoogleVisionOcr};
pub use score_client::{ScoreClient, ScoreTarget, ScoreCallResponse, ClientError, http_call_url, build_full_route};
