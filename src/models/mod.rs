// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Preference, PreferenceRanks, MissingPreference, MaterialShare, LabelElements, ScoreOutcome};
pub use requests::{LabelMessage, SentMessage, ImageInput, images_to_base64};
pub use responses::{ScoreResponse, HealthResponse, ErrorResponse};
