// Core pipeline exports
pub mod interpreter;
pub mod pipeline;
pub mod scorer;

pub use interpreter::Interpreter;
pub use pipeline::ScorePipeline;
pub use scorer::{Scorer, MaterialProfile};
