pub mod model;
pub mod service;

pub use model::{TagIndex, TagSuggestion};
pub use service::*;
