pub mod model;
pub mod service;

pub use model::{SearchMode, SearchParams, SearchQuery};
pub use service::*;
