// Re-export model types and normalization functions
pub mod model;
pub mod service;

pub use model::{ExternalPost, ItemBatch, ItemRecord, Post};
pub use service::*;
