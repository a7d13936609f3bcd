//! Tag search over the externally hosted gallery index, with external
//! catalog backfill and autocomplete.

pub mod autocomplete;
pub mod cache;
pub mod engine;
pub mod error;
pub mod external;
pub mod gather;
pub mod http;
pub mod items;
pub mod store;
pub mod tags;
pub mod types;

pub use cache::{SearchCaches, ShardCache};
pub use engine::{EngineSettings, SearchEngine};
pub use error::FetchError;
pub use external::{DanbooruClient, ExternalCatalog, ExternalPage};
pub use store::{HttpIndexStore, IndexStore, MemoryIndexStore, S3IndexStore};
pub use tags::TagIndexLayout;
pub use types::{SearchResponse, SourceCounts};
