//! Domain types shared by the gallery handlers: stored item records, the
//! normalized post shape, tag index shards and validated search queries.
//! No I/O lives here.

pub mod posts;
pub mod query;
pub mod tags;
