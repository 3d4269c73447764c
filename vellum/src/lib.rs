#![deny(clippy::all)]

pub mod cache;
pub mod document;
pub mod key;
pub mod ports;

pub use cache::DocumentCache;
pub use document::{BulkWriteResult, CacheDocument, IdFilter, Projection, QueryOptions, WriteOp};
pub use key::CacheKey;
pub use ports::{Cache, DocumentStore};
