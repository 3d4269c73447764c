use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire shape of one cache entry in the backing collection.
///
/// `id` is the canonical key and acts as the document's primary identity.
/// `data` is opaque to this layer; its encoding belongs to the value type.
/// `expire_at` is the absolute instant after which the entry is logically
/// absent; `None` means the entry never expires. Expired documents are
/// physically removed by the store's own expiration sweep, not by read-time
/// checks in this layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheDocument<V> {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<V>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<DateTime<Utc>>,
}

/// Equality or set-membership filter on the identity field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdFilter {
    Eq(String),
    In(Vec<String>),
    All,
}

/// Which fields the store should return. The identity field is always
/// included, matching the projection behavior of document databases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Projection {
    #[default]
    Full,
    /// `id` + `data`, no expiration field.
    DataOnly,
    /// `id` alone; used for existence checks.
    IdOnly,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct QueryOptions {
    pub limit: Option<usize>,
    pub projection: Projection,
}

/// One operation inside a bulk write. Every write in this workspace flows
/// through a bulk call, even single-key ones, so success checking has a
/// single uniform path.
#[derive(Clone, Debug)]
pub enum WriteOp<V> {
    /// Replace-or-insert the document identified by `id`.
    Upsert {
        id: String,
        data: V,
        expire_at: Option<DateTime<Utc>>,
    },
    /// Remove at most one document.
    DeleteOne { id: String },
    /// Remove every document whose identity is in `ids`.
    DeleteMany { ids: Vec<String> },
    /// Remove every document in the collection.
    DeleteAll,
}

/// Aggregate outcome of a bulk write. Individual writes within one bulk call
/// may partially succeed; callers of the cache façade only ever observe
/// whether the error count was zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct BulkWriteResult {
    pub write_error_count: usize,
}

impl BulkWriteResult {
    pub fn ok(&self) -> bool {
        self.write_error_count == 0
    }
}
