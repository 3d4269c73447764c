#![deny(clippy::all)]

use crate::document::{BulkWriteResult, CacheDocument, IdFilter, QueryOptions, WriteOp};
use crate::key::CacheKey;
use async_trait::async_trait;
use indexmap::IndexMap;
use shared::{Result, Ttl};

// Ports are the pluggable extension points for underlying document stores

/// Port for the backing document collection.
///
/// Implementations own all network I/O, connection pooling, persistence and
/// expiration sweeping; the cache layer never sees a connection. They are
/// constructed from a connection/session handle plus a `shared::Namespace`.
#[async_trait]
pub trait DocumentStore<V>: Send + Sync + 'static {
    /// Read documents whose identity field matches `filter`.
    async fn query(
        &self,
        filter: IdFilter,
        options: QueryOptions,
    ) -> Result<Vec<CacheDocument<V>>>;

    /// Apply a batch of upsert/delete operations in one round-trip.
    async fn bulk_write(&self, operations: Vec<WriteOp<V>>) -> Result<BulkWriteResult>;
}

/// The cache contract. The only public API surface of this workspace;
/// alternative backing stores substitute behind [`DocumentStore`].
///
/// Error channel asymmetry is deliberate: key validation failures surface as
/// `Err(Error::InvalidKey)` before any I/O, while store-side write failures
/// collapse into an `Ok(false)` return. Callers rely on that split to tell
/// programmer error from transient failure.
#[async_trait]
pub trait Cache<V>: Send + Sync + 'static {
    /// Fetch the value stored under `key`, or `default` when the entry is
    /// missing, expired, or the store errored on the read. Those three cases
    /// are indistinguishable on purpose.
    async fn get(&self, key: &CacheKey, default: V) -> Result<V>;

    /// Upsert `value` under `key`, expiring `ttl` from now (`None` = never).
    /// `Ok(true)` iff the store reported zero write errors.
    async fn set(&self, key: &CacheKey, value: V, ttl: Option<Ttl>) -> Result<bool>;

    /// Remove at most one entry. Deleting an absent key is a successful
    /// no-op.
    async fn delete(&self, key: &CacheKey) -> Result<bool>;

    /// Remove every entry in the backing collection.
    async fn clear(&self) -> Result<bool>;

    /// Fetch many keys in one store round-trip. The returned map carries an
    /// entry for every input key in input order (duplicates collapse to
    /// one), keyed by canonical form, with misses defaulted.
    async fn get_multiple(
        &self,
        keys: &[CacheKey],
        default: V,
    ) -> Result<IndexMap<String, V>>;

    /// Upsert a batch of entries in one bulk write. A single expiration
    /// instant is computed once and shared by the whole batch.
    async fn set_multiple(&self, values: Vec<(CacheKey, V)>, ttl: Option<Ttl>) -> Result<bool>;

    /// Remove a batch of entries in one bulk write.
    async fn delete_multiple(&self, keys: &[CacheKey]) -> Result<bool>;

    /// Whether an entry is currently present. Inherently racy: another
    /// caller may delete or expire the entry immediately after this returns
    /// `true`. Never a linearizable guard for get/set logic.
    async fn has(&self, key: &CacheKey) -> Result<bool>;
}
