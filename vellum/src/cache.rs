use crate::document::{IdFilter, Projection, QueryOptions, WriteOp};
use crate::key::CacheKey;
use crate::ports::{Cache, DocumentStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use shared::{Result, Ttl};
use std::fmt::Debug;
use std::sync::Arc;

/// Cache façade over a document collection.
///
/// Holds nothing but an immutable handle to the [`DocumentStore`] port, so a
/// single instance is safe to share across concurrent callers; serialization
/// of conflicting writes to the same key is the store's per-document write
/// ordering, not anything done here. No internal tasks, locks or timeouts.
pub struct DocumentCache<V> {
    store: Arc<dyn DocumentStore<V>>,
}

impl<V> DocumentCache<V>
where
    V: Debug + Send + Sync + Clone + 'static,
{
    pub fn new(store: Arc<dyn DocumentStore<V>>) -> Self {
        Self { store }
    }

    /// Translate a relative TTL into the absolute instant persisted on the
    /// document. `None` means the entry never expires. Instants past the
    /// representable range saturate rather than overflow.
    fn expire_at(ttl: Option<Ttl>) -> Option<DateTime<Utc>> {
        ttl.map(|ttl| {
            Utc::now()
                .checked_add_signed(ttl.as_delta())
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        })
    }

    /// Canonicalize every key before any I/O. Invalidity of any single key
    /// aborts the whole batch. Preserves input order; duplicates collapse.
    fn canonical_keys(keys: &[CacheKey]) -> Result<Vec<String>> {
        let mut ids: IndexSet<String> = IndexSet::with_capacity(keys.len());
        for key in keys {
            ids.insert(key.canonical()?);
        }
        Ok(ids.into_iter().collect())
    }

    /// Uniform success path for every write: submit one bulk call and
    /// collapse all failure modes into the aggregate boolean.
    async fn submit(&self, operations: Vec<WriteOp<V>>) -> Result<bool> {
        let op_count = operations.len();
        match self.store.bulk_write(operations).await {
            Ok(result) if result.ok() => {
                tracing::debug!(operations = op_count, "bulk write applied");
                Ok(true)
            }
            Ok(result) => {
                tracing::warn!(
                    operations = op_count,
                    write_errors = result.write_error_count,
                    "bulk write reported errors"
                );
                Ok(false)
            }
            Err(err) => {
                tracing::warn!(operations = op_count, error = %err, "bulk write failed");
                Ok(false)
            }
        }
    }
}

impl<V> Clone for DocumentCache<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<V> Debug for DocumentCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCache").finish_non_exhaustive()
    }
}

#[async_trait]
impl<V> Cache<V> for DocumentCache<V>
where
    V: Debug + Send + Sync + Clone + 'static,
{
    async fn get(&self, key: &CacheKey, default: V) -> Result<V> {
        let id = key.canonical()?;
        let options = QueryOptions {
            limit: Some(1),
            projection: Projection::DataOnly,
        };

        // Missing, expired and store-errored reads all collapse to the
        // default; expiration is enforced by the store's sweep, not here.
        match self.store.query(IdFilter::Eq(id.clone()), options).await {
            Ok(documents) => match documents.into_iter().next().and_then(|doc| doc.data) {
                Some(data) => {
                    tracing::debug!(key = %id, "cache hit");
                    Ok(data)
                }
                None => {
                    tracing::debug!(key = %id, "cache miss, returning default");
                    Ok(default)
                }
            },
            Err(err) => {
                tracing::warn!(key = %id, error = %err, "read failed, returning default");
                Ok(default)
            }
        }
    }

    async fn set(&self, key: &CacheKey, value: V, ttl: Option<Ttl>) -> Result<bool> {
        let id = key.canonical()?;
        let expire_at = Self::expire_at(ttl);
        self.submit(vec![WriteOp::Upsert {
            id,
            data: value,
            expire_at,
        }])
        .await
    }

    async fn delete(&self, key: &CacheKey) -> Result<bool> {
        let id = key.canonical()?;
        // Deleting an absent key is still a zero-error bulk write.
        self.submit(vec![WriteOp::DeleteOne { id }]).await
    }

    async fn clear(&self) -> Result<bool> {
        self.submit(vec![WriteOp::DeleteAll]).await
    }

    async fn get_multiple(
        &self,
        keys: &[CacheKey],
        default: V,
    ) -> Result<IndexMap<String, V>> {
        let ids = Self::canonical_keys(keys)?;

        // Every input key gets a defaulted entry up front, in input order;
        // hits overwrite in place so ordering never depends on the store.
        let mut resolved: IndexMap<String, V> = ids
            .iter()
            .map(|id| (id.clone(), default.clone()))
            .collect();

        let options = QueryOptions {
            limit: None,
            projection: Projection::DataOnly,
        };
        match self.store.query(IdFilter::In(ids), options).await {
            Ok(documents) => {
                let mut hits = 0usize;
                for doc in documents {
                    if let (Some(slot), Some(data)) = (resolved.get_mut(&doc.id), doc.data) {
                        *slot = data;
                        hits += 1;
                    }
                }
                tracing::debug!(keys = resolved.len(), hits, "batch read resolved");
            }
            Err(err) => {
                tracing::warn!(
                    keys = resolved.len(),
                    error = %err,
                    "batch read failed, returning defaults"
                );
            }
        }

        Ok(resolved)
    }

    async fn set_multiple(&self, values: Vec<(CacheKey, V)>, ttl: Option<Ttl>) -> Result<bool> {
        // Validate the whole batch before any I/O; one bad pair writes
        // nothing.
        let mut pairs: Vec<(String, V)> = Vec::with_capacity(values.len());
        for (key, value) in values {
            pairs.push((key.canonical()?, value));
        }

        // One expiration instant for the entire batch, computed once.
        let expire_at = Self::expire_at(ttl);
        let operations = pairs
            .into_iter()
            .map(|(id, data)| WriteOp::Upsert {
                id,
                data,
                expire_at,
            })
            .collect();

        self.submit(operations).await
    }

    async fn delete_multiple(&self, keys: &[CacheKey]) -> Result<bool> {
        let ids = Self::canonical_keys(keys)?;
        self.submit(vec![WriteOp::DeleteMany { ids }]).await
    }

    async fn has(&self, key: &CacheKey) -> Result<bool> {
        let id = key.canonical()?;
        let options = QueryOptions {
            limit: Some(1),
            projection: Projection::IdOnly,
        };

        match self.store.query(IdFilter::Eq(id.clone()), options).await {
            Ok(documents) => Ok(!documents.is_empty()),
            Err(err) => {
                tracing::warn!(key = %id, error = %err, "existence check failed");
                Ok(false)
            }
        }
    }
}
