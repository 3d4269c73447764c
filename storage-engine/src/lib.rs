use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use shared::{Namespace, Result};
use std::fmt::Debug;
use vellum::document::{
    BulkWriteResult, CacheDocument, IdFilter, Projection, QueryOptions, WriteOp,
};
use vellum::ports::DocumentStore;

struct StoredDocument<V> {
    data: V,
    expire_at: Option<DateTime<Utc>>,
}

/// In-process implementation of the `DocumentStore` port, backed by a
/// concurrent map keyed on the identity field.
///
/// A remote document database removes expired documents with a background
/// sweep over its expiration index; this store emulates that by dropping
/// expired documents lazily whenever a query touches them.
pub struct MemoryDocumentStore<V> {
    namespace: Namespace,
    documents: DashMap<String, StoredDocument<V>>,
}

impl<V> MemoryDocumentStore<V>
where
    V: Debug + Send + Sync + Clone + 'static,
{
    pub fn new(namespace: Namespace) -> Self {
        tracing::debug!("opened in-memory document store for {}", namespace);
        Self {
            namespace,
            documents: DashMap::new(),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Number of live (unexpired) documents.
    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.documents
            .iter()
            .filter(|entry| !Self::is_expired(entry.value(), now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(document: &StoredDocument<V>, now: DateTime<Utc>) -> bool {
        document.expire_at.is_some_and(|at| at <= now)
    }

    fn project(id: &str, document: &StoredDocument<V>, projection: Projection) -> CacheDocument<V> {
        match projection {
            Projection::Full => CacheDocument {
                id: id.to_string(),
                data: Some(document.data.clone()),
                expire_at: document.expire_at,
            },
            Projection::DataOnly => CacheDocument {
                id: id.to_string(),
                data: Some(document.data.clone()),
                expire_at: None,
            },
            Projection::IdOnly => CacheDocument {
                id: id.to_string(),
                data: None,
                expire_at: None,
            },
        }
    }

    fn collect(
        &self,
        id: &str,
        now: DateTime<Utc>,
        projection: Projection,
        out: &mut Vec<CacheDocument<V>>,
        expired: &mut Vec<String>,
    ) {
        if let Some(entry) = self.documents.get(id) {
            if Self::is_expired(entry.value(), now) {
                expired.push(id.to_string());
            } else {
                out.push(Self::project(id, entry.value(), projection));
            }
        }
    }
}

#[async_trait]
impl<V> DocumentStore<V> for MemoryDocumentStore<V>
where
    V: Debug + Send + Sync + Clone + 'static,
{
    async fn query(
        &self,
        filter: IdFilter,
        options: QueryOptions,
    ) -> Result<Vec<CacheDocument<V>>> {
        let now = Utc::now();
        let mut out = Vec::new();
        let mut expired = Vec::new();

        match &filter {
            IdFilter::Eq(id) => {
                self.collect(id, now, options.projection, &mut out, &mut expired);
            }
            IdFilter::In(ids) => {
                for id in ids {
                    self.collect(id, now, options.projection, &mut out, &mut expired);
                }
            }
            IdFilter::All => {
                // Snapshot the keys first; removing while iterating a shard
                // would deadlock.
                let ids: Vec<String> = self
                    .documents
                    .iter()
                    .map(|entry| entry.key().clone())
                    .collect();
                for id in &ids {
                    self.collect(id, now, options.projection, &mut out, &mut expired);
                }
            }
        }

        // Lazy expiration sweep, standing in for the remote store's reaper.
        for id in expired {
            self.documents.remove(&id);
        }

        if let Some(limit) = options.limit {
            out.truncate(limit);
        }
        Ok(out)
    }

    async fn bulk_write(&self, operations: Vec<WriteOp<V>>) -> Result<BulkWriteResult> {
        for op in operations {
            match op {
                WriteOp::Upsert {
                    id,
                    data,
                    expire_at,
                } => {
                    self.documents.insert(id, StoredDocument { data, expire_at });
                }
                WriteOp::DeleteOne { id } => {
                    self.documents.remove(&id);
                }
                WriteOp::DeleteMany { ids } => {
                    for id in ids {
                        self.documents.remove(&id);
                    }
                }
                WriteOp::DeleteAll => {
                    tracing::debug!("clearing collection {}", self.namespace);
                    self.documents.clear();
                }
            }
        }
        // In-process writes have no partial-failure mode to report.
        Ok(BulkWriteResult::default())
    }
}

impl<V> Debug for MemoryDocumentStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDocumentStore")
            .field("namespace", &self.namespace)
            .field("documents", &self.documents.len())
            .finish()
    }
}
