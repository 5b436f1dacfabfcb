//! In-process document store with live queries.
//!
//! Documents are kept in memory and, when opened with a data file, written
//! through to disk as JSON before every change is committed. Each write
//! rewrites the whole file, which suits a household's worth of events.

use chrono::Utc;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

use crate::error::{FamCalError, FamCalResult};
use crate::store::{Direction, DocumentSnapshot, DocumentStore, Query, Snapshot, SnapshotStream};
use crate::wire::{FieldValue, Fields, to_wire};

type Collection = BTreeMap<String, Fields>;

struct Listener {
    query: Query,
    tx: mpsc::UnboundedSender<FamCalResult<Snapshot>>,
}

#[derive(Default)]
struct Inner {
    collections: BTreeMap<String, Collection>,
    listeners: Vec<Listener>,
    data_file: Option<PathBuf>,
    offline: bool,
}

/// Cheap to clone; clones share the same documents and listeners.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    /// Held for the whole of a write so the file sees commits in order
    writer: Arc<tokio::sync::Mutex<()>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Open a store backed by `path`, loading any documents already saved there.
    pub fn open(path: &Path) -> FamCalResult<Self> {
        let collections: BTreeMap<String, Collection> = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content).map_err(|e| {
                FamCalError::Persistence(format!("Could not read {}: {}", path.display(), e))
            })?
        } else {
            BTreeMap::new()
        };

        tracing::info!(path = %path.display(), "Opened event store");

        Ok(MemoryStore {
            inner: Arc::new(Mutex::new(Inner {
                collections,
                data_file: Some(path.to_path_buf()),
                ..Default::default()
            })),
            writer: Arc::default(),
        })
    }

    /// While offline every write fails with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Fail every open live query with `reason`, ending them.
    pub fn break_listeners(&self, reason: &str) {
        let mut inner = self.lock();
        for listener in inner.listeners.drain(..) {
            let _ = listener
                .tx
                .send(Err(FamCalError::Subscription(reason.to_string())));
        }
    }

    /// Number of live queries still attached.
    pub fn listener_count(&self) -> usize {
        let mut inner = self.lock();
        inner.listeners.retain(|l| !l.tx.is_closed());
        inner.listeners.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `op` to a copy of `collection`, persist, then commit and notify.
    /// Nothing changes if `op` or persisting fails.
    async fn write<T>(
        &self,
        collection: &str,
        op: impl FnOnce(&mut Collection) -> FamCalResult<T>,
    ) -> FamCalResult<T> {
        let _writer = self.writer.lock().await;

        let (docs, out, save) = {
            let inner = self.lock();
            if inner.offline {
                return Err(FamCalError::Unavailable("store is offline".into()));
            }

            let mut docs = inner.collections.get(collection).cloned().unwrap_or_default();
            let out = op(&mut docs)?;
            let save = match &inner.data_file {
                Some(path) => Some((path.clone(), inner.serialize_with(collection, &docs)?)),
                None => None,
            };
            (docs, out, save)
        };

        if let Some((path, content)) = save {
            tokio::task::spawn_blocking(move || persist(&path, &content))
                .await
                .map_err(|e| FamCalError::Persistence(e.to_string()))??;
        }

        let mut inner = self.lock();
        inner.collections.insert(collection.to_string(), docs);
        inner.notify(collection);
        Ok(out)
    }
}

impl Inner {
    fn snapshot(&self, query: &Query) -> Snapshot {
        let mut docs: Vec<DocumentSnapshot> = self
            .collections
            .get(&query.collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| DocumentSnapshot {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order_by {
            // Missing fields compare as null, which sorts before every other value
            docs.sort_by(|a, b| {
                let key_a = a.fields.get(&order.field).unwrap_or(&FieldValue::Null);
                let key_b = b.fields.get(&order.field).unwrap_or(&FieldValue::Null);
                let by_value = match order.direction {
                    Direction::Ascending => key_a.cmp(key_b),
                    Direction::Descending => key_b.cmp(key_a),
                };
                by_value.then_with(|| a.id.cmp(&b.id))
            });
        }

        Snapshot { docs }
    }

    fn notify(&mut self, collection: &str) {
        let snapshots: Vec<Option<Snapshot>> = self
            .listeners
            .iter()
            .map(|l| (l.query.collection == collection).then(|| self.snapshot(&l.query)))
            .collect();

        let mut snapshots = snapshots.into_iter();
        self.listeners.retain(|listener| match snapshots.next().flatten() {
            Some(snapshot) => listener.tx.send(Ok(snapshot)).is_ok(),
            None => !listener.tx.is_closed(),
        });
    }

    /// The whole store as JSON, with `collection` replaced by `docs`.
    fn serialize_with(&self, collection: &str, docs: &Collection) -> FamCalResult<String> {
        let mut all: BTreeMap<&str, &Collection> = self
            .collections
            .iter()
            .map(|(name, docs)| (name.as_str(), docs))
            .collect();
        all.insert(collection, docs);

        serde_json::to_string_pretty(&all).map_err(|e| FamCalError::Serialization(e.to_string()))
    }
}

/// Write `content` to `path` through a temp file so a crash never leaves it half written.
fn persist(path: &Path, content: &str) -> FamCalResult<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .map_err(|e| FamCalError::Persistence(format!("{}: {}", dir.display(), e)))?;
    }

    let temp = path.with_extension("json.tmp");
    std::fs::write(&temp, content)
        .and_then(|_| std::fs::rename(&temp, path))
        .map_err(|e| FamCalError::Persistence(format!("{}: {}", path.display(), e)))
}

/// Replace server timestamp sentinels with the store's clock.
fn resolve_server_timestamps(fields: &mut Fields) {
    let now = to_wire(Utc::now());
    for value in fields.values_mut() {
        if *value == FieldValue::ServerTimestamp {
            *value = FieldValue::Timestamp(now);
        }
    }
}

impl DocumentStore for MemoryStore {
    async fn listen(&self, query: Query) -> FamCalResult<SnapshotStream> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();

        // Receiver is alive, send cannot fail here
        let _ = tx.send(Ok(inner.snapshot(&query)));
        inner.listeners.push(Listener { query, tx });

        Ok(SnapshotStream::new(rx))
    }

    async fn add(&self, collection: &str, mut fields: Fields) -> FamCalResult<String> {
        resolve_server_timestamps(&mut fields);
        let id = uuid::Uuid::new_v4().simple().to_string();

        self.write(collection, |docs| {
            docs.insert(id.clone(), fields);
            Ok(())
        })
        .await?;

        tracing::debug!(collection, id = %id, "Added document");
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, mut fields: Fields) -> FamCalResult<()> {
        resolve_server_timestamps(&mut fields);

        self.write(collection, |docs| {
            let doc = docs.get_mut(id).ok_or_else(|| FamCalError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
            doc.extend(fields);
            Ok(())
        })
        .await?;

        tracing::debug!(collection, id, "Updated document");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> FamCalResult<()> {
        let removed = self
            .write(collection, |docs| Ok(docs.remove(id).is_some()))
            .await?;

        tracing::debug!(collection, id, removed, "Deleted document");
        Ok(())
    }
}
