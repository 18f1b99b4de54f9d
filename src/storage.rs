use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const JOBS_COLLECTION: &str = "jobPosts";
pub const APPLICATIONS_COLLECTION: &str = "jobApplications";

const MAX_MODIFY_ATTEMPTS: usize = 3;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed collection data: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("collection {collection} was modified concurrently")]
    Conflict { collection: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Per-collection write counter. A collection that was never written is at
/// version 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(u64);

impl Version {
    pub fn next(self) -> Self {
        Version(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub version: Version,
    pub records: Vec<Value>,
}

/// Whole-collection document store. `write` replaces every record of the
/// collection and only succeeds when `expected` matches the current version.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    async fn read(&self, collection: &str) -> StoreResult<Snapshot>;

    async fn write(
        &self,
        collection: &str,
        expected: Version,
        records: Vec<Value>,
    ) -> StoreResult<Version>;
}

/// Stores each collection as `<root>/<collection>.json`.
pub struct FileStore {
    root: PathBuf,
    versions: Mutex<HashMap<String, Version>>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            versions: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{collection}.json"))
    }

    async fn read_records(&self, collection: &str) -> StoreResult<Vec<Value>> {
        let path = self.collection_path(collection);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn read(&self, collection: &str) -> StoreResult<Snapshot> {
        let versions = self.versions.lock().await;
        let version = versions.get(collection).copied().unwrap_or_default();
        let records = self.read_records(collection).await?;
        Ok(Snapshot { version, records })
    }

    async fn write(
        &self,
        collection: &str,
        expected: Version,
        records: Vec<Value>,
    ) -> StoreResult<Version> {
        let mut versions = self.versions.lock().await;
        let current = versions.get(collection).copied().unwrap_or_default();
        if current != expected {
            return Err(StoreError::Conflict {
                collection: collection.to_string(),
            });
        }

        let bytes = serde_json::to_vec(&records)?;
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.collection_path(collection);
        let staging = self.root.join(format!(".{collection}.json.tmp"));
        tokio::fs::write(&staging, &bytes).await?;
        tokio::fs::rename(&staging, &path).await?;

        let next = current.next();
        versions.insert(collection.to_string(), next);
        debug!(collection, records = records.len(), version = next.get(), "collection written");
        Ok(next)
    }
}

/// In-process store, used by tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn read(&self, collection: &str) -> StoreResult<Snapshot> {
        let guard = self.collections.lock().await;
        Ok(guard.get(collection).cloned().unwrap_or_default())
    }

    async fn write(
        &self,
        collection: &str,
        expected: Version,
        records: Vec<Value>,
    ) -> StoreResult<Version> {
        let mut guard = self.collections.lock().await;
        let entry = guard.entry(collection.to_string()).or_default();
        if entry.version != expected {
            return Err(StoreError::Conflict {
                collection: collection.to_string(),
            });
        }
        entry.version = entry.version.next();
        entry.records = records;
        Ok(entry.version)
    }
}

/// Reads a collection and decodes its records as `T`. Records that do not
/// decode are skipped with a warning so one bad entry cannot hide the rest.
pub async fn load<T: DeserializeOwned>(
    store: &dyn RecordStore,
    collection: &str,
) -> StoreResult<(Version, Vec<T>)> {
    let snapshot = store.read(collection).await?;
    let (records, _) = decode_records(collection, snapshot.records);
    Ok((snapshot.version, records))
}

/// Encodes `records` and replaces the collection.
pub async fn save<T: Serialize>(
    store: &dyn RecordStore,
    collection: &str,
    expected: Version,
    records: &[T],
) -> StoreResult<Version> {
    let values = encode_records(records)?;
    store.write(collection, expected, values).await
}

/// Read-modify-write of a whole collection. An `Err` from `apply` leaves the
/// collection untouched and is returned as is. A write that loses the version
/// race is re-run against a fresh snapshot. Records that do not decode as `T`
/// are written back unchanged where they were read from.
pub async fn modify<T, R, E, F>(
    store: &dyn RecordStore,
    collection: &str,
    mut apply: F,
) -> Result<R, E>
where
    T: Serialize + DeserializeOwned,
    E: From<StoreError>,
    F: FnMut(&mut Vec<T>) -> Result<R, E>,
{
    let mut attempt = 1;
    loop {
        let snapshot = store.read(collection).await?;
        let (mut records, undecodable) = decode_records::<T>(collection, snapshot.records);
        let outcome = apply(&mut records)?;

        let mut values = encode_records(&records)?;
        for (position, raw) in undecodable {
            values.insert(position.min(values.len()), raw);
        }

        match store.write(collection, snapshot.version, values).await {
            Ok(_) => return Ok(outcome),
            Err(StoreError::Conflict { .. }) if attempt < MAX_MODIFY_ATTEMPTS => {
                warn!(collection, attempt, "collection changed during update, retrying");
                attempt += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

fn decode_records<T: DeserializeOwned>(
    collection: &str,
    values: Vec<Value>,
) -> (Vec<T>, Vec<(usize, Value)>) {
    let mut records = Vec::with_capacity(values.len());
    let mut undecodable = Vec::new();
    for (position, value) in values.into_iter().enumerate() {
        match T::deserialize(&value) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(collection, position, error = %err, "skipping undecodable record");
                undecodable.push((position, value));
            }
        }
    }
    (records, undecodable)
}

fn encode_records<T: Serialize>(records: &[T]) -> StoreResult<Vec<Value>> {
    Ok(records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<Value>, _>>()?)
}
