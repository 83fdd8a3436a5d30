use crate::types::push::{Subscription, SubscriptionRecord};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "store io error: {err}"),
            StoreError::Parse(err) => write!(f, "store parse error: {err}"),
            StoreError::Serialize(err) => write!(f, "store serialize error: {err}"),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    subscriptions: HashMap<String, SubscriptionRecord>,
}

/// At most one active subscription per client id; re-registration replaces
/// the record (last write wins). The whole-map mutex provides the per-key
/// read-modify-write atomicity concurrent registration and dispatch need,
/// and reads hand out cloned snapshots so no lock is held across awaits.
#[derive(Clone)]
pub struct SubscriptionStore {
    records: Arc<Mutex<HashMap<String, SubscriptionRecord>>>,
    path: Option<PathBuf>,
}

impl SubscriptionStore {
    pub fn in_memory() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            path: None,
        }
    }

    /// Opens a file-backed store, loading any records persisted earlier.
    /// A missing file is an empty store, not an error.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let records = match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let file: StoreFile = toml::from_str(&contents).map_err(StoreError::Parse)?;
                file.subscriptions
            }
            Err(err) if err.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(StoreError::Io(err)),
        };
        Ok(Self {
            records: Arc::new(Mutex::new(records)),
            path: Some(path),
        })
    }

    /// Creates or replaces the record for `client_id`. Persistence failure is
    /// surfaced so registration can report it; the in-memory write still
    /// happened and a later successful write will persist it.
    pub fn insert(&self, client_id: &str, subscription: Subscription) -> Result<(), StoreError> {
        let mut records = self.records.lock().expect("subscription store lock");
        records.insert(
            client_id.to_string(),
            SubscriptionRecord {
                subscription,
                registered_at: OffsetDateTime::now_utc(),
            },
        );
        self.persist(&records)
    }

    pub fn get(&self, client_id: &str) -> Option<SubscriptionRecord> {
        let records = self.records.lock().expect("subscription store lock");
        records.get(client_id).cloned()
    }

    pub fn contains(&self, client_id: &str) -> bool {
        let records = self.records.lock().expect("subscription store lock");
        records.contains_key(client_id)
    }

    /// Drops the record for `client_id`, returning whether one existed.
    /// Used by the self-healing path after the push service reports the
    /// endpoint gone; a persistence failure is logged but does not resurrect
    /// the in-memory record.
    pub fn remove(&self, client_id: &str) -> bool {
        let mut records = self.records.lock().expect("subscription store lock");
        let removed = records.remove(client_id).is_some();
        if removed
            && let Err(err) = self.persist(&records)
        {
            eprintln!("subscription store warning: failed to persist removal ({err})");
        }
        removed
    }

    pub fn snapshot(&self) -> HashMap<String, SubscriptionRecord> {
        let records = self.records.lock().expect("subscription store lock");
        records.clone()
    }

    fn persist(&self, records: &HashMap<String, SubscriptionRecord>) -> Result<(), StoreError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        let file = StoreFile {
            subscriptions: records.clone(),
        };
        let contents = toml::to_string(&file).map_err(StoreError::Serialize)?;
        atomic_write(path, &contents).map_err(StoreError::Io)
    }
}

pub(crate) fn atomic_write(path: &Path, contents: &str) -> std::io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("missing parent directory"))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("store.toml");
    let pid = std::process::id();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    for attempt in 0..10u32 {
        let temp_name = format!(".{}.tmp-{}-{}-{}", file_name, pid, nanos, attempt);
        let temp_path = parent.join(temp_name);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
        {
            Ok(mut file) => {
                file.write_all(contents.as_bytes())?;
                file.flush()?;
                std::fs::rename(&temp_path, path)?;
                return Ok(());
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        "failed to create temp file",
    ))
}
