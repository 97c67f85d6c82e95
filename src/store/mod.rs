//! Event store module
//!
//! Events live in memory and in a single JSON file shaped like
//! `{"events": [...]}`. Every mutation rewrites the whole file through a
//! temporary sibling that is renamed over the original.

mod error;
mod event;

pub use error::{StoreError, StoreResult};
pub use event::{parse_event_time, Event};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

#[derive(Deserialize, Default)]
struct DataFile {
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Serialize)]
struct DataFileRef<'a> {
    events: &'a [Event],
}

/// JSON file backed event collection
pub struct EventStore {
    path: PathBuf,
    events: RwLock<Vec<Event>>,
}

impl EventStore {
    /// Open the store at `path`
    ///
    /// A missing file opens as an empty collection and is created on the
    /// first write. An unreadable or malformed file is an error.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let events = match fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_json::from_str::<DataFile>(&content)?.events,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            events: RwLock::new(events),
        })
    }

    /// Every event, in insertion order
    pub async fn all(&self) -> Vec<Event> {
        self.events.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> StoreResult<Event> {
        self.events
            .read()
            .await
            .iter()
            .find(|event| event.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Events whose start or end falls inside `[from, to]`
    pub async fn in_range(&self, from: NaiveDateTime, to: NaiveDateTime) -> Vec<Event> {
        self.events
            .read()
            .await
            .iter()
            .filter(|event| event.touches(from, to))
            .cloned()
            .collect()
    }

    /// Validate `fields` and store them as a new event with a fresh id
    pub async fn append(&self, fields: Map<String, Value>) -> StoreResult<Event> {
        let id = uuid::Uuid::new_v4().to_string();
        let event = Event::from_fields(&id, fields)?;

        let mut events = self.events.write().await;
        let mut next = events.clone();
        next.push(event.clone());
        self.flush(&next).await?;
        *events = next;

        Ok(event)
    }

    /// Merge `patch` over the stored event `id`
    pub async fn update(&self, id: &str, patch: Map<String, Value>) -> StoreResult<Event> {
        let mut events = self.events.write().await;
        let index = events
            .iter()
            .position(|event| event.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let event = events[index].merged(patch)?;

        let mut next = events.clone();
        next[index] = event.clone();
        self.flush(&next).await?;
        *events = next;

        Ok(event)
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut events = self.events.write().await;
        let index = events
            .iter()
            .position(|event| event.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let mut next = events.clone();
        next.remove(index);
        self.flush(&next).await?;
        *events = next;

        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    #[allow(clippy::missing_const_for_fn)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `events` to disk, replacing the data file atomically
    async fn flush(&self, events: &[Event]) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(&DataFileRef { events })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, content).await?;
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

/// Wrapper for Arc<EventStore>
pub type SharedEventStore = Arc<EventStore>;
