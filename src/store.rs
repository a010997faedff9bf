use crate::dlog;
use crate::storage::KeyValueStore;
use crate::types::{Workout, WorkoutRecord};
use crate::workout::id_from_time;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use thiserror::Error;

/// Storage key holding the serialized snapshot.
pub const STORAGE_KEY: &str = "workouts";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("workout id {0} is already taken")]
pub struct DuplicateId(pub String);

/// Workouts of the current session, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, workout: Workout) -> Result<&Workout, DuplicateId> {
        if self.find(workout.id()).is_some() {
            return Err(DuplicateId(workout.id().to_string()));
        }
        self.workouts.push(workout);
        Ok(&self.workouts[self.workouts.len() - 1])
    }

    pub fn find(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Workout> {
        self.workouts.iter()
    }

    /// Display order: the most recently added first.
    pub fn newest_first(&self) -> impl Iterator<Item = &Workout> {
        self.workouts.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    /// Time-derived id, bumped until it is unused in this store.
    pub fn next_id(&self, created_at: DateTime<Local>) -> String {
        let mut id = id_from_time(created_at);
        while self.find(&id).is_some() {
            let n = id.parse::<u64>().unwrap_or(0).wrapping_add(1) % 10_000_000_000;
            id = format!("{n:010}");
        }
        id
    }

    pub fn to_snapshot(&self) -> Result<String> {
        let records: Vec<WorkoutRecord> = self.workouts.iter().map(Workout::to_record).collect();
        serde_json::to_string(&records).context("Serializing workouts")
    }

    /// Parses a snapshot and rebuilds every record through construction.
    ///
    /// A snapshot that is not a JSON array is an error; individual records
    /// that fail to decode or rehydrate (ill-typed fields, unknown type, bad
    /// numbers, repeated id) are skipped.
    pub fn from_snapshot(snapshot: &str) -> Result<Self> {
        let values: Vec<serde_json::Value> =
            serde_json::from_str(snapshot).context("Parsing workouts snapshot")?;

        let mut store = Self::new();
        for (idx, value) in values.into_iter().enumerate() {
            let record = match serde_json::from_value::<WorkoutRecord>(value) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(idx, err = %e, "skipping stored workout");
                    continue;
                }
            };
            let id = record.id.clone();
            match Workout::from_record(record) {
                Ok(w) => {
                    if let Err(e) = store.push(w) {
                        tracing::warn!(err = %e, "skipping stored workout");
                    }
                }
                Err(e) => tracing::warn!(id = %id, err = %e, "skipping stored workout"),
            }
        }
        Ok(store)
    }
}

impl<'a> IntoIterator for &'a WorkoutStore {
    type Item = &'a Workout;
    type IntoIter = std::slice::Iter<'a, Workout>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Reads the stored snapshot. Absent, unreadable or corrupt data yields an empty store.
pub fn load(kv: &impl KeyValueStore) -> WorkoutStore {
    let raw = match kv.get(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            dlog!("no stored workouts");
            return WorkoutStore::new();
        }
        Err(e) => {
            tracing::warn!(err = %e, "could not read stored workouts");
            return WorkoutStore::new();
        }
    };

    match WorkoutStore::from_snapshot(&raw) {
        Ok(store) => {
            tracing::debug!(workouts = store.len(), "loaded stored workouts");
            store
        }
        Err(e) => {
            dlog!("stored workouts unreadable, starting empty: {e:#}");
            WorkoutStore::new()
        }
    }
}

/// Overwrites the stored snapshot with the full store.
pub fn save(kv: &mut impl KeyValueStore, store: &WorkoutStore) -> Result<()> {
    let snapshot = store.to_snapshot()?;
    kv.set(STORAGE_KEY, &snapshot)
}

pub fn clear(kv: &mut impl KeyValueStore) -> Result<()> {
    kv.remove(STORAGE_KEY)
}
