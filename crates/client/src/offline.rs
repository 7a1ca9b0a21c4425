// SPDX-License-Identifier: MIT

//!
//! The offline marker queue.
//!
//! Marker creations made without connectivity are appended to a JSON file
//! and replayed through the API when connectivity returns.  An entry leaves
//! the queue only once the server has accepted it.
//!

use crate::{ApiClient, ClientError};
use chrono::{DateTime, Utc};
use geomark_core::{GeomarkId, Marker, MarkerCreateRequest};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// One queued, not-yet-synced marker creation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OfflineMarker {
    /// Queue-local ID (the server assigns the real one at sync)
    #[serde(rename = "localId")]
    pub local_id: GeomarkId,

    /// When the entry was queued
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    /// The creation to replay
    pub request: MarkerCreateRequest,
}

/// What a [`OfflineQueue::drain`] run did
#[derive(Debug, Default)]
pub struct DrainOutcome {
    /// The markers the server accepted, in queue order
    pub synced: Vec<Marker>,

    /// How many entries stayed queued because their replay failed
    pub kept: usize,
}

/// A durable queue of unsynced marker creations, backed by one JSON file
pub struct OfflineQueue {
    path: PathBuf,
}

impl OfflineQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        OfflineQueue { path: path.into() }
    }

    /// Queue a marker creation, assigning it a local ID
    pub fn save_offline_marker(
        &self,
        request: MarkerCreateRequest,
    ) -> Result<OfflineMarker, ClientError> {
        let entry = OfflineMarker {
            local_id: GeomarkId::new(),
            created_at: Utc::now(),
            request,
        };
        let mut entries = self.load()?;
        entries.push(entry.clone());
        self.persist(&entries)?;
        Ok(entry)
    }

    /// All queued entries, oldest first
    pub fn get_offline_markers(&self) -> Result<Vec<OfflineMarker>, ClientError> {
        self.load()
    }

    /// Remove one entry.  Returns whether it was present.
    pub fn remove_offline_marker(&self, local_id: &GeomarkId) -> Result<bool, ClientError> {
        let mut entries = self.load()?;
        let before = entries.len();
        entries.retain(|entry| entry.local_id != *local_id);
        let removed = entries.len() < before;
        if removed {
            self.persist(&entries)?;
        }
        Ok(removed)
    }

    /// Drop every queued entry
    pub fn clear_offline_markers(&self) -> Result<(), ClientError> {
        self.persist(&[])
    }

    /// Replay every queued entry through the API.
    ///
    /// Entries the server accepts are removed; entries whose replay fails
    /// (connectivity or rejection) stay queued, so a failed replay never
    /// loses data.  Replays happen in queue order.
    pub async fn drain(&self, client: &ApiClient) -> Result<DrainOutcome, ClientError> {
        let entries = self.load()?;
        let mut outcome = DrainOutcome::default();
        let mut kept = Vec::new();

        for entry in entries {
            match client.create_marker(&entry.request).await {
                Ok(marker) => outcome.synced.push(marker),
                Err(error) => {
                    log::warn!("keeping queued marker {}: {error}", entry.local_id);
                    kept.push(entry);
                }
            }
        }

        outcome.kept = kept.len();
        self.persist(&kept)?;
        Ok(outcome)
    }

    fn load(&self) -> Result<Vec<OfflineMarker>, ClientError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn persist(&self, entries: &[OfflineMarker]) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
