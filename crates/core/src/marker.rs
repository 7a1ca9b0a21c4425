// SPDX-License-Identifier: MIT

//!
//! The GeoMark marker type
//!

use crate::{GeoPoint, GeomarkId, Title, Visibility};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

/// Errors that can arise in relation to a [`Marker`]
#[derive(Error, Debug)]
pub enum MarkerError {
    #[error("The marker's end time precedes its start time")]
    Times,
}

/// A marker's type (category): name plus presentation hints
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MarkerType {
    /// The type's ID
    #[serde(rename = "typeId")]
    pub type_id: Option<GeomarkId>,

    /// The type's display name
    pub name: String,

    /// Icon URL (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Default CSS colour value, e.g. `#FF0000`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Who created a marker
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CreatedBy {
    #[serde(rename = "userId")]
    pub user_id: GeomarkId,
    pub username: String,
}

/// The GeoMark [`Marker`] type: a geotagged, time-scoped point of interest
///
/// `time_end` is optional; when absent the marker is an instantaneous event
/// (a zero-width interval equal to `time_start`).  Construction rejects
/// `time_end < time_start`, but consumers of already-stored data must
/// tolerate inverted intervals — see [`Marker::end_or_start`].
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Marker {
    /// The marker's ID
    id: Option<GeomarkId>,

    /// The marker's title
    title: Title,

    /// Optional longer description
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    /// Where the marker sits
    #[serde(flatten)]
    point: GeoPoint,

    /// When the marker begins
    time_start: DateTime<Utc>,

    /// When the marker ends (if it does)
    #[serde(skip_serializing_if = "Option::is_none")]
    time_end: Option<DateTime<Utc>>,

    /// The marker's type (category)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    marker_type: Option<MarkerType>,

    /// Who can see the marker
    visibility: Visibility,

    /// Who created the marker
    #[serde(rename = "createdBy", skip_serializing_if = "Option::is_none")]
    created_by: Option<CreatedBy>,

    /// When the marker row was created
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,

    /// When the marker row was last updated
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

// Ord using just the marker ID (positions and instants have no meaningful
// total order between markers)
impl Ord for Marker {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl PartialOrd for Marker {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Marker {}

#[allow(clippy::too_many_arguments)]
impl Marker {
    /// Create a valid GeoMark [`Marker`] if it is possible to do so with the
    /// values passed in
    pub fn from(
        id: Option<GeomarkId>,
        title: Title,
        description: Option<String>,
        point: GeoPoint,
        time_start: DateTime<Utc>,
        time_end: Option<DateTime<Utc>>,
        marker_type: Option<MarkerType>,
        visibility: Visibility,
        created_by: Option<CreatedBy>,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Result<Marker, MarkerError> {
        let marker = Marker {
            id,
            title,
            description,
            point,
            time_start,
            time_end,
            marker_type,
            visibility,
            created_by,
            created_at,
            updated_at,
        };

        if marker.has_valid_times() {
            Ok(marker)
        } else {
            Err(MarkerError::Times)
        }
    }

    /// Whether the marker's interval is well formed
    fn has_valid_times(&self) -> bool {
        match self.time_end {
            Some(end) => end >= self.time_start,
            None => true,
        }
    }

    /// Get the marker's ID
    pub fn id(&self) -> Option<GeomarkId> {
        self.id
    }

    /// Set the marker's ID
    pub fn set_id(&mut self, id: GeomarkId) {
        self.id = Some(id);
    }

    /// Clear the marker's ID
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Get the marker's title
    pub fn title(&self) -> &Title {
        &self.title
    }

    /// Set the marker's title
    pub fn set_title(&mut self, title: Title) {
        self.title = title;
    }

    /// Get the marker's description
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Set the marker's description
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Get the marker's position
    pub fn point(&self) -> GeoPoint {
        self.point
    }

    /// Set the marker's position
    pub fn set_point(&mut self, point: GeoPoint) {
        self.point = point;
    }

    /// Get the marker's start instant
    pub fn time_start(&self) -> DateTime<Utc> {
        self.time_start
    }

    /// Set the marker's start instant if the interval will remain valid
    pub fn set_time_start(&mut self, time_start: DateTime<Utc>) -> Result<(), MarkerError> {
        let mut tmp = self.clone();
        tmp.time_start = time_start;
        if !tmp.has_valid_times() {
            return Err(MarkerError::Times);
        }
        self.time_start = time_start;
        Ok(())
    }

    /// Get the marker's end instant (if set)
    pub fn time_end(&self) -> Option<DateTime<Utc>> {
        self.time_end
    }

    /// Set the marker's end instant if the interval will remain valid
    pub fn set_time_end(&mut self, time_end: Option<DateTime<Utc>>) -> Result<(), MarkerError> {
        let mut tmp = self.clone();
        tmp.time_end = time_end;
        if !tmp.has_valid_times() {
            return Err(MarkerError::Times);
        }
        self.time_end = time_end;
        Ok(())
    }

    /// The marker's effective end instant.
    ///
    /// A missing `time_end` means an instantaneous event, and a stored
    /// inverted interval (`time_end < time_start`) is normalised to
    /// `time_start` rather than rejected, so callers can treat the result as
    /// the inclusive upper edge of the interval without panicking.
    pub fn end_or_start(&self) -> DateTime<Utc> {
        self.time_end
            .map_or(self.time_start, |end| end.max(self.time_start))
    }

    /// Get the marker's type (category)
    pub fn marker_type(&self) -> Option<&MarkerType> {
        self.marker_type.as_ref()
    }

    /// Set the marker's type (category)
    pub fn set_marker_type(&mut self, marker_type: Option<MarkerType>) {
        self.marker_type = marker_type;
    }

    /// Get the marker's visibility
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Set the marker's visibility
    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    /// Get the marker's creator
    pub fn created_by(&self) -> Option<&CreatedBy> {
        self.created_by.as_ref()
    }

    /// Get when the marker row was created
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Get when the marker row was last updated
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

#[derive(Deserialize)]
struct RawMarker {
    id: Option<GeomarkId>,
    title: Title,
    description: Option<String>,
    #[serde(flatten)]
    point: GeoPoint,
    time_start: DateTime<Utc>,
    time_end: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    marker_type: Option<MarkerType>,
    #[serde(default)]
    visibility: Visibility,
    #[serde(rename = "createdBy")]
    created_by: Option<CreatedBy>,
    #[serde(rename = "createdAt")]
    created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt")]
    updated_at: Option<DateTime<Utc>>,
}

impl<'de> Deserialize<'de> for Marker {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawMarker::deserialize(deserializer)?;
        Marker::from(
            raw.id,
            raw.title,
            raw.description,
            raw.point,
            raw.time_start,
            raw.time_end,
            raw.marker_type,
            raw.visibility,
            raw.created_by,
            raw.created_at,
            raw.updated_at,
        )
        .map_err(serde::de::Error::custom)
    }
}
