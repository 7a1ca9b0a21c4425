// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! All query parameter structs
//!

use chrono::{DateTime, Utc};
use geomark_core::GeomarkId;
use geomark_crud::MarkerFilter;
use serde::Deserialize;

/// Query parameters accepted by the marker listing.  `min_height` and
/// `max_height` are the wire names for the altitude band; `type` selects a
/// marker type.
#[derive(Deserialize, Default)]
pub struct MarkerQueryParams {
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<DateTime<Utc>>,
    pub min_height: Option<f64>,
    pub max_height: Option<f64>,
    #[serde(rename = "type")]
    pub type_id: Option<GeomarkId>,
    pub keyword: Option<String>,
}

impl From<MarkerQueryParams> for MarkerFilter {
    fn from(params: MarkerQueryParams) -> Self {
        MarkerFilter {
            time_start: params.time_start,
            time_end: params.time_end,
            min_altitude: params.min_height,
            max_altitude: params.max_height,
            type_id: params.type_id,
            keyword: params.keyword,
        }
    }
}

/// Query parameters for user search
#[derive(Deserialize)]
pub struct SearchQueryParams {
    pub query: String,
}
