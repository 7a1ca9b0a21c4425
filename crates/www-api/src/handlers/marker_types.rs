// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! Web API for marker types
//!

use crate::{ApiContext, ApiError, CurrentUser};
use axum::Json;
use axum::extract::State;
use geomark_crud::{FetchAll, MarkerTypes};

/// Handle a request to list all marker types
pub async fn handle_get_marker_types(
    State(context): State<ApiContext>,
    CurrentUser(_): CurrentUser,
) -> Result<Json<MarkerTypes>, ApiError> {
    let mut transaction = context.pool().begin().await?;
    let types = MarkerTypes::fetch_all(&mut transaction).await?;
    Ok(Json(types))
}
