// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! Web API for markers
//!

use crate::{ApiContext, ApiError, CurrentUser, MarkerQueryParams};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use geomark_core::{
    GeoPoint, GeomarkId, Marker, MarkerCreateRequest, MarkerPage, MarkerRequestError, MarkerType,
    MarkerUpdateRequest, Visibility,
};
use geomark_crud::{
    Create, DeleteById, FetchById, MarkerTypes, Update, are_friends, fetch_visible_to,
    user_may_see,
};
use sqlx::{Sqlite, Transaction};

fn validation_from(error: MarkerRequestError) -> ApiError {
    match error {
        MarkerRequestError::Geo(geo) => ApiError::validation_field("location", &geo.to_string()),
        MarkerRequestError::Times => {
            ApiError::validation_field("time_end", "must not precede time_start")
        }
    }
}

/// Look up a marker type reference, rejecting unknown IDs
async fn resolve_type(
    transaction: &mut Transaction<'_, Sqlite>,
    type_id: Option<GeomarkId>,
) -> Result<Option<MarkerType>, ApiError> {
    match type_id {
        None => Ok(None),
        Some(type_id) => {
            if !MarkerTypes::contains_id(transaction, &type_id).await? {
                return Err(ApiError::validation_field("typeId", "unknown marker type"));
            }
            Ok(Some(MarkerType {
                type_id: Some(type_id),
                name: String::new(),
                icon: None,
                color: None,
            }))
        }
    }
}

/// Fetch a marker and check the user may see it (404 unknown, 403 hidden)
async fn fetch_permitted(
    transaction: &mut Transaction<'_, Sqlite>,
    user_id: &GeomarkId,
    marker_id: &GeomarkId,
) -> Result<Marker, ApiError> {
    let marker = Marker::fetch_by_id(transaction, marker_id).await?;
    let friend = match marker.created_by() {
        Some(creator) => are_friends(transaction, user_id, &creator.user_id).await?,
        None => false,
    };
    if !user_may_see(&marker, user_id, friend) {
        return Err(ApiError::forbidden());
    }
    Ok(marker)
}

/// Whether the user may modify the marker (creator only)
fn is_creator(marker: &Marker, user_id: &GeomarkId) -> bool {
    marker
        .created_by()
        .is_some_and(|creator| creator.user_id == *user_id)
}

/// Handle a request to list all visible markers
pub async fn handle_get_markers(
    State(context): State<ApiContext>,
    CurrentUser(user_id): CurrentUser,
    Query(params): Query<MarkerQueryParams>,
) -> Result<Json<MarkerPage>, ApiError> {
    let mut transaction = context.pool().begin().await?;
    let data = fetch_visible_to(&mut transaction, &user_id, &params.into()).await?;
    Ok(Json(MarkerPage {
        total: data.len(),
        data,
    }))
}

/// Handle a request to create a marker
pub async fn handle_post_marker(
    State(context): State<ApiContext>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<MarkerCreateRequest>,
) -> Result<(StatusCode, Json<Marker>), ApiError> {
    payload.validate().map_err(validation_from)?;

    let mut transaction = context.pool().begin().await?;
    let marker_type = resolve_type(&mut transaction, payload.type_id).await?;

    // validate() has checked the coordinates and interval already
    let point = GeoPoint::from(payload.latitude, payload.longitude, payload.altitude)
        .map_err(|error| validation_from(error.into()))?;
    let mut marker = Marker::from(
        None,
        payload.title,
        payload.description,
        point,
        payload.time_start,
        payload.time_end,
        marker_type,
        payload.visibility.unwrap_or(Visibility::Private),
        None,
        None,
        None,
    )
    .map_err(|_| ApiError::validation_field("time_end", "must not precede time_start"))?;

    marker.create(&mut transaction, &user_id).await?;
    transaction.commit().await?;

    Ok((StatusCode::CREATED, Json(marker)))
}

/// Handle a request to fetch a single marker
pub async fn handle_get_marker(
    State(context): State<ApiContext>,
    CurrentUser(user_id): CurrentUser,
    Path(marker_id): Path<GeomarkId>,
) -> Result<Json<Marker>, ApiError> {
    let mut transaction = context.pool().begin().await?;
    let marker = fetch_permitted(&mut transaction, &user_id, &marker_id).await?;
    Ok(Json(marker))
}

/// Handle a request to update a marker.  Absent fields are left untouched;
/// only the creator may update.
pub async fn handle_put_marker(
    State(context): State<ApiContext>,
    CurrentUser(user_id): CurrentUser,
    Path(marker_id): Path<GeomarkId>,
    Json(payload): Json<MarkerUpdateRequest>,
) -> Result<Json<Marker>, ApiError> {
    let mut transaction = context.pool().begin().await?;
    let mut marker = Marker::fetch_by_id(&mut transaction, &marker_id).await?;
    if !is_creator(&marker, &user_id) {
        return Err(ApiError::forbidden());
    }

    if let Some(title) = payload.title {
        marker.set_title(title);
    }
    if payload.description.is_some() {
        marker.set_description(payload.description);
    }
    if payload.latitude.is_some() || payload.longitude.is_some() || payload.altitude.is_some() {
        let current = marker.point();
        let point = GeoPoint::from(
            payload.latitude.unwrap_or(current.latitude()),
            payload.longitude.unwrap_or(current.longitude()),
            payload.altitude.or(current.altitude()),
        )
        .map_err(|error| validation_from(error.into()))?;
        marker.set_point(point);
    }
    if let Some(time_start) = payload.time_start {
        marker
            .set_time_start(time_start)
            .map_err(|_| ApiError::validation_field("time_start", "must not follow time_end"))?;
    }
    if let Some(time_end) = payload.time_end {
        marker
            .set_time_end(Some(time_end))
            .map_err(|_| ApiError::validation_field("time_end", "must not precede time_start"))?;
    }
    if payload.type_id.is_some() {
        let marker_type = resolve_type(&mut transaction, payload.type_id).await?;
        marker.set_marker_type(marker_type);
    }
    if let Some(visibility) = payload.visibility {
        marker.set_visibility(visibility);
    }

    marker.update(&mut transaction).await?;
    transaction.commit().await?;

    Ok(Json(marker))
}

/// Handle a request to delete a marker (creator only)
pub async fn handle_delete_marker(
    State(context): State<ApiContext>,
    CurrentUser(user_id): CurrentUser,
    Path(marker_id): Path<GeomarkId>,
) -> Result<StatusCode, ApiError> {
    let mut transaction = context.pool().begin().await?;
    let marker = Marker::fetch_by_id(&mut transaction, &marker_id).await?;
    if !is_creator(&marker, &user_id) {
        return Err(ApiError::forbidden());
    }

    Marker::delete_by_id(&mut transaction, &marker_id).await?;
    transaction.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
