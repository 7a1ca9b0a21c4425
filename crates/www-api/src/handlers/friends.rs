// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! Web API for friendships, friend requests and user search
//!

use crate::{ApiContext, ApiError, CurrentUser, SearchQueryParams};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use geomark_core::{
    FriendAddRequest, FriendRequestHandleRequest, FriendRequestSendRequest, FriendRequestSummary,
    FriendSummary, GeomarkId, MessageResponse, UserSearchHit,
};
use geomark_crud::{
    CrudError, add_friendship, fetch_user_by_id, handle_request, list_friends,
    list_incoming_requests, mutual_friend_count, remove_friendship, search_users, send_request,
};

/// Handle a request to list the user's friends
pub async fn handle_get_friends(
    State(context): State<ApiContext>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<FriendSummary>>, ApiError> {
    let mut transaction = context.pool().begin().await?;
    let friends = list_friends(&mut transaction, &user_id).await?;
    Ok(Json(friends))
}

/// Handle a request to add a friend directly.  Answers 403
/// `ALREADY_FRIENDS` if the pair are already friends.
pub async fn handle_post_friend(
    State(context): State<ApiContext>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<FriendAddRequest>,
) -> Result<(StatusCode, Json<FriendSummary>), ApiError> {
    let mut transaction = context.pool().begin().await?;
    add_friendship(&mut transaction, &user_id, &payload.target_user_id)
        .await
        .map_err(|error| match error {
            CrudError::AlreadyFriends => ApiError::already_friends(StatusCode::FORBIDDEN),
            other => other.into(),
        })?;

    let target = fetch_user_by_id(&mut transaction, &payload.target_user_id).await?;
    let mutual_friends =
        mutual_friend_count(&mut transaction, &user_id, &payload.target_user_id).await?;
    transaction.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(FriendSummary {
            id: target.id,
            name: target.username,
            email: target.email,
            phone: target.phone,
            mutual_friends,
            created_at: None,
        }),
    ))
}

/// Handle a request to remove a friend
pub async fn handle_delete_friend(
    State(context): State<ApiContext>,
    CurrentUser(user_id): CurrentUser,
    Path(friend_id): Path<GeomarkId>,
) -> Result<StatusCode, ApiError> {
    let mut transaction = context.pool().begin().await?;
    remove_friendship(&mut transaction, &user_id, &friend_id).await?;
    transaction.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle a request to list pending incoming friend requests
pub async fn handle_get_requests(
    State(context): State<ApiContext>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<FriendRequestSummary>>, ApiError> {
    let mut transaction = context.pool().begin().await?;
    let requests = list_incoming_requests(&mut transaction, &user_id).await?;
    Ok(Json(requests))
}

/// Handle a request to send a friend request.  Answers 409
/// `ALREADY_FRIENDS` or `REQUEST_EXISTS` on conflicts.
pub async fn handle_post_request(
    State(context): State<ApiContext>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<FriendRequestSendRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut transaction = context.pool().begin().await?;
    send_request(
        &mut transaction,
        &user_id,
        &payload.target_user_id,
        payload.message.as_deref(),
    )
    .await?;
    transaction.commit().await?;

    Ok(Json(MessageResponse {
        message: "Friend request sent".to_string(),
    }))
}

/// Handle a request to accept or decline a friend request (recipient only)
pub async fn handle_post_request_handle(
    State(context): State<ApiContext>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<FriendRequestHandleRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut transaction = context.pool().begin().await?;
    handle_request(&mut transaction, &user_id, &payload.request_id, payload.accept).await?;
    transaction.commit().await?;

    let message = if payload.accept {
        "Friend request accepted"
    } else {
        "Friend request declined"
    };
    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}

/// Handle a user search
pub async fn handle_get_search(
    State(context): State<ApiContext>,
    CurrentUser(user_id): CurrentUser,
    Query(params): Query<SearchQueryParams>,
) -> Result<Json<Vec<UserSearchHit>>, ApiError> {
    let mut transaction = context.pool().begin().await?;
    let hits = search_users(&mut transaction, &params.query, &user_id).await?;
    Ok(Json(hits))
}
