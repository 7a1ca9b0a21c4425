// SPDX-License-Identifier: MIT

//!
//! Request and response bodies shared by the GeoMark web API and client
//!

use crate::{GeoError, GeomarkId, Marker, Title, Visibility};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can arise when validating a marker request body
#[derive(Error, Debug)]
pub enum MarkerRequestError {
    #[error(transparent)]
    Geo(#[from] GeoError),

    #[error("The marker's end time precedes its start time")]
    Times,
}

/// One field-level problem inside a [`ErrorBody`]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorDetail {
    pub field: String,
    pub issue: String,
}

/// The API error body: `{code, message, details?}`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ErrorDetail>>,
}

/// A plain `{message}` acknowledgement
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

/// `POST /auth/register` request
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// `POST /auth/register` response
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RegisterResponse {
    #[serde(rename = "userId")]
    pub user_id: GeomarkId,
    pub message: String,
}

/// `POST /auth/login` request.  `identity` may be a username, email address
/// or phone number.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LoginRequest {
    pub identity: String,
    pub password: String,
}

/// The user part of a [`LoginResponse`]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LoginUser {
    #[serde(rename = "userId")]
    pub user_id: GeomarkId,
    pub username: String,
}

/// `POST /auth/login` response
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "expiresIn")]
    pub expires_in: i64,
    pub user: LoginUser,
}

/// `POST /markers` request
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MarkerCreateRequest {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    pub time_start: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<DateTime<Utc>>,
    #[serde(rename = "typeId", skip_serializing_if = "Option::is_none")]
    pub type_id: Option<GeomarkId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

impl MarkerCreateRequest {
    /// Check the request describes a marker that could actually exist
    /// (coordinates in range, interval not inverted)
    pub fn validate(&self) -> Result<(), MarkerRequestError> {
        crate::GeoPoint::from(self.latitude, self.longitude, self.altitude)?;
        if let Some(end) = self.time_end {
            if end < self.time_start {
                return Err(MarkerRequestError::Times);
            }
        }
        Ok(())
    }
}

/// `PUT /markers/{id}` request — every field optional, absent fields are
/// left untouched
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MarkerUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<DateTime<Utc>>,
    #[serde(rename = "typeId", skip_serializing_if = "Option::is_none")]
    pub type_id: Option<GeomarkId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

/// `GET /markers` response
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MarkerPage {
    pub total: usize,
    pub data: Vec<Marker>,
}

/// One friend in a `GET /friends` response
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FriendSummary {
    pub id: GeomarkId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "mutualFriends")]
    pub mutual_friends: u32,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One pending request in a `GET /friends/requests` response
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FriendRequestSummary {
    pub id: GeomarkId,
    #[serde(rename = "senderId")]
    pub sender_id: GeomarkId,
    pub name: String,
    #[serde(rename = "mutualFriends")]
    pub mutual_friends: u32,
    #[serde(rename = "requestDate")]
    pub request_date: DateTime<Utc>,
    pub message: String,
}

/// One hit in a `GET /friends/search` response
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserSearchHit {
    pub id: GeomarkId,
    pub name: String,
    #[serde(rename = "mutualFriends")]
    pub mutual_friends: u32,
    #[serde(rename = "isFriend")]
    pub is_friend: bool,
    #[serde(rename = "isPending")]
    pub is_pending: bool,
}

/// `POST /friends` request (direct add)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FriendAddRequest {
    #[serde(rename = "targetUserId")]
    pub target_user_id: GeomarkId,
}

/// `POST /friends/request` request
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FriendRequestSendRequest {
    #[serde(rename = "targetUserId")]
    pub target_user_id: GeomarkId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `POST /friends/request/handle` request
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FriendRequestHandleRequest {
    #[serde(rename = "requestId")]
    pub request_id: GeomarkId,
    pub accept: bool,
}
