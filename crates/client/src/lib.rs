// SPDX-License-Identifier: MIT

//!
//! *Part of the wider GeoMark project*
//!
//! The GeoMark API client: a session object holding the base URL, the HTTP
//! client and (after login) the bearer token.  All state travels in the
//! [`ApiClient`] value; nothing is ambient.
//!
//! The [`offline`] module keeps unsynced marker creations in a durable JSON
//! queue and replays them when connectivity returns.
//!

pub mod offline;

use chrono::{DateTime, Utc};
use geomark_core::{
    ErrorBody, FriendAddRequest, FriendRequestHandleRequest, FriendRequestSendRequest,
    FriendRequestSummary, FriendSummary, GeomarkId, LoginRequest, LoginResponse, Marker,
    MarkerCreateRequest, MarkerPage, MarkerType, MarkerUpdateRequest, MessageResponse,
    RegisterRequest, RegisterResponse, UserSearchHit,
};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can arise when talking to the API
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a response (connectivity, DNS, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error body
    #[error("API error {status}: {} ({})", body.message, body.code)]
    Api { status: StatusCode, body: ErrorBody },

    /// An authed call was made before logging in
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// The server's error code, if the server produced one
    pub fn api_code(&self) -> Option<&str> {
        match self {
            ClientError::Api { body, .. } => Some(&body.code),
            _ => None,
        }
    }
}

/// Filters for a marker listing, serialised as query parameters
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct MarkerQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<f64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_id: Option<GeomarkId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

/// A session against one GeoMark API instance
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for an API at `base_url` (e.g.
    /// `http://localhost:2408/api/v1`)
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            token: None,
        }
    }

    /// Whether the session holds a token
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Adopt a token obtained elsewhere (e.g. restored from disk)
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Drop the session's token
    pub fn logout(&mut self) {
        self.token = None;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authed(&self, builder: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_ref().ok_or(ClientError::NotAuthenticated)?;
        Ok(builder.bearer_auth(token))
    }

    /// Register a new account
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<RegisterResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    /// Log in and keep the returned token for subsequent calls
    pub async fn login(&mut self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(request)
            .send()
            .await?;
        let login: LoginResponse = decode(response).await?;
        self.token = Some(login.token.clone());
        Ok(login)
    }

    /// Fetch all visible markers matching the query
    pub async fn fetch_markers(&self, query: &MarkerQuery) -> Result<MarkerPage, ClientError> {
        let request = self.authed(self.http.get(self.url("/markers")))?.query(query);
        decode(request.send().await?).await
    }

    /// Fetch one marker
    pub async fn fetch_marker(&self, id: &GeomarkId) -> Result<Marker, ClientError> {
        let request = self.authed(self.http.get(self.url(&format!("/markers/{id}"))))?;
        decode(request.send().await?).await
    }

    /// Create a marker
    pub async fn create_marker(
        &self,
        request: &MarkerCreateRequest,
    ) -> Result<Marker, ClientError> {
        let request = self
            .authed(self.http.post(self.url("/markers")))?
            .json(request);
        decode(request.send().await?).await
    }

    /// Update a marker (absent fields are left untouched)
    pub async fn update_marker(
        &self,
        id: &GeomarkId,
        request: &MarkerUpdateRequest,
    ) -> Result<Marker, ClientError> {
        let request = self
            .authed(self.http.put(self.url(&format!("/markers/{id}"))))?
            .json(request);
        decode(request.send().await?).await
    }

    /// Delete a marker
    pub async fn delete_marker(&self, id: &GeomarkId) -> Result<(), ClientError> {
        let request = self.authed(self.http.delete(self.url(&format!("/markers/{id}"))))?;
        expect_success(request.send().await?).await
    }

    /// Fetch all marker types
    pub async fn fetch_marker_types(&self) -> Result<Vec<MarkerType>, ClientError> {
        let request = self.authed(self.http.get(self.url("/marker-types")))?;
        decode(request.send().await?).await
    }

    /// List friends
    pub async fn fetch_friends(&self) -> Result<Vec<FriendSummary>, ClientError> {
        let request = self.authed(self.http.get(self.url("/friends")))?;
        decode(request.send().await?).await
    }

    /// Add a friend directly
    pub async fn add_friend(&self, target: &GeomarkId) -> Result<FriendSummary, ClientError> {
        let request = self
            .authed(self.http.post(self.url("/friends")))?
            .json(&FriendAddRequest {
                target_user_id: *target,
            });
        decode(request.send().await?).await
    }

    /// Remove a friend
    pub async fn remove_friend(&self, target: &GeomarkId) -> Result<(), ClientError> {
        let request = self.authed(self.http.delete(self.url(&format!("/friends/{target}"))))?;
        expect_success(request.send().await?).await
    }

    /// List pending incoming friend requests
    pub async fn fetch_friend_requests(&self) -> Result<Vec<FriendRequestSummary>, ClientError> {
        let request = self.authed(self.http.get(self.url("/friends/requests")))?;
        decode(request.send().await?).await
    }

    /// Send a friend request
    pub async fn send_friend_request(
        &self,
        target: &GeomarkId,
        message: Option<String>,
    ) -> Result<MessageResponse, ClientError> {
        let request = self
            .authed(self.http.post(self.url("/friends/request")))?
            .json(&FriendRequestSendRequest {
                target_user_id: *target,
                message,
            });
        decode(request.send().await?).await
    }

    /// Accept or decline a friend request
    pub async fn handle_friend_request(
        &self,
        request_id: &GeomarkId,
        accept: bool,
    ) -> Result<MessageResponse, ClientError> {
        let request = self
            .authed(self.http.post(self.url("/friends/request/handle")))?
            .json(&FriendRequestHandleRequest {
                request_id: *request_id,
                accept,
            });
        decode(request.send().await?).await
    }

    /// Search users
    pub async fn search_users(&self, query: &str) -> Result<Vec<UserSearchHit>, ClientError> {
        let request = self
            .authed(self.http.get(self.url("/friends/search")))?
            .query(&[("query", query)]);
        decode(request.send().await?).await
    }
}

/// Decode a JSON response, turning non-2xx answers into
/// [`ClientError::Api`]
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        Err(api_error(status, response).await)
    }
}

/// Check a response for success, discarding any body
async fn expect_success(response: Response) -> Result<(), ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(api_error(status, response).await)
    }
}

async fn api_error(status: StatusCode, response: Response) -> ClientError {
    // A proxy in the way may answer with a non-JSON body
    let body = response.json::<ErrorBody>().await.unwrap_or(ErrorBody {
        code: "INTERNAL_ERROR".to_string(),
        message: format!("The server answered {status} with no error body"),
        details: None,
    });
    ClientError::Api { status, body }
}
