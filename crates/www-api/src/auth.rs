// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! Bearer token signing and verification.
//!
//! A token is `<user-id>.<expiry-unix-secs>.<base64url(HMAC-SHA256)>`; the
//! MAC covers the first two segments.  Stateless, so any instance sharing the
//! secret can verify.
//!

use crate::{ApiContext, ApiError, consts::BEARER_PREFIX};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use geomark_core::GeomarkId;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies bearer tokens
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl_secs: i64,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        TokenSigner {
            secret: secret.as_bytes().to_vec(),
            ttl_secs,
        }
    }

    /// How long a freshly signed token lives, in seconds
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    fn mac(&self, payload: &str) -> Vec<u8> {
        // The key is accepted at construction, so this cannot fail
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key size");
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    /// Sign a token for a user, valid for [`TokenSigner::ttl_secs`]
    pub fn sign(&self, user_id: &GeomarkId) -> String {
        let expiry = Utc::now().timestamp() + self.ttl_secs;
        let payload = format!("{user_id}.{expiry}");
        let signature = URL_SAFE_NO_PAD.encode(self.mac(&payload));
        format!("{payload}.{signature}")
    }

    /// Verify a token and extract the user it was signed for
    pub fn verify(&self, token: &str) -> Option<GeomarkId> {
        // UUIDs contain no '.', so the shape is exactly three segments
        let (user_id, rest) = token.split_once('.')?;
        let (expiry, signature) = rest.split_once('.')?;

        let payload = format!("{user_id}.{expiry}");
        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;
        mac.verify_slice(&signature).ok()?;

        let expiry: i64 = expiry.parse().ok()?;
        if expiry <= Utc::now().timestamp() {
            return None;
        }

        GeomarkId::from(user_id).ok()
    }
}

/// The authenticated user, extracted from the `Authorization` header.
///
/// Any handler taking a `CurrentUser` argument is bearer-token authed; a
/// missing or invalid token answers 401 `UNAUTHENTICATED` before the handler
/// runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentUser(pub GeomarkId);

impl FromRequestParts<ApiContext> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        context: &ApiContext,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(ApiError::unauthenticated)?;

        let token = header
            .strip_prefix(BEARER_PREFIX)
            .ok_or_else(ApiError::unauthenticated)?;

        context
            .signer()
            .verify(token)
            .map(CurrentUser)
            .ok_or_else(ApiError::unauthenticated)
    }
}
