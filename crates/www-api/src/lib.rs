// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! *Part of the wider GeoMark project*
//!
//! This crate provides the web API, which may also be run locally.  This
//! means, for example, that a group or individual could host their own marker
//! store, keep it private, and share it with friends on their own terms.
//!
//! All state the handlers need (connection pool, token signer) travels in an
//! explicit [`ApiContext`]; there are no ambient globals.
//!

mod auth;
mod consts;
mod error;
mod handlers;
mod queries;

pub use auth::*;
pub use error::*;

use consts::*;
use queries::*;

use axum::Router;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::{str::FromStr, sync::Arc};
use tower_http::trace::TraceLayer;

/// Everything a handler needs, passed as axum state
#[derive(Clone)]
pub struct ApiContext {
    pool: Arc<Pool<Sqlite>>,
    signer: Arc<TokenSigner>,
}

impl ApiContext {
    /// Build a context from an already-open pool and a token secret
    pub fn new(pool: Arc<Pool<Sqlite>>, token_secret: &str) -> Self {
        ApiContext {
            pool,
            signer: Arc::new(TokenSigner::new(token_secret, TOKEN_TTL_SECS)),
        }
    }

    /// The connection pool
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// The token signer
    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }
}

/// Set up and serve the API
pub async fn prepare_api_router(db_url: &str, token_secret: &str) -> Result<Router, sqlx::Error> {
    let connect_options = SqliteConnectOptions::from_str(db_url)?;

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;

    let context = ApiContext::new(Arc::new(pool), token_secret);

    // Get the router and add the state
    let apiv1 = handlers::router().with_state(context);

    // Add URL path prefix
    let api = Router::new()
        .nest("/api/v1", apiv1)
        .layer(TraceLayer::new_for_http());

    Ok(api)
}
