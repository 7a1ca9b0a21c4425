// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! All handlers
//!

use crate::ApiContext;
use axum::Router;
use axum::routing::{get, post};

pub mod auth;
pub mod friends;
pub mod marker_types;
pub mod markers;

/// Set up the API routes
pub fn router() -> Router<ApiContext> {
    #[rustfmt::skip]
    let apiv1 = Router::new()
        .route("/auth/register",          post(auth::handle_register))
        .route("/auth/login",             post(auth::handle_login))
        .route("/markers",                get(markers::handle_get_markers)
                                              .post(markers::handle_post_marker))
        .route("/markers/{id}",           get(markers::handle_get_marker)
                                              .put(markers::handle_put_marker)
                                              .delete(markers::handle_delete_marker))
        .route("/marker-types",           get(marker_types::handle_get_marker_types))
        .route("/friends",                get(friends::handle_get_friends)
                                              .post(friends::handle_post_friend))
        .route("/friends/{id}",           axum::routing::delete(friends::handle_delete_friend))
        .route("/friends/requests",       get(friends::handle_get_requests))
        .route("/friends/request",        post(friends::handle_post_request))
        .route("/friends/request/handle", post(friends::handle_post_request_handle))
        .route("/friends/search",         get(friends::handle_get_search));

    apiv1
}
