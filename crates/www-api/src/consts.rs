// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! Web API consts
//!

/// How long a bearer token stays valid
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// The Authorization scheme expected on authed routes
pub const BEARER_PREFIX: &str = "Bearer ";
