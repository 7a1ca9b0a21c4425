// SPDX-License-Identifier: MIT

//!
//! The GeoMark user type
//!

use crate::GeomarkId;
use serde::{Deserialize, Serialize};

/// A GeoMark user, as exposed over the API (never carries credentials)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct User {
    /// The user's ID
    pub id: GeomarkId,

    /// The user's unique username
    pub username: String,

    /// The user's email address (if shared)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// The user's phone number (if shared)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}
