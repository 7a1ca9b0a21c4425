// SPDX-License-Identifier: MIT

//!
//! Marker visibility levels
//!

use serde::{Deserialize, Serialize};

/// Who can see a marker.
///
/// `Friend` visibility means the marker is visible to its creator's friends
/// (the friendship graph lives in the persistence layer).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum Visibility {
    #[default]
    Private,
    Friend,
    Public,
}

impl Visibility {
    /// The wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Friend => "friend",
            Visibility::Public => "public",
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn serde_lowercase() {
        assert_eq!(serde_json::to_string(&Visibility::Friend).unwrap(), r#""friend""#);
        let parsed: Visibility = serde_json::from_str(r#""public""#).unwrap();
        assert_eq!(parsed, Visibility::Public);
    }
}
