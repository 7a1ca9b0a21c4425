// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! *Part of the wider GeoMark project*
//!
//! This library crate is responsible for all database interactions and
//! management for the GeoMark project.  It does the following:
//!
//! - Enables CRUD (Create, Read, Update, Delete) operations on markers
//! - Provides visibility-aware marker listing (public / own / friend)
//! - Provides user registration and credential verification
//! - Provides friendships, friend requests and user search
//! - Provides marker type lookup
//!
//! This crate makes use of the basic GeoMark `core` crate for primitive
//! types, and is itself used by the `www-api` and `bins` crates.
//!

mod crud;
mod db;

pub use crud::*;
pub use db::*;

#[cfg(test)]
pub mod test {
    use crate::{Create, register};
    use chrono::{DateTime, Utc};
    use geomark_core::{
        GeoPoint, GeomarkId, Marker, RegisterRequest, Title, User, Visibility,
    };
    use sqlx::{Sqlite, Transaction};

    pub fn instant(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    pub async fn seed_user(transaction: &mut Transaction<'_, Sqlite>, username: &str) -> User {
        register(
            transaction,
            &RegisterRequest {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                phone: format!("+44-{username}"),
                password: "hunter2hunter2".to_string(),
            },
        )
        .await
        .unwrap()
    }

    pub fn valid_marker(visibility: Visibility) -> Marker {
        Marker::from(
            None,
            Title::from("Noodle bar").unwrap(),
            Some("Open late".to_string()),
            GeoPoint::from(31.23, 121.47, Some(4.0)).unwrap(),
            instant("2024-10-01T12:00:00Z"),
            Some(instant("2024-10-01T13:00:00Z")),
            None,
            visibility,
            None,
            None,
            None,
        )
        .unwrap()
    }

    pub async fn seed_marker(
        transaction: &mut Transaction<'_, Sqlite>,
        creator: &GeomarkId,
        visibility: Visibility,
    ) -> Marker {
        let mut marker = valid_marker(visibility);
        marker.create(transaction, creator).await.unwrap();
        marker
    }
}
