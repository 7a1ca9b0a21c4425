// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! CRUD traits and errors
//!

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use geomark_core::GeomarkId;
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, Transaction};
use thiserror::Error;

/// Alias of u64
pub type RowsAffected = u64;

/// Used to limit the number of things fetched/returned.
///
/// Can easily be destructured, e.g.:
///
/// ```
/// use geomark_crud::Limit;
///
/// fn my_func(Limit(limit): Limit) {
///     println!("Limit is {}", limit);
/// }
/// ```
#[derive(Serialize, Deserialize, Hash, PartialEq, Eq, Debug, Clone)]
pub struct Limit(pub u32);

/// The filters a marker listing can carry.  All fields optional; an empty
/// filter matches everything the requesting user may see.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MarkerFilter {
    /// Keep markers whose start time is at or after this instant
    pub time_start: Option<DateTime<Utc>>,

    /// Keep markers whose start time is at or before this instant
    pub time_end: Option<DateTime<Utc>>,

    /// Minimum altitude in metres
    pub min_altitude: Option<f64>,

    /// Maximum altitude in metres
    pub max_altitude: Option<f64>,

    /// Keep markers of this type only
    pub type_id: Option<GeomarkId>,

    /// Case-insensitive substring match on title and description
    pub keyword: Option<String>,
}

/// Implementing types can fetch all instances
#[allow(async_fn_in_trait)]
#[async_trait]
pub trait FetchAll: Sized + Send {
    async fn fetch_all(transaction: &mut Transaction<'_, Sqlite>) -> Result<Self, CrudError>;
}

/// Implementing types can be fetched using their [`GeomarkId`]
#[allow(async_fn_in_trait)]
pub trait FetchById: Sized {
    /// Fetch the thing using its [`GeomarkId`]
    async fn fetch_by_id(
        transaction: &mut Transaction<'_, Sqlite>,
        id: &GeomarkId,
    ) -> Result<Self, CrudError>;
}

/// Implementing types can be deleted using their [`GeomarkId`]
#[allow(async_fn_in_trait)]
pub trait DeleteById {
    /// Delete the thing using its [`GeomarkId`]
    async fn delete_by_id(
        transaction: &mut Transaction<'_, Sqlite>,
        id: &GeomarkId,
    ) -> Result<(), CrudError>;
}

/// Implementing types can be created in the database
#[allow(async_fn_in_trait)]
pub trait Create {
    /// Create the data in the database on behalf of a user
    async fn create(
        &mut self,
        transaction: &mut Transaction<'_, Sqlite>,
        creator_id: &GeomarkId,
    ) -> Result<(), CrudError>;
}

/// Implementing types can be updated in the database
#[allow(async_fn_in_trait)]
pub trait Update {
    async fn update(&mut self, transaction: &mut Transaction<'_, Sqlite>) -> Result<(), CrudError>;
}

/// All errors that could occur when running CRUD operations
#[derive(Debug, Error, Clone, Hash, PartialEq, Eq)]
pub enum CrudError {
    #[error("The ID field is not set")]
    IdNotSet,

    #[error("The ID is not in the database")]
    IdNotInDb,

    #[error("Not in the database")]
    NotInDb,

    #[error("Not unique in the database: {0}")]
    NotUniqueInDb(String),

    #[error("The username, email or phone is already in use")]
    UserAlreadyExists,

    #[error("The supplied credentials are wrong")]
    InvalidCredentials,

    #[error("The two users are already friends")]
    AlreadyFriends,

    #[error("A friend request between the two users already exists")]
    RequestExists,

    #[error("The user may not perform this operation")]
    Forbidden,

    #[error("A stored marker row is malformed")]
    MalformedMarkerRow,

    #[error("SQLx database error: {0}")]
    SqlxDbError(String),

    #[error("Database migration error: {0}")]
    DbMigrate(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<sqlx::Error> for CrudError {
    fn from(value: sqlx::Error) -> Self {
        if let Some(db_err) = value.as_database_error() {
            if db_err.is_unique_violation() {
                return CrudError::NotUniqueInDb(db_err.message().to_string());
            }
        }

        Self::SqlxDbError(value.to_string())
    }
}

impl From<std::io::Error> for CrudError {
    fn from(value: std::io::Error) -> Self {
        CrudError::Io(value.to_string())
    }
}
