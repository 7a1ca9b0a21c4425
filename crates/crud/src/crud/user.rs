// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! User registration and credential verification
//!

use crate::crud::common::*;
use chrono::Utc;
use geomark_core::{GeomarkId, RegisterRequest, User};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

/// A user row including its credential material.  Never leaves this crate's
/// callers' process; the API exposes only the inner [`User`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    user: User,
    password_hash: Vec<u8>,
    salt: Vec<u8>,
}

impl UserRecord {
    /// The credential-free user
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Whether the supplied password matches the stored hash
    pub fn verify_password(&self, password: &str) -> bool {
        hash_password(&self.salt, password) == self.password_hash
    }
}

/// Salted SHA-256 of a password
fn hash_password(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

/// Register a new user.  Username, email and phone must all be unused;
/// a clash yields [`CrudError::UserAlreadyExists`].
pub async fn register(
    transaction: &mut Transaction<'_, Sqlite>,
    request: &RegisterRequest,
) -> Result<User, CrudError> {
    let id = GeomarkId::new();
    let mut salt = vec![0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let password_hash = hash_password(&salt, &request.password);

    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, phone, password_hash, salt, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
    "#,
    )
    .bind(id)
    .bind(&request.username)
    .bind(&request.email)
    .bind(&request.phone)
    .bind(&password_hash)
    .bind(&salt)
    .bind(Utc::now())
    .execute(&mut **transaction)
    .await
    .map_err(|error| {
        if let Some(db_err) = error.as_database_error() {
            if db_err.is_unique_violation() {
                return CrudError::UserAlreadyExists;
            }
        }
        error.into()
    })?;

    Ok(User {
        id,
        username: request.username.clone(),
        email: Some(request.email.clone()),
        phone: Some(request.phone.clone()),
    })
}

/// Fetch a user row by username, email or phone
pub async fn fetch_by_identity(
    transaction: &mut Transaction<'_, Sqlite>,
    identity: &str,
) -> Result<UserRecord, CrudError> {
    let row = sqlx::query(
        r#"
        SELECT id, username, email, phone, password_hash, salt
        FROM users
        WHERE username = ? OR email = ? OR phone = ?
    "#,
    )
    .bind(identity)
    .bind(identity)
    .bind(identity)
    .fetch_optional(&mut **transaction)
    .await?
    .ok_or(CrudError::NotInDb)?;
    user_record_from_row(&row)
}

/// Fetch a user by ID
pub async fn fetch_user_by_id(
    transaction: &mut Transaction<'_, Sqlite>,
    id: &GeomarkId,
) -> Result<User, CrudError> {
    let record = sqlx::query(
        r#"
        SELECT id, username, email, phone, password_hash, salt
        FROM users
        WHERE id = ?
    "#,
    )
    .bind(id)
    .fetch_optional(&mut **transaction)
    .await?
    .ok_or(CrudError::IdNotInDb)?;
    Ok(user_record_from_row(&record)?.user)
}

fn user_record_from_row(row: &SqliteRow) -> Result<UserRecord, CrudError> {
    Ok(UserRecord {
        user: User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
        },
        password_hash: row.try_get("password_hash")?,
        salt: row.try_get("salt")?,
    })
}
