// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! Registration and login
//!

use crate::{ApiContext, ApiError};
use axum::Json;
use axum::extract::State;
use geomark_core::{
    ErrorDetail, LoginRequest, LoginResponse, LoginUser, RegisterRequest, RegisterResponse,
};
use geomark_crud::{CrudError, fetch_by_identity, register};

/// The shortest password accepted at registration
const MIN_PASSWORD_LEN: usize = 8;

fn validate_register(request: &RegisterRequest) -> Vec<ErrorDetail> {
    let mut details = Vec::new();
    let mut require = |field: &str, ok: bool, issue: &str| {
        if !ok {
            details.push(ErrorDetail {
                field: field.to_string(),
                issue: issue.to_string(),
            });
        }
    };

    require("username", !request.username.trim().is_empty(), "must not be empty");
    require("email", request.email.contains('@'), "must be an email address");
    require("phone", !request.phone.trim().is_empty(), "must not be empty");
    require(
        "password",
        request.password.len() >= MIN_PASSWORD_LEN,
        "must be at least 8 characters",
    );
    details
}

/// Handle a request to register a new user
pub async fn handle_register(
    State(context): State<ApiContext>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let details = validate_register(&payload);
    if !details.is_empty() {
        return Err(ApiError::validation(details));
    }

    let mut transaction = context.pool().begin().await?;
    let user = register(&mut transaction, &payload).await?;
    transaction.commit().await?;

    Ok(Json(RegisterResponse {
        user_id: user.id,
        message: "Registration successful".to_string(),
    }))
}

/// Handle a login request.  An unknown identity and a wrong password are
/// indistinguishable to the caller.
pub async fn handle_login(
    State(context): State<ApiContext>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let mut transaction = context.pool().begin().await?;
    let record = fetch_by_identity(&mut transaction, &payload.identity)
        .await
        .map_err(|error| match error {
            CrudError::NotInDb => CrudError::InvalidCredentials,
            other => other,
        })?;

    if !record.verify_password(&payload.password) {
        return Err(ApiError::invalid_credentials());
    }

    let user = record.user();
    let token = context.signer().sign(&user.id);

    Ok(Json(LoginResponse {
        token,
        expires_in: context.signer().ttl_secs(),
        user: LoginUser {
            user_id: user.id,
            username: user.username.clone(),
        },
    }))
}

#[cfg(test)]
mod test {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            phone: "+44-alice".to_string(),
            password: "hunter2hunter2".to_string(),
        }
    }

    #[test]
    fn valid_register_passes() {
        assert!(validate_register(&request()).is_empty());
    }

    #[test]
    fn short_password_and_bad_email_are_flagged() {
        let mut bad = request();
        bad.password = "short".to_string();
        bad.email = "not-an-email".to_string();

        let details = validate_register(&bad);
        let fields: Vec<&str> = details.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "password"]);
    }
}
