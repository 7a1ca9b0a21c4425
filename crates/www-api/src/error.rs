// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! API error responses: `{code, message, details?}` with the matching HTTP
//! status code
//!

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use geomark_core::{ErrorBody, ErrorDetail};
use geomark_crud::CrudError;

/// Container for API errors.  Can be sent back to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: &str) -> Self {
        ApiError {
            status,
            body: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
                details: None,
            },
        }
    }

    /// 400 `VALIDATION_ERROR` with field-level details
    pub fn validation(details: Vec<ErrorDetail>) -> Self {
        let mut error = Self::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "The request body is invalid",
        );
        error.body.details = Some(details);
        error
    }

    /// 400 `VALIDATION_ERROR` for a single field
    pub fn validation_field(field: &str, issue: &str) -> Self {
        Self::validation(vec![ErrorDetail {
            field: field.to_string(),
            issue: issue.to_string(),
        }])
    }

    /// 401 `UNAUTHENTICATED`
    pub fn unauthenticated() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "UNAUTHENTICATED",
            "A valid bearer token is required",
        )
    }

    /// 401 `INVALID_CREDENTIALS`
    pub fn invalid_credentials() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            "The identity or password is wrong",
        )
    }

    /// 403 `FORBIDDEN`
    pub fn forbidden() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "FORBIDDEN",
            "You may not perform this operation",
        )
    }

    /// 404 `NOT_FOUND`
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", "No such resource")
    }

    /// `ALREADY_FRIENDS` with the status the route calls for (the direct-add
    /// route answers 403, the request route 409)
    pub fn already_friends(status: StatusCode) -> Self {
        Self::new(status, "ALREADY_FRIENDS", "The two users are already friends")
    }

    /// The HTTP status this error answers with
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The machine-readable error code
    pub fn code(&self) -> &str {
        &self.body.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(value: sqlx::Error) -> Self {
        let value: CrudError = value.into();
        value.into()
    }
}

impl From<CrudError> for ApiError {
    fn from(value: CrudError) -> Self {
        match value {
            CrudError::UserAlreadyExists => Self::new(
                StatusCode::CONFLICT,
                "USER_ALREADY_EXISTS",
                "The username, email or phone is already in use",
            ),
            CrudError::AlreadyFriends => Self::already_friends(StatusCode::CONFLICT),
            CrudError::RequestExists => Self::new(
                StatusCode::CONFLICT,
                "REQUEST_EXISTS",
                "A friend request between the two users already exists",
            ),
            CrudError::Forbidden => Self::forbidden(),
            CrudError::InvalidCredentials => Self::invalid_credentials(),
            CrudError::IdNotInDb | CrudError::NotInDb => Self::not_found(),
            other => {
                log::error!("CRUD error: {other}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unknown server error occurred",
                )
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn crud_errors_map_to_codes() {
        let error: ApiError = CrudError::UserAlreadyExists.into();
        assert_eq!(error.status(), StatusCode::CONFLICT);
        assert_eq!(error.code(), "USER_ALREADY_EXISTS");

        let error: ApiError = CrudError::IdNotInDb.into();
        assert_eq!(error.status(), StatusCode::NOT_FOUND);

        // Internals never leak their message
        let error: ApiError = CrudError::SqlxDbError("secret".to_string()).into();
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn validation_carries_details() {
        let error = ApiError::validation_field("latitude", "out of range");
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.code(), "VALIDATION_ERROR");
    }
}
