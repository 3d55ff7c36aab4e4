use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mongodb::error::{ErrorKind, WriteError, WriteFailure};
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid user ID format: {0}")]
    InvalidId(String),

    #[error("No fields provided for update")]
    EmptyUpdate,

    #[error("User with email {0} already exists")]
    DuplicateEmail(String),

    #[error("User with ID {0} not found")]
    NotFound(Uuid),

    #[error("{0}")]
    Persistence(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    /// Prefix store and internal faults with the operation that hit them.
    ///
    /// Client errors already carry a complete message and pass through.
    pub fn during(self, operation: &str) -> Self {
        match self {
            UserError::Database(msg) => UserError::Database(format!("{}: {}", operation, msg)),
            UserError::Internal(msg) => UserError::Internal(format!("{}: {}", operation, msg)),
            other => other,
        }
    }
}

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(errors) => AppError::ValidationError(errors),
            err @ UserError::InvalidId(_) => AppError::InvalidIdentifier(err.to_string()),
            err @ UserError::EmptyUpdate => AppError::BadRequest(err.to_string()),
            err @ UserError::DuplicateEmail(_) => AppError::Duplicate(err.to_string()),
            err @ UserError::NotFound(_) => AppError::NotFound(err.to_string()),
            UserError::Persistence(msg) | UserError::Database(msg) | UserError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Database(err.to_string())
    }
}

/// Whether a driver error is a unique index violation (E11000)
pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(WriteError { code: 11000, .. }))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use validator::Validate;

    fn status_of(err: UserError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_client_errors_map_to_400() {
        #[derive(Validate)]
        struct AgeInput {
            #[validate(range(min = 1))]
            age: i32,
        }
        let errors = AgeInput { age: 0 }.validate().unwrap_err();

        assert_eq!(status_of(UserError::Validation(errors)), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(UserError::InvalidId("nope".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(UserError::EmptyUpdate), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(UserError::DuplicateEmail("john@example.com".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(
            status_of(UserError::NotFound(Uuid::new_v4())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_server_errors_map_to_500() {
        assert_eq!(
            status_of(UserError::Persistence("Failed to create user".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(UserError::Database("connection refused".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(UserError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_store_fault_message_reaches_client() {
        use http_body_util::BodyExt;

        let err = UserError::Database("connection refused".into()).during("Error fetching users");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "INTERNAL_ERROR");
        assert_eq!(body["message"], "Error fetching users: connection refused");
    }

    #[test]
    fn test_during_leaves_client_errors_alone() {
        assert!(matches!(
            UserError::EmptyUpdate.during("Error updating user"),
            UserError::EmptyUpdate
        ));
        assert_eq!(
            UserError::Internal("bad id".into())
                .during("Error fetching user")
                .to_string(),
            "Internal error: Error fetching user: bad id"
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            UserError::DuplicateEmail("john@example.com".into()).to_string(),
            "User with email john@example.com already exists"
        );
        assert_eq!(
            UserError::InvalidId("abc".into()).to_string(),
            "Invalid user ID format: abc"
        );
        assert_eq!(
            UserError::EmptyUpdate.to_string(),
            "No fields provided for update"
        );
    }
}
