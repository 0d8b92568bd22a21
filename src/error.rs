use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug)]
pub enum ApiError {
    NotFound { resource: &'static str, id: i64 },
    Validation(String),
    Conflict(String),
    DatabaseError(sqlx::Error),
}

/// JSON body of every error response
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    pub fn not_found(resource: &'static str, id: i64) -> Self {
        ApiError::NotFound { resource, id }
    }

    /// Turn unique and foreign key violations into a conflict carrying `message`.
    pub fn conflict_on_constraint(err: sqlx::Error, message: impl Into<String>) -> Self {
        match &err {
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
            {
                ApiError::Conflict(message.into())
            }
            _ => ApiError::DatabaseError(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                format!("{} {} not found", resource, id),
            ),
            ApiError::Validation(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
            ApiError::DatabaseError(err) => {
                tracing::error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::DatabaseError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(
            ApiError::not_found("Player", 3).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Validation("role_id is required".into()).into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Conflict("taken".into()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(sqlx::Error::RowNotFound).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn non_constraint_errors_stay_database_errors() {
        let err = ApiError::conflict_on_constraint(sqlx::Error::PoolTimedOut, "taken");
        assert!(matches!(err, ApiError::DatabaseError(_)));
    }
}
