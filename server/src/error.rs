use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("nombre o email ya existe")]
    Duplicate,

    #[error("credenciales inválidas")]
    InvalidCredentials,

    #[error("orden no encontrada")]
    OrderNotFound,

    #[error("transición de estado inválida")]
    InvalidTransition,

    #[error("server error")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        // The only unique constraints are on clientes (nombre, email).
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return AppError::Duplicate;
            }
        }

        AppError::Database(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Duplicate | AppError::InvalidTransition => StatusCode::CONFLICT,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::OrderNotFound => StatusCode::NOT_FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let AppError::Database(err) = &self {
            error!("database failure: {err}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn taxonomy_maps_to_expected_statuses() {
        let cases = [
            (
                AppError::Validation("email inválido".into()),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::Duplicate, StatusCode::CONFLICT),
            (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AppError::OrderNotFound, StatusCode::NOT_FOUND),
            (AppError::InvalidTransition, StatusCode::CONFLICT),
            (
                AppError::Database(sqlx::Error::PoolClosed),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn body_is_json_with_error_field() {
        let response = AppError::OrderNotFound.into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["error"], "orden no encontrada");
    }

    #[tokio::test]
    async fn database_errors_never_leak_details() {
        let response = AppError::Database(sqlx::Error::PoolClosed).into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["error"], "server error");
    }
}
