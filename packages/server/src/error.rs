use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

/// Which storage-level constraint rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// A referenced category, ingredient or recipe does not exist
    /// (or a row is still referenced and cannot be removed).
    ForeignKey,
    /// A unique name or a (recipe, ingredient) pair was used twice.
    Unique,
}

/// Errors returned by the catalog repositories and services.
///
/// Storage failures are classified but never swallowed: the original
/// [`DbErr`] stays reachable through `source()`.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("constraint violation ({kind:?}): {detail}")]
    ConstraintViolation {
        kind: ConstraintKind,
        detail: String,
        #[source]
        source: DbErr,
    },

    #[error("transaction failed: {0}")]
    TransactionFailure(#[source] DbErr),

    #[error(transparent)]
    Unknown(DbErr),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CatalogError {
    pub fn not_found(what: impl Into<String>) -> Self {
        CatalogError::NotFound(what.into())
    }

    /// Wrap a begin/commit/rollback failure.
    pub fn transaction(err: DbErr) -> Self {
        CatalogError::TransactionFailure(err)
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, CatalogError::ConstraintViolation { .. })
    }
}

impl From<DbErr> for CatalogError {
    fn from(err: DbErr) -> Self {
        let classified = match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                Some((ConstraintKind::ForeignKey, detail))
            }
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                Some((ConstraintKind::Unique, detail))
            }
            _ => None,
        };

        match (classified, err) {
            (Some((kind, detail)), source) => CatalogError::ConstraintViolation {
                kind,
                detail,
                source,
            },
            (None, DbErr::RecordNotFound(what)) => CatalogError::NotFound(what),
            (None, other) => CatalogError::Unknown(other),
        }
    }
}

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `NOT_FOUND`,
    /// `CONFLICT`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Title must be 1-256 characters")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
            CatalogError::ConstraintViolation { kind, detail, .. } => {
                tracing::warn!(?kind, %detail, "Write rejected by constraint");
                match kind {
                    ConstraintKind::ForeignKey => AppError::Conflict(
                        "Referenced record does not exist or is still in use".into(),
                    ),
                    ConstraintKind::Unique => AppError::Conflict("Record already exists".into()),
                }
            }
            CatalogError::Storage(e) => e.into(),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => AppError::NotFound("Image not found".into()),
            StorageError::SizeLimitExceeded { limit, .. } => {
                AppError::Validation(format!("Image exceeds maximum size of {limit} bytes"))
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}
