//! Typed errors and HTTP mapping.

use crate::merge::MergeError;
use crate::query::QueryError;
use crate::record::{DecodeError, RecordError};
use crate::validate::{FatalValidation, RuleError, Verdict};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub const SYSTEM_MESSAGE: &str =
    "There was a problem with the system. If the problem persists contact the administrator.";
pub const CLIENT_MESSAGE: &str =
    "Problem performing request. Please alert the account owner if the problem continues.";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing reference: {kind} '{id}'")]
    MissingReference { kind: &'static str, id: String },
    #[error("invalid primary key: resource {resource} field {field}: {reason}")]
    InvalidPrimaryKey {
        resource: String,
        field: String,
        reason: &'static str,
    },
    #[error("duplicate resource: {0}")]
    DuplicateResource(String),
    #[error("duplicate field: resource {resource} field {field}")]
    DuplicateField { resource: String, field: String },
    #[error("invalid rule on {resource}.{field}: {source}")]
    InvalidRule {
        resource: String,
        field: String,
        #[source]
        source: RuleError,
    },
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("{resource}: {source}")]
    Decode {
        resource: String,
        #[source]
        source: DecodeError,
    },
    #[error("{resource}: {verdict}")]
    Validation { resource: String, verdict: Verdict },
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error(transparent)]
    Fatal(#[from] FatalValidation),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("internal: {0}")]
    Internal(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub status: u16,
    pub code: String,
    pub message: String,
    pub cause: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn not_found(collection: &str) -> Self {
        AppError::NotFound(format!("Could not find {collection}."))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Query(_) | AppError::Decode { .. } | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Db(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Merge(_)
            | AppError::Fatal(_)
            | AppError::Record(_)
            | AppError::Internal(_)
            | AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config_error",
            AppError::NotFound(_) => "not_found",
            AppError::Query(_) | AppError::Decode { .. } | AppError::BadRequest(_) => "bad_request",
            AppError::Validation { .. } => "validation_error",
            AppError::Db(_) => "database_error",
            AppError::Merge(_) | AppError::Fatal(_) | AppError::Record(_) | AppError::Internal(_) => {
                "internal_error"
            }
        }
    }

    /// Client-facing message. Internal causes are never exposed here.
    fn message(&self) -> String {
        match self {
            AppError::Config(e) => e.to_string(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Query(_) => CLIENT_MESSAGE.to_string(),
            AppError::Decode { resource, .. } => format!("{resource} json could not be parsed."),
            AppError::Validation { resource, .. } => format!("{resource} did not pass validation."),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Merge(_)
            | AppError::Fatal(_)
            | AppError::Record(_)
            | AppError::Internal(_)
            | AppError::Db(_) => SYSTEM_MESSAGE.to_string(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Validation { verdict, .. } => Some(verdict.to_json()),
            _ => None,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: ErrorDetail {
                status: self.status().as_u16(),
                code: self.code().to_string(),
                message: self.message(),
                cause: self.to_string(),
                details: self.details(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}
