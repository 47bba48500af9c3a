// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::config::ConfigError;
use crate::pipeline::PipelineError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use vaultline_persistence::LedgerError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Internal server error")]
    Internal,
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Pipeline(PipelineError::Io(e))
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            EngineError::Pipeline(p_err) => match p_err {
                PipelineError::UnsupportedCodec(c) => {
                    (StatusCode::BAD_REQUEST, format!("Unsupported codec: {c}"))
                }
                PipelineError::UnknownExtension(e) => {
                    (StatusCode::BAD_REQUEST, format!("Unknown extension: {e}"))
                }
                PipelineError::InvalidPath(p) => (StatusCode::BAD_REQUEST, format!("Invalid path: {p}")),
                PipelineError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "Cancelled".to_string()),
                PipelineError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string()),
            },
            EngineError::Ledger(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Ledger unavailable".to_string()),
            EngineError::Config(c) => (StatusCode::INTERNAL_SERVER_ERROR, c.to_string()),
            EngineError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            EngineError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
