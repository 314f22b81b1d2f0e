use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Every way a proxied request can fail. All of them render as the same
/// 500 failure envelope; only the message differs.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Config(String),

    #[error("ImageKit API error: {body}")]
    Upstream { status: u16, body: String },

    #[error("ImageKit API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ProxyError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Config(_) => "config",
            Self::Upstream { .. } => "upstream",
            Self::Transport(_) => "transport",
        }
    }
}

#[derive(Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match &self {
            ProxyError::Upstream { status, .. } => {
                error!(kind = self.kind(), upstream_status = status, "request failed: {}", self)
            }
            _ => error!(kind = self.kind(), "request failed: {}", self),
        }

        let body = Json(ErrorEnvelope {
            success: false,
            error: self.to_string(),
        });
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
