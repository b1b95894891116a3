use actix_web::{http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};

/// Error body shared by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Human-readable reason
    pub error: String,
    /// Stable machine-readable code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn to_response(&self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

/// Gateway rejection: the error body plus the address the request was judged from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RejectionResponse {
    #[serde(flatten)]
    pub error: ErrorResponse,
    pub client_ip: String,
}
