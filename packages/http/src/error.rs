use confentry_core::BackendError;

use crate::types::{HttpResponse, Method};

/// Outcomes of a dispatched request other than success.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Method {method} not allowed")]
    MethodNotAllowed {
        method: Method,
        allowed: Vec<Method>,
    },

    /// A verb outside the standard set.
    #[error("Method {method} not allowed")]
    UnknownMethod { method: String },

    #[error("{reason}")]
    BadRequest { reason: String },

    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {message}")]
    Client { message: String },
}

impl Error {
    pub fn bad_request(reason: impl Into<String>) -> Self {
        Error::BadRequest {
            reason: reason.into(),
        }
    }

    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            Error::MethodNotAllowed { .. } | Error::UnknownMethod { .. } => 405,
            Error::BadRequest { .. } => 400,
            Error::NotFound => 404,
            Error::Backend(BackendError::PermissionDenied) => 403,
            Error::Backend(_) | Error::Json(_) | Error::UrlParse(_) | Error::Client { .. } => 500,
        }
    }

    /// Render as a plain-text response. `MethodNotAllowed` also sets `Allow`.
    pub fn into_response(self) -> HttpResponse {
        let response = HttpResponse::text(self.status(), self.to_string());
        match &self {
            Error::MethodNotAllowed { allowed, .. } => {
                let allow = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                response.with_header("Allow", allow)
            }
            _ => response,
        }
    }
}
