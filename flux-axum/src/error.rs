use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flux_blob::FluxError;
use serde_json::{json, Value};

/// Feathers-style error classes used by the upload routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    GeneralError,
}

impl ErrorKind {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::GeneralError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::GeneralError => "GeneralError",
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::NotFound => "not-found",
            ErrorKind::GeneralError => "general-error",
        }
    }
}

/// Error returned by upload handlers
#[derive(Debug)]
pub struct FluxAxumError {
    pub kind: ErrorKind,
    pub message: String,
    pub errors: Option<Value>,
}

impl FluxAxumError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errors: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn with_errors(mut self, errors: Value) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "name": self.kind.name(),
            "message": self.message,
            "code": self.kind.status().as_u16(),
            "className": self.kind.class_name(),
        });
        if let Some(errors) = &self.errors {
            body["errors"] = errors.clone();
        }
        body
    }
}

impl From<FluxError> for FluxAxumError {
    fn from(error: FluxError) -> Self {
        match &error {
            FluxError::EmptyIdentifier | FluxError::MissingExtension => {
                Self::bad_request(error.to_string())
            }
            FluxError::NoChunksFound | FluxError::NotFound { .. } => {
                Self::new(ErrorKind::NotFound, error.to_string())
            }
            FluxError::Io { .. } | FluxError::Backend { .. } => {
                // storage details stay in the server log
                tracing::error!(%error, "upload storage failure");
                Self::new(ErrorKind::GeneralError, "Upload storage failure")
            }
        }
    }
}

impl From<JsonRejection> for FluxAxumError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("Failed to parse the request body as JSON")
            .with_errors(json!({ "_schema": [rejection.body_text()] }))
    }
}

impl From<PathRejection> for FluxAxumError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request("Invalid upload path").with_errors(json!({ "_path": [rejection.body_text()] }))
    }
}

impl IntoResponse for FluxAxumError {
    fn into_response(self) -> Response {
        (self.kind.status(), Json(self.to_json())).into_response()
    }
}
