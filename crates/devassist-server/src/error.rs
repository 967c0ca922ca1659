//! HTTP error responses.
//!
//! Every failure leaves the server as
//! `{"statusCode", "error", "message", "fields"?}`.

use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use devassist_core::error::DevAssistError;
use serde::Serialize;
use validator::ValidationErrors;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    fields: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    status_code: u16,
    error: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            fields: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }

    pub fn not_found(entity: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("{} not found", entity_label(entity)),
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }

    /// A 400 carrying per-field messages.
    pub fn invalid_fields(fields: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            fields: Some(fields),
            ..Self::bad_request("Validation failed")
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn error_code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        self.fields.as_ref()
    }
}

fn entity_label(entity: &str) -> &str {
    match entity {
        "ticket" => "Ticket",
        "comment" => "Comment",
        "kb_article" => "KB article",
        "playbook" => "Playbook",
        "user" => "User",
        other => other,
    }
}

/// `title_length` -> `titleLength`, matching the JSON field names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl From<DevAssistError> for ApiError {
    fn from(err: DevAssistError) -> Self {
        match err {
            DevAssistError::NotFound { entity, .. } => Self::not_found(&entity),
            DevAssistError::Disabled { .. } => {
                Self::new(StatusCode::NOT_FOUND, "not_found", err.to_string())
            }
            DevAssistError::AlreadyExists { entity } => Self::new(
                StatusCode::CONFLICT,
                "conflict",
                format!("{} already exists", entity_label(&entity)),
            ),
            DevAssistError::Unauthorized { reason } => Self::unauthorized(reason),
            DevAssistError::Forbidden { reason } => Self::forbidden(reason),
            DevAssistError::Validation { message } => Self::bad_request(message),
            DevAssistError::Database(_)
            | DevAssistError::Crypto(_)
            | DevAssistError::Internal(_) => {
                tracing::error!(error = %err, "Request failed");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred",
                )
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| match &e.message {
                        Some(m) => m.to_string(),
                        None => format!("{field} is invalid ({})", e.code),
                    })
                    .collect();
                (camel_case(&field), messages)
            })
            .collect();
        Self::invalid_fields(fields)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status_code: self.status.as_u16(),
            error: self.code,
            message: &self.message,
            fields: self.fields.as_ref(),
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
