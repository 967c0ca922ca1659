//! Request extractors that turn malformed input into 400 responses.
//!
//! Bodies and query strings are first read as untyped JSON, then
//! deserialized into the target type while tracking the path, so a bad
//! enum value or a missing field is reported under its own name in
//! `fields`.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;

/// JSON body that has been deserialized and validated.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // Content type and JSON syntax are checked here.
        let Json(raw) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        let value: T = deserialize_tracked(raw)?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string with the same 400 behaviour as [`ValidJson`].
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<BTreeMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        let object: Map<String, Value> = raw
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        Ok(Self(deserialize_tracked(Value::Object(object))?))
    }
}

fn deserialize_tracked<T: DeserializeOwned>(raw: Value) -> Result<T, ApiError> {
    serde_path_to_error::deserialize(raw).map_err(|err| {
        let path = err.path().to_string();
        field_error(&path, &err.inner().to_string())
    })
}

/// `path` is `.` when serde failed at the top level, which is where a
/// missing field is reported.
fn field_error(path: &str, message: &str) -> ApiError {
    if path != "." {
        return ApiError::invalid_fields(BTreeMap::from([(
            path.to_string(),
            vec![format!("{path}: {message}")],
        )]));
    }
    match missing_field(message) {
        Some(field) => ApiError::invalid_fields(BTreeMap::from([(
            field.to_string(),
            vec![format!("{field} is required")],
        )])),
        None => ApiError::bad_request(message),
    }
}

fn missing_field(message: &str) -> Option<&str> {
    message.strip_prefix("missing field `")?.split('`').next()
}

/// Ids are opaque to clients, so one that is not a UUID names nothing.
pub fn parse_id(entity: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(entity))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use devassist_core::models::ticket::TicketSeverity;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[allow(dead_code)]
        title: String,
        #[allow(dead_code)]
        severity: TicketSeverity,
    }

    fn fields_of(err: &ApiError) -> Vec<String> {
        err.fields()
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn unknown_variant_is_keyed_by_field() {
        let err = deserialize_tracked::<Body>(json!({ "title": "abc", "severity": "P9" }))
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(fields_of(&err), vec!["severity"]);
    }

    #[test]
    fn missing_field_is_keyed_by_field() {
        let err = deserialize_tracked::<Body>(json!({ "severity": "P1" })).unwrap_err();
        assert_eq!(fields_of(&err), vec!["title"]);
        assert_eq!(err.fields().unwrap()["title"], vec!["title is required"]);
    }

    #[test]
    fn non_object_body_has_no_field_map() {
        let err = deserialize_tracked::<Body>(json!([1, 2])).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.fields().is_none());
    }

    #[test]
    fn missing_field_parser() {
        assert_eq!(missing_field("missing field `tags`"), Some("tags"));
        assert_eq!(missing_field("invalid type: null"), None);
    }
}
