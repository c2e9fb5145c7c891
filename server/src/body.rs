//! Request body extraction for todo payloads.
//!
//! JSON and URL-encoded bodies are both accepted and normalized to a JSON
//! object so validation sees one shape. A missing body or an unrelated
//! content type yields an empty object, which validation then rejects with
//! its usual "required" message.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Form;
use serde_json::{Map, Value};

use crate::handlers::HandlerError;

/// Raw, unvalidated todo payload.
#[derive(Debug)]
pub struct TodoBody(pub Value);

enum BodyKind {
    Json,
    Form,
    Other,
}

fn body_kind(request: &Request) -> BodyKind {
    let essence = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default();
    if essence == "application/json" || essence.ends_with("+json") {
        BodyKind::Json
    } else if essence == "application/x-www-form-urlencoded" {
        BodyKind::Form
    } else {
        BodyKind::Other
    }
}

impl<S> FromRequest<S> for TodoBody
where
    S: Send + Sync,
{
    type Rejection = HandlerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(&req) {
            BodyKind::Json => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|_| HandlerError::BadBody)?;
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(TodoBody(Value::Object(Map::new())));
                }
                serde_json::from_slice(&bytes)
                    .map(TodoBody)
                    .map_err(|_| HandlerError::BadBody)
            }
            BodyKind::Form => {
                let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(|_| HandlerError::BadBody)?;
                Ok(TodoBody(Value::Object(form_fields(pairs))))
            }
            BodyKind::Other => Ok(TodoBody(Value::Object(Map::new()))),
        }
    }
}

/// A key given once maps to a string; a repeated key maps to an array of
/// its values in order, which validation then rejects as a non-string.
fn form_fields(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut fields = Map::new();
    for (key, value) in pairs {
        let value = Value::String(value);
        match fields.get_mut(&key) {
            Some(Value::Array(values)) => values.push(value),
            Some(first) => {
                let first = first.take();
                fields.insert(key, Value::Array(vec![first, value]));
            }
            None => {
                fields.insert(key, value);
            }
        }
    }
    fields
}
