use axum::{
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

/// Shared HTTP result type.
pub type ApiResult<T> = Result<T, ApiError>;

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    UnsupportedMediaType(String),
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), format!("{self}\n")).into_response()
    }
}

/// Rejects requests whose `Content-Type` media type is not `application/json`.
/// Parameters such as `charset` are allowed.
pub fn require_json(headers: &HeaderMap) -> ApiResult<()> {
    let raw = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if is_json_media_type(raw) {
        return Ok(());
    }
    warn!(content_type = raw, "rejected non-JSON payload");
    Err(ApiError::UnsupportedMediaType(format!(
        "Invalid content-type. Expected '{JSON_CONTENT_TYPE}'"
    )))
}

fn is_json_media_type(raw: &str) -> bool {
    let essence = raw.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case(JSON_CONTENT_TYPE)
}

/// Decodes the first JSON value of a body, surfacing the decoder's message as
/// a 400. Anything after that value is not read, and `null` yields
/// `T::default()`.
pub fn decode_json<T: DeserializeOwned + Default>(body: &[u8]) -> ApiResult<T> {
    let mut values = serde_json::Deserializer::from_slice(body).into_iter::<Option<T>>();
    match values.next() {
        Some(Ok(value)) => Ok(value.unwrap_or_default()),
        Some(Err(err)) => Err(reject_payload(err.to_string())),
        None => Err(reject_payload("EOF".to_string())),
    }
}

fn reject_payload(message: String) -> ApiError {
    warn!(error = %message, "rejected malformed JSON payload");
    ApiError::InvalidInput(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde::Deserialize;

    #[test]
    fn errors_map_to_status_codes() {
        assert_eq!(
            ApiError::invalid_input("bad").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::UnsupportedMediaType("x".into()).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn json_media_type_accepts_parameters() {
        assert!(is_json_media_type("application/json"));
        assert!(is_json_media_type("Application/JSON; charset=utf-8"));
        assert!(!is_json_media_type("text/plain"));
        assert!(!is_json_media_type(""));
        assert!(!is_json_media_type("application/jsonp"));
    }

    #[test]
    fn missing_content_type_is_unsupported() {
        let err = require_json(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(require_json(&headers).is_ok());
    }

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Badge {
        name: String,
    }

    #[test]
    fn malformed_json_keeps_decoder_message() {
        let err = decode_json::<Badge>(b"{\"name\":").unwrap_err();
        match err {
            ApiError::InvalidInput(msg) => assert!(msg.contains("EOF")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_body_is_rejected() {
        assert_eq!(
            decode_json::<Badge>(b"  \n"),
            Err(ApiError::invalid_input("EOF"))
        );
    }

    #[test]
    fn null_decodes_to_default() {
        assert_eq!(decode_json::<Badge>(b"null"), Ok(Badge::default()));
    }

    #[test]
    fn data_after_first_value_is_ignored() {
        let decoded = decode_json::<Badge>(b"{\"name\":\"x\"} trailing").unwrap();
        assert_eq!(decoded.name, "x");
        let decoded = decode_json::<Badge>(b"{\"name\":\"a\"}{\"name\":\"b\"}").unwrap();
        assert_eq!(decoded.name, "a");
    }
}
