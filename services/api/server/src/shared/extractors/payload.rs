use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, Request};
use axum::http::{HeaderMap, header};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::weather_api::api_error::{ApiV1Detail, ApiV1Error};

/// JSON body extractor that reports the failing field path.
#[derive(Debug, Clone, Copy, Default)]
#[must_use]
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        if json_content_type(req.headers()) {
            let bytes = Bytes::from_request(req, state).await?;
            let deserializer =
                &mut serde_json::Deserializer::from_slice(&bytes);
            let value: T = serde_path_to_error::deserialize(deserializer)?;

            Ok(Payload(value))
        } else {
            Err(Error::MissingJsonContentType)
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Bytes(#[from] BytesRejection),

    #[error(transparent)]
    Json(#[from] serde_path_to_error::Error<serde_json::Error>),

    #[error("missing content-type header")]
    MissingJsonContentType,
}

impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        self.to_api_v1_error(&uuid::Uuid::now_v7()).into_response()
    }
}

impl Error {
    pub fn to_api_v1_error(&self, request_id: &uuid::Uuid) -> ApiV1Error {
        match self {
            Error::Json(serde_err) => {
                let field_path = serde_err.path().to_string();
                let inner_message = serde_err.inner().to_string();

                let (field, message, code) = if field_path.is_empty()
                    || field_path == "."
                {
                    match extract_missing_field_from_message(&inner_message) {
                        Some(missing) => (
                            missing.clone(),
                            format!("Missing required field: {missing}"),
                            "missing_field",
                        ),
                        None => (
                            "request".to_string(),
                            format!("Invalid JSON: {inner_message}"),
                            "invalid_json",
                        ),
                    }
                } else {
                    let field_name =
                        extract_nested_field_name(&field_path, &inner_message);
                    let message = match extract_missing_field_from_message(
                        &inner_message,
                    ) {
                        Some(missing) => {
                            format!("Missing required field: {missing}")
                        }
                        None => format!(
                            "Invalid value for field '{field_name}': {inner_message}"
                        ),
                    };
                    (field_name, message, "invalid_field")
                };

                ApiV1Error::bad_request(
                    message.clone(),
                    vec![ApiV1Detail::new(Some(&field), code, message)],
                    request_id.to_string(),
                )
            }
            Error::MissingJsonContentType => ApiV1Error::bad_request(
                "Content-Type header must be application/json".to_string(),
                vec![ApiV1Detail::new(
                    Some("Content-Type"),
                    "missing_content_type",
                    "Set Content-Type header to application/json",
                )],
                request_id.to_string(),
            ),
            Error::Bytes(_) => ApiV1Error::bad_request(
                "Unable to read request body".to_string(),
                vec![ApiV1Detail::new(
                    Some("request"),
                    "request_body_error",
                    "Check the request body and content length",
                )],
                request_id.to_string(),
            ),
        }
    }
}

fn json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(header::CONTENT_TYPE) else {
        return false;
    };

    let Ok(content_type) = content_type.to_str() else {
        return false;
    };

    let Ok(mime) = content_type.parse::<mime::Mime>() else {
        return false;
    };

    mime.type_() == "application"
        && (mime.subtype() == "json"
            || mime.suffix().is_some_and(|name| name == "json"))
}

fn extract_nested_field_name(field_path: &str, inner_message: &str) -> String {
    match extract_missing_field_from_message(inner_message) {
        Some(missing_field) if field_path.is_empty() => missing_field,
        Some(missing_field) => format!("{field_path}.{missing_field}"),
        None => field_path.to_string(),
    }
}

/// "missing field `location_input`" -> Some("location_input")
fn extract_missing_field_from_message(message: &str) -> Option<String> {
    let start = message.find("missing field")?;
    let after_missing = &message[start + "missing field".len()..];

    let open = after_missing.find('`')?;
    let close = after_missing[open + 1..].find('`')?;
    Some(after_missing[open + 1..open + 1 + close].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_field_name_is_extracted() {
        assert_eq!(
            extract_missing_field_from_message(
                "missing field `location_input` at line 1 column 2"
            ),
            Some("location_input".to_string())
        );
        assert_eq!(extract_missing_field_from_message("expected value"), None);
    }

    #[test]
    fn content_type_must_be_json() {
        let mut headers = HeaderMap::new();
        assert!(!json_content_type(&headers));

        headers.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
        assert!(!json_content_type(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            "application/json; charset=utf-8".parse().unwrap(),
        );
        assert!(json_content_type(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            "application/merge-patch+json".parse().unwrap(),
        );
        assert!(json_content_type(&headers));
    }
}
