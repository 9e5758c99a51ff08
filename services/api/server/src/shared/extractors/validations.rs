use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use std::borrow::Cow;

use crate::shared::extractors::payload::Payload;
use crate::shared::extractors::request_id::RequestId;
use crate::weather_api::api_error::{ApiV1Detail, ApiV1Error};

/// JSON body that passed [`validator::Validate`].
///
/// Consumes the body, so it must be the last extractor of a handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedPayload<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedPayload<T>
where
    T: serde::de::DeserializeOwned + validator::Validate,
    S: Send + Sync,
{
    type Rejection = ApiV1Error;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let RequestId(request_id) = RequestId::from_headers(req.headers());

        let Payload(value) = Payload::<T>::from_request(req, state)
            .await
            .map_err(|e| e.to_api_v1_error(&request_id))?;

        value
            .validate()
            .map_err(|e| validation_error(&e, &request_id))?;

        Ok(ValidatedPayload(value))
    }
}

/// Query string that deserialized and passed [`validator::Validate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: serde::de::DeserializeOwned + validator::Validate,
    S: Send + Sync,
{
    type Rejection = ApiV1Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let RequestId(request_id) = RequestId::from_headers(&parts.headers);

        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                let message = rejection.body_text();
                ApiV1Error::bad_request(
                    message.clone(),
                    vec![ApiV1Detail::new(
                        Some("query"),
                        "invalid_query",
                        message,
                    )],
                    request_id.to_string(),
                )
            })?;

        value
            .validate()
            .map_err(|e| validation_error(&e, &request_id))?;

        Ok(ValidatedQuery(value))
    }
}

fn validation_error(
    errors: &validator::ValidationErrors,
    request_id: &uuid::Uuid,
) -> ApiV1Error {
    let details = validation_errors_to_details(errors);
    let detail = if details.is_empty() {
        "Validation failed".to_string()
    } else {
        details
            .iter()
            .map(|d| d.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    };

    ApiV1Error::bad_request(detail, details, request_id.to_string())
}

/// Flattens validator errors into one detail per failed rule, ordered by
/// field with struct-level rules (no field) last.
pub fn validation_errors_to_details(
    errors: &validator::ValidationErrors,
) -> Vec<ApiV1Detail> {
    let mut details = Vec::new();
    collect_details(errors, None, &mut details);
    details.sort_by(|a, b| {
        (a.field.is_none(), &a.field).cmp(&(b.field.is_none(), &b.field))
    });
    details
}

fn collect_details(
    errors: &validator::ValidationErrors,
    parent_path: Option<&str>,
    output: &mut Vec<ApiV1Detail>,
) {
    for (field, kind) in errors.errors() {
        let current_path = match parent_path {
            Some(p) => format!("{p}.{field}"),
            None => field.to_string(),
        };

        match kind {
            validator::ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .clone()
                        .unwrap_or_else(|| {
                            Cow::Owned(format!(
                                "`{current_path}` failed validation: {}",
                                error.code
                            ))
                        })
                        .to_string();
                    let field = (current_path != "__all__")
                        .then_some(current_path.as_str());

                    output.push(ApiV1Detail::new(
                        field,
                        error.code.to_string(),
                        message,
                    ));
                }
            }
            validator::ValidationErrorsKind::Struct(struct_errors) => {
                collect_details(struct_errors, Some(&current_path), output);
            }
            validator::ValidationErrorsKind::List(list_errors) => {
                for (index, item_errors) in list_errors {
                    let item_path = format!("{current_path}[{index}]");
                    collect_details(item_errors, Some(&item_path), output);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use validator::{Validate, ValidationError};

    #[derive(Validate)]
    #[validate(schema(function = "never_valid", skip_on_field_errors = false))]
    struct Form {
        #[validate(length(min = 1, message = "zeta is empty"))]
        zeta: String,
        #[validate(length(min = 1, message = "alpha is empty"))]
        alpha: String,
        #[validate(range(min = 1, message = "middle is zero"))]
        middle: u32,
    }

    fn never_valid(_: &Form) -> Result<(), ValidationError> {
        Err(ValidationError::new("whole_form")
            .with_message(Cow::Borrowed("form is invalid")))
    }

    #[test]
    fn details_are_ordered_by_field() {
        let form = Form {
            zeta: String::new(),
            alpha: String::new(),
            middle: 0,
        };
        let errors = form.validate().unwrap_err();
        let request_id = uuid::Uuid::nil();

        let details = validation_errors_to_details(&errors);
        let fields: Vec<Option<&str>> =
            details.iter().map(|d| d.field.as_deref()).collect();
        assert_eq!(
            fields,
            vec![Some("alpha"), Some("middle"), Some("zeta"), None]
        );

        for _ in 0..5 {
            let error = validation_error(&errors, &request_id);
            assert_eq!(
                error.detail,
                "alpha is empty; middle is zero; zeta is empty; form is invalid"
            );
        }
    }
}
