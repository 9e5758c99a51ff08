use serde::Deserialize;
use utoipa::IntoParams;
use validator::{Validate, ValidationError};

/// `?location=` of the live lookup endpoints
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LocationQuery {
    /// City, postal code, landmark or `"lat,lon"` pair
    #[param(example = "Paris")]
    #[validate(custom(function = "validate_location"))]
    pub location: String,
}

pub(crate) fn validate_location(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank")
            .with_message("Location must not be empty".into()));
    }
    if value.chars().count() > MAX_LOCATION_CHARS {
        return Err(ValidationError::new("too_long").with_message(
            format!("Location must be at most {MAX_LOCATION_CHARS} characters")
                .into(),
        ));
    }
    if value.chars().any(char::is_control) {
        return Err(ValidationError::new("control_characters")
            .with_message("Location must not contain control characters".into()));
    }
    Ok(())
}

pub(crate) const MAX_LOCATION_CHARS: usize = 200;
