use crate::common::errors::{BusinessError, BusinessResult};
use crate::validation_error;
use sea_orm::DbErr;

/// Trimmed name, rejected when blank
pub fn validate_name(name: &str) -> BusinessResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(validation_error!("name", "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Trimmed address. Only the shape is checked: a local part, an `@`, and a
/// dotted domain.
pub fn validate_email(email: &str) -> BusinessResult<String> {
    let trimmed = email.trim();
    match trimmed.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !trimmed.contains(char::is_whitespace) =>
        {
            Ok(trimmed.to_string())
        }
        _ => Err(validation_error!(
            "email",
            format!("'{trimmed}' is not a valid address")
        )),
    }
}

/// Blank optional addresses are stored as null
pub fn validate_optional_email(email: Option<&str>) -> BusinessResult<Option<String>> {
    match email.map(str::trim) {
        None | Some("") => Ok(None),
        Some(address) => validate_email(address).map(Some),
    }
}

impl BusinessError {
    /// Carries the error through crudcrate hooks, which speak `DbErr`.
    /// `ErrorMapper` turns the validation form back into a `ValidationError`.
    pub fn into_db_err(self) -> DbErr {
        match self {
            BusinessError::ValidationError { field, message } => {
                DbErr::Custom(format!("Validation failed: {field} {message}"))
            }
            other => DbErr::Custom(other.to_string()),
        }
    }
}
