use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

/// Field name to human-readable problem, ordered by field name.
pub type Problems = IndexMap<String, String>;

const NAME_MIN_CHARS: usize = 2;
const PASSWORD_MIN_CHARS: usize = 8;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

fn problem(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Required, and at least two characters once surrounding whitespace is trimmed.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(problem("required", "name is required"));
    }
    if trimmed.chars().count() < NAME_MIN_CHARS {
        return Err(problem("length", "name must be at least 2 characters"));
    }
    Ok(())
}

/// Required, and shaped like `local@domain.tld`.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(problem("required", "email is required"));
    }
    if !EMAIL.is_match(email) {
        return Err(problem("email", "invalid email format"));
    }
    Ok(())
}

/// At least eight characters.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(problem("length", "password must be at least 8 characters"));
    }
    Ok(())
}

/// [`validate_name`], skipped when the field is empty.
pub fn validate_optional_name(name: &str) -> Result<(), ValidationError> {
    skip_empty(name, validate_name)
}

/// [`validate_email`], skipped when the field is empty.
pub fn validate_optional_email(email: &str) -> Result<(), ValidationError> {
    skip_empty(email, validate_email)
}

/// [`validate_password`], skipped when the field is empty.
pub fn validate_optional_password(password: &str) -> Result<(), ValidationError> {
    skip_empty(password, validate_password)
}

fn skip_empty(
    value: &str,
    validate: fn(&str) -> Result<(), ValidationError>,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        Ok(())
    } else {
        validate(value)
    }
}

/// Flattens validator output to the first problem of each field.
pub fn problems(errors: &ValidationErrors) -> Problems {
    let mut problems: Problems = errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errors)| {
            let message = errors
                .first()?
                .message
                .as_ref()
                .map(|message| message.to_string())
                .unwrap_or_else(|| format!("{field} is invalid"));
            Some((field.to_string(), message))
        })
        .collect();
    problems.sort_keys();
    problems
}
