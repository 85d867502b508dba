//! Shared validation helpers for inbound HTTP adapters.
//!
//! All failures produce `invalid_request` errors with a structured `details`
//! block naming the offending field, so clients can highlight it.

use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

pub(crate) fn field_error(field: &str, message: impl Into<String>, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

pub(crate) fn missing_field_error(field: &str) -> Error {
    field_error(field, format!("{field} is required"), "missing_field")
}

/// Require a non-blank string field, returning it trimmed.
pub(crate) fn require_non_empty(value: &str, field: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(missing_field_error(field));
    }
    Ok(trimmed.to_owned())
}

/// Parse a comma-separated list of UUIDs from a path segment.
pub(crate) fn parse_uuid_list(raw: &str, field: &str) -> Result<Vec<Uuid>, Error> {
    let mut ids = Vec::new();
    for (index, part) in raw.split(',').enumerate() {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let id = Uuid::parse_str(part).map_err(|_| {
            Error::invalid_request(format!("{field} contains an invalid identifier"))
                .with_details(json!({
                    "field": field,
                    "index": index,
                    "value": part,
                    "code": "invalid_uuid",
                }))
        })?;
        ids.push(id);
    }
    Ok(ids)
}

/// Minimal syntactic e-mail check: one `@` with non-empty local part and a
/// dotted domain. Real validation is the verification mail.
pub(crate) fn validate_email(raw: &str) -> Result<String, Error> {
    let email = require_non_empty(raw, "email")?;
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        });
    if !valid {
        return Err(field_error("email", "email is malformed", "invalid_email"));
    }
    Ok(email)
}

/// Password policy: at least 8 characters with an uppercase letter, a digit
/// and a non-alphanumeric character.
pub(crate) fn validate_password(password: &str) -> Result<(), Error> {
    let long_enough = password.chars().count() >= 8;
    let has_upper = password.chars().any(char::is_uppercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());
    if long_enough && has_upper && has_digit && has_special {
        return Ok(());
    }
    Err(field_error(
        "password",
        "password must be at least 8 characters and include an uppercase letter, a digit and a special character",
        "weak_password",
    ))
}
