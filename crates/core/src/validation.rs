//! Field validation shared by event creation and attendee registration.

use crate::error::CoreError;

/// Maximum length of an event slug.
pub const MAX_SLUG_LEN: usize = 64;

/// Maximum length of free-text profile fields (name, role, company).
pub const MAX_PROFILE_FIELD_LEN: usize = 200;

/// Require a non-blank value for `field`.
pub fn validate_required(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Require a non-blank value for `field` no longer than `max` characters.
pub fn validate_text(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    validate_required(field, value)?;
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Validate that `value` is an absolute `http` or `https` URL with a host.
pub fn validate_http_url(field: &str, value: &str) -> Result<(), CoreError> {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .ok_or_else(|| CoreError::Validation(format!("{field} must be an http(s) URL")))?;

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return Err(CoreError::Validation(format!("{field} must be an http(s) URL")));
    }
    Ok(())
}

/// Validate an event slug: 1-64 characters of `a-z`, `0-9` and `-`, not
/// starting or ending with a hyphen.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return Err(CoreError::Validation(format!(
            "slug must be between 1 and {MAX_SLUG_LEN} characters"
        )));
    }
    let allowed = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !allowed || slug.starts_with('-') || slug.ends_with('-') {
        return Err(CoreError::Validation(format!(
            "Invalid slug '{slug}'. Use lowercase letters, digits and inner hyphens"
        )));
    }
    Ok(())
}
