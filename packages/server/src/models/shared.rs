use std::collections::HashSet;

use crate::error::AppError;

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Validate a trimmed title (1-256 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 256 {
        return Err(AppError::Validation(
            "Title must be 1-256 characters".into(),
        ));
    }
    Ok(())
}

/// Validate a trimmed category or ingredient name (1-128 characters).
pub fn validate_name(name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 128 {
        return Err(AppError::Validation("Name must be 1-128 characters".into()));
    }
    Ok(())
}

/// Validate an optional image reference (URL or path, at most 2048 bytes).
pub fn validate_image_url(url: Option<&str>) -> Result<(), AppError> {
    if let Some(url) = url
        && (url.len() > 2048 || url.chars().any(|c| c.is_control()))
    {
        return Err(AppError::Validation(
            "Image URL must be at most 2048 characters without control characters".into(),
        ));
    }
    Ok(())
}

/// Validate a referenced ID (non-empty, at most 64 characters).
pub fn validate_ref_id(id: &str, name: &str) -> Result<(), AppError> {
    let id = id.trim();
    if id.is_empty() || id.len() > 64 {
        return Err(AppError::Validation(format!("{name} must be 1-64 characters")));
    }
    Ok(())
}

/// Validate that a list of string IDs has no duplicates.
pub fn validate_unique_ids<'a>(
    ids: impl IntoIterator<Item = &'a str>,
    name: &str,
) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id.trim()) {
            return Err(AppError::Validation(format!("Duplicate {name}: {id}")));
        }
    }
    Ok(())
}

/// Treat a blank optional string as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
