use crate::utils::error::{RecordsError, Result};
use std::fmt::Display;
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl Display, reason: impl Into<String>) -> RecordsError {
    RecordsError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Dataset files are loaded by extension, so only `.json` and `.toml` pass.
pub fn validate_dataset_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    match Path::new(path).extension().and_then(|ext| ext.to_str()) {
        Some("json") | Some("toml") => Ok(()),
        _ => Err(invalid(field_name, path, "Dataset must be a .json or .toml file")),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| RecordsError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field_name, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(invalid(
            field_name,
            value,
            format!("Allowed values: {}", allowed.join(", ")),
        ));
    }
    Ok(())
}

/// Inclusive on both ends.
pub fn validate_range<T: PartialOrd + Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}
