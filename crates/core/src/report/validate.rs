//! Structural validation of report configurations.
//!
//! Validation is pure and runs before any storage call; a failure here is
//! a client-input error, never a server fault.

use super::error::ReportError;
use super::types::ReportConfiguration;

/// Validates a configuration's structure.
///
/// Rejects a configuration with no fields, a field missing its source or
/// display name, a filter missing field or operator, or an order clause
/// missing field or direction. Unknown *operators* are not rejected here;
/// the condition builder drops them with a warning.
///
/// # Errors
///
/// Returns [`ReportError::InvalidConfiguration`] describing the first
/// violation found.
pub fn validate_configuration(config: &ReportConfiguration) -> Result<(), ReportError> {
    if config.fields.is_empty() {
        return Err(ReportError::InvalidConfiguration(
            "at least one field is required".to_string(),
        ));
    }

    for (index, field) in config.fields.iter().enumerate() {
        if field.source_field.trim().is_empty() {
            return Err(ReportError::InvalidConfiguration(format!(
                "field {index} is missing sourceField"
            )));
        }
        if field.display_name.trim().is_empty() {
            return Err(ReportError::InvalidConfiguration(format!(
                "field {index} is missing displayName"
            )));
        }
    }

    for (index, filter) in config.filters.iter().enumerate() {
        if filter.field.trim().is_empty() {
            return Err(ReportError::InvalidConfiguration(format!(
                "filter {index} is missing field"
            )));
        }
        if filter.operator.trim().is_empty() {
            return Err(ReportError::InvalidConfiguration(format!(
                "filter {index} is missing operator"
            )));
        }
    }

    for (index, sort) in config.sorts.iter().enumerate() {
        if sort.field.trim().is_empty() {
            return Err(ReportError::InvalidConfiguration(format!(
                "order clause {index} is missing field"
            )));
        }
        if sort.direction.trim().is_empty() {
            return Err(ReportError::InvalidConfiguration(format!(
                "order clause {index} is missing direction"
            )));
        }
    }

    let mut aliases: Vec<&str> = config
        .aggregations
        .iter()
        .map(|a| a.alias.as_str())
        .collect();
    aliases.sort_unstable();
    aliases.dedup();
    if aliases.len() != config.aggregations.len() {
        return Err(ReportError::InvalidConfiguration(
            "aggregation aliases must be unique".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
