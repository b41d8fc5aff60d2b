//! Alert rule bound validation.

use crate::error::CoreError;

/// Validate a `temp_min` / `temp_max` pair for an alert rule.
///
/// Both values must be finite and `temp_min` must be strictly less than
/// `temp_max`, which keeps the HIGH and LOW branches of the rule engine
/// mutually exclusive.
pub fn validate_rule_bounds(temp_min: f64, temp_max: f64) -> Result<(), CoreError> {
    if !temp_min.is_finite() || !temp_max.is_finite() {
        return Err(CoreError::Validation(
            "temp_min and temp_max must be finite numbers".to_string(),
        ));
    }
    if temp_min >= temp_max {
        return Err(CoreError::Validation(format!(
            "temp_min must be less than temp_max, got {temp_min} >= {temp_max}"
        )));
    }
    Ok(())
}
