use crate::error::{MeasurementError, Result};
use crate::helper::calibration::validate_reference_length;

/// parse_reference_length reads a user entered reference length in cm.
pub fn parse_reference_length(input: &str) -> Result<f64> {
    let value: f64 = input.trim().parse().map_err(|_| {
        MeasurementError::InvalidCalibrationInput(format!("'{input}' is not a number"))
    })?;
    validate_reference_length(value)
}
