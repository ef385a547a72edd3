use thiserror::Error;

/// Errors raised by the measurement core.
///
/// None of these are fatal: the caller reports the message and the analysis
/// run ends with no measurements.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    #[error("insufficient keypoints detected: need at least 2, have {found}")]
    InsufficientKeypoints { found: usize },

    #[error("unable to calculate scale: no eye or shoulder keypoints detected")]
    CalibrationUnresolved,

    #[error("invalid calibration input: {0}")]
    InvalidCalibrationInput(String),
}

pub type Result<T> = std::result::Result<T, MeasurementError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeasurementError::InsufficientKeypoints { found: 1 };
        assert_eq!(err.to_string(), "insufficient keypoints detected: need at least 2, have 1");

        let err = MeasurementError::InvalidCalibrationInput("abc".to_string());
        assert_eq!(err.to_string(), "invalid calibration input: abc");
    }
}
