use std::fmt;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::error::{MeasurementError, Result};
use crate::helper::measurement::{MeasurementEngine, MeasurementResult};
use crate::utils::coordinate::KeypointCollection;

/// Pixel-domain queries never read the scale, so any positive value works
/// while the reference is being chosen.
const PLACEHOLDER_SCALE: f64 = 1.0;

/// Body measurement whose known real-world length calibrates the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationReference {
    #[serde(rename = "Eye Distance")]
    EyeDistance,
    #[serde(rename = "Shoulder Width")]
    ShoulderWidth,
}

impl CalibrationReference {
    pub fn name(&self) -> &'static str {
        match self {
            CalibrationReference::EyeDistance => "Eye Distance",
            CalibrationReference::ShoulderWidth => "Shoulder Width",
        }
    }
}

impl fmt::Display for CalibrationReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Calibration is the outcome of reference selection for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub reference: CalibrationReference,
    pub reference_pixels: f64,
    pub reference_length_cm: f64,
    /// Pixels per centimeter, always strictly positive.
    pub scale: f64,
}

/// validate_reference_length rejects lengths that cannot produce a scale.
pub fn validate_reference_length(reference_length_cm: f64) -> Result<f64> {
    if !reference_length_cm.is_finite() || reference_length_cm <= 0.0 {
        return Err(MeasurementError::InvalidCalibrationInput(format!(
            "reference length must be a positive number of centimeters, got {reference_length_cm}"
        )));
    }
    Ok(reference_length_cm)
}

/// derive_calibration chooses the reference measurement and derives the
/// pixels-per-centimeter scale.
///
/// The interpupillary distance is preferred and shoulder width is the
/// fallback. Both use the same user supplied length.
///
/// # Arguments
/// * `keypoints` - &KeypointCollection
/// * `reference_length_cm` - real-world length of the reference, in cm
///
/// # Returns
/// * `Result<Calibration>`
pub fn derive_calibration(keypoints: &KeypointCollection, reference_length_cm: f64) -> Result<Calibration> {
    let reference_length_cm = validate_reference_length(reference_length_cm)?;

    if keypoints.len() < 2 {
        return Err(MeasurementError::InsufficientKeypoints { found: keypoints.len() });
    }

    let engine = MeasurementEngine::new(keypoints, PLACEHOLDER_SCALE);
    let candidates = [
        (CalibrationReference::EyeDistance, engine.eye_distance()),
        (CalibrationReference::ShoulderWidth, engine.shoulder_width_pixels()),
    ];

    let (reference, reference_pixels) = candidates
        .into_iter()
        .find_map(|(reference, pixels)| pixels.filter(|px| *px > 0.0).map(|px| (reference, px)))
        .ok_or(MeasurementError::CalibrationUnresolved)?;

    let scale = reference_pixels / reference_length_cm;
    debug!(%reference, reference_pixels, scale, "calibration derived");

    Ok(Calibration {
        reference,
        reference_pixels,
        reference_length_cm,
        scale,
    })
}

/// derive_measurements computes every resolvable measurement in cm.
pub fn derive_measurements(keypoints: &KeypointCollection, calibration: &Calibration) -> MeasurementResult {
    MeasurementEngine::new(keypoints, calibration.scale).all_measurements()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use crate::error::MeasurementError;
    use crate::helper::calibration::{derive_calibration, derive_measurements, CalibrationReference};
    use crate::helper::measurement::Measurement;
    use crate::utils::coordinate::{Keypoint, KeypointCollection};

    fn kp(id: u32, x: f64, y: f64) -> Keypoint {
        Keypoint::new(Some(id), &format!("new-point-{id}"), x, y, 0.9)
    }

    #[test]
    fn test_eye_distance_reference() {
        let keypoints = KeypointCollection::new(vec![
            kp(2, 100.0, 100.0),
            kp(1, 140.0, 100.0),
            kp(6, 80.0, 200.0),
            kp(5, 160.0, 200.0),
        ]);

        let calibration = derive_calibration(&keypoints, 6.0).unwrap();
        assert_eq!(calibration.reference, CalibrationReference::EyeDistance);
        assert_relative_eq!(calibration.reference_pixels, 40.0);
        assert_relative_eq!(calibration.scale, 40.0 / 6.0);

        let result = derive_measurements(&keypoints, &calibration);
        assert_relative_eq!(result.get(Measurement::ShoulderWidth).unwrap(), 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_shoulder_fallback_reference() {
        let keypoints = KeypointCollection::new(vec![
            kp(6, 80.0, 200.0),
            kp(5, 160.0, 200.0),
            kp(12, 90.0, 300.0),
            kp(11, 150.0, 300.0),
        ]);

        let calibration = derive_calibration(&keypoints, 40.0).unwrap();
        assert_eq!(calibration.reference, CalibrationReference::ShoulderWidth);
        assert_relative_eq!(calibration.scale, 2.0);

        let result = derive_measurements(&keypoints, &calibration);
        assert_relative_eq!(result.get(Measurement::WaistWidth).unwrap(), 30.0);
    }

    #[test]
    fn test_coincident_eyes_fall_back_to_shoulders() {
        let keypoints = KeypointCollection::new(vec![
            kp(2, 100.0, 100.0),
            kp(1, 100.0, 100.0),
            kp(6, 80.0, 200.0),
            kp(5, 160.0, 200.0),
        ]);

        let calibration = derive_calibration(&keypoints, 40.0).unwrap();
        assert_eq!(calibration.reference, CalibrationReference::ShoulderWidth);
    }

    #[test]
    fn test_single_keypoint_is_insufficient() {
        let keypoints = KeypointCollection::new(vec![kp(0, 120.0, 130.0)]);
        let err = derive_calibration(&keypoints, 6.0).unwrap_err();
        assert_eq!(err, MeasurementError::InsufficientKeypoints { found: 1 });
    }

    #[test]
    fn test_no_reference_pair_is_unresolved() {
        let keypoints = KeypointCollection::new(vec![kp(0, 120.0, 130.0), kp(2, 100.0, 100.0), kp(6, 80.0, 200.0)]);
        let err = derive_calibration(&keypoints, 6.0).unwrap_err();
        assert_eq!(err, MeasurementError::CalibrationUnresolved);
    }

    #[test]
    fn test_invalid_reference_length() {
        let keypoints = KeypointCollection::new(vec![kp(2, 100.0, 100.0), kp(1, 140.0, 100.0)]);
        for length in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let err = derive_calibration(&keypoints, length).unwrap_err();
            assert!(matches!(err, MeasurementError::InvalidCalibrationInput(_)));
        }
    }
}
