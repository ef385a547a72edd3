use serde::{Deserialize, Serialize};
use crate::helper::calibration::Calibration;
use crate::helper::keypoint_catalog::canonical_name;
use crate::helper::measurement::{Measurement, MeasurementResult};
use crate::utils::coordinate::KeypointCollection;

/// Display groups for the measurement table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasurementCategory {
    Overall,
    Arms,
    Legs,
}

impl MeasurementCategory {
    pub const ALL: [MeasurementCategory; 3] = [
        MeasurementCategory::Overall,
        MeasurementCategory::Arms,
        MeasurementCategory::Legs,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MeasurementCategory::Overall => "Overall",
            MeasurementCategory::Arms => "Arms",
            MeasurementCategory::Legs => "Legs",
        }
    }

    /// members lists the measurements of the category in display order.
    pub fn members(&self) -> &'static [Measurement] {
        match self {
            MeasurementCategory::Overall => &[
                Measurement::Height,
                Measurement::ArmSpan,
                Measurement::ShoulderWidth,
                Measurement::WaistWidth,
                Measurement::TorsoLength,
            ],
            MeasurementCategory::Arms => &[
                Measurement::LeftArmLength,
                Measurement::RightArmLength,
                Measurement::LeftUpperArm,
                Measurement::RightUpperArm,
                Measurement::LeftForearm,
                Measurement::RightForearm,
            ],
            MeasurementCategory::Legs => &[
                Measurement::LeftLegLength,
                Measurement::RightLegLength,
                Measurement::LeftThigh,
                Measurement::RightThigh,
                Measurement::LeftShin,
                Measurement::RightShin,
            ],
        }
    }
}

/// One row of the measurement table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRow {
    pub category: String,
    pub measurement: String,
    pub value: String,
}

pub fn format_centimeters(value: f64) -> String {
    format!("{value:.1} cm")
}

/// format_measurement_results flattens the result into table rows grouped
/// by category. Measurements missing from the result get no row.
///
/// # Arguments
/// * `measurements` - &MeasurementResult
///
/// # Returns
/// * `Vec<MeasurementRow>`
pub fn format_measurement_results(measurements: &MeasurementResult) -> Vec<MeasurementRow> {
    let mut rows = Vec::with_capacity(measurements.len());
    for category in MeasurementCategory::ALL {
        for measurement in category.members() {
            if let Some(value) = measurements.get(*measurement) {
                rows.push(MeasurementRow {
                    category: category.name().to_string(),
                    measurement: measurement.name().to_string(),
                    value: format_centimeters(value),
                });
            }
        }
    }
    rows
}

pub fn format_calibration(calibration: &Calibration) -> String {
    format!(
        "Scale: {} ({:.1} cm, {:.1} pixels, {:.2} pixels/cm)",
        calibration.reference,
        calibration.reference_length_cm,
        calibration.reference_pixels,
        calibration.scale,
    )
}

/// format_keypoints renders the numbered audit list of detected keypoints.
pub fn format_keypoints(keypoints: &KeypointCollection) -> Vec<String> {
    keypoints
        .iter()
        .enumerate()
        .map(|(i, kp)| {
            format!(
                "{}. {}: ({:.0}, {:.0}) [Conf: {:.3}]",
                i + 1,
                canonical_name(&kp.identifier),
                kp.position.x,
                kp.position.y,
                kp.confidence,
            )
        })
        .collect()
}
