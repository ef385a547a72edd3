use std::path::Path;
use anyhow::{Context, Error};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use crate::error::MeasurementError;
use crate::helper::calibration::{derive_calibration, derive_measurements, validate_reference_length, Calibration};
use crate::helper::measurement::MeasurementResult;
use crate::modules::pose_client::{PoseEstimation, PoseEstimationClient};
use crate::utils::coordinate::KeypointCollection;
use crate::utils::export::save_keypoints_npy;

/// AnalysisReport is everything one analysis run produces for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub keypoints: KeypointCollection,
    pub calibration: Calibration,
    pub measurements: MeasurementResult,
    #[serde(skip)]
    pub visualization: Option<String>,
}

/// analyze_keypoints calibrates the image and derives the measurements.
///
/// # Arguments
/// * `keypoints` - one person's keypoints
/// * `reference_length_cm` - real-world length of the calibration reference
///
/// # Returns
/// * `Result<AnalysisReport, MeasurementError>`
pub fn analyze_keypoints(keypoints: KeypointCollection, reference_length_cm: f64) -> Result<AnalysisReport, MeasurementError> {
    let calibration = derive_calibration(&keypoints, reference_length_cm)?;
    let measurements = derive_measurements(&keypoints, &calibration);

    info!(
        keypoints = keypoints.len(),
        reference = %calibration.reference,
        scale = calibration.scale,
        measurements = measurements.len(),
        "analysis complete"
    );

    Ok(AnalysisReport {
        keypoints,
        calibration,
        measurements,
        visualization: None,
    })
}

/// analyze_outputs runs the measurement core on a workflow `outputs` array,
/// e.g. a response saved from an earlier provider call.
pub fn analyze_outputs(outputs: &Value, reference_length_cm: f64) -> Result<AnalysisReport, MeasurementError> {
    let estimation = PoseEstimation::from_outputs(outputs);
    analyze_estimation(estimation, reference_length_cm)
}

pub fn analyze_estimation(estimation: PoseEstimation, reference_length_cm: f64) -> Result<AnalysisReport, MeasurementError> {
    let mut report = analyze_keypoints(estimation.keypoints, reference_length_cm)?;
    report.visualization = estimation.visualization;
    Ok(report)
}

/// analyze_with_export saves the detected keypoints before calibrating, so
/// the export exists even when no measurement can be derived.
///
/// # Arguments
/// * `estimation` - decoded provider answer
/// * `reference_length_cm` - real-world length of the calibration reference
/// * `keypoints_path` - optional `.npy` destination for the keypoint matrix
///
/// # Returns
/// * `Result<AnalysisReport, Error>`
pub fn analyze_with_export(
    estimation: PoseEstimation,
    reference_length_cm: f64,
    keypoints_path: Option<&Path>,
) -> Result<AnalysisReport, Error> {
    if let Some(path) = keypoints_path {
        save_keypoints_npy(&estimation.keypoints, path)?;
        info!(path = %path.display(), keypoints = estimation.keypoints.len(), "keypoints saved");
    }
    Ok(analyze_estimation(estimation, reference_length_cm)?)
}

#[derive(Debug, Clone)]
pub struct MeasurementPipeline {
    pose_client: PoseEstimationClient,
}

impl MeasurementPipeline {

    /// new initializes new instance of the pipeline
    pub fn new(pose_client: PoseEstimationClient) -> Self {
        MeasurementPipeline { pose_client }
    }

    /// analyze_image runs one full analysis: provider call, keypoint
    /// extraction, calibration and measurement.
    ///
    /// The reference length is checked before the provider is contacted.
    ///
    /// # Arguments
    /// * `image_path` - path of the image to analyze
    /// * `reference_length_cm` - real-world length of the calibration reference
    ///
    /// # Returns
    /// * `Result<AnalysisReport, Error>`
    pub async fn analyze_image<P: AsRef<Path>>(&self, image_path: P, reference_length_cm: f64) -> Result<AnalysisReport, Error> {
        let reference_length_cm = validate_reference_length(reference_length_cm)?;
        let estimation = self.estimate_pose(image_path).await?;
        Ok(analyze_estimation(estimation, reference_length_cm)?)
    }

    /// estimate_pose reads the image and asks the provider for its keypoints.
    pub async fn estimate_pose<P: AsRef<Path>>(&self, image_path: P) -> Result<PoseEstimation, Error> {
        let image_path = image_path.as_ref();
        let image_bytes = tokio::fs::read(image_path)
            .await
            .with_context(|| format!("pipeline - cannot read image {}", image_path.display()))?;

        info!(path = %image_path.display(), "analyzing image");
        self.pose_client.infer(&image_bytes).await
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use serde_json::json;
    use crate::config::config::PoseProviderConfig;
    use crate::error::MeasurementError;
    use crate::helper::calibration::CalibrationReference;
    use crate::helper::measurement::Measurement;
    use crate::modules::pose_client::PoseEstimationClient;
    use ndarray::Array2;
    use ndarray_npy::read_npy;
    use crate::modules::pose_client::PoseEstimation;
    use crate::pipeline::pipeline::{analyze_keypoints, analyze_outputs, analyze_with_export, MeasurementPipeline};
    use crate::utils::coordinate::{Keypoint, KeypointCollection};

    fn kp(id: u32, x: f64, y: f64) -> Keypoint {
        Keypoint::new(Some(id), &format!("new-point-{id}"), x, y, 0.9)
    }

    #[test]
    fn test_analyze_keypoints_is_idempotent() {
        let keypoints = KeypointCollection::new(vec![
            kp(0, 120.0, 130.0),
            kp(1, 140.0, 100.0),
            kp(2, 100.0, 100.0),
            kp(15, 150.0, 510.0),
            kp(16, 90.0, 500.0),
        ]);

        let first = analyze_keypoints(keypoints.clone(), 6.0).unwrap();
        let second = analyze_keypoints(keypoints, 6.0).unwrap();
        assert_eq!(first, second);
        assert_relative_eq!(first.measurements.get(Measurement::Height).unwrap(), 470.0 / (40.0 / 6.0));
    }

    #[test]
    fn test_analyze_keypoints_nose_only() {
        let keypoints = KeypointCollection::new(vec![kp(0, 120.0, 130.0)]);
        let err = analyze_keypoints(keypoints, 6.0).unwrap_err();
        assert_eq!(err, MeasurementError::InsufficientKeypoints { found: 1 });
    }

    #[test]
    fn test_analyze_outputs() {
        let outputs = json!([{
            "predictions": { "predictions": [{ "keypoints": [
                {"class_id": 6, "class": "new-point-6", "x": 80.0, "y": 200.0, "confidence": 0.9},
                {"class_id": 5, "class": "new-point-5", "x": 160.0, "y": 200.0, "confidence": 0.9},
                {"class_id": 12, "class": "new-point-12", "x": 90.0, "y": 300.0, "confidence": 0.9},
                {"class_id": 11, "class": "new-point-11", "x": 150.0, "y": 300.0, "confidence": 0.9}
            ]}]},
            "keypoint_visualization": "iVBORw0KGgo"
        }]);

        let report = analyze_outputs(&outputs, 40.0).unwrap();
        assert_eq!(report.calibration.reference, CalibrationReference::ShoulderWidth);
        assert_relative_eq!(report.measurements.get(Measurement::WaistWidth).unwrap(), 30.0);
        assert_eq!(report.visualization.as_deref(), Some("iVBORw0KGgo"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["measurements"]["Waist Width"], 30.0);
        assert_eq!(json["calibration"]["reference"], "Shoulder Width");
        assert!(json.get("visualization").is_none());
    }

    #[test]
    fn test_keypoints_exported_when_calibration_fails() {
        let outputs = json!([{
            "predictions": { "predictions": [{ "keypoints": [
                {"class_id": 0, "class": "new-point-0", "x": 120.0, "y": 130.0, "confidence": 0.97}
            ]}]}
        }]);
        let path = std::env::temp_dir().join(format!("rs_body_measure_nose_only_{}.npy", std::process::id()));

        let err = analyze_with_export(PoseEstimation::from_outputs(&outputs), 6.0, Some(&path)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<MeasurementError>(),
            Some(&MeasurementError::InsufficientKeypoints { found: 1 })
        );

        let saved: Array2<f64> = read_npy(&path).unwrap();
        assert_eq!(saved.shape(), &[1, 3]);
        assert_eq!(saved[[0, 1]], 130.0);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_analyze_with_export_without_path() {
        let keypoints = KeypointCollection::new(vec![kp(6, 80.0, 200.0), kp(5, 160.0, 200.0)]);
        let estimation = PoseEstimation { keypoints, visualization: None };

        let report = analyze_with_export(estimation, 40.0, None).unwrap();
        assert_relative_eq!(report.calibration.scale, 2.0);
    }

    #[tokio::test]
    async fn test_analyze_image_rejects_bad_reference_before_io() {
        let client = PoseEstimationClient::new(PoseProviderConfig::new()).unwrap();
        let pipeline = MeasurementPipeline::new(client);

        let err = pipeline.analyze_image("does/not/exist.jpg", 0.0).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MeasurementError>(),
            Some(MeasurementError::InvalidCalibrationInput(_))
        ));
    }

    #[tokio::test]
    async fn test_analyze_image_missing_file() {
        let client = PoseEstimationClient::new(PoseProviderConfig::new()).unwrap();
        let pipeline = MeasurementPipeline::new(client);

        let err = pipeline.analyze_image("does/not/exist.jpg", 6.3).await.unwrap_err();
        assert!(err.to_string().contains("cannot read image"));
    }
}
