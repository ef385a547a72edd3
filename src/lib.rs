pub mod utils;
pub mod pipeline;
pub mod config;
pub mod helper;
pub mod modules;
pub mod error;

pub use error::MeasurementError;
pub use helper::calibration::{derive_calibration, derive_measurements, Calibration, CalibrationReference};
pub use helper::measurement::{Measurement, MeasurementEngine, MeasurementResult};
pub use pipeline::pipeline::{analyze_keypoints, analyze_outputs, analyze_with_export, AnalysisReport, MeasurementPipeline};
pub use utils::coordinate::{Keypoint, KeypointCollection};
