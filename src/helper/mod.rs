pub mod calibration;
pub mod keypoint_catalog;
pub mod measurement;
pub mod report;
