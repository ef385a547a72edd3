use std::collections::BTreeMap;
use nalgebra::{distance, Point2};
use serde::{Deserialize, Serialize};
use crate::helper::keypoint_catalog::{find_part, BodyPart, Side};
use crate::utils::coordinate::KeypointCollection;

/// Head-top to eye length is estimated as this multiple of the vertical
/// eye to nose distance.
const HEAD_TOP_TO_EYE_FACTOR: f64 = 2.0;

/// Named body measurements reported in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Measurement {
    #[serde(rename = "Shoulder Width")]
    ShoulderWidth,
    #[serde(rename = "Arm Span")]
    ArmSpan,
    #[serde(rename = "Height")]
    Height,
    #[serde(rename = "Waist Width")]
    WaistWidth,
    #[serde(rename = "Torso Length")]
    TorsoLength,
    #[serde(rename = "Left Arm Length")]
    LeftArmLength,
    #[serde(rename = "Right Arm Length")]
    RightArmLength,
    #[serde(rename = "Left Upper Arm")]
    LeftUpperArm,
    #[serde(rename = "Right Upper Arm")]
    RightUpperArm,
    #[serde(rename = "Left Forearm")]
    LeftForearm,
    #[serde(rename = "Right Forearm")]
    RightForearm,
    #[serde(rename = "Left Leg Length")]
    LeftLegLength,
    #[serde(rename = "Right Leg Length")]
    RightLegLength,
    #[serde(rename = "Left Thigh")]
    LeftThigh,
    #[serde(rename = "Right Thigh")]
    RightThigh,
    #[serde(rename = "Left Shin")]
    LeftShin,
    #[serde(rename = "Right Shin")]
    RightShin,
}

impl Measurement {
    pub const ALL: [Measurement; 17] = [
        Measurement::ShoulderWidth,
        Measurement::ArmSpan,
        Measurement::Height,
        Measurement::WaistWidth,
        Measurement::TorsoLength,
        Measurement::LeftArmLength,
        Measurement::RightArmLength,
        Measurement::LeftUpperArm,
        Measurement::RightUpperArm,
        Measurement::LeftForearm,
        Measurement::RightForearm,
        Measurement::LeftLegLength,
        Measurement::RightLegLength,
        Measurement::LeftThigh,
        Measurement::RightThigh,
        Measurement::LeftShin,
        Measurement::RightShin,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Measurement::ShoulderWidth => "Shoulder Width",
            Measurement::ArmSpan => "Arm Span",
            Measurement::Height => "Height",
            Measurement::WaistWidth => "Waist Width",
            Measurement::TorsoLength => "Torso Length",
            Measurement::LeftArmLength => "Left Arm Length",
            Measurement::RightArmLength => "Right Arm Length",
            Measurement::LeftUpperArm => "Left Upper Arm",
            Measurement::RightUpperArm => "Right Upper Arm",
            Measurement::LeftForearm => "Left Forearm",
            Measurement::RightForearm => "Right Forearm",
            Measurement::LeftLegLength => "Left Leg Length",
            Measurement::RightLegLength => "Right Leg Length",
            Measurement::LeftThigh => "Left Thigh",
            Measurement::RightThigh => "Right Thigh",
            Measurement::LeftShin => "Left Shin",
            Measurement::RightShin => "Right Shin",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Measurement::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// MeasurementResult maps each resolved measurement to its value in
/// centimeters. Unresolved measurements are never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementResult {
    values: BTreeMap<Measurement, f64>,
}

impl MeasurementResult {
    pub fn get(&self, measurement: Measurement) -> Option<f64> {
        self.values.get(&measurement).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        Measurement::from_name(name).and_then(|m| self.get(m))
    }

    pub fn contains(&self, measurement: Measurement) -> bool {
        self.values.contains_key(&measurement)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Measurement, f64)> + '_ {
        self.values.iter().map(|(m, v)| (*m, *v))
    }

    fn insert(&mut self, measurement: Measurement, value: Option<f64>) {
        if let Some(value) = value {
            self.values.insert(measurement, value);
        }
    }
}

/// vertical_reference picks the y-coordinate standing in for a left/right
/// landmark pair.
///
/// With both sides present the larger value is used when `pick_max` is set,
/// otherwise the two are averaged. With one side present that side is used.
///
/// # Arguments
/// * `left` - Option<f64>
/// * `right` - Option<f64>
/// * `pick_max` - bool
///
/// # Returns
/// * `Option<f64>`
pub fn vertical_reference(left: Option<f64>, right: Option<f64>, pick_max: bool) -> Option<f64> {
    match (left, right) {
        (Some(l), Some(r)) if pick_max => Some(l.max(r)),
        (Some(l), Some(r)) => Some((l + r) / 2.0),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}

/// MeasurementEngine derives body measurements from one person's keypoints.
#[derive(Debug, Clone)]
pub struct MeasurementEngine<'a> {
    keypoints: &'a KeypointCollection,
    scale: f64,
}

impl<'a> MeasurementEngine<'a> {

    /// new initializes the engine over a keypoint collection.
    ///
    /// `scale` is in pixels per centimeter. Pixel-domain queries ignore it,
    /// so a placeholder is fine until a calibration has been derived.
    pub fn new(keypoints: &'a KeypointCollection, scale: f64) -> Self {
        MeasurementEngine { keypoints, scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn point(&self, part: BodyPart) -> Option<Point2<f64>> {
        find_part(self.keypoints, part).map(|kp| kp.position.to_point())
    }

    fn y(&self, part: BodyPart) -> Option<f64> {
        find_part(self.keypoints, part).map(|kp| kp.position.y)
    }

    /// pixel_distance is the Euclidean distance between two body parts in
    /// pixels, absent if either part is missing.
    pub fn pixel_distance(&self, a: BodyPart, b: BodyPart) -> Option<f64> {
        Some(distance(&self.point(a)?, &self.point(b)?))
    }

    pub fn to_centimeters(&self, pixels: f64) -> f64 {
        pixels / self.scale
    }

    fn distance_cm(&self, a: BodyPart, b: BodyPart) -> Option<f64> {
        self.pixel_distance(a, b).map(|px| self.to_centimeters(px))
    }

    /// eye_distance is the interpupillary distance in pixels.
    pub fn eye_distance(&self) -> Option<f64> {
        self.pixel_distance(BodyPart::LeftEye, BodyPart::RightEye)
    }

    pub fn shoulder_width_pixels(&self) -> Option<f64> {
        self.pixel_distance(BodyPart::LeftShoulder, BodyPart::RightShoulder)
    }

    pub fn shoulder_width(&self) -> Option<f64> {
        self.shoulder_width_pixels().map(|px| self.to_centimeters(px))
    }

    pub fn waist_width(&self) -> Option<f64> {
        self.distance_cm(BodyPart::LeftHip, BodyPart::RightHip)
    }

    /// torso_length is the vertical eye to hip distance. The left landmark
    /// is preferred for each of eye and hip, the right one is the fallback.
    pub fn torso_length(&self) -> Option<f64> {
        let eye_y = self.y(BodyPart::LeftEye).or_else(|| self.y(BodyPart::RightEye))?;
        let hip_y = self.y(BodyPart::LeftHip).or_else(|| self.y(BodyPart::RightHip))?;
        Some(self.to_centimeters((eye_y - hip_y).abs()))
    }

    pub fn arm_length(&self, side: Side) -> Option<f64> {
        self.distance_cm(BodyPart::shoulder(side), BodyPart::wrist(side))
    }

    pub fn upper_arm_length(&self, side: Side) -> Option<f64> {
        self.distance_cm(BodyPart::shoulder(side), BodyPart::elbow(side))
    }

    pub fn forearm_length(&self, side: Side) -> Option<f64> {
        self.distance_cm(BodyPart::elbow(side), BodyPart::wrist(side))
    }

    pub fn leg_length(&self, side: Side) -> Option<f64> {
        self.distance_cm(BodyPart::hip(side), BodyPart::ankle(side))
    }

    pub fn thigh_length(&self, side: Side) -> Option<f64> {
        self.distance_cm(BodyPart::hip(side), BodyPart::knee(side))
    }

    pub fn shin_length(&self, side: Side) -> Option<f64> {
        self.distance_cm(BodyPart::knee(side), BodyPart::ankle(side))
    }

    /// arm_span sums both arms' upper arm and forearm segments plus the
    /// shoulder width. A segment with a missing endpoint contributes zero.
    pub fn arm_span(&self) -> Option<f64> {
        let segments = [
            (BodyPart::LeftShoulder, BodyPart::LeftElbow),
            (BodyPart::LeftElbow, BodyPart::LeftWrist),
            (BodyPart::RightShoulder, BodyPart::RightElbow),
            (BodyPart::RightElbow, BodyPart::RightWrist),
            (BodyPart::LeftShoulder, BodyPart::RightShoulder),
        ];
        let total: f64 = segments
            .iter()
            .map(|(a, b)| self.pixel_distance(*a, *b).unwrap_or(0.0))
            .sum();

        if total > 0.0 {
            Some(self.to_centimeters(total))
        } else {
            None
        }
    }

    fn eye_y(&self) -> Option<f64> {
        vertical_reference(self.y(BodyPart::LeftEye), self.y(BodyPart::RightEye), false)
    }

    fn ankle_y(&self) -> Option<f64> {
        vertical_reference(self.y(BodyPart::LeftAnkle), self.y(BodyPart::RightAnkle), true)
    }

    /// head_top_to_eye_length estimates, in pixels, the distance from the top
    /// of the head down to the eyes.
    pub fn head_top_to_eye_length(&self) -> Option<f64> {
        let eye_y = self.eye_y()?;
        let nose_y = self.y(BodyPart::Nose)?;
        Some((eye_y - nose_y).abs() * HEAD_TOP_TO_EYE_FACTOR)
    }

    /// height_pixels is the eye to lowest ankle distance plus the estimated
    /// head-top length, which counts as zero without a nose.
    pub fn height_pixels(&self) -> Option<f64> {
        let body = (self.eye_y()? - self.ankle_y()?).abs();
        Some(body + self.head_top_to_eye_length().unwrap_or(0.0))
    }

    pub fn height(&self) -> Option<f64> {
        self.height_pixels().map(|px| self.to_centimeters(px))
    }

    pub fn measure(&self, measurement: Measurement) -> Option<f64> {
        match measurement {
            Measurement::ShoulderWidth => self.shoulder_width(),
            Measurement::ArmSpan => self.arm_span(),
            Measurement::Height => self.height(),
            Measurement::WaistWidth => self.waist_width(),
            Measurement::TorsoLength => self.torso_length(),
            Measurement::LeftArmLength => self.arm_length(Side::Left),
            Measurement::RightArmLength => self.arm_length(Side::Right),
            Measurement::LeftUpperArm => self.upper_arm_length(Side::Left),
            Measurement::RightUpperArm => self.upper_arm_length(Side::Right),
            Measurement::LeftForearm => self.forearm_length(Side::Left),
            Measurement::RightForearm => self.forearm_length(Side::Right),
            Measurement::LeftLegLength => self.leg_length(Side::Left),
            Measurement::RightLegLength => self.leg_length(Side::Right),
            Measurement::LeftThigh => self.thigh_length(Side::Left),
            Measurement::RightThigh => self.thigh_length(Side::Right),
            Measurement::LeftShin => self.shin_length(Side::Left),
            Measurement::RightShin => self.shin_length(Side::Right),
        }
    }

    /// all_measurements computes every measurement whose keypoints resolved.
    pub fn all_measurements(&self) -> MeasurementResult {
        let mut result = MeasurementResult::default();
        for measurement in Measurement::ALL {
            result.insert(measurement, self.measure(measurement));
        }
        result
    }
}
