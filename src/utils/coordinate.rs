use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Coordinate2D is a position in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate2D {
    pub x: f64,
    pub y: f64,
}

impl Coordinate2D {
    pub fn new(x: f64, y: f64) -> Self {
        Coordinate2D { x, y }
    }

    pub fn to_point(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

/// Keypoint is a single detected anatomical landmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Numeric class id reported by the provider, used for ordering only.
    pub class_id: Option<u32>,
    /// Provider label, resolved through the keypoint catalog.
    pub identifier: String,
    pub position: Coordinate2D,
    /// Carried for display, never used to filter or weight.
    pub confidence: f64,
}

impl Keypoint {
    pub fn new(class_id: Option<u32>, identifier: &str, x: f64, y: f64, confidence: f64) -> Self {
        Keypoint {
            class_id,
            identifier: identifier.to_string(),
            position: Coordinate2D::new(x, y),
            confidence,
        }
    }
}

/// KeypointCollection holds the keypoints of exactly one detected person,
/// ordered by class id with unresolved ids last.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Keypoint>", into = "Vec<Keypoint>")]
pub struct KeypointCollection {
    keypoints: Vec<Keypoint>,
}

impl KeypointCollection {

    /// new sorts the keypoints and freezes them into a collection.
    ///
    /// The sort is stable, so keypoints sharing a class id keep their
    /// provider order and the first one wins in name lookups.
    ///
    /// # Arguments
    /// * `keypoints` - Vec<Keypoint>
    ///
    /// # Returns
    /// * `KeypointCollection`
    pub fn new(mut keypoints: Vec<Keypoint>) -> Self {
        keypoints.sort_by_key(|kp| (kp.class_id.is_none(), kp.class_id));
        KeypointCollection { keypoints }
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Keypoint> {
        self.keypoints.iter()
    }

    pub fn as_slice(&self) -> &[Keypoint] {
        &self.keypoints
    }
}

impl From<Vec<Keypoint>> for KeypointCollection {
    fn from(keypoints: Vec<Keypoint>) -> Self {
        KeypointCollection::new(keypoints)
    }
}

impl From<KeypointCollection> for Vec<Keypoint> {
    fn from(collection: KeypointCollection) -> Self {
        collection.keypoints
    }
}

impl<'a> IntoIterator for &'a KeypointCollection {
    type Item = &'a Keypoint;
    type IntoIter = std::slice::Iter<'a, Keypoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.keypoints.iter()
    }
}
