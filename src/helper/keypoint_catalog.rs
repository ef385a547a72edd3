use crate::utils::coordinate::{Keypoint, KeypointCollection};

/// Provider identifier to canonical body-part name. Closed table matching the
/// 17 point skeleton the pose workflow always returns.
const KEYPOINT_MAPPING: [(&str, &str); 17] = [
    ("new-point-0", "Nose"),
    ("new-point-1", "Right Eye"),
    ("new-point-2", "Left Eye"),
    ("new-point-3", "Right Ear"),
    ("new-point-4", "Left Ear"),
    ("new-point-5", "Right Shoulder"),
    ("new-point-6", "Left Shoulder"),
    ("new-point-7", "Right Elbow"),
    ("new-point-8", "Left Elbow"),
    ("new-point-9", "Right Wrist"),
    ("new-point-10", "Left Wrist"),
    ("new-point-11", "Right Hip"),
    ("new-point-12", "Left Hip"),
    ("new-point-13", "Right Knee"),
    ("new-point-14", "Left Knee"),
    ("new-point-15", "Right Ankle"),
    ("new-point-16", "Left Ankle"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// Canonical body parts known to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Nose,
    RightEye,
    LeftEye,
    RightEar,
    LeftEar,
    RightShoulder,
    LeftShoulder,
    RightElbow,
    LeftElbow,
    RightWrist,
    LeftWrist,
    RightHip,
    LeftHip,
    RightKnee,
    LeftKnee,
    RightAnkle,
    LeftAnkle,
}

impl BodyPart {
    pub fn name(&self) -> &'static str {
        match self {
            BodyPart::Nose => "Nose",
            BodyPart::RightEye => "Right Eye",
            BodyPart::LeftEye => "Left Eye",
            BodyPart::RightEar => "Right Ear",
            BodyPart::LeftEar => "Left Ear",
            BodyPart::RightShoulder => "Right Shoulder",
            BodyPart::LeftShoulder => "Left Shoulder",
            BodyPart::RightElbow => "Right Elbow",
            BodyPart::LeftElbow => "Left Elbow",
            BodyPart::RightWrist => "Right Wrist",
            BodyPart::LeftWrist => "Left Wrist",
            BodyPart::RightHip => "Right Hip",
            BodyPart::LeftHip => "Left Hip",
            BodyPart::RightKnee => "Right Knee",
            BodyPart::LeftKnee => "Left Knee",
            BodyPart::RightAnkle => "Right Ankle",
            BodyPart::LeftAnkle => "Left Ankle",
        }
    }

    pub fn shoulder(side: Side) -> Self {
        match side {
            Side::Left => BodyPart::LeftShoulder,
            Side::Right => BodyPart::RightShoulder,
        }
    }

    pub fn elbow(side: Side) -> Self {
        match side {
            Side::Left => BodyPart::LeftElbow,
            Side::Right => BodyPart::RightElbow,
        }
    }

    pub fn wrist(side: Side) -> Self {
        match side {
            Side::Left => BodyPart::LeftWrist,
            Side::Right => BodyPart::RightWrist,
        }
    }

    pub fn hip(side: Side) -> Self {
        match side {
            Side::Left => BodyPart::LeftHip,
            Side::Right => BodyPart::RightHip,
        }
    }

    pub fn knee(side: Side) -> Self {
        match side {
            Side::Left => BodyPart::LeftKnee,
            Side::Right => BodyPart::RightKnee,
        }
    }

    pub fn ankle(side: Side) -> Self {
        match side {
            Side::Left => BodyPart::LeftAnkle,
            Side::Right => BodyPart::RightAnkle,
        }
    }
}

/// canonical_name resolves a provider identifier to its body-part name.
///
/// Unknown identifiers are returned unchanged.
///
/// # Arguments
/// * `identifier` - provider label, e.g. `new-point-2`
///
/// # Returns
/// * `&str`
pub fn canonical_name(identifier: &str) -> &str {
    KEYPOINT_MAPPING
        .iter()
        .find(|(id, _)| *id == identifier)
        .map(|(_, name)| *name)
        .unwrap_or(identifier)
}

/// find_by_name returns the first keypoint whose canonical name equals `name`.
///
/// # Arguments
/// * `keypoints` - &KeypointCollection
/// * `name` - canonical body-part name
///
/// # Returns
/// * `Option<&Keypoint>`
pub fn find_by_name<'a>(keypoints: &'a KeypointCollection, name: &str) -> Option<&'a Keypoint> {
    keypoints
        .iter()
        .find(|kp| canonical_name(&kp.identifier) == name)
}

pub fn find_part(keypoints: &KeypointCollection, part: BodyPart) -> Option<&Keypoint> {
    find_by_name(keypoints, part.name())
}

#[cfg(test)]
mod tests {
    use crate::helper::keypoint_catalog::{canonical_name, find_by_name, find_part, BodyPart, KEYPOINT_MAPPING};
    use crate::utils::coordinate::{Keypoint, KeypointCollection};

    #[test]
    fn test_canonical_name_known_identifiers() {
        assert_eq!(canonical_name("new-point-0"), "Nose");
        assert_eq!(canonical_name("new-point-2"), "Left Eye");
        assert_eq!(canonical_name("new-point-15"), "Right Ankle");
    }

    #[test]
    fn test_canonical_name_unknown_identifier_passes_through() {
        assert_eq!(canonical_name("new-point-17"), "new-point-17");
        assert_eq!(canonical_name(""), "");
    }

    #[test]
    fn test_table_matches_body_part_names() {
        let names: Vec<&str> = KEYPOINT_MAPPING.iter().map(|(_, name)| *name).collect();
        for part in [BodyPart::Nose, BodyPart::LeftAnkle, BodyPart::RightWrist, BodyPart::LeftEar] {
            assert!(names.contains(&part.name()));
        }
    }

    #[test]
    fn test_find_by_name_first_match_wins() {
        let keypoints = KeypointCollection::new(vec![
            Keypoint::new(Some(2), "new-point-2", 100.0, 100.0, 0.9),
            Keypoint::new(Some(2), "new-point-2", 500.0, 500.0, 0.9),
            Keypoint::new(Some(0), "new-point-0", 120.0, 130.0, 0.9),
        ]);

        let eye = find_by_name(&keypoints, "Left Eye").unwrap();
        assert_eq!(eye.position.x, 100.0);
        assert!(find_by_name(&keypoints, "Right Eye").is_none());
        assert!(find_part(&keypoints, BodyPart::Nose).is_some());
    }
}
