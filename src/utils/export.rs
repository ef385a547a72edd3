use std::path::Path;
use anyhow::Error;
use ndarray::Array2;
use ndarray_npy::write_npy;
use crate::utils::coordinate::KeypointCollection;

/// convert_keypoints_to_ndarray lays the collection out as an N x 3 matrix
/// of `[x, y, confidence]` rows, in collection order.
///
/// # Arguments
/// * `keypoints` - &KeypointCollection
///
/// # Returns
/// * `Result<Array2<f64>, Error>`
pub fn convert_keypoints_to_ndarray(keypoints: &KeypointCollection) -> Result<Array2<f64>, Error> {
    let mut result: Vec<f64> = Vec::with_capacity(keypoints.len() * 3);
    for kp in keypoints {
        result.extend_from_slice(&[kp.position.x, kp.position.y, kp.confidence]);
    }

    let arr = Array2::from_shape_vec((keypoints.len(), 3), result)?;
    Ok(arr)
}

/// save_keypoints_npy writes the keypoint matrix to `path` in `.npy` format.
pub fn save_keypoints_npy<P: AsRef<Path>>(keypoints: &KeypointCollection, path: P) -> Result<(), Error> {
    let arr = convert_keypoints_to_ndarray(keypoints)?;
    write_npy(path, &arr)?;
    Ok(())
}
