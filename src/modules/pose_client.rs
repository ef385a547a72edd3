use std::time::Duration;
use anyhow::Error;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use crate::config::config::PoseProviderConfig;
use crate::utils::coordinate::{Keypoint, KeypointCollection};

/// Keypoint entry as sent by the provider. Every field is optional so a
/// malformed entry can be dropped without failing the whole response.
#[derive(Debug, Deserialize)]
struct RawKeypoint {
    class_id: Option<Value>,
    class: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
    confidence: Option<f64>,
}

/// parse_class_id accepts integer or numeric string ids. Anything else is
/// treated as unresolved, which only moves the keypoint to the end.
fn parse_class_id(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|id| u32::try_from(id).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl RawKeypoint {
    fn into_keypoint(self) -> Option<Keypoint> {
        Some(Keypoint::new(
            self.class_id.as_ref().and_then(parse_class_id),
            &self.class?,
            self.x?,
            self.y?,
            self.confidence.unwrap_or(0.0),
        ))
    }
}

/// PoseEstimation is the decoded provider answer for one image.
#[derive(Debug, Clone, Default)]
pub struct PoseEstimation {
    pub keypoints: KeypointCollection,
    /// Annotated image as returned by the workflow (base64 payload or URL).
    pub visualization: Option<String>,
}

impl PoseEstimation {
    pub fn from_outputs(outputs: &Value) -> Self {
        PoseEstimation {
            keypoints: extract_keypoints(outputs),
            visualization: extract_visualization(outputs),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoseEstimationClient {
    http: reqwest::Client,
    config: PoseProviderConfig,
}

impl PoseEstimationClient {
    pub fn new(config: PoseProviderConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;
        Ok(PoseEstimationClient { http, config })
    }

    fn workflow_url(&self) -> String {
        format!(
            "{}/{}/workflows/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.workspace_name,
            self.config.workflow_id,
        )
    }

    /// run_workflow sends the image to the hosted pose workflow.
    ///
    /// # Arguments
    /// * `image_bytes` - encoded image file contents
    ///
    /// # Returns
    /// * `Result<Value, Error>` - the workflow `outputs` array
    pub async fn run_workflow(&self, image_bytes: &[u8]) -> Result<Value, Error> {
        let body = json!({
            "api_key": self.config.api_key,
            "inputs": {
                "image": { "type": "base64", "value": STANDARD.encode(image_bytes) }
            },
            "use_cache": self.config.use_cache,
        });

        let url = self.workflow_url();
        debug!(%url, bytes = image_bytes.len(), "running pose workflow");

        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::msg(format!("pose_client - workflow returned {status}: {error_text}")));
        }

        let mut payload: Value = response.json().await?;
        match payload.get_mut("outputs") {
            Some(outputs) => Ok(outputs.take()),
            None => Err(Error::msg("pose_client - workflow response has no outputs")),
        }
    }

    pub async fn infer(&self, image_bytes: &[u8]) -> Result<PoseEstimation, Error> {
        let outputs = self.run_workflow(image_bytes).await?;
        Ok(PoseEstimation::from_outputs(&outputs))
    }
}

/// extract_keypoints reads the first detected person's keypoints from the
/// workflow outputs.
///
/// Entries missing the class, x or y are dropped. A response without any
/// person yields an empty collection.
///
/// # Arguments
/// * `outputs` - &Value
///
/// # Returns
/// * `KeypointCollection`
pub fn extract_keypoints(outputs: &Value) -> KeypointCollection {
    let entries = outputs
        .get(0)
        .and_then(|output| output.get("predictions"))
        .and_then(|predictions| predictions.get("predictions"))
        .and_then(Value::as_array)
        .and_then(|detections| detections.first())
        .and_then(|person| person.get("keypoints"))
        .and_then(Value::as_array);

    let entries = match entries {
        None => {
            warn!("pose_client - no person detected in workflow outputs");
            return KeypointCollection::default();
        }
        Some(entries) => entries,
    };

    let keypoints: Vec<Keypoint> = entries
        .iter()
        .filter_map(|entry| RawKeypoint::deserialize(entry).ok())
        .filter_map(RawKeypoint::into_keypoint)
        .collect();

    let dropped = entries.len() - keypoints.len();
    if dropped > 0 {
        warn!(dropped, "pose_client - dropped malformed keypoints");
    }
    debug!(kept = keypoints.len(), "pose_client - keypoints extracted");

    KeypointCollection::new(keypoints)
}

/// extract_visualization returns the annotated image reference if the
/// workflow produced one.
pub fn extract_visualization(outputs: &Value) -> Option<String> {
    let vis = outputs.get(0)?.get("keypoint_visualization")?;
    match vis {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("value").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}
