use std::env;
use anyhow::Error;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://serverless.roboflow.com";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoseProviderConfig {
    pub api_url: String,
    pub api_key: String,
    pub workspace_name: String,
    pub workflow_id: String,
    /// Request timeout in seconds.
    pub timeout: u64,
    pub use_cache: bool,
}

impl PoseProviderConfig {
    pub(crate) fn new() -> Self {
        PoseProviderConfig {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            workspace_name: String::new(),
            workflow_id: String::new(),
            timeout: 60,
            use_cache: true,
        }
    }

    /// from_env reads the provider settings from the process environment.
    ///
    /// `ROBOFLOW_API_KEY`, `ROBOFLOW_WORKSPACE` and `ROBOFLOW_WORKFLOW_ID` are
    /// required, `ROBOFLOW_API_URL` overrides the hosted endpoint.
    ///
    /// # Returns
    /// * `Result<PoseProviderConfig, Error>`
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, Error> {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(Error::msg(format!("config - environment variable {key} is not set"))),
            }
        };

        let mut config = PoseProviderConfig::new();
        config.api_key = required("ROBOFLOW_API_KEY")?;
        config.workspace_name = required("ROBOFLOW_WORKSPACE")?;
        config.workflow_id = required("ROBOFLOW_WORKFLOW_ID")?;
        if let Some(api_url) = lookup("ROBOFLOW_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_url = api_url;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Real-world length of the calibration reference in centimeters. The
    /// default is a typical adult interpupillary distance.
    pub reference_length_cm: f64,
    pub json_output: bool,
}

impl AnalysisConfig {
    pub(crate) fn new() -> Self {
        AnalysisConfig {
            reference_length_cm: 6.3,
            json_output: false,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new()
    }
}
