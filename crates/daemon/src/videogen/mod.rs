use anyhow::{anyhow, Result};
use serde::Serialize;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use storycatcher_engine::{convert_storyboard_with_budget, enforce_budget};

use crate::config::Config;

/// Upstream message seen while a freshly submitted file is still rendering.
const STILL_PROCESSING: &str = "Failed to fetch video data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoadingState {
    Pending,
    Fulfilled,
    Rejected,
}

impl LoadingState {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("FULFILLED") => LoadingState::Fulfilled,
            Some("REJECTED") => LoadingState::Rejected,
            _ => LoadingState::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoFile {
    pub api_file_id: String,
    pub loading_state: LoadingState,
    pub signed_url: Option<String>,
    /// Upstream payload, passed through to status callers.
    pub raw: serde_json::Value,
}

impl VideoFile {
    fn from_value(api_file_id: &str, raw: serde_json::Value) -> Self {
        let loading_state = LoadingState::parse(raw.get("loadingState").and_then(|v| v.as_str()));
        let signed_url = raw
            .get("apiFileSignedUrl")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        VideoFile {
            api_file_id: api_file_id.to_string(),
            loading_state,
            signed_url,
            raw,
        }
    }
}

/// Client for the script-to-video rendering API.
pub struct VideoGenClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    script_words: usize,
    poll_interval: Duration,
    max_wait: Duration,
}

impl VideoGenClient {
    pub fn new(config: &Config) -> Self {
        VideoGenClient {
            http: reqwest::Client::new(),
            api_key: config.videogen_api_key.clone(),
            base_url: config.videogen_base_url.trim_end_matches('/').to_string(),
            script_words: config.script_words,
            poll_interval: config.poll_interval,
            max_wait: config.max_wait,
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| anyhow!("VIDEOGEN_API_KEY environment variable not set"))
    }

    /// Narration script for a storyboard, within the configured word budget.
    pub fn script_for(&self, storyboard: &str) -> String {
        convert_storyboard_with_budget(storyboard, self.script_words)
    }

    /// Submit a narration script for rendering as a vertical video.
    /// Returns the upstream file id.
    pub async fn submit_script(&self, script: &str) -> Result<String> {
        let api_key = self.api_key()?;
        let script = enforce_budget(script, self.script_words);

        let response = self
            .http
            .post(&format!("{}/script-to-video", self.base_url))
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "script": script,
                "aspectRatio": {
                    "width": 9,
                    "height": 16
                }
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("VideoGen API error: {} - {}", status, error_text));
        }

        let result: serde_json::Value = response.json().await?;
        match result.get("apiFileId").and_then(|v| v.as_str()) {
            Some(id) => {
                info!("Submitted script ({} words) as video {}", script.split_whitespace().count(), id);
                Ok(id.to_string())
            }
            None => Err(anyhow!("No apiFileId returned from VideoGen API")),
        }
    }

    pub async fn get_file(&self, api_file_id: &str) -> Result<VideoFile> {
        let api_key = self.api_key()?;

        let response = self
            .http
            .get(&format!("{}/get-file", self.base_url))
            .bearer_auth(api_key)
            .query(&[("apiFileId", api_file_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("VideoGen API error: {} - {}", status, error_text));
        }

        let result: serde_json::Value = response.json().await?;
        Ok(VideoFile::from_value(api_file_id, result))
    }

    /// Poll until the file is fulfilled, rejected, or the deadline passes.
    pub async fn wait_for_completion(&self, api_file_id: &str) -> Result<VideoFile> {
        let deadline = Instant::now() + self.max_wait;

        while Instant::now() < deadline {
            match self.get_file(api_file_id).await {
                Ok(file) => match file.loading_state {
                    LoadingState::Fulfilled => return Ok(file),
                    LoadingState::Rejected => {
                        return Err(anyhow!("Video generation was rejected"));
                    }
                    LoadingState::Pending => debug!("Video {} still rendering", api_file_id),
                },
                Err(e) if e.to_string().contains(STILL_PROCESSING) => {
                    debug!("Video {} not yet available: {}", api_file_id, e);
                }
                Err(e) => return Err(e),
            }
            sleep(self.poll_interval).await;
        }

        warn!("Video {} did not finish within {:?}", api_file_id, self.max_wait);
        Err(anyhow!(
            "Video generation timed out after {} seconds",
            self.max_wait.as_secs()
        ))
    }

    /// Convert, submit, and wait. Returns the signed video URL.
    pub async fn generate_from_storyboard(&self, storyboard: &str) -> Result<String> {
        let script = self.script_for(storyboard);
        let api_file_id = self.submit_script(&script).await?;
        let file = self.wait_for_completion(&api_file_id).await?;
        file.signed_url
            .ok_or_else(|| anyhow!("Video {} finished without a signed URL", api_file_id))
    }
}
