use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Shown whenever the upstream vision call fails. The raw error is never
/// surfaced as the user-visible description.
pub const FALLBACK_DESCRIPTION: &str = "카메라가 현재 주변을 감지하고 있습니다.";

/// Shown when no image data was captured at all.
pub const EMPTY_IMAGE_DESCRIPTION: &str = "이미지를 전송해주세요";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct VisionRequest<'a> {
    image: &'a str,
}

#[derive(Debug, Deserialize)]
struct VisionResponse {
    description: String,
}

/// Scene description from a captured camera frame.
#[async_trait]
pub trait VisionService: Send + Sync {
    /// Describe the image given as a data URL. Always yields displayable
    /// text: upstream failures degrade to a generic placeholder.
    async fn describe_image(&self, image_data_url: &str) -> String;
}

pub struct HttpVisionService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpVisionService {
    pub fn new(api_base: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/vision", api_base.trim_end_matches('/')),
        })
    }

    async fn try_describe(&self, image: &str) -> Result<String, reqwest::Error> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&VisionRequest { image })
            .send()
            .await?
            .error_for_status()?;

        let body: VisionResponse = response.json().await?;
        Ok(body.description)
    }
}

#[async_trait]
impl VisionService for HttpVisionService {
    async fn describe_image(&self, image_data_url: &str) -> String {
        if image_data_url.is_empty() {
            return EMPTY_IMAGE_DESCRIPTION.to_string();
        }

        match self.try_describe(image_data_url).await {
            Ok(description) if !description.is_empty() => description,
            Ok(_) => FALLBACK_DESCRIPTION.to_string(),
            Err(err) => {
                warn!(error = %err, "Vision call failed, using placeholder");
                FALLBACK_DESCRIPTION.to_string()
            }
        }
    }
}
