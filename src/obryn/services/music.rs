use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct MusicQuery<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct MusicResponse {
    result: String,
}

/// Music lookup: text query or raw audio identification.
#[async_trait]
pub trait MusicSearchService: Send + Sync {
    async fn search(&self, query: &str) -> Result<String>;

    async fn identify(&self, file_name: &str, audio: Vec<u8>) -> Result<String>;
}

pub struct HttpMusicSearchService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMusicSearchService {
    pub fn new(api_base: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build music search client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/music-search", api_base.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl MusicSearchService for HttpMusicSearchService {
    async fn search(&self, query: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&MusicQuery { query })
            .send()
            .await
            .context("Music search request failed")?
            .error_for_status()
            .context("Music search returned an error status")?;

        let body: MusicResponse = response
            .json()
            .await
            .context("Music search returned an unreadable body")?;
        Ok(body.result)
    }

    async fn identify(&self, file_name: &str, audio: Vec<u8>) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(audio).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .context("Music identification request failed")?
            .error_for_status()
            .context("Music identification returned an error status")?;

        let body: MusicResponse = response
            .json()
            .await
            .context("Music identification returned an unreadable body")?;
        Ok(body.result)
    }
}
