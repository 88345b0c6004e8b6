use anyhow::Result;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, error, instrument};

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("showcatalog/0.1.0")
            .build()?;

        Ok(Self { client })
    }

    #[instrument(skip(self, url))]
    pub async fn get(&self, url: &str) -> Result<Response> {
        debug!("Making GET request");
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            error!("HTTP request failed with status: {}", response.status());
            return Err(anyhow::anyhow!("HTTP request failed: {}", response.status()));
        }

        Ok(response)
    }

    /// Returns the raw body; decoding is left to the caller.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;
        Ok(response.text().await?)
    }
}
