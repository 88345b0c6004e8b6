use crate::config::OmdbConfig;
use crate::error::CatalogError;
use crate::http::HttpClient;
use anyhow::Result;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Series metadata as OMDb returns it for `?t=<title>`.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesData {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "totalSeasons", deserialize_with = "number_from_text")]
    pub total_seasons: u32,
    #[serde(rename = "imdbRating")]
    pub rating: String,
    #[serde(rename = "Poster")]
    pub poster: String,
    #[serde(rename = "Genre")]
    pub genre: String,
    #[serde(rename = "Actors")]
    pub cast: String,
    #[serde(rename = "Plot")]
    pub synopsis: String,
}

/// One season as OMDb returns it for `?t=<title>&Season=<n>`.
#[derive(Debug, Clone, Deserialize)]
pub struct SeasonData {
    #[serde(rename = "Season", deserialize_with = "number_from_text")]
    pub number: u32,
    #[serde(rename = "Episodes", default)]
    pub episodes: Vec<EpisodeData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpisodeData {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Episode", default)]
    pub number: Option<String>,
    #[serde(rename = "imdbRating", default)]
    pub rating: Option<String>,
    #[serde(rename = "Released", default)]
    pub released: Option<String>,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

fn number_from_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected a number, got {text:?}"))),
    }
}

/// Decodes a raw OMDb body into the requested shape.
///
/// OMDb reports lookups that found nothing with a 200 and
/// `"Response": "False"`; those become [`CatalogError::Unavailable`].
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, CatalogError> {
    let envelope: Envelope = serde_json::from_str(raw)?;
    if envelope.response.as_deref() == Some("False") {
        let message = envelope.error.unwrap_or_else(|| "unknown error".to_string());
        return Err(CatalogError::Unavailable(message));
    }

    Ok(serde_json::from_str(raw)?)
}

pub struct OmdbClient {
    http: HttpClient,
    config: OmdbConfig,
    api_key: String,
}

impl OmdbClient {
    pub fn new(http: HttpClient, config: OmdbConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    fn url(&self, title: &str, season: Option<u32>) -> String {
        let mut url = format!(
            "{}?t={}&apikey={}",
            self.config.base_url,
            urlencoding::encode(title),
            self.api_key
        );
        if let Some(season) = season {
            url.push_str(&format!("&Season={season}"));
        }
        url
    }

    #[instrument(skip(self))]
    pub async fn fetch_series(&self, title: &str) -> Result<SeriesData> {
        info!("Fetching series metadata: {}", title);
        let raw = self.http.get_text(&self.url(title, None)).await?;
        debug!("Received {} bytes", raw.len());
        Ok(decode(&raw)?)
    }

    #[instrument(skip(self))]
    pub async fn fetch_season(&self, title: &str, season: u32) -> Result<SeasonData> {
        let raw = self.http.get_text(&self.url(title, Some(season))).await?;
        debug!("Received {} bytes for season {}", raw.len(), season);
        Ok(decode(&raw)?)
    }

    /// Fetches seasons `1..=total_seasons` in order, pausing between requests.
    #[instrument(skip(self))]
    pub async fn fetch_seasons(&self, title: &str, total_seasons: u32) -> Result<Vec<SeasonData>> {
        let delay = Duration::from_millis(self.config.request_delay_ms);
        let mut seasons = Vec::with_capacity(total_seasons as usize);

        for season in 1..=total_seasons {
            if season > 1 {
                tokio::time::sleep(delay).await;
            }
            seasons.push(self.fetch_season(title, season).await?);
        }

        info!("Fetched {} seasons of {}", seasons.len(), title);
        Ok(seasons)
    }
}
