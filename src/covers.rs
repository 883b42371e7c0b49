//! Cover art lookup against a Google Books compatible volumes endpoint.

use crate::config::CoversConfig;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    #[serde(default)]
    volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    #[serde(default)]
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
struct ImageLinks {
    thumbnail: Option<String>,
}

/// Best-effort cover resolver.
///
/// Lookups never fail: every error is logged and turned into `None`.
#[derive(Debug, Clone)]
pub struct CoverResolver {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    enabled: bool,
}

impl CoverResolver {
    /// Create a resolver from configuration.
    pub fn new(config: &CoversConfig) -> Self {
        let mut builder = Client::builder();
        if config.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_seconds));
        }

        let client = builder.build().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to build HTTP client, using defaults");
            Client::new()
        });

        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            enabled: config.enabled,
        }
    }

    /// A resolver that never performs lookups.
    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            endpoint: String::new(),
            api_key: None,
            enabled: false,
        }
    }

    /// Whether lookups are performed.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Look up a cover thumbnail for the given title and author.
    pub async fn resolve(&self, title: &str, author: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        match self.fetch(title, author).await {
            Ok(Some(url)) => {
                tracing::debug!(title, author, cover = %url, "Resolved cover");
                Some(url)
            }
            Ok(None) => {
                tracing::debug!(title, author, "No cover found");
                None
            }
            Err(e) => {
                tracing::warn!(title, author, error = %e, "Error fetching book cover");
                None
            }
        }
    }

    async fn fetch(&self, title: &str, author: &str) -> reqwest::Result<Option<String>> {
        let query = format!("{} {}", title, author);
        let mut request = self.client.get(&self.endpoint).query(&[("q", query.as_str())]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response: VolumesResponse = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(first_thumbnail(response))
    }
}

/// Thumbnail of the first result, upgraded to https.
fn first_thumbnail(response: VolumesResponse) -> Option<String> {
    let thumbnail = response
        .items
        .into_iter()
        .next()?
        .volume_info?
        .image_links?
        .thumbnail?;

    Some(secure_url(&thumbnail))
}

/// Rewrite an `http://` URL to `https://`.
pub fn secure_url(url: &str) -> String {
    url.replace("http://", "https://")
}
