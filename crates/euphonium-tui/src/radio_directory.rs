//! Station search against a radio-browser.info compatible directory.

use euphonium_proto::config::{join_url, RadioBrowserConfig};
use euphonium_proto::protocol::RadioStation;
use reqwest::Client;
use tracing::debug;

use crate::api::ApiError;

#[derive(Clone)]
pub struct RadioDirectory {
    http: Client,
    config: RadioBrowserConfig,
}

impl RadioDirectory {
    pub fn new(http: Client, config: RadioBrowserConfig) -> Self {
        Self { http, config }
    }

    pub fn search_url(&self) -> String {
        join_url(&self.config.base_url, "/json/stations/search")
    }

    pub async fn search(&self, name: &str) -> Result<Vec<RadioStation>, ApiError> {
        let url = self.search_url();
        debug!("radio search {:?} via {}", name, url);
        let limit = self.config.limit.to_string();
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("name", name),
                ("limit", limit.as_str()),
                ("hidebroken", "true"),
                ("order", "votes"),
                ("reverse", "true"),
            ])
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status { url, status });
        }
        let mut stations: Vec<RadioStation> = resp
            .json()
            .await
            .map_err(|source| ApiError::Decode { url, source })?;
        stations.retain(|s| !s.stream_url().is_empty());
        Ok(stations)
    }
}
