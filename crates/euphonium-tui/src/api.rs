//! HTTP client for the device API.

use euphonium_proto::config::ServiceConfig;
use euphonium_proto::protocol::{
    PlaybackState, PluginConfiguration, PluginSummary, VolumeCommand, WebRadioCommand,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Thin wrapper around a shared `reqwest::Client` that knows the device's
/// endpoint layout.  Cheap to clone; background tasks each take a copy.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    service: ServiceConfig,
}

impl ApiClient {
    pub fn new(service: ServiceConfig) -> Self {
        Self::with_client(Client::new(), service)
    }

    pub fn with_client(http: Client, service: ServiceConfig) -> Self {
        Self { http, service }
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn service(&self) -> &ServiceConfig {
        &self.service
    }

    pub fn events_url(&self) -> String {
        self.service.events_url()
    }

    pub async fn playback_state(&self) -> Result<PlaybackState, ApiError> {
        self.get_json(self.service.playback_url()).await
    }

    /// Send a volume command.  The response body is never read.
    pub async fn set_volume(&self, command: VolumeCommand) -> Result<(), ApiError> {
        self.post_json(self.service.volume_url(), &command).await
    }

    pub async fn plugins(&self) -> Result<Vec<PluginSummary>, ApiError> {
        self.get_json(self.service.plugins_url()).await
    }

    pub async fn plugin_configuration(&self, name: &str) -> Result<PluginConfiguration, ApiError> {
        self.get_json(self.service.plugin_url(name)).await
    }

    pub async fn save_plugin_configuration(
        &self,
        config: &PluginConfiguration,
    ) -> Result<(), ApiError> {
        self.post_json(self.service.plugin_url(&config.name), &config.to_values())
            .await
    }

    pub async fn play_web_radio(&self, command: &WebRadioCommand) -> Result<(), ApiError> {
        self.post_json(self.service.webradio_url(), command).await
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        debug!("GET {}", url);
        let resp = self
            .http
            .get(&url)
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
        resp.json::<T>()
            .await
            .map_err(|source| ApiError::Decode { url, source })
    }

    async fn post_json<B: Serialize + ?Sized>(&self, url: String, body: &B) -> Result<(), ApiError> {
        debug!("POST {}", url);
        let resp = self
            .http
            .post(&url)
            .json(body)
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
        Ok(())
    }
}
