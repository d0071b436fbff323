use crate::config::Config;
use async_trait::async_trait;
use dispatch::{DeliveryError, MediaError, MediaFetcher, Notifier};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::error;

/// Thin client for the WhatsApp Graph API: resolves and downloads media,
/// and delivers outbound text messages.
pub struct WhatsAppClient {
	http: reqwest::Client,
	graph_api_url: String,
	access_token: String,
	phone_number_id: String,
}

#[derive(Deserialize)]
struct MediaMetadata {
	url: Option<String>,
}

impl WhatsAppClient {
	pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
		let http = reqwest::Client::builder().timeout(Duration::from_secs(config.request_timeout_secs)).build()?;
		Ok(Self {
			http,
			graph_api_url: config.graph_api_url.trim_end_matches('/').to_owned(),
			access_token: config.access_token.clone(),
			phone_number_id: config.phone_number_id.clone(),
		})
	}

	async fn media_url(&self, media_id: &str) -> Result<String, MediaError> {
		let response = self
			.http
			.get(format!("{}/{media_id}", self.graph_api_url))
			.bearer_auth(&self.access_token)
			.send()
			.await
			.map_err(|e| MediaError::Network(e.to_string()))?;

		let status = response.status();
		if status.as_u16() == 401 || status.as_u16() == 403 {
			return Err(MediaError::Auth);
		}
		if !status.is_success() {
			return Err(MediaError::Http(status.as_u16()));
		}

		let metadata: MediaMetadata = response.json().await.map_err(|e| MediaError::Network(e.to_string()))?;
		metadata.url.ok_or(MediaError::MissingUrl)
	}
}

#[async_trait]
impl MediaFetcher for WhatsAppClient {
	async fn fetch(&self, media_id: &str) -> Result<Vec<u8>, MediaError> {
		let url = self.media_url(media_id).await?;

		let response = self
			.http
			.get(url)
			.bearer_auth(&self.access_token)
			.send()
			.await
			.map_err(|e| MediaError::Network(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			error!(media_id, status = status.as_u16(), "media download failed");
			return Err(MediaError::Http(status.as_u16()));
		}

		let bytes = response.bytes().await.map_err(|e| MediaError::Network(e.to_string()))?;
		Ok(bytes.to_vec())
	}
}

#[async_trait]
impl Notifier for WhatsAppClient {
	async fn notify(&self, to: &str, body: &str) -> Result<(), DeliveryError> {
		let payload = json!({
			"messaging_product": "whatsapp",
			"to": to,
			"type": "text",
			"text": { "body": body },
		});

		let response = self
			.http
			.post(format!("{}/{}/messages", self.graph_api_url, self.phone_number_id))
			.bearer_auth(&self.access_token)
			.json(&payload)
			.send()
			.await
			.map_err(|e| DeliveryError::Network(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			return Err(DeliveryError::Http(status.as_u16()));
		}
		Ok(())
	}
}
