use crate::config::Config;
use async_trait::async_trait;
use dispatch::{ProcessingError, Transcriber};
use serde::Deserialize;
use std::time::Duration;

/// Client for the transcription engine service.
///
/// One engine process fronts all accelerators; the bound resource's name is
/// passed as the `device` hint so the engine runs the model on the device
/// whose slot the worker is holding.
pub struct EngineClient {
	http: reqwest::Client,
	engine_url: String,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
	text: String,
}

impl EngineClient {
	pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
		// Transcription is the slow leg; the worker's task timeout is the
		// real bound, this one just catches dead engines
		let http = reqwest::Client::builder().timeout(Duration::from_secs(config.dispatch.task_timeout.as_secs())).build()?;
		Ok(Self {
			http,
			engine_url: config.engine_url.trim_end_matches('/').to_owned(),
		})
	}
}

#[async_trait]
impl Transcriber for EngineClient {
	async fn transcribe(&self, audio: &[u8], device: &str) -> Result<String, ProcessingError> {
		let response = self
			.http
			.post(format!("{}/transcribe", self.engine_url))
			.query(&[("device", device)])
			.header("content-type", "application/octet-stream")
			.body(audio.to_vec())
			.send()
			.await
			.map_err(|e| if e.is_timeout() { ProcessingError::Timeout } else { ProcessingError::Network(e.to_string()) })?;

		let status = response.status();
		if !status.is_success() {
			return Err(ProcessingError::Http(status.as_u16()));
		}

		let transcription: TranscriptionResponse = response.json().await.map_err(|e| ProcessingError::Engine(e.to_string()))?;
		Ok(transcription.text)
	}
}
