use crate::error::{DeliveryError, MediaError, ProcessingError};
use async_trait::async_trait;

/// Retrieves raw media bytes for an opaque media identifier.
///
/// Implementations own their request timeouts so a slow upstream cannot
/// pin a worker's resource slot forever.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
	async fn fetch(&self, media_id: &str) -> Result<Vec<u8>, MediaError>;
}

/// Turns audio bytes into text on a named accelerator device.
#[async_trait]
pub trait Transcriber: Send + Sync {
	async fn transcribe(&self, audio: &[u8], device: &str) -> Result<String, ProcessingError>;
}

/// Delivers a text reply to a destination address.
#[async_trait]
pub trait Notifier: Send + Sync {
	async fn notify(&self, to: &str, body: &str) -> Result<(), DeliveryError>;
}
