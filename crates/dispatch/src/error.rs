use thiserror::Error;

/// Fetching raw media bytes from the upstream API failed.
#[derive(Error, Debug)]
pub enum MediaError {
	#[error("media endpoint returned status {0}")]
	Http(u16),
	#[error("network error while fetching media: {0}")]
	Network(String),
	#[error("media request rejected: bad or expired credentials")]
	Auth,
	#[error("media metadata did not contain a download url")]
	MissingUrl,
}

/// Transcription of already-downloaded audio failed.
#[derive(Error, Debug)]
pub enum ProcessingError {
	#[error("transcription engine error: {0}")]
	Engine(String),
	#[error("transcription endpoint returned status {0}")]
	Http(u16),
	#[error("network error while transcribing: {0}")]
	Network(String),
	#[error("transcription timed out")]
	Timeout,
}

/// Delivering the reply text to its destination failed.
#[derive(Error, Debug)]
pub enum DeliveryError {
	#[error("message endpoint returned status {0}")]
	Http(u16),
	#[error("network error while sending message: {0}")]
	Network(String),
}

/// Any failure produced while a worker executes a single task.
///
/// These terminate one task, never the worker: the worker loop logs the
/// failure, releases its slot, and moves on to the next task.
#[derive(Error, Debug)]
pub enum TaskFailure {
	#[error(transparent)]
	Media(#[from] MediaError),
	#[error(transparent)]
	Processing(#[from] ProcessingError),
	#[error(transparent)]
	Delivery(#[from] DeliveryError),
}

/// Infrastructure errors from the dispatch machinery itself.
#[derive(Error, Debug)]
pub enum DispatchError {
	#[error("invalid resource spec: {0}")]
	InvalidResourceSpec(String),
	#[error("prometheus error: {0}")]
	Prometheus(#[from] prometheus::Error),
}
