use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "wa_transcriber")]
#[command(about = "WhatsApp voice-note transcription service", long_about = None)]
pub struct Config {
	/// Address the webhook server binds to
	#[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8000")]
	pub listen_addr: String,

	/// Shared secret for the webhook verification handshake
	#[arg(long, env = "VERIFICATION_TOKEN")]
	pub verify_token: String,

	/// Bearer token for the Graph API
	#[arg(long, env = "ACCESS_TOKEN")]
	pub access_token: String,

	/// Business phone number id used as the outbound message sender
	#[arg(long, env = "PHONE_NUMBER_ID")]
	pub phone_number_id: String,

	/// Graph API base url
	#[arg(long, env = "GRAPH_API_URL", default_value = "https://graph.facebook.com/v19.0")]
	pub graph_api_url: String,

	/// Transcription engine base url
	#[arg(long, env = "ENGINE_URL", default_value = "http://127.0.0.1:9000")]
	pub engine_url: String,

	/// Comma list of canonical sender numbers permitted to use the service
	#[arg(long, env = "ALLOWED_NUMBERS", value_delimiter = ',')]
	pub allowed_numbers: Vec<String>,

	/// Timeout for individual Graph API requests, in seconds
	#[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
	pub request_timeout_secs: u64,

	#[command(flatten)]
	pub dispatch: dispatch::Config,
}

impl Config {
	/// Validate configuration values
	pub fn validate(&self) -> Result<(), String> {
		if self.verify_token.is_empty() {
			return Err("verify_token must not be empty".to_string());
		}

		if self.access_token.is_empty() {
			return Err("access_token must not be empty".to_string());
		}

		if self.allowed_numbers.is_empty() {
			return Err("allowed_numbers must contain at least one number".to_string());
		}

		if self.request_timeout_secs == 0 {
			return Err("request_timeout_secs must be greater than 0".to_string());
		}

		self.dispatch.validate().map_err(|e| e.to_string())
	}
}
