pub mod config;
pub mod observability;
pub mod phone;
pub mod routes;
pub mod state;
pub mod transcribe;
pub mod whatsapp;

pub use config::Config;
pub use state::AppState;
