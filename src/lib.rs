// Finexus - client for the Finexus lending and investment marketplace

pub mod cli;
pub mod config;
pub mod http;
pub mod models;
pub mod navigation;
pub mod services;
pub mod session;
pub mod types;
pub mod utils;
pub mod views;

// Re-exports for convenience
pub use config::Config;
pub use http::ApiClient;
pub use services::Api;
pub use session::{SessionManager, SessionStore};
pub use types::{AppError, AppResult};
