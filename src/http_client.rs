use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::config::AppConfig;
use crate::error::ApiError;

const USER_AGENT: &str = concat!("ttrank_terminal/", env!("CARGO_PKG_VERSION"));

static CLIENT: OnceCell<Client> = OnceCell::new();
static UPLOAD_CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared client for the short ranking calls.
pub fn http_client(config: &AppConfig) -> Result<&'static Client, ApiError> {
    CLIENT.get_or_try_init(|| build_http_client(config.request_timeout))
}

/// Shared client for video uploads, which wait on model inference.
pub fn upload_client(config: &AppConfig) -> Result<&'static Client, ApiError> {
    UPLOAD_CLIENT.get_or_try_init(|| build_http_client(config.analysis_timeout))
}

pub fn build_http_client(timeout: Duration) -> Result<Client, ApiError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|err| ApiError::Config(format!("failed to build http client: {err}")))
}
