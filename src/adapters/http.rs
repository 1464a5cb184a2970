//! HTTP client shared by the outbound adapters.

use std::time::Duration;

/// User-Agent sent to external APIs
pub const USER_AGENT: &str = concat!("libremore/", env!("CARGO_PKG_VERSION"));

/// Create the asynchronous HTTP client used for every external call.
///
/// The timeout applies uniformly to each request (connect + response).
pub fn create_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}
