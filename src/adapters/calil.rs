use crate::ports::availability_provider::{
    AvailabilityProvider as AvailabilityProviderTrait, CheckResponse, Result,
};
use async_trait::async_trait;

/// Calil library-availability API client
///
/// `GET {base}/check` starts a lookup and returns a session; the same endpoint
/// is polled with the session until `continue` drops to 0. `callback=no`
/// makes the API answer with plain JSON instead of JSONP.
pub struct CalilProvider {
    client: reqwest::Client,
    base: String,
    appkey: String,
}

impl CalilProvider {
    pub fn new(client: reqwest::Client, base: &str, appkey: &str) -> Self {
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
            appkey: appkey.to_string(),
        }
    }

    fn check_url(&self) -> String {
        format!("{}/check", self.base)
    }

    /// Any non-2xx status or undecodable body is returned as an error.
    async fn request(&self, params: &[(&str, &str)]) -> Result<CheckResponse> {
        let response = self
            .client
            .get(self.check_url())
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        let body = response.json::<CheckResponse>().await?;
        tracing::debug!(
            session = body.session.as_deref().unwrap_or(""),
            continue_polling = body.continue_polling,
            "Calil check response"
        );
        Ok(body)
    }
}

#[async_trait]
impl AvailabilityProviderTrait for CalilProvider {
    async fn check(&self, isbns: &[String], systemids: &[String]) -> Result<CheckResponse> {
        let isbn = isbns.join(",");
        let systemid = systemids.join(",");
        self.request(&[
            ("appkey", self.appkey.as_str()),
            ("isbn", isbn.as_str()),
            ("systemid", systemid.as_str()),
            ("format", "json"),
            ("callback", "no"),
        ])
        .await
    }

    async fn poll(&self, session: &str) -> Result<CheckResponse> {
        self.request(&[
            ("appkey", self.appkey.as_str()),
            ("session", session),
            ("format", "json"),
            ("callback", "no"),
        ])
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_url_strips_trailing_slash() {
        let provider = CalilProvider::new(reqwest::Client::new(), "https://api.calil.jp/", "key");
        assert_eq!(provider.check_url(), "https://api.calil.jp/check");
    }

    #[test]
    fn test_check_response_decodes_provider_json() {
        let body = r#"{
            "session": "abc",
            "continue": 1,
            "books": {"9784000000000": {"Sys-1": {"status": "Running", "libkey": {}}}}
        }"#;
        let response: CheckResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.session.as_deref(), Some("abc"));
        assert!(response.should_continue());
        assert_eq!(
            response.books["9784000000000"]["Sys-1"]["status"],
            "Running"
        );
    }

    #[test]
    fn test_check_response_defaults_when_fields_missing() {
        let response: CheckResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.session, None);
        assert!(!response.should_continue());
        assert!(response.books.is_null());
    }
}
