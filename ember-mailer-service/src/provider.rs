use serde_json::json;
use tracing::error;

use crate::error::RelayError;

/// Authenticated client for the outbound mail provider.
///
/// The provider speaks the Resend wire shape: `POST {endpoint}/emails` with a
/// bearer key and a `{from, to, subject, html}` body.
#[derive(Clone)]
pub struct MailProvider {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    sender: String,
}

impl MailProvider {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        sender: impl Into<String>,
    ) -> Self {
        MailProvider {
            http: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            sender: sender.into(),
        }
    }

    /// Reads `MAIL_API_KEY` and `MAIL_FROM`, plus `MAIL_API_ENDPOINT` with
    /// the hosted provider as the default.
    pub fn from_env() -> Self {
        let endpoint = std::env::var("MAIL_API_ENDPOINT")
            .unwrap_or_else(|_| "https://api.resend.com".to_string());
        let api_key = std::env::var("MAIL_API_KEY").expect("MAIL_API_KEY must be set");
        let sender = std::env::var("MAIL_FROM").expect("MAIL_FROM must be set");
        MailProvider::new(endpoint, api_key, sender)
    }

    /// Sends one message. A non-success answer is logged with its raw body
    /// and surfaced as [`RelayError::Provider`].
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), RelayError> {
        let response = self
            .http
            .post(format!("{}/emails", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.sender,
                "to": to,
                "subject": subject,
                "html": html,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            error!(status = %status, body = %body, "mail provider rejected the message");
            return Err(RelayError::Provider { status, body });
        }
        Ok(())
    }
}
