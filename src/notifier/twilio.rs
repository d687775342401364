//! Twilio REST API notifier.
//!
//! Messages are created with a form-encoded `POST` to
//! `/2010-04-01/Accounts/{sid}/Messages.json`, authenticated with the
//! account SID and auth token as HTTP basic credentials.

use reqwest::redirect;
use tracing::debug;

use super::{DeliveryReceipt, Notifier};
use crate::error::NotifierError;

/// Production API root.
pub const DEFAULT_API_BASE: &str = "https://api.twilio.com";

/// Largest error body kept for diagnostics.
const MAX_ERROR_BODY: usize = 512;

/// Credentials and endpoint for the Twilio API.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Account SID (`AC...`).
    pub account_sid: String,
    /// Account auth token.
    pub auth_token: String,
    /// API root, overridable for testing.
    pub api_base: String,
}

impl TwilioConfig {
    /// Config pointing at the production API.
    #[must_use]
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base.trim_end_matches('/'),
            self.account_sid
        )
    }
}

/// Sends SMS through Twilio.
pub struct TwilioNotifier {
    client: reqwest::Client,
    config: TwilioConfig,
}

impl std::fmt::Debug for TwilioNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioNotifier")
            .field("account_sid", &self.config.account_sid)
            .field("api_base", &self.config.api_base)
            .finish_non_exhaustive()
    }
}

impl TwilioNotifier {
    /// Builds a notifier with its own HTTP client.
    ///
    /// Redirects are not followed.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::Network`] if the HTTP client cannot be built.
    pub fn new(config: TwilioConfig) -> Result<Self, NotifierError> {
        let client = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| NotifierError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait::async_trait]
impl Notifier for TwilioNotifier {
    async fn send(
        &self,
        to: &str,
        from: &str,
        body: &str,
    ) -> Result<DeliveryReceipt, NotifierError> {
        let url = self.config.messages_url();
        debug!(%to, %from, "sending SMS via Twilio");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[("To", to), ("From", from), ("Body", body)])
            .send()
            .await
            .map_err(|e| NotifierError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut text = response.text().await.unwrap_or_default();
            if text.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !text.is_char_boundary(cut) {
                    cut -= 1;
                }
                text.truncate(cut);
            }
            return Err(NotifierError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        response
            .json::<DeliveryReceipt>()
            .await
            .map_err(|e| NotifierError::InvalidResponse(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "twilio"
    }
}
