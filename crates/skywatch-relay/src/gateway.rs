//! Outbound messaging gateway (Twilio-compatible REST API).

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::RelayError;
use skywatch_core::{GatewayConfig, NetworkError, ReqwestErrorExt};

const GATEWAY_URL: &str = "https://api.twilio.com";
const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    message: Option<String>,
}

/// Sends WhatsApp messages through the gateway's Messages endpoint using
/// HTTP basic auth.
#[derive(Debug, Clone)]
pub struct MessageGateway {
    client: Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl MessageGateway {
    /// # Errors
    ///
    /// [`RelayError::NotConfigured`] when the credentials are missing or
    /// placeholders, [`RelayError::Network`] if the HTTP client cannot be
    /// built.
    pub fn new(config: &GatewayConfig) -> Result<Self, RelayError> {
        Self::new_with_base_url(config, GATEWAY_URL)
    }

    /// Point the gateway at an alternate endpoint. Tests use this with a
    /// local mock server.
    ///
    /// # Errors
    ///
    /// Same as [`MessageGateway::new`].
    pub fn new_with_base_url(config: &GatewayConfig, base_url: &str) -> Result<Self, RelayError> {
        if !config.is_configured() {
            return Err(RelayError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| RelayError::Network(e.into_network_error()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
        })
    }

    /// Deliver `body` to `phone_number` over WhatsApp. Returns the gateway's
    /// message id.
    ///
    /// # Errors
    ///
    /// [`RelayError::GatewayRejected`] when the gateway answers non-2xx,
    /// [`RelayError::Network`] on connectivity failure.
    pub async fn send(&self, phone_number: &str, body: &str) -> Result<String, RelayError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );
        let to = if phone_number.starts_with("whatsapp:") {
            phone_number.to_string()
        } else {
            format!("whatsapp:{phone_number}")
        };

        let params = [
            ("From", self.from_number.as_str()),
            ("To", to.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| RelayError::Network(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<GatewayErrorBody>()
                .await
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| format!("status {status}"));
            return Err(RelayError::GatewayRejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: MessageResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Network(NetworkError::InvalidResponse(e.to_string())))?;

        let sid = body.sid.unwrap_or_default();
        tracing::info!("Message accepted by gateway, sid {}", sid);
        Ok(sid)
    }
}
