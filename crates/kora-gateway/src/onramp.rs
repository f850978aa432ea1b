//! Fiat on-ramp gateway
//!
//! Creates hosted checkout sessions with the upstream aggregator. The
//! user pays in local currency and the aggregator settles KOR to the
//! destination wallet. Completion callbacks are applied optimistically:
//! the session is marked complete as soon as the callback arrives, and
//! the wallet balance is re-read from chain on the next refresh.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kora_core::{KoraError, Result, WalletAddress};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Upstream aggregator settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OnrampConfig {
    /// Aggregator API base URL
    pub api_url: String,

    /// API key sent as a bearer token
    pub api_key: String,

    /// URL the user is returned to after checkout
    pub return_url: String,
}

/// A hosted checkout session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Our session identifier (also the aggregator's reference)
    pub id: Uuid,

    /// Amount the user will pay, in their display currency
    pub amount: f64,

    /// ISO currency code of the payment
    pub currency: String,

    /// Wallet that receives the purchased KOR
    pub destination: WalletAddress,

    /// Hosted checkout page to redirect the user to
    pub redirect_url: String,

    pub created_at: DateTime<Utc>,
}

/// Checkout session creation
#[async_trait]
pub trait OnrampClient: Send + Sync {
    /// Open a checkout session for `amount` of `currency`, settling to
    /// `destination`
    async fn create_session(
        &self,
        amount: f64,
        currency: &str,
        destination: WalletAddress,
    ) -> Result<CheckoutSession>;
}

/// [`OnrampClient`] backed by the aggregator's REST API
pub struct HttpOnrampClient {
    config: OnrampConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct CreateSessionRequest<'a> {
    reference: String,
    amount: f64,
    currency: &'a str,
    wallet_address: String,
    return_url: &'a str,
}

#[derive(Deserialize)]
struct CreateSessionResponse {
    redirect_url: String,
}

impl HttpOnrampClient {
    pub fn new(config: OnrampConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl OnrampClient for HttpOnrampClient {
    async fn create_session(
        &self,
        amount: f64,
        currency: &str,
        destination: WalletAddress,
    ) -> Result<CheckoutSession> {
        if !(amount > 0.0) || !amount.is_finite() {
            return Err(KoraError::InvalidInput(
                "checkout amount must be positive".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let request = CreateSessionRequest {
            reference: id.to_string(),
            amount,
            currency,
            wallet_address: destination.to_hex(),
            return_url: &self.config.return_url,
        };

        let response = self
            .client
            .post(format!("{}/v1/sessions", self.config.api_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| KoraError::Onramp(format!("session request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(KoraError::Onramp(format!(
                "aggregator returned {}: {}",
                status, body
            )));
        }

        let parsed: CreateSessionResponse = response
            .json()
            .await
            .map_err(|e| KoraError::Onramp(format!("malformed session response: {}", e)))?;

        info!(session = %id, amount, currency, "checkout session opened");
        Ok(CheckoutSession {
            id,
            amount,
            currency: currency.to_string(),
            destination,
            redirect_url: parsed.redirect_url,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubOnramp;

    #[async_trait]
    impl OnrampClient for StubOnramp {
        async fn create_session(
            &self,
            amount: f64,
            currency: &str,
            destination: WalletAddress,
        ) -> Result<CheckoutSession> {
            Ok(CheckoutSession {
                id: Uuid::new_v4(),
                amount,
                currency: currency.to_string(),
                destination,
                redirect_url: "https://pay.example.com/s/abc".to_string(),
                created_at: Utc::now(),
            })
        }
    }

    #[tokio::test]
    async fn test_session_carries_destination_wallet() {
        let wallet = WalletAddress::new([7u8; 20]);
        let session = StubOnramp
            .create_session(50_000.0, "NGN", wallet)
            .await
            .unwrap();
        assert_eq!(session.destination, wallet);
        assert!(session.redirect_url.starts_with("https://"));
    }

    #[tokio::test]
    async fn test_http_client_rejects_invalid_amount() {
        let client = HttpOnrampClient::new(OnrampConfig {
            api_url: "http://127.0.0.1:1".to_string(),
            api_key: "test".to_string(),
            return_url: "https://app.example.com/wallet".to_string(),
        });
        let result = client
            .create_session(0.0, "NGN", WalletAddress::ZERO)
            .await;
        assert!(matches!(result, Err(KoraError::InvalidInput(_))));
    }
}
