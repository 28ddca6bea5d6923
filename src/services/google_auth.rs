use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::GoogleConfig;
use crate::error::{Error, Result};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expiry")]
    expires_in: u64,
}

fn default_expiry() -> u64 {
    3600
}

/// Exchanges the configured refresh token for short-lived access tokens, reusing one until
/// shortly before it expires.
pub struct GoogleAuth {
    client: Client,
    config: GoogleConfig,
    cached: Mutex<Option<(String, Instant)>>,
}

impl GoogleAuth {
    pub fn new(client: Client, config: GoogleConfig) -> Self {
        Self {
            client,
            config,
            cached: Mutex::new(None),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn sender_email(&self) -> &str {
        &self.config.sender_email
    }

    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some((token, expires_at)) = cached.as_ref() {
            if Instant::now() < *expires_at {
                return Ok(token.clone());
            }
        }

        let res = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", self.config.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::upstream_server(format!(
                "Google token refresh failed {}: {}",
                status, text
            )));
        }

        let body: TokenResponse = res.json().await?;
        let lifetime = Duration::from_secs(body.expires_in.saturating_sub(60).max(1));
        *cached = Some((body.access_token.clone(), Instant::now() + lifetime));
        tracing::debug!("refreshed Google access token");
        Ok(body.access_token)
    }
}
