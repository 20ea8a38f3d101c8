//! Explicit credential/session handling.
//!
//! The session is created once at run start from the supplied credentials
//! and discarded when the run ends. There is no on-disk token cache.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::error::CatalogError;

/// Account credentials supplied by the caller. Also handed to the capture
/// process, which logs in as the same account to register itself as a
/// playback target.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// A live API session holding the bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    access_token: String,
}

impl Session {
    /// Exchanges credentials for a bearer token at the given token endpoint.
    pub async fn authenticate(
        client: &Client,
        auth_url: &str,
        credentials: &Credentials,
    ) -> Result<Self, CatalogError> {
        let params = [
            ("grant_type", "password"),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];

        let response = client
            .post(auth_url)
            .form(&params)
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CatalogError::Timeout
                } else {
                    CatalogError::AuthenticationFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::AuthenticationFailed(format!(
                "token endpoint returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(format!("token response: {}", e)))?;

        debug!(username = %credentials.username, "session established");

        Ok(Self {
            access_token: token.access_token,
        })
    }

    /// The bearer token to attach to API requests.
    pub fn bearer_token(&self) -> &str {
        &self.access_token
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}
