//! Authentication endpoints.

use std::fmt;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use cuppa_core::Result;

use crate::client::{ApiClient, required};
use crate::envelope::Envelope;

/// Endpoint for password login.
const LOGIN: &str = "/api/core/v1/auth/login";

/// Endpoint for exchanging a refresh token.
pub(crate) const REFRESH: &str = "/api/core/v1/auth/refresh";

#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// A new token set granted by login or refresh.
///
/// Expiry fields arrive either as epoch milliseconds in a decimal string
/// or as RFC 3339, depending on the endpoint.
#[derive(Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub refresh_token_expires_at: Option<String>,
}

// Hide token values in Debug output
impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("refresh_token_expires_at", &self.refresh_token_expires_at)
            .finish()
    }
}

impl ApiClient {
    /// Authenticate with email and password, storing the granted tokens.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let request = LoginRequest { email, password };
        let response = self.execute(Method::POST, LOGIN, Some(&request), false).await?;
        let granted: Envelope<TokenGrant> = required(&response)?;
        self.apply_grant(granted.data);
        Ok(())
    }

    /// Drop the stored tokens (local logout).
    pub fn logout(&self) {
        self.clear_credentials();
    }
}
