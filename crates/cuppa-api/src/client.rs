//! Authenticated request pipeline.

use std::sync::{Arc, RwLock};

use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use cuppa_core::error::{ApiError, AuthError, DecodeError, TransportError};
use cuppa_core::{ApiUrl, CredentialState, Error, Result};

use crate::auth::{self, TokenGrant};
use crate::envelope::Envelope;
use crate::error_decode::decode_error_message;

/// HTTP client for the cuppa backend.
///
/// Owns the credential state it was constructed with. Any authenticated
/// call may rotate the stored tokens as a side effect of a transparent
/// refresh, so callers that persist credentials should re-read them via
/// [`ApiClient::credentials`] after making calls.
pub struct ApiClient {
    http: reqwest::Client,
    base: ApiUrl,
    credentials: Arc<RwLock<CredentialState>>,
    // Serializes token refreshes so concurrent 401s don't race.
    refresh_gate: tokio::sync::Mutex<()>,
}

/// A fully-read HTTP response: status plus an owned body buffer.
#[derive(Debug)]
pub struct RawResponse {
    status: u16,
    body: Vec<u8>,
}

impl RawResponse {
    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Raw response body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// True for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport)?.to_vec();
        trace!(status, bytes = body.len(), "response read");
        Ok(Self { status, body })
    }
}

impl ApiClient {
    /// Create a new client for the given base URL and credential state.
    pub fn new(base: ApiUrl, credentials: CredentialState) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cuppa/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base,
            credentials: Arc::new(RwLock::new(credentials)),
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Returns the base URL this client is configured for.
    pub fn base(&self) -> &ApiUrl {
        &self.base
    }

    /// Snapshot of the current credential state.
    pub fn credentials(&self) -> CredentialState {
        self.credentials.read().unwrap().clone()
    }

    /// True iff an access token is held.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.read().unwrap().is_authenticated()
    }

    /// True when the access token is past (or within the safety margin of)
    /// its expiry.
    pub fn is_access_token_expired(&self) -> bool {
        self.credentials.read().unwrap().is_access_token_expired()
    }

    /// True when the refresh token can no longer be exchanged.
    pub fn is_refresh_token_expired(&self) -> bool {
        self.credentials.read().unwrap().is_refresh_token_expired()
    }

    /// Execute a request with no body through the pipeline.
    pub async fn execute_empty(
        &self,
        method: Method,
        path: &str,
        require_auth: bool,
    ) -> Result<RawResponse> {
        self.execute(method, path, None::<&serde_json::Value>, require_auth)
            .await
    }

    /// Execute one request through the pipeline.
    ///
    /// For authenticated requests: an expired access token triggers a
    /// refresh before sending (failing fast with `SessionExpired` when the
    /// refresh token is gone too), and a 401 response triggers one refresh
    /// and one resend. If the refresh or the resend fails, the original 401
    /// response is returned so callers see a single, consistent
    /// authorization-failure path.
    #[instrument(skip(self, body), fields(base = %self.base))]
    pub async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        require_auth: bool,
    ) -> Result<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        // Serialize once into an owned buffer; the 401 retry resends it.
        let payload = match body {
            Some(value) => Some(serde_json::to_vec(value).map_err(|e| DecodeError::Json {
                message: format!("request body: {e}"),
            })?),
            None => None,
        };

        if require_auth && self.is_authenticated() && self.is_access_token_expired() {
            if self.is_refresh_token_expired() {
                return Err(AuthError::SessionExpired.into());
            }
            let stale = self.access_token_snapshot();
            self.refresh_access_token(&stale).await?;
        }

        let url = self.base.endpoint(path);
        debug!(%method, %url, require_auth, "sending request");

        let token = if require_auth {
            Some(self.access_token_snapshot())
        } else {
            None
        };
        let response = self
            .send(&method, &url, payload.as_deref(), token.as_deref())
            .await?;

        if require_auth && response.status().as_u16() == 401 && !self.is_refresh_token_expired() {
            let original = RawResponse::read(response).await?;
            let stale = token.unwrap_or_default();

            if let Err(err) = self.refresh_access_token(&stale).await {
                debug!(error = %err, "refresh after 401 failed, returning original response");
                return Ok(original);
            }

            let fresh = self.access_token_snapshot();
            return match self
                .send(&method, &url, payload.as_deref(), Some(&fresh))
                .await
            {
                Ok(retry) => match RawResponse::read(retry).await {
                    Ok(retried) => Ok(retried),
                    Err(err) => {
                        debug!(error = %err, "retry read failed, returning original response");
                        Ok(original)
                    }
                },
                Err(err) => {
                    debug!(error = %err, "retry after refresh failed, returning original response");
                    Ok(original)
                }
            };
        }

        RawResponse::read(response).await
    }

    async fn send(
        &self,
        method: &Method,
        url: &str,
        payload: Option<&[u8]>,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut request = self
            .http
            .request(method.clone(), url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        if let Some(token) = bearer.filter(|t| !t.is_empty()) {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(bytes) = payload {
            request = request.body(bytes.to_vec());
        }

        request.send().await.map_err(transport)
    }

    /// Exchange the refresh token for a new token set.
    ///
    /// Serialized behind an async mutex: when a concurrent call already
    /// rotated the token (the stored access token no longer matches
    /// `stale_access_token`), the exchange is skipped. On any network
    /// failure or non-2xx response the credential state is left unchanged.
    #[instrument(skip_all, fields(base = %self.base))]
    pub(crate) async fn refresh_access_token(&self, stale_access_token: &str) -> Result<()> {
        let _gate = self.refresh_gate.lock().await;

        let (current, refresh_token) = {
            let creds = self.credentials.read().unwrap();
            (
                creds.access_token().to_string(),
                creds.refresh_token().to_string(),
            )
        };
        if current != stale_access_token {
            debug!("token already rotated by a concurrent refresh");
            return Ok(());
        }

        match self.exchange_refresh_token(&refresh_token).await {
            Ok(grant) => {
                self.apply_grant(grant);
                debug!("access token refreshed");
                Ok(())
            }
            Err(err) => Err(AuthError::RefreshFailed {
                source: Box::new(err),
            }
            .into()),
        }
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenGrant> {
        let url = self.base.endpoint(auth::REFRESH);
        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&auth::RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(transport)?;

        let raw = RawResponse::read(response).await?;
        let granted: Envelope<TokenGrant> = required(&raw)?;
        Ok(granted.data)
    }

    pub(crate) fn apply_grant(&self, grant: TokenGrant) {
        let mut creds = self.credentials.write().unwrap();
        creds.apply_refresh(
            grant.access_token,
            grant.refresh_token,
            grant.expires_at,
            grant.refresh_token_expires_at,
        );
    }

    pub(crate) fn clear_credentials(&self) {
        self.credentials.write().unwrap().clear();
    }

    fn access_token_snapshot(&self) -> String {
        self.credentials.read().unwrap().access_token().to_string()
    }
}

/// Decode a pipeline response into a typed value.
///
/// Non-2xx statuses become [`ApiError`]s with a message extracted by the
/// error decoder. A 2xx with an empty body (204 No Content) yields `None`;
/// a 2xx body that doesn't match `T` is a [`DecodeError`].
pub fn decode<T: DeserializeOwned>(response: &RawResponse) -> Result<Option<T>> {
    if !response.is_success() {
        let message = decode_error_message(response.status(), response.body());
        return Err(ApiError::new(response.status(), message).into());
    }

    if response.body().is_empty() {
        return Ok(None);
    }

    serde_json::from_slice(response.body())
        .map(Some)
        .map_err(|e| {
            DecodeError::Json {
                message: e.to_string(),
            }
            .into()
        })
}

/// Decode a response whose payload is required.
pub fn required<T: DeserializeOwned>(response: &RawResponse) -> Result<T> {
    decode(response)?.ok_or_else(|| DecodeError::EmptyBody.into())
}

/// Check a response for success, discarding any body (204-style endpoints).
pub fn accept(response: &RawResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    let message = decode_error_message(response.status(), response.body());
    Err(ApiError::new(response.status(), message).into())
}

fn transport(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}
