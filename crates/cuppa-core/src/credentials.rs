//! Credential state for the authenticated request pipeline.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::timestamp::parse_timestamp;

/// Default safety margin in seconds: the access token is treated as expired
/// this long before its stated expiry, guarding against clock skew and
/// in-flight request latency.
pub const DEFAULT_SAFETY_MARGIN_SECS: i64 = 30;

/// Access and refresh tokens together with their expiry timestamps.
///
/// An empty access token means "not authenticated". The state is an owned
/// value injected into the client at construction, so independent sessions
/// can coexist in one process. It is mutated only by [`apply_refresh`]
/// (token refresh and login) — which means any authenticated call through
/// the pipeline may silently rotate the tokens held here.
///
/// [`apply_refresh`]: CredentialState::apply_refresh
#[derive(Clone)]
pub struct CredentialState {
    access_token: String,
    refresh_token: String,
    access_token_expires_at: Option<String>,
    refresh_token_expires_at: Option<String>,
    safety_margin_secs: i64,
}

impl Default for CredentialState {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            refresh_token: String::new(),
            access_token_expires_at: None,
            refresh_token_expires_at: None,
            safety_margin_secs: DEFAULT_SAFETY_MARGIN_SECS,
        }
    }
}

impl CredentialState {
    /// Create an empty, unauthenticated state with the default safety margin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore state from persisted token fields.
    pub fn from_parts(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        access_token_expires_at: Option<String>,
        refresh_token_expires_at: Option<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            access_token_expires_at,
            refresh_token_expires_at,
            safety_margin_secs: DEFAULT_SAFETY_MARGIN_SECS,
        }
    }

    /// Override the expiry safety margin. The margin is tuned to the
    /// backend's token lifetime, so it is configuration rather than a
    /// constant.
    pub fn with_safety_margin_secs(mut self, secs: i64) -> Self {
        self.safety_margin_secs = secs;
        self
    }

    /// Returns the access token. Empty when not authenticated.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the refresh token.
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Returns the raw access token expiry, if any.
    pub fn access_token_expires_at(&self) -> Option<&str> {
        self.access_token_expires_at.as_deref()
    }

    /// Returns the raw refresh token expiry, if any.
    pub fn refresh_token_expires_at(&self) -> Option<&str> {
        self.refresh_token_expires_at.as_deref()
    }

    /// True iff the access token is non-empty.
    pub fn is_authenticated(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// True when the access token should no longer be sent.
    ///
    /// A token without a recorded expiry never expires by this check. An
    /// unparsable expiry is treated as already expired (fail-safe).
    pub fn is_access_token_expired(&self) -> bool {
        self.access_token_expired_at(Utc::now())
    }

    /// True when the refresh token can no longer be exchanged.
    ///
    /// No safety margin here: the refresh token either works or doesn't
    /// when actually used.
    pub fn is_refresh_token_expired(&self) -> bool {
        self.refresh_token_expired_at(Utc::now())
    }

    /// Atomically replace all four credential fields.
    pub fn apply_refresh(
        &mut self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        access_token_expires_at: Option<String>,
        refresh_token_expires_at: Option<String>,
    ) {
        self.access_token = access_token.into();
        self.refresh_token = refresh_token.into();
        self.access_token_expires_at = access_token_expires_at;
        self.refresh_token_expires_at = refresh_token_expires_at;
    }

    /// Drop all tokens, returning to the unauthenticated state.
    pub fn clear(&mut self) {
        self.access_token.clear();
        self.refresh_token.clear();
        self.access_token_expires_at = None;
        self.refresh_token_expires_at = None;
    }

    fn access_token_expired_at(&self, now: DateTime<Utc>) -> bool {
        let Some(raw) = self.access_token_expires_at.as_deref() else {
            return false;
        };

        match parse_timestamp(raw) {
            Ok(expires_at) => now + Duration::seconds(self.safety_margin_secs) >= expires_at,
            Err(_) => true,
        }
    }

    fn refresh_token_expired_at(&self, now: DateTime<Utc>) -> bool {
        let Some(raw) = self.refresh_token_expires_at.as_deref() else {
            return false;
        };

        match parse_timestamp(raw) {
            Ok(expires_at) => now >= expires_at,
            Err(_) => true,
        }
    }
}

// Hide token values in Debug output
impl fmt::Debug for CredentialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialState")
            .field("authenticated", &self.is_authenticated())
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("access_token_expires_at", &self.access_token_expires_at)
            .field("refresh_token_expires_at", &self.refresh_token_expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_access_expiry(expiry: &str) -> CredentialState {
        CredentialState::from_parts("access", "refresh", Some(expiry.to_string()), None)
    }

    #[test]
    fn empty_state_is_unauthenticated() {
        let creds = CredentialState::new();
        assert!(!creds.is_authenticated());
        assert!(!creds.is_access_token_expired());
        assert!(!creds.is_refresh_token_expired());
    }

    #[test]
    fn non_empty_access_token_is_authenticated() {
        let creds = CredentialState::from_parts("token", "", None, None);
        assert!(creds.is_authenticated());
    }

    #[test]
    fn no_expiry_never_expires() {
        let creds = CredentialState::from_parts("access", "refresh", None, None);
        assert!(!creds.access_token_expired_at(Utc::now()));
        assert!(!creds.refresh_token_expired_at(Utc::now()));
    }

    #[test]
    fn expiry_inside_safety_margin_is_expired() {
        let now = Utc::now();
        let expiry = (now + Duration::seconds(29)).to_rfc3339();
        let creds = with_access_expiry(&expiry);
        assert!(creds.access_token_expired_at(now));
    }

    #[test]
    fn expiry_outside_safety_margin_is_live() {
        let now = Utc::now();
        let expiry = (now + Duration::seconds(31)).to_rfc3339();
        let creds = with_access_expiry(&expiry);
        assert!(!creds.access_token_expired_at(now));
    }

    #[test]
    fn custom_safety_margin_is_honored() {
        let now = Utc::now();
        let expiry = (now + Duration::seconds(31)).to_rfc3339();
        let creds = with_access_expiry(&expiry).with_safety_margin_secs(60);
        assert!(creds.access_token_expired_at(now));
    }

    #[test]
    fn unparsable_expiry_is_expired() {
        let creds = with_access_expiry("not-a-date");
        assert!(creds.access_token_expired_at(Utc::now()));
    }

    #[test]
    fn epoch_milliseconds_expiry_is_parsed() {
        let now = Utc::now();
        let expiry = ((now + Duration::seconds(120)).timestamp_millis()).to_string();
        let creds = with_access_expiry(&expiry);
        assert!(!creds.access_token_expired_at(now));
    }

    #[test]
    fn refresh_expiry_has_no_margin() {
        let now = Utc::now();
        let expiry = (now + Duration::seconds(5)).to_rfc3339();
        let creds =
            CredentialState::from_parts("access", "refresh", None, Some(expiry));
        // Inside the 30s access margin, but the refresh check has none.
        assert!(!creds.refresh_token_expired_at(now));
    }

    #[test]
    fn elapsed_refresh_expiry_is_expired() {
        let now = Utc::now();
        let expiry = (now - Duration::seconds(1)).to_rfc3339();
        let creds =
            CredentialState::from_parts("access", "refresh", None, Some(expiry));
        assert!(creds.refresh_token_expired_at(now));
    }

    #[test]
    fn unparsable_refresh_expiry_is_expired() {
        let creds = CredentialState::from_parts(
            "access",
            "refresh",
            None,
            Some("later".to_string()),
        );
        assert!(creds.refresh_token_expired_at(Utc::now()));
    }

    #[test]
    fn apply_refresh_replaces_all_fields() {
        let mut creds = CredentialState::from_parts(
            "old-access",
            "old-refresh",
            Some("100".to_string()),
            Some("200".to_string()),
        );
        creds.apply_refresh(
            "new-access",
            "new-refresh",
            Some("300".to_string()),
            None,
        );
        assert_eq!(creds.access_token(), "new-access");
        assert_eq!(creds.refresh_token(), "new-refresh");
        assert_eq!(creds.access_token_expires_at(), Some("300"));
        assert_eq!(creds.refresh_token_expires_at(), None);
    }

    #[test]
    fn clear_returns_to_unauthenticated() {
        let mut creds = CredentialState::from_parts("a", "r", None, None);
        creds.clear();
        assert!(!creds.is_authenticated());
        assert!(creds.refresh_token().is_empty());
    }

    #[test]
    fn debug_hides_token_values() {
        let creds = CredentialState::from_parts("secret-access", "secret-refresh", None, None);
        let debug = format!("{creds:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
