//! Whoami command implementation.

use anyhow::Result;
use chrono::SecondsFormat;

use cuppa_core::timestamp::parse_timestamp;

use crate::config::Config;
use crate::output;

pub async fn run() -> Result<()> {
    let config = Config::load()?;
    let credentials = config.credentials();

    if !credentials.is_authenticated() {
        output::warn("Not logged in");
        return Ok(());
    }

    output::field("API", &config.api_url()?.to_string());
    output::field(
        "Access token",
        if credentials.is_access_token_expired() {
            "expired"
        } else {
            "valid"
        },
    );
    output::field(
        "Refresh token",
        if credentials.is_refresh_token_expired() {
            "expired"
        } else {
            "valid"
        },
    );

    if let Some(expiry) = credentials.access_token_expires_at() {
        output::field("Access expires", &display_expiry(expiry));
    }
    if let Some(expiry) = credentials.refresh_token_expires_at() {
        output::field("Refresh expires", &display_expiry(expiry));
    }

    if credentials.is_refresh_token_expired() {
        output::warn("Session expired; run `cuppa login` again");
    }

    Ok(())
}

/// Normalize a stored expiry (epoch millis or RFC 3339) for display; an
/// unparsable value is shown as-is.
fn display_expiry(raw: &str) -> String {
    match parse_timestamp(raw) {
        Ok(ts) => ts.to_rfc3339_opts(SecondsFormat::Secs, true),
        Err(_) => raw.to_string(),
    }
}
