//! Command implementations.

pub mod learn;
pub mod login;
pub mod logout;
pub mod manage;
pub mod orders;
pub mod plans;
pub mod subscribe;
pub mod whoami;

use anyhow::{Context, Result, bail};

use cuppa_api::ApiClient;

use crate::config::Config;

/// Build a client from the stored config.
pub(crate) fn client(config: &Config) -> Result<ApiClient> {
    Ok(ApiClient::new(config.api_url()?, config.credentials()))
}

/// Build a client, failing early when no session is stored.
pub(crate) fn authenticated_client(config: &Config) -> Result<ApiClient> {
    if config.access_token.is_empty() {
        bail!("Not logged in; run `cuppa login` first");
    }
    client(config)
}

/// Persist tokens the pipeline may have rotated during a command.
pub(crate) fn persist_session(config: &mut Config, client: &ApiClient) -> Result<()> {
    config.set_credentials(&client.credentials());
    config.save().context("Failed to save config")
}
