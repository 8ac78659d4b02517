//! Logout command implementation.

use anyhow::Result;

use crate::config::Config;
use crate::output;

pub async fn run() -> Result<()> {
    let mut config = Config::load()?;

    let mut credentials = config.credentials();
    if !credentials.is_authenticated() {
        output::warn("Not logged in");
        return Ok(());
    }

    credentials.clear();
    config.set_credentials(&credentials);
    config.save()?;

    output::success("Logged out");
    Ok(())
}
