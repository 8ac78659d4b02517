//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::commands;
use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn run(args: LoginArgs) -> Result<()> {
    let mut config = Config::load()?;
    let client = commands::client(&config)?;

    eprintln!("{}", "Logging in...".dimmed());

    client
        .login(&args.email, &args.password)
        .await
        .context("Failed to log in")?;

    commands::persist_session(&mut config, &client)?;

    output::success("Logged in successfully");
    println!();
    output::field("Email", &args.email);
    output::field("API", &client.base().to_string());

    Ok(())
}
