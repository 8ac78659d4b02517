//! Subscription management commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use cuppa_api::orders::OrderLineItem;
use cuppa_api::subscriptions::{Subscription, UpdateSubscriptionRequest};

use crate::commands;
use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct ManageCommand {
    #[command(subcommand)]
    pub command: ManageSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ManageSubcommand {
    /// List your subscriptions
    List,

    /// Show a subscription with its default preferences
    Show(IdArgs),

    /// Pause an active subscription
    Pause(IdArgs),

    /// Resume a paused subscription
    Resume(IdArgs),

    /// Cancel a subscription
    Cancel(IdArgs),

    /// Update quantity and default preferences
    Update(UpdateArgs),
}

#[derive(Args, Debug)]
pub struct IdArgs {
    /// Subscription ID
    #[arg(long)]
    pub id: String,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Subscription ID
    #[arg(long)]
    pub id: String,

    /// New monthly quantity in whole kilograms
    #[arg(long)]
    pub quantity: Option<u32>,

    /// New grind type
    #[arg(long)]
    pub grind: Option<String>,

    /// New brewing method
    #[arg(long)]
    pub brew: Option<String>,
}

pub async fn handle(cmd: ManageCommand) -> Result<()> {
    match cmd.command {
        ManageSubcommand::List => list().await,
        ManageSubcommand::Show(args) => show(args).await,
        ManageSubcommand::Pause(args) => action(args, Action::Pause).await,
        ManageSubcommand::Resume(args) => action(args, Action::Resume).await,
        ManageSubcommand::Cancel(args) => action(args, Action::Cancel).await,
        ManageSubcommand::Update(args) => update(args).await,
    }
}

enum Action {
    Pause,
    Resume,
    Cancel,
}

async fn list() -> Result<()> {
    let mut config = Config::load()?;
    let client = commands::authenticated_client(&config)?;

    let subscriptions = client
        .list_subscriptions()
        .await
        .context("Failed to fetch subscriptions")?;
    commands::persist_session(&mut config, &client)?;

    if subscriptions.is_empty() {
        output::warn("No subscriptions yet; run `cuppa subscribe`");
        return Ok(());
    }

    for subscription in &subscriptions {
        print_subscription(subscription);
        println!();
    }

    Ok(())
}

async fn show(args: IdArgs) -> Result<()> {
    let mut config = Config::load()?;
    let client = commands::authenticated_client(&config)?;

    let subscription = client
        .get_subscription(&args.id)
        .await
        .context("Failed to fetch subscription")?;
    commands::persist_session(&mut config, &client)?;

    print_subscription(&subscription);
    for preference in &subscription.default_preferences {
        println!(
            "  {} kg, {} for {}",
            preference.quantity(),
            preference.grind_type,
            preference.brewing_method
        );
    }

    Ok(())
}

async fn action(args: IdArgs, action: Action) -> Result<()> {
    let mut config = Config::load()?;
    let client = commands::authenticated_client(&config)?;

    let subscription = match action {
        Action::Pause => client.pause_subscription(&args.id).await,
        Action::Resume => client.resume_subscription(&args.id).await,
        Action::Cancel => client.cancel_subscription(&args.id).await,
    }
    .context("Subscription action failed")?;
    commands::persist_session(&mut config, &client)?;

    output::success(&format!(
        "Subscription {} is now {}",
        subscription.id, subscription.status
    ));
    Ok(())
}

async fn update(args: UpdateArgs) -> Result<()> {
    let mut config = Config::load()?;
    let client = commands::authenticated_client(&config)?;

    let current = client
        .get_subscription(&args.id)
        .await
        .context("Failed to fetch subscription")?;

    let preferences = if args.grind.is_some() || args.brew.is_some() {
        let quantity = args.quantity.unwrap_or_else(|| current.total_quantity());
        Some(vec![OrderLineItem {
            quantity_kg: quantity,
            grind_type: args.grind.unwrap_or_else(|| "whole_bean".to_string()),
            brewing_method: args.brew.unwrap_or_else(|| "v60".to_string()),
            notes: None,
        }])
    } else {
        None
    };

    let request = UpdateSubscriptionRequest {
        total_quantity: args.quantity,
        preferences,
    };

    let updated = client
        .update_subscription(&args.id, &request)
        .await
        .context("Failed to update subscription")?;
    commands::persist_session(&mut config, &client)?;

    output::success("Subscription updated");
    print_subscription(&updated);
    Ok(())
}

fn print_subscription(subscription: &Subscription) {
    output::heading(&format!(
        "{} ({})",
        subscription.tier, subscription.id
    ));
    output::field("Status", &subscription.status);

    let quantity = subscription.total_quantity();
    if quantity > 0 {
        output::field("Quantity", &format!("{quantity} kg / month"));
    }
    if let Some(started) = &subscription.started_at {
        output::field("Started", started);
    }
    if let Some(expires) = &subscription.expires_at {
        output::field("Expires", expires);
    }
}
