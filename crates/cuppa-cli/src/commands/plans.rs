//! Plans command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::commands;
use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct PlansArgs {
    /// Show one-time products instead of subscription tiers
    #[arg(long)]
    pub products: bool,
}

pub async fn run(args: PlansArgs) -> Result<()> {
    let config = Config::load()?;
    let client = commands::client(&config)?;

    let plans = if args.products {
        client
            .available_products()
            .await
            .context("Failed to fetch products")?
    } else {
        client
            .available_subscriptions()
            .await
            .context("Failed to fetch plans")?
    };

    if plans.is_empty() {
        output::warn("No plans available");
        return Ok(());
    }

    for plan in &plans {
        output::heading(&format!("{} ({})", plan.name, plan.tier));

        let price = if plan.billing_period.is_empty() {
            format!("{} {}", plan.price, plan.currency)
        } else {
            format!("{} {} / {}", plan.price, plan.currency, plan.billing_period)
        };
        output::field("Price", &price);

        if !plan.summary.is_empty() {
            output::field("Summary", &plan.summary);
        }
        for feature in &plan.features {
            println!("  - {feature}");
        }
        println!();
    }

    Ok(())
}
