//! Subscribe command: configure an order, check out, wait for payment.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use tracing::debug;

use cuppa_api::ApiClient;
use cuppa_api::orders::{CreateOrderRequest, OrderLineItem};

use crate::commands;
use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct SubscribeArgs {
    /// Subscription tier to purchase
    #[arg(long)]
    pub tier: String,

    /// Monthly quantity in whole kilograms
    #[arg(long)]
    pub quantity: u32,

    /// Grind type (whole_bean, filter, espresso, french_press)
    #[arg(long, default_value = "whole_bean")]
    pub grind: String,

    /// Brewing method (v60, espresso, french_press, aeropress, moka)
    #[arg(long, default_value = "v60")]
    pub brew: String,

    /// Free-text note for the roaster
    #[arg(long)]
    pub notes: Option<String>,

    /// Print the checkout URL instead of opening a browser
    #[arg(long)]
    pub no_browser: bool,
}

pub async fn run(args: SubscribeArgs) -> Result<()> {
    let mut config = Config::load()?;

    if args.quantity < config.min_quantity_kg || args.quantity > config.max_quantity_kg {
        bail!(
            "Quantity must be between {} and {} kg",
            config.min_quantity_kg,
            config.max_quantity_kg
        );
    }

    let client = commands::authenticated_client(&config)?;

    let plan = client
        .subscription_pricing(&args.tier)
        .await
        .context("Failed to fetch plan pricing")?;

    output::heading(&format!("{} ({})", plan.name, plan.tier));
    output::field("Quantity", &format!("{} kg / month", args.quantity));
    output::field("Grind", grind_description(&args.grind));
    output::field("Brew", brewing_method_display(&args.brew));
    output::field(
        "Price",
        &format!(
            "{:.2} {} / month",
            plan.price_per_kg() * f64::from(args.quantity),
            plan.currency
        ),
    );
    println!();

    let request = CreateOrderRequest {
        tier: Some(args.tier.clone()),
        product_id: None,
        total_quantity_kg: args.quantity,
        line_items: vec![OrderLineItem {
            quantity_kg: args.quantity,
            grind_type: args.grind.clone(),
            brewing_method: args.brew.clone(),
            notes: args.notes.clone(),
        }],
    };

    let order = client
        .create_order(&request)
        .await
        .context("Failed to configure order")?;
    debug!(order_id = %order.id, "order configured");

    let checkout = client
        .create_checkout_session(&order.id)
        .await
        .context("Failed to create checkout session")?;
    commands::persist_session(&mut config, &client)?;

    if args.no_browser {
        output::field("Checkout", &checkout.checkout_url);
    } else if webbrowser::open(&checkout.checkout_url).is_err() {
        output::warn("Could not open a browser; complete checkout manually:");
        output::field("Checkout", &checkout.checkout_url);
    }

    eprintln!("{}", "Waiting for payment...".dimmed());

    let paid = wait_for_payment(
        &client,
        &order.id,
        Duration::from_secs(config.poll_interval_secs),
        Duration::from_secs(config.payment_timeout_secs),
    )
    .await;
    commands::persist_session(&mut config, &client)?;

    if paid {
        output::success("Payment confirmed; your subscription is active");
        output::field("Order", &order.id);
    } else {
        output::warn("Timed out waiting for payment");
        output::field("Order", &order.id);
        output::field("Check later with", &format!("cuppa orders get --id {}", order.id));
    }

    Ok(())
}

/// Poll the order status until it is paid and an active subscription shows
/// up, or the timeout elapses. One API round-trip per tick; a failed tick
/// is logged and retried on the next one, so a transient network blip
/// during the payment window doesn't abort the wait.
async fn wait_for_payment(
    client: &ApiClient,
    order_id: &str,
    interval: Duration,
    timeout: Duration,
) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if tokio::time::Instant::now() >= deadline {
            return false;
        }

        let order = match client.get_order(order_id).await {
            Ok(order) => order,
            Err(err) => {
                debug!(error = %err, order_id, "order poll failed, retrying next tick");
                continue;
            }
        };
        debug!(order_id, status = %order.status, "polled order");

        if order.is_paid() {
            match client.list_subscriptions().await {
                Ok(subscriptions) if subscriptions.iter().any(|s| s.is_active()) => {
                    return true;
                }
                Ok(_) => {}
                Err(err) => {
                    debug!(error = %err, "subscription poll failed, retrying next tick");
                }
            }
        }
    }
}

fn grind_description(grind: &str) -> &str {
    match grind {
        "whole_bean" => "Whole bean",
        "filter" => "Ground for filter",
        "espresso" => "Ground for espresso",
        "french_press" => "Coarse ground",
        other => other,
    }
}

fn brewing_method_display(brew: &str) -> &str {
    match brew {
        "v60" => "V60 pour-over",
        "espresso" => "Espresso",
        "french_press" => "French press",
        "aeropress" => "AeroPress",
        "moka" => "Moka pot",
        other => other,
    }
}
