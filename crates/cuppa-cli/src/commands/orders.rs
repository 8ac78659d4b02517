//! Order commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use cuppa_api::orders::Order;

use crate::commands;
use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct OrdersCommand {
    #[command(subcommand)]
    pub command: OrdersSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum OrdersSubcommand {
    /// Fetch an order by ID
    Get(GetArgs),
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Order ID
    #[arg(long)]
    pub id: String,
}

pub async fn handle(cmd: OrdersCommand) -> Result<()> {
    match cmd.command {
        OrdersSubcommand::Get(args) => get(args).await,
    }
}

async fn get(args: GetArgs) -> Result<()> {
    let mut config = Config::load()?;
    let client = commands::authenticated_client(&config)?;

    let order = client
        .get_order(&args.id)
        .await
        .context("Failed to fetch order")?;
    commands::persist_session(&mut config, &client)?;

    print_order(&order);
    Ok(())
}

fn print_order(order: &Order) {
    output::heading(&format!("Order {}", order.id));
    output::field("Tier", &order.tier);
    output::field("Status", &order.status);
    output::field("Quantity", &format!("{} kg", order.total_quantity()));
    if let Some(date) = &order.expected_shipment_date {
        output::field("Expected shipment", date);
    }

    for item in &order.line_items {
        println!(
            "  {} kg, {} for {}",
            item.quantity(),
            item.grind_type,
            item.brewing_method
        );
    }
}
