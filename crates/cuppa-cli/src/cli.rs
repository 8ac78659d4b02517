//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::learn::LearnCommand;
use crate::commands::login::LoginArgs;
use crate::commands::manage::ManageCommand;
use crate::commands::orders::OrdersCommand;
use crate::commands::plans::PlansArgs;
use crate::commands::subscribe::SubscribeArgs;

/// Terminal client for the cuppa coffee-subscription service.
#[derive(Parser, Debug)]
#[command(name = "cuppa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with email and password
    Login(LoginArgs),

    /// Drop the stored session
    Logout,

    /// Display the stored session and its expiry status
    Whoami,

    /// List available subscription tiers or one-time products
    Plans(PlansArgs),

    /// Browse the coffee knowledge base
    Learn(LearnCommand),

    /// Configure an order, check out, and wait for payment
    Subscribe(SubscribeArgs),

    /// Order operations
    Orders(OrdersCommand),

    /// Manage existing subscriptions
    Manage(ManageCommand),
}
