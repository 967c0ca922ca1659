//! Command-line argument definitions.

use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use devassist_core::models::ticket::{TicketComponent, TicketSeverity, TicketStatus};

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// DevAssist Hub command-line client
#[derive(Debug, Parser)]
#[command(name = "devassist", version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the DevAssist API
    #[arg(long, global = true, env = "DEVASSIST_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session locally
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Revoke the session and remove local tokens
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Work with tickets
    Tickets {
        #[command(subcommand)]
        action: TicketCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum TicketCommand {
    /// List tickets, newest first
    List(ListArgs),
    /// File a new ticket
    Create(CreateArgs),
    /// Print the number of tickets matching the filters
    Count(ListArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    #[arg(long, value_parser = parse_upper::<TicketStatus>)]
    pub status: Option<TicketStatus>,
    #[arg(long, value_parser = parse_upper::<TicketSeverity>)]
    pub severity: Option<TicketSeverity>,
    #[arg(long, value_parser = parse_upper::<TicketComponent>)]
    pub component: Option<TicketComponent>,
    /// Case-sensitive substring of title or description
    #[arg(long)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    #[arg(long, value_parser = parse_upper::<TicketSeverity>)]
    pub severity: TicketSeverity,
    #[arg(long, value_parser = parse_upper::<TicketComponent>)]
    pub component: TicketComponent,
}

/// Enum values are accepted in any case (`in_progress`, `p1`, `ci`).
fn parse_upper<T>(raw: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .to_ascii_uppercase()
        .parse()
        .map_err(|e: T::Err| e.to_string())
}
