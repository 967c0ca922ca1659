mod auth;
mod tickets;

use anyhow::Result;

use crate::cli::{Command, TicketCommand};
use crate::context::ClientContext;

pub async fn run(ctx: &mut ClientContext, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => auth::login(ctx, &email, &password).await,
        Command::Logout => auth::logout(ctx).await,
        Command::Whoami => auth::whoami(ctx).await,
        Command::Tickets { action } => match action {
            TicketCommand::List(args) => tickets::list(ctx, &args).await,
            TicketCommand::Create(args) => tickets::create(ctx, &args).await,
            TicketCommand::Count(args) => tickets::count(ctx, &args).await,
        },
    }
}
