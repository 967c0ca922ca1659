use anyhow::{Result, bail};

use crate::api::TicketSummary;
use crate::cli::{CreateArgs, ListArgs};
use crate::context::ClientContext;

const MIN_TITLE_LEN: usize = 3;
const MIN_DESCRIPTION_LEN: usize = 10;
const PREVIEW_LEN: usize = 60;

pub async fn list(ctx: &mut ClientContext, args: &ListArgs) -> Result<()> {
    let page = ctx.api.list_tickets(ctx.access_token()?, args).await?;
    if page.items.is_empty() {
        println!("No tickets found");
        return Ok(());
    }
    for ticket in &page.items {
        println!("{}", summary_line(ticket));
    }
    println!("{} total", page.total);
    Ok(())
}

pub async fn count(ctx: &mut ClientContext, args: &ListArgs) -> Result<()> {
    let page = ctx.api.list_tickets(ctx.access_token()?, args).await?;
    println!("{}", page.total);
    Ok(())
}

pub async fn create(ctx: &mut ClientContext, args: &CreateArgs) -> Result<()> {
    check_new_ticket(&args.title, &args.description)?;
    let ticket = ctx.api.create_ticket(ctx.access_token()?, args).await?;
    tracing::info!(ticket_id = %ticket.id, "Ticket created");
    println!("Created ticket {}", ticket.id);
    Ok(())
}

/// Same minimum character counts as the server, so short input fails
/// before a round trip. Whitespace counts, as it does server-side.
fn check_new_ticket(title: &str, description: &str) -> Result<()> {
    if title.chars().count() < MIN_TITLE_LEN {
        bail!("Title must be at least {MIN_TITLE_LEN} characters");
    }
    if description.chars().count() < MIN_DESCRIPTION_LEN {
        bail!("Description must be at least {MIN_DESCRIPTION_LEN} characters");
    }
    Ok(())
}

fn summary_line(ticket: &TicketSummary) -> String {
    let assignee = ticket.assignee_id.as_deref().unwrap_or("unassigned");
    format!(
        "{}  [{} {} {}]  {}  {}  ({assignee})",
        ticket.id,
        ticket.severity,
        ticket.status,
        ticket.component,
        ticket.created_at.format("%Y-%m-%d %H:%M"),
        preview(&ticket.title),
    )
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LEN {
        text.to_string()
    } else {
        let cut: String = text.chars().take(PREVIEW_LEN).collect();
        format!("{cut}...")
    }
}
