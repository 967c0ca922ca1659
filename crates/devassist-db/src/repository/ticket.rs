//! SurrealDB implementation of [`TicketRepository`].

use chrono::{DateTime, Utc};
use devassist_core::error::DevAssistResult;
use devassist_core::models::ticket::{CreateTicket, Ticket, TicketFilter, UpdateTicket};
use devassist_core::repository::{ListResult, TicketRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::CountRow;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct TicketRow {
    title: String,
    description: String,
    status: String,
    severity: String,
    component: String,
    requester_id: String,
    assignee_id: Option<String>,
    sla_due_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct TicketRowWithId {
    record_id: String,
    title: String,
    description: String,
    status: String,
    severity: String,
    component: String,
    requester_id: String,
    assignee_id: Option<String>,
    sla_due_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TicketRow {
    fn into_ticket(self, id: Uuid) -> Result<Ticket, DbError> {
        Ok(Ticket {
            id,
            title: self.title,
            description: self.description,
            status: parse_field(&self.status)?,
            severity: parse_field(&self.severity)?,
            component: parse_field(&self.component)?,
            requester_id: Uuid::parse_str(&self.requester_id)
                .map_err(|e| DbError::invalid_row("ticket", format!("invalid requester: {e}")))?,
            assignee_id: self.assignee_id,
            sla_due_at: self.sla_due_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TicketRowWithId {
    fn try_into_ticket(self) -> Result<Ticket, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::invalid_row("ticket", format!("invalid UUID: {e}")))?;
        TicketRow {
            title: self.title,
            description: self.description,
            status: self.status,
            severity: self.severity,
            component: self.component,
            requester_id: self.requester_id,
            assignee_id: self.assignee_id,
            sla_due_at: self.sla_due_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_ticket(id)
    }
}

fn parse_field<T: std::str::FromStr>(s: &str) -> Result<T, DbError> {
    s.parse()
        .map_err(|_| DbError::invalid_row("ticket", format!("unexpected value: {s}")))
}

/// Build the `WHERE` clause for a ticket filter. Every condition is
/// joined by AND; the free-text query matches title OR description.
fn filter_clause(filter: &TicketFilter) -> String {
    let mut conditions = Vec::new();
    if filter.status.is_some() {
        conditions.push("status = $status");
    }
    if filter.severity.is_some() {
        conditions.push("severity = $severity");
    }
    if filter.component.is_some() {
        conditions.push("component = $component");
    }
    if filter.query.is_some() {
        conditions.push(
            "(string::contains(title, $query) OR string::contains(description, $query))",
        );
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

/// SurrealDB implementation of the Ticket repository.
#[derive(Clone)]
pub struct SurrealTicketRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTicketRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TicketRepository for SurrealTicketRepository<C> {
    async fn create(&self, input: CreateTicket) -> DevAssistResult<Ticket> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('ticket', $id) SET \
                 title = $title, description = $description, \
                 status = 'OPEN', severity = $severity, \
                 component = $component, requester_id = $requester_id, \
                 assignee_id = NONE, sla_due_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("severity", input.severity.as_str().to_string()))
            .bind(("component", input.component.as_str().to_string()))
            .bind(("requester_id", input.requester_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TicketRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("ticket", &id_str))?;

        Ok(row.into_ticket(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> DevAssistResult<Ticket> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('ticket', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TicketRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("ticket", &id_str))?;

        Ok(row.into_ticket(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateTicket) -> DevAssistResult<Ticket> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.severity.is_some() {
            sets.push("severity = $severity");
        }
        if input.component.is_some() {
            sets.push("component = $component");
        }
        if input.assignee_id.is_some() {
            sets.push("assignee_id = $assignee_id");
        }
        if input.sla_due_at.is_some() {
            sets.push("sla_due_at = $sla_due_at");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('ticket', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(severity) = input.severity {
            builder = builder.bind(("severity", severity.as_str().to_string()));
        }
        if let Some(component) = input.component {
            builder = builder.bind(("component", component.as_str().to_string()));
        }
        if let Some(assignee_id) = input.assignee_id {
            // Some(None) binds NONE, which clears the field.
            builder = builder.bind(("assignee_id", assignee_id));
        }
        if let Some(sla_due_at) = input.sla_due_at {
            builder = builder.bind(("sla_due_at", sla_due_at));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TicketRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("ticket", &id_str))?;

        Ok(row.into_ticket(id)?)
    }

    async fn list(&self, filter: TicketFilter) -> DevAssistResult<ListResult<Ticket>> {
        let clause = filter_clause(&filter);

        // Items and count share one transaction so `total` always
        // describes the returned page.
        let query = format!(
            "BEGIN TRANSACTION; \
             SELECT meta::id(id) AS record_id, * FROM ticket {clause} \
             ORDER BY created_at DESC; \
             SELECT count() AS total FROM ticket {clause} GROUP ALL; \
             COMMIT TRANSACTION;"
        );

        let mut builder = self.db.query(&query);
        if let Some(status) = filter.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(severity) = filter.severity {
            builder = builder.bind(("severity", severity.as_str().to_string()));
        }
        if let Some(component) = filter.component {
            builder = builder.bind(("component", component.as_str().to_string()));
        }
        if let Some(query) = filter.query {
            builder = builder.bind(("query", query));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TicketRowWithId> = result.take(0).map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = result.take(1).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let items = rows
            .into_iter()
            .map(TicketRowWithId::try_into_ticket)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(ListResult { items, total })
    }
}
