//! SurrealDB implementation of [`CommentRepository`].

use chrono::{DateTime, Utc};
use devassist_core::error::DevAssistResult;
use devassist_core::models::comment::{Comment, CreateComment};
use devassist_core::repository::CommentRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CommentRow {
    ticket_id: String,
    author_id: String,
    body: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CommentRowWithId {
    record_id: String,
    ticket_id: String,
    author_id: String,
    body: String,
    created_at: DateTime<Utc>,
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::invalid_row("comment", format!("invalid {what}: {e}")))
}

impl CommentRow {
    fn into_comment(self, id: Uuid) -> Result<Comment, DbError> {
        Ok(Comment {
            id,
            ticket_id: parse_uuid(&self.ticket_id, "ticket_id")?,
            author_id: parse_uuid(&self.author_id, "author_id")?,
            body: self.body,
            created_at: self.created_at,
        })
    }
}

impl CommentRowWithId {
    fn try_into_comment(self) -> Result<Comment, DbError> {
        let id = parse_uuid(&self.record_id, "id")?;
        CommentRow {
            ticket_id: self.ticket_id,
            author_id: self.author_id,
            body: self.body,
            created_at: self.created_at,
        }
        .into_comment(id)
    }
}

/// SurrealDB implementation of the Comment repository.
///
/// Comments are append-only: there is no update or delete path.
#[derive(Clone)]
pub struct SurrealCommentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCommentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CommentRepository for SurrealCommentRepository<C> {
    async fn append(&self, input: CreateComment) -> DevAssistResult<Comment> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('comment', $id) SET \
                 ticket_id = $ticket_id, author_id = $author_id, body = $body",
            )
            .bind(("id", id_str.clone()))
            .bind(("ticket_id", input.ticket_id.to_string()))
            .bind(("author_id", input.author_id.to_string()))
            .bind(("body", input.body))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<CommentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("comment", &id_str))?;

        Ok(row.into_comment(id)?)
    }

    async fn list_by_ticket(&self, ticket_id: Uuid) -> DevAssistResult<Vec<Comment>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM comment \
                 WHERE ticket_id = $ticket_id ORDER BY created_at ASC",
            )
            .bind(("ticket_id", ticket_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CommentRowWithId> = result.take(0).map_err(DbError::from)?;
        let comments = rows
            .into_iter()
            .map(CommentRowWithId::try_into_comment)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(comments)
    }
}
