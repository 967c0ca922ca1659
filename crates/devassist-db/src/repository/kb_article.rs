//! SurrealDB implementation of [`KbArticleRepository`].

use chrono::{DateTime, Utc};
use devassist_core::error::DevAssistResult;
use devassist_core::models::kb_article::{
    CreateKbArticle, KbArticle, KbArticleFilter, UpdateKbArticle,
};
use devassist_core::repository::KbArticleRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct KbArticleRow {
    title: String,
    body: String,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct KbArticleRowWithId {
    record_id: String,
    title: String,
    body: String,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl KbArticleRow {
    fn into_article(self, id: Uuid) -> KbArticle {
        KbArticle {
            id,
            title: self.title,
            body: self.body,
            tags: self.tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl KbArticleRowWithId {
    fn try_into_article(self) -> Result<KbArticle, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::invalid_row("kb_article", format!("invalid UUID: {e}")))?;
        Ok(KbArticle {
            id,
            title: self.title,
            body: self.body,
            tags: self.tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the knowledge-base repository.
#[derive(Clone)]
pub struct SurrealKbArticleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealKbArticleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> KbArticleRepository for SurrealKbArticleRepository<C> {
    async fn create(&self, input: CreateKbArticle) -> DevAssistResult<KbArticle> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('kb_article', $id) SET \
                 title = $title, body = $body, tags = $tags",
            )
            .bind(("id", id_str.clone()))
            .bind(("title", input.title))
            .bind(("body", input.body))
            .bind(("tags", input.tags))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<KbArticleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("kb_article", &id_str))?;

        Ok(row.into_article(id))
    }

    async fn get_by_id(&self, id: Uuid) -> DevAssistResult<KbArticle> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('kb_article', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<KbArticleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("kb_article", &id_str))?;

        Ok(row.into_article(id))
    }

    async fn update(&self, id: Uuid, input: UpdateKbArticle) -> DevAssistResult<KbArticle> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.body.is_some() {
            sets.push("body = $body");
        }
        if input.tags.is_some() {
            sets.push("tags = $tags");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('kb_article', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(body) = input.body {
            builder = builder.bind(("body", body));
        }
        if let Some(tags) = input.tags {
            builder = builder.bind(("tags", tags));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<KbArticleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("kb_article", &id_str))?;

        Ok(row.into_article(id))
    }

    async fn delete(&self, id: Uuid) -> DevAssistResult<()> {
        let id_str = id.to_string();

        let result = self
            .db
            .query("DELETE type::record('kb_article', $id) RETURN BEFORE")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<KbArticleRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::not_found("kb_article", id_str).into());
        }

        Ok(())
    }

    async fn list(&self, filter: KbArticleFilter) -> DevAssistResult<Vec<KbArticle>> {
        let mut conditions = Vec::new();
        if filter.query.is_some() {
            conditions
                .push("(string::contains(title, $query) OR string::contains(body, $query))");
        }
        if filter.tag.is_some() {
            conditions.push("$tag IN tags");
        }
        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM kb_article {clause} \
             ORDER BY updated_at DESC"
        );

        let mut builder = self.db.query(&query);
        if let Some(q) = filter.query {
            builder = builder.bind(("query", q));
        }
        if let Some(tag) = filter.tag {
            builder = builder.bind(("tag", tag));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<KbArticleRowWithId> = result.take(0).map_err(DbError::from)?;

        let articles = rows
            .into_iter()
            .map(KbArticleRowWithId::try_into_article)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(articles)
    }
}
