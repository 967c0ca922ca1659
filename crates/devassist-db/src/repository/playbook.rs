//! SurrealDB implementation of [`PlaybookRepository`].

use chrono::{DateTime, Utc};
use devassist_core::error::DevAssistResult;
use devassist_core::models::playbook::{CreatePlaybook, Playbook, PlaybookFilter, UpdatePlaybook};
use devassist_core::repository::PlaybookRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PlaybookRow {
    name: String,
    description: Option<String>,
    template: String,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct PlaybookRowWithId {
    record_id: String,
    name: String,
    description: Option<String>,
    template: String,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PlaybookRow {
    fn into_playbook(self, id: Uuid) -> Playbook {
        Playbook {
            id,
            name: self.name,
            description: self.description,
            template: self.template,
            tags: self.tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl PlaybookRowWithId {
    fn try_into_playbook(self) -> Result<Playbook, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::invalid_row("playbook", format!("invalid UUID: {e}")))?;
        Ok(Playbook {
            id,
            name: self.name,
            description: self.description,
            template: self.template,
            tags: self.tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Playbook repository.
#[derive(Clone)]
pub struct SurrealPlaybookRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPlaybookRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PlaybookRepository for SurrealPlaybookRepository<C> {
    async fn create(&self, input: CreatePlaybook) -> DevAssistResult<Playbook> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('playbook', $id) SET \
                 name = $name, description = $description, \
                 template = $template, tags = $tags",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("template", input.template))
            .bind(("tags", input.tags))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PlaybookRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("playbook", &id_str))?;

        Ok(row.into_playbook(id))
    }

    async fn get_by_id(&self, id: Uuid) -> DevAssistResult<Playbook> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('playbook', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PlaybookRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("playbook", &id_str))?;

        Ok(row.into_playbook(id))
    }

    async fn update(&self, id: Uuid, input: UpdatePlaybook) -> DevAssistResult<Playbook> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.template.is_some() {
            sets.push("template = $template");
        }
        if input.tags.is_some() {
            sets.push("tags = $tags");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('playbook', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(template) = input.template {
            builder = builder.bind(("template", template));
        }
        if let Some(tags) = input.tags {
            builder = builder.bind(("tags", tags));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PlaybookRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("playbook", &id_str))?;

        Ok(row.into_playbook(id))
    }

    async fn delete(&self, id: Uuid) -> DevAssistResult<()> {
        let id_str = id.to_string();

        let result = self
            .db
            .query("DELETE type::record('playbook', $id) RETURN BEFORE")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PlaybookRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::not_found("playbook", id_str).into());
        }

        Ok(())
    }

    async fn list(&self, filter: PlaybookFilter) -> DevAssistResult<Vec<Playbook>> {
        let query = if filter.search.is_some() {
            "SELECT meta::id(id) AS record_id, * FROM playbook \
             WHERE string::contains(name, $search) OR $search IN tags \
             ORDER BY updated_at DESC"
        } else {
            "SELECT meta::id(id) AS record_id, * FROM playbook ORDER BY updated_at DESC"
        };

        let mut builder = self.db.query(query);
        if let Some(search) = filter.search {
            builder = builder.bind(("search", search));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<PlaybookRowWithId> = result.take(0).map_err(DbError::from)?;

        let playbooks = rows
            .into_iter()
            .map(PlaybookRowWithId::try_into_playbook)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(playbooks)
    }
}
