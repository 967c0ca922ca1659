//! Playbook domain model: a named, tagged prompt template.
//!
//! Templates may contain `{{variable}}` placeholders. They are stored and
//! returned verbatim; nothing in the server interprets them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playbook {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub template: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaybook {
    pub name: String,
    pub description: Option<String>,
    pub template: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlaybook {
    pub name: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub template: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct PlaybookFilter {
    /// Matches a name substring OR an exact tag.
    pub search: Option<String>,
}
