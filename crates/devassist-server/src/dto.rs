//! Wire types. Bodies are camelCase JSON.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use devassist_core::models::comment::Comment;
use devassist_core::models::kb_article::{
    CreateKbArticle, KbArticle, KbArticleFilter, UpdateKbArticle,
};
use devassist_core::models::playbook::{CreatePlaybook, Playbook, PlaybookFilter, UpdatePlaybook};
use devassist_core::models::suggestion::{Suggestion, SuggestionSet};
use devassist_core::models::ticket::{
    Ticket, TicketComponent, TicketFilter, TicketSeverity, TicketStatus, UpdateTicket,
};
use devassist_core::models::user::{Caller, PublicUser, Role};
use devassist_core::repository::ListResult;
use devassist_service::{NewTicket, TicketDetail};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;

/// Distinguishes an omitted field (`None`) from an explicit `null`
/// (`Some(None)`). Use together with `#[serde(default)]`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email must be an email"))]
    pub email: String,
    #[validate(length(min = 1, message = "password should not be empty"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "refreshToken should not be empty"))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

impl From<PublicUser> for UserDto {
    fn from(u: PublicUser) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub struct CallerDto {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<Caller> for CallerDto {
    fn from(c: Caller) -> Self {
        Self {
            id: c.id,
            email: c.email,
            role: c.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: CallerDto,
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketRequest {
    #[validate(length(min = 3, message = "title must be longer than or equal to 3 characters"))]
    pub title: String,
    #[validate(length(
        min = 10,
        message = "description must be longer than or equal to 10 characters"
    ))]
    pub description: String,
    pub severity: TicketSeverity,
    pub component: TicketComponent,
}

impl From<CreateTicketRequest> for NewTicket {
    fn from(r: CreateTicketRequest) -> Self {
        Self {
            title: r.title,
            description: r.description,
            severity: r.severity,
            component: r.component,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    #[validate(length(min = 3, message = "title must be longer than or equal to 3 characters"))]
    pub title: Option<String>,
    #[validate(length(
        min = 10,
        message = "description must be longer than or equal to 10 characters"
    ))]
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
    pub severity: Option<TicketSeverity>,
    pub component: Option<TicketComponent>,
    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub sla_due_at: Option<Option<String>>,
}

impl TryFrom<UpdateTicketRequest> for UpdateTicket {
    type Error = ApiError;

    fn try_from(r: UpdateTicketRequest) -> Result<Self, Self::Error> {
        let sla_due_at = match r.sla_due_at {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) => {
                let parsed = DateTime::parse_from_rfc3339(&raw).map_err(|_| {
                    ApiError::invalid_fields(BTreeMap::from([(
                        "slaDueAt".to_string(),
                        vec!["slaDueAt must be a valid ISO 8601 date string".to_string()],
                    )]))
                })?;
                Some(Some(parsed.with_timezone(&Utc)))
            }
        };

        Ok(UpdateTicket {
            title: r.title,
            description: r.description,
            status: r.status,
            severity: r.severity,
            component: r.component,
            assignee_id: r.assignee_id,
            sla_due_at,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignTicketRequest {
    /// `null` or omitted unassigns.
    #[serde(default)]
    pub assignee_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TicketQuery {
    pub status: Option<TicketStatus>,
    pub severity: Option<TicketSeverity>,
    pub component: Option<TicketComponent>,
    pub query: Option<String>,
}

impl From<TicketQuery> for TicketFilter {
    fn from(q: TicketQuery) -> Self {
        Self {
            status: q.status,
            severity: q.severity,
            component: q.component,
            query: q.query.filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub severity: TicketSeverity,
    pub component: TicketComponent,
    pub requester_id: Uuid,
    pub assignee_id: Option<String>,
    pub sla_due_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Ticket> for TicketDto {
    fn from(t: Ticket) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            status: t.status,
            severity: t.severity,
            component: t.component,
            requester_id: t.requester_id,
            assignee_id: t.assignee_id,
            sla_due_at: t.sla_due_at,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TicketListResponse {
    pub items: Vec<TicketDto>,
    pub total: u64,
}

impl From<ListResult<Ticket>> for TicketListResponse {
    fn from(r: ListResult<Ticket>) -> Self {
        Self {
            items: r.items.into_iter().map(TicketDto::from).collect(),
            total: r.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TicketDetailResponse {
    pub ticket: TicketDto,
    pub comments: Vec<CommentDto>,
}

impl From<TicketDetail> for TicketDetailResponse {
    fn from(d: TicketDetail) -> Self {
        Self {
            ticket: d.ticket.into(),
            comments: d.comments.into_iter().map(CommentDto::from).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, message = "body should not be empty"))]
    pub body: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentDto {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            ticket_id: c.ticket_id,
            author_id: c.author_id,
            body: c.body,
            created_at: c.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Knowledge base
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct KbQuery {
    pub query: Option<String>,
    pub tag: Option<String>,
}

impl From<KbQuery> for KbArticleFilter {
    fn from(q: KbQuery) -> Self {
        Self {
            query: q.query.filter(|s| !s.is_empty()),
            tag: q.tag.filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateKbArticleRequest {
    #[validate(length(min = 3, message = "title must be longer than or equal to 3 characters"))]
    pub title: String,
    #[validate(length(min = 10, message = "body must be longer than or equal to 10 characters"))]
    pub body: String,
    pub tags: Vec<String>,
}

impl From<CreateKbArticleRequest> for CreateKbArticle {
    fn from(r: CreateKbArticleRequest) -> Self {
        Self {
            title: r.title,
            body: r.body,
            tags: r.tags,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateKbArticleRequest {
    #[validate(length(min = 3, message = "title must be longer than or equal to 3 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 10, message = "body must be longer than or equal to 10 characters"))]
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl From<UpdateKbArticleRequest> for UpdateKbArticle {
    fn from(r: UpdateKbArticleRequest) -> Self {
        Self {
            title: r.title,
            body: r.body,
            tags: r.tags,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KbArticleDto {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<KbArticle> for KbArticleDto {
    fn from(a: KbArticle) -> Self {
        Self {
            id: a.id,
            title: a.title,
            body: a.body,
            tags: a.tags,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Playbooks
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct PlaybookQuery {
    pub search: Option<String>,
}

impl From<PlaybookQuery> for PlaybookFilter {
    fn from(q: PlaybookQuery) -> Self {
        Self {
            search: q.search.filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlaybookRequest {
    #[validate(length(min = 1, message = "name should not be empty"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "template should not be empty"))]
    pub template: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<CreatePlaybookRequest> for CreatePlaybook {
    fn from(r: CreatePlaybookRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            template: r.template,
            tags: r.tags,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePlaybookRequest {
    #[validate(length(min = 1, message = "name should not be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[validate(length(min = 1, message = "template should not be empty"))]
    pub template: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl From<UpdatePlaybookRequest> for UpdatePlaybook {
    fn from(r: UpdatePlaybookRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            template: r.template,
            tags: r.tags,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub template: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Playbook> for PlaybookDto {
    fn from(p: Playbook) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            template: p.template,
            tags: p.tags,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub suggestions: Vec<Suggestion>,
    pub generated_at: DateTime<Utc>,
    pub model: String,
}

impl From<SuggestionSet> for SuggestionResponse {
    fn from(s: SuggestionSet) -> Self {
        Self {
            suggestions: s.suggestions,
            generated_at: s.generated_at,
            model: s.model,
        }
    }
}
