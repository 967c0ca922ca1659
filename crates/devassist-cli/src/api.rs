//! Thin HTTP client over the DevAssist REST API.

use chrono::{DateTime, Utc};
use devassist_core::models::ticket::{TicketComponent, TicketSeverity, TicketStatus};
use devassist_core::models::user::Role;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cli::{CreateArgs, ListArgs};
use crate::store::{Session, SessionUser};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response; `message` is taken from the JSON error body.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
    user: SessionUser,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    user: Me,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Me {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketSummary {
    pub id: Uuid,
    pub title: String,
    pub status: TicketStatus,
    pub severity: TicketSeverity,
    pub component: TicketComponent,
    #[serde(default)]
    pub assignee_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketPage {
    pub items: Vec<TicketSummary>,
    pub total: u64,
}

#[derive(Debug, Serialize)]
struct CreateTicketBody<'a> {
    title: &'a str,
    description: &'a str,
    severity: TicketSeverity,
    component: TicketComponent,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("devassist-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let request = self
            .http
            .post(self.url("/auth/login"))
            .json(&LoginRequest { email, password });
        let body: LoginResponse = send_json(request).await?;
        Ok(Session {
            access_token: body.access_token,
            refresh_token: body.refresh_token,
            user: body.user,
        })
    }

    pub async fn logout(&self, token: &str) -> Result<(), ApiError> {
        let request = self.http.post(self.url("/auth/logout")).bearer_auth(token);
        check(request.send().await?).await?;
        Ok(())
    }

    pub async fn me(&self, token: &str) -> Result<Me, ApiError> {
        let request = self.http.get(self.url("/auth/me")).bearer_auth(token);
        let body: MeResponse = send_json(request).await?;
        Ok(body.user)
    }

    pub async fn list_tickets(&self, token: &str, args: &ListArgs) -> Result<TicketPage, ApiError> {
        let request = self
            .http
            .get(self.url("/tickets"))
            .bearer_auth(token)
            .query(&list_query(args));
        send_json(request).await
    }

    pub async fn create_ticket(
        &self,
        token: &str,
        args: &CreateArgs,
    ) -> Result<TicketSummary, ApiError> {
        let request = self
            .http
            .post(self.url("/tickets"))
            .bearer_auth(token)
            .json(&CreateTicketBody {
                title: &args.title,
                description: &args.description,
                severity: args.severity,
                component: args.component,
            });
        send_json(request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn list_query(args: &ListArgs) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(status) = args.status {
        query.push(("status", status.as_str().to_string()));
    }
    if let Some(severity) = args.severity {
        query.push(("severity", severity.as_str().to_string()));
    }
    if let Some(component) = args.component {
        query.push(("component", component.as_str().to_string()));
    }
    if let Some(q) = args.query.as_deref().filter(|q| !q.is_empty()) {
        query.push(("query", q.to_string()));
    }
    query
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let response = check(request.send().await?).await?;
    Ok(response.json().await?)
}

async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    tracing::debug!(%status, body = %text, "API request failed");
    Err(ApiError::Status {
        status,
        message: error_message(status, &text),
    })
}

/// Server errors carry `{ "message": ... }`; fall back to the status line.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| format!("API error: {status}"))
}
