//! Shared application state handed to every handler.

use std::sync::Arc;

use devassist_auth::{AuthConfig, AuthService};
use devassist_db::DbManager;
use devassist_db::repository::{
    SurrealCommentRepository, SurrealKbArticleRepository, SurrealPlaybookRepository,
    SurrealTicketRepository, SurrealUserRepository,
};
use devassist_service::{
    CommentService, KbService, PlaybookService, SuggestionService, TicketService,
};
use surrealdb::engine::any::Any;

pub type Users = SurrealUserRepository<Any>;
pub type Tickets = SurrealTicketRepository<Any>;
pub type Comments = SurrealCommentRepository<Any>;
pub type KbArticles = SurrealKbArticleRepository<Any>;
pub type Playbooks = SurrealPlaybookRepository<Any>;

/// Immutable after startup; cloning is a handful of `Arc` bumps.
#[derive(Clone)]
pub struct AppState {
    pub db: DbManager,
    pub auth: Arc<AuthService<Users>>,
    pub tickets: Arc<TicketService<Tickets, Comments>>,
    pub comments: Arc<CommentService<Tickets, Comments>>,
    pub kb: Arc<KbService<KbArticles>>,
    pub playbooks: Arc<PlaybookService<Playbooks>>,
    pub suggestions: Arc<SuggestionService<Tickets>>,
}

impl AppState {
    pub fn new(db: DbManager, auth: AuthConfig, ai_assist_enabled: bool) -> Self {
        let client = db.client().clone();
        let users = SurrealUserRepository::with_pepper(client.clone(), auth.pepper.clone());
        let tickets = SurrealTicketRepository::new(client.clone());
        let comments = SurrealCommentRepository::new(client.clone());

        Self {
            auth: Arc::new(AuthService::new(users, auth)),
            tickets: Arc::new(TicketService::new(tickets.clone(), comments.clone())),
            comments: Arc::new(CommentService::new(tickets.clone(), comments)),
            kb: Arc::new(KbService::new(SurrealKbArticleRepository::new(client.clone()))),
            playbooks: Arc::new(PlaybookService::new(SurrealPlaybookRepository::new(
                client.clone(),
            ))),
            suggestions: Arc::new(SuggestionService::new(tickets, ai_assist_enabled)),
            db,
        }
    }
}
