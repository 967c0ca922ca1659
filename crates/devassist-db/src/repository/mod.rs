//! SurrealDB repository implementations.

mod comment;
mod kb_article;
mod playbook;
mod ticket;
mod user;

use surrealdb_types::SurrealValue;

pub use comment::SurrealCommentRepository;
pub use kb_article::SurrealKbArticleRepository;
pub use playbook::SurrealPlaybookRepository;
pub use ticket::SurrealTicketRepository;
pub use user::SurrealUserRepository;

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}
