//! DevAssist services: business rules over the repository traits.
//!
//! Every service is generic over its repositories, so this crate has no
//! dependency on the database crate. Ownership and role checks for
//! tickets go through [`devassist_core::policy`].

pub mod comment;
pub mod document;
pub mod suggestion;
pub mod ticket;

pub use comment::CommentService;
pub use document::{KbService, PlaybookService};
pub use suggestion::SuggestionService;
pub use ticket::{NewTicket, TicketDetail, TicketService};
