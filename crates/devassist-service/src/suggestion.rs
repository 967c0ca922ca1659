//! Assist suggestions for a ticket.
//!
//! No inference happens here: when enabled, every existing ticket gets
//! the same three canned suggestions.

use chrono::Utc;
use devassist_core::error::{DevAssistError, DevAssistResult};
use devassist_core::models::suggestion::{Suggestion, SuggestionSet};
use devassist_core::repository::TicketRepository;
use uuid::Uuid;

pub const STUB_MODEL: &str = "stub-v1";

/// Name reported when the feature flag is off.
pub const FEATURE_NAME: &str = "AI Assist";

pub struct SuggestionService<T: TicketRepository> {
    tickets: T,
    enabled: bool,
}

impl<T: TicketRepository> SuggestionService<T> {
    pub fn new(tickets: T, enabled: bool) -> Self {
        Self { tickets, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn suggest(&self, ticket_id: Uuid) -> DevAssistResult<SuggestionSet> {
        if !self.enabled {
            return Err(DevAssistError::Disabled {
                feature: FEATURE_NAME.into(),
            });
        }

        self.tickets.get_by_id(ticket_id).await?;

        let mut suggestions = stub_suggestions();
        suggestions.sort_by(|a, b| b.relevance().total_cmp(&a.relevance()));

        Ok(SuggestionSet {
            suggestions,
            generated_at: Utc::now(),
            model: STUB_MODEL.into(),
        })
    }
}

fn stub_suggestions() -> Vec<Suggestion> {
    vec![
        Suggestion::KbArticle {
            id: "kb-stub-1".into(),
            title: "Getting Started with Cline".into(),
            description: "Basic setup and configuration guide".into(),
            relevance: 0.85,
        },
        Suggestion::Playbook {
            id: "pb-stub-1".into(),
            name: "Debug CI Pipeline".into(),
            description: "Step-by-step guide for CI debugging".into(),
            relevance: 0.72,
        },
        Suggestion::Action {
            label: "Escalate to Support".into(),
            description: "This ticket may require senior support attention".into(),
            relevance: 0.65,
        },
    ]
}
