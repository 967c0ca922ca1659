//! Assist suggestions attached to a ticket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Suggestion {
    KbArticle {
        id: String,
        title: String,
        description: String,
        relevance: f32,
    },
    Playbook {
        id: String,
        name: String,
        description: String,
        relevance: f32,
    },
    Action {
        label: String,
        description: String,
        relevance: f32,
    },
}

impl Suggestion {
    pub fn relevance(&self) -> f32 {
        match self {
            Suggestion::KbArticle { relevance, .. }
            | Suggestion::Playbook { relevance, .. }
            | Suggestion::Action { relevance, .. } => *relevance,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionSet {
    pub suggestions: Vec<Suggestion>,
    pub generated_at: DateTime<Utc>,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_are_tagged_by_type() {
        let s = Suggestion::Action {
            label: "Escalate".into(),
            description: "d".into(),
            relevance: 0.5,
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["type"], "action");
        assert_eq!(json["label"], "Escalate");

        let kb = Suggestion::KbArticle {
            id: "kb-1".into(),
            title: "t".into(),
            description: "d".into(),
            relevance: 0.9,
        };
        assert_eq!(serde_json::to_value(&kb).unwrap()["type"], "kb_article");
    }
}
