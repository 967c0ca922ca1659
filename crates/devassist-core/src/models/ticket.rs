//! Ticket domain model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DevAssistError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Blocked,
    Resolved,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Blocked,
        TicketStatus::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "OPEN",
            TicketStatus::InProgress => "IN_PROGRESS",
            TicketStatus::Blocked => "BLOCKED",
            TicketStatus::Resolved => "RESOLVED",
        }
    }
}

impl FromStr for TicketStatus {
    type Err = DevAssistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(TicketStatus::Open),
            "IN_PROGRESS" => Ok(TicketStatus::InProgress),
            "BLOCKED" => Ok(TicketStatus::Blocked),
            "RESOLVED" => Ok(TicketStatus::Resolved),
            other => Err(DevAssistError::validation(format!(
                "unknown ticket status: {other}"
            ))),
        }
    }
}

/// Ticket urgency; `P0` is the most urgent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TicketSeverity {
    P0,
    P1,
    P2,
    P3,
}

impl TicketSeverity {
    pub const ALL: [TicketSeverity; 4] = [
        TicketSeverity::P0,
        TicketSeverity::P1,
        TicketSeverity::P2,
        TicketSeverity::P3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketSeverity::P0 => "P0",
            TicketSeverity::P1 => "P1",
            TicketSeverity::P2 => "P2",
            TicketSeverity::P3 => "P3",
        }
    }
}

impl FromStr for TicketSeverity {
    type Err = DevAssistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P0" => Ok(TicketSeverity::P0),
            "P1" => Ok(TicketSeverity::P1),
            "P2" => Ok(TicketSeverity::P2),
            "P3" => Ok(TicketSeverity::P3),
            other => Err(DevAssistError::validation(format!(
                "unknown ticket severity: {other}"
            ))),
        }
    }
}

/// Subsystem a ticket is filed against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketComponent {
    Cline,
    Copilot,
    Rag,
    Ci,
    Extension,
    Other,
}

impl TicketComponent {
    pub const ALL: [TicketComponent; 6] = [
        TicketComponent::Cline,
        TicketComponent::Copilot,
        TicketComponent::Rag,
        TicketComponent::Ci,
        TicketComponent::Extension,
        TicketComponent::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketComponent::Cline => "CLINE",
            TicketComponent::Copilot => "COPILOT",
            TicketComponent::Rag => "RAG",
            TicketComponent::Ci => "CI",
            TicketComponent::Extension => "EXTENSION",
            TicketComponent::Other => "OTHER",
        }
    }
}

impl FromStr for TicketComponent {
    type Err = DevAssistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CLINE" => Ok(TicketComponent::Cline),
            "COPILOT" => Ok(TicketComponent::Copilot),
            "RAG" => Ok(TicketComponent::Rag),
            "CI" => Ok(TicketComponent::Ci),
            "EXTENSION" => Ok(TicketComponent::Extension),
            "OTHER" => Ok(TicketComponent::Other),
            other => Err(DevAssistError::validation(format!(
                "unknown ticket component: {other}"
            ))),
        }
    }
}

macro_rules! display_via_as_str {
    ($($ty:ty),+) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })+
    };
}

display_via_as_str!(TicketStatus, TicketSeverity, TicketComponent);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub severity: TicketSeverity,
    pub component: TicketComponent,
    /// Set once at creation, never changed.
    pub requester_id: Uuid,
    /// Opaque reference; not checked against the user table.
    pub assignee_id: Option<String>,
    pub sla_due_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicket {
    pub title: String,
    pub description: String,
    pub severity: TicketSeverity,
    pub component: TicketComponent,
    pub requester_id: Uuid,
}

/// Partial ticket update. Plain `Option` fields overwrite when `Some`.
/// Nullable fields use `Option<Option<_>>`: `None` = no change,
/// `Some(None)` = clear, `Some(Some(v))` = set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTicket {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
    pub severity: Option<TicketSeverity>,
    pub component: Option<TicketComponent>,
    pub assignee_id: Option<Option<String>>,
    pub sla_due_at: Option<Option<DateTime<Utc>>>,
}

impl UpdateTicket {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.severity.is_none()
            && self.component.is_none()
            && self.assignee_id.is_none()
            && self.sla_due_at.is_none()
    }
}

/// Conjunctive list filter; every `None` field matches everything.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub severity: Option<TicketSeverity>,
    pub component: Option<TicketComponent>,
    /// Substring matched against title OR description.
    pub query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_round_trip_through_str() {
        for s in TicketStatus::ALL {
            assert_eq!(s.as_str().parse::<TicketStatus>().unwrap(), s);
        }
        for s in TicketSeverity::ALL {
            assert_eq!(s.as_str().parse::<TicketSeverity>().unwrap(), s);
        }
        for c in TicketComponent::ALL {
            assert_eq!(c.as_str().parse::<TicketComponent>().unwrap(), c);
        }
    }

    #[test]
    fn serde_names_match_wire_names() {
        assert_eq!(
            serde_json::to_string(&TicketStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(serde_json::to_string(&TicketSeverity::P1).unwrap(), "\"P1\"");
        assert_eq!(serde_json::to_string(&TicketComponent::Ci).unwrap(), "\"CI\"");
    }

    #[test]
    fn default_status_is_open() {
        assert_eq!(TicketStatus::default(), TicketStatus::Open);
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(UpdateTicket::default().is_empty());
        let clear = UpdateTicket {
            assignee_id: Some(None),
            ..Default::default()
        };
        assert!(!clear.is_empty());
    }
}
