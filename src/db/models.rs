//! Domain models for the taskboard database.
//!
//! These models are storage-agnostic and represent the core entities
//! used throughout the application.

use serde::{Deserialize, Serialize};

/// Opaque string ID type used for all entities.
pub type Id = String;

/// A tenant. Owns zero or more tickets; deleting it deletes its tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: Id,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A work item on an organization's board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Id,
    pub title: String,
    pub assignee: String,
    pub status: TicketStatus,
    pub description: Option<String>,
    pub organization_id: Id,
    pub created_at: String,
    pub updated_at: String,
}

/// Status of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    #[default]
    Backlog,
    InProgress,
    Review,
    Done,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Backlog => "backlog",
            TicketStatus::InProgress => "in-progress",
            TicketStatus::Review => "review",
            TicketStatus::Done => "done",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backlog" => Ok(TicketStatus::Backlog),
            "in-progress" => Ok(TicketStatus::InProgress),
            "review" => Ok(TicketStatus::Review),
            "done" => Ok(TicketStatus::Done),
            _ => Err(format!("Invalid ticket status: {}", s)),
        }
    }
}

/// Fields supplied when creating a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub title: String,
    pub assignee: String,
    pub description: Option<String>,
}

/// Partial ticket update. `None` leaves a field untouched.
///
/// `description` is doubly optional so a caller can clear it:
/// `Some(None)` stores NULL, `Some(Some(text))` stores the text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketPatch {
    pub title: Option<String>,
    pub assignee: Option<String>,
    pub status: Option<TicketStatus>,
    pub description: Option<Option<String>>,
}

impl TicketPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.assignee.is_none()
            && self.status.is_none()
            && self.description.is_none()
    }

    /// Apply the present fields to `target`, field by field.
    pub fn apply_to(self, target: &mut Ticket) {
        if let Some(title) = self.title {
            target.title = title;
        }
        if let Some(assignee) = self.assignee {
            target.assignee = assignee;
        }
        if let Some(status) = self.status {
            target.status = status;
        }
        if let Some(description) = self.description {
            target.description = description;
        }
    }
}

/// Filters for ticket search. Absent filters match everything; present ones are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketSearch {
    /// Exact status match.
    pub status: Option<TicketStatus>,
    /// Case-insensitive exact assignee match.
    pub assignee: Option<String>,
    /// Case-insensitive substring match on the title.
    pub title_contains: Option<String>,
}

impl TicketSearch {
    /// Build a search from raw filter values. Blank values count as absent.
    pub fn new(
        status: Option<TicketStatus>,
        assignee: Option<String>,
        title_contains: Option<String>,
    ) -> Self {
        Self {
            status,
            assignee: filter_value(assignee),
            title_contains: filter_value(title_contains),
        }
    }
}

/// `None` for a missing or blank filter value.
pub fn filter_value(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// An item on a user's personal task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Millisecond timestamp rendered as a string.
    pub id: Id,
    pub user_id: Id,
    pub text: String,
    pub completed: bool,
    pub created_at: String,
}
