//! Domain types shared by the record sources and the reconciliation engine.
//!
//! Identifiers are opaque strings assigned by their owning store; the newtypes
//! exist so a lead id can never be passed where a task or list id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Display name used when a lead record has no `Name` field.
pub const UNNAMED_LEAD: &str = "Unnamed Lead";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Identifier of a lead, assigned by the lead store (e.g. `rec3kQ9xYz`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeadId(pub String);

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for LeadId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LeadId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier of a task on the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier of one ordered list (column) on the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListId(pub String);

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ListId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ListId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Lead status
// ---------------------------------------------------------------------------

/// Pipeline status of a lead.
///
/// The set is open: any value the store holds that is not one of the known
/// statuses is carried verbatim in [`LeadStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    InProgress,
    Qualified,
    Lost,
    Other(String),
}

impl LeadStatus {
    /// Wire text as stored in the lead store.
    pub fn as_str(&self) -> &str {
        match self {
            LeadStatus::New => "NEW",
            LeadStatus::Contacted => "CONTACTED",
            LeadStatus::InProgress => "IN_PROGRESS",
            LeadStatus::Qualified => "QUALIFIED",
            LeadStatus::Lost => "LOST",
            LeadStatus::Other(s) => s,
        }
    }

    /// Parse the stored text. Unknown values are preserved, never rejected.
    pub fn parse(s: &str) -> Self {
        match s {
            "NEW" => LeadStatus::New,
            "CONTACTED" => LeadStatus::Contacted,
            "IN_PROGRESS" => LeadStatus::InProgress,
            "QUALIFIED" => LeadStatus::Qualified,
            "LOST" => LeadStatus::Lost,
            other => LeadStatus::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for LeadStatus {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for LeadStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LeadStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A sales lead as held by the lead store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub status: LeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Lead {
    /// Title a task for this lead should carry: `"<name> - <status>"`.
    pub fn task_title(&self) -> String {
        format!("{} - {}", self.name, self.status)
    }

    /// Human-readable part of a task description, before any metadata footer.
    pub fn details(&self) -> String {
        let mut parts = Vec::new();
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            parts.push(format!("Email: {email}"));
        }
        if let Some(source) = self.source.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!("Source: {source}"));
        }
        if parts.is_empty() {
            "No additional details".to_string()
        } else {
            parts.join("\n")
        }
    }
}

/// A task (card) on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub list: ListId,
    #[serde(default)]
    pub description: String,
}

/// Fields for a task that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub list: ListId,
}

/// Partial update of a task; `None` fields are left untouched by the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub list: Option<ListId>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(email: Option<&str>, source: Option<&str>) -> Lead {
        Lead {
            id: LeadId::from("rec1"),
            name: "Jane".to_string(),
            status: LeadStatus::New,
            email: email.map(str::to_owned),
            source: source.map(str::to_owned),
        }
    }

    #[test]
    fn newtype_display() {
        assert_eq!(LeadId::from("rec1").to_string(), "rec1");
        assert_eq!(TaskId::from("c-01").to_string(), "c-01");
        assert_eq!(ListId::from("todo").to_string(), "todo");
    }

    #[test]
    fn unknown_status_is_preserved() {
        let status = LeadStatus::parse("NEGOTIATING");
        assert_eq!(status, LeadStatus::Other("NEGOTIATING".to_string()));
        assert_eq!(status.to_string(), "NEGOTIATING");
    }

    #[test]
    fn status_serializes_as_wire_text() {
        let json = serde_json::to_string(&LeadStatus::InProgress).expect("serialize");
        assert_eq!(json, "\"IN_PROGRESS\"");
        let back: LeadStatus = serde_json::from_str("\"QUALIFIED\"").expect("deserialize");
        assert_eq!(back, LeadStatus::Qualified);
    }

    #[test]
    fn task_title_uses_name_and_status() {
        let mut l = lead(None, None);
        assert_eq!(l.task_title(), "Jane - NEW");
        l.status = LeadStatus::Qualified;
        assert_eq!(l.task_title(), "Jane - QUALIFIED");
    }

    #[test]
    fn details_lists_present_fields_only() {
        assert_eq!(
            lead(Some("jane@example.com"), Some("LinkedIn")).details(),
            "Email: jane@example.com\nSource: LinkedIn"
        );
        assert_eq!(lead(None, Some("Referral")).details(), "Source: Referral");
        assert_eq!(lead(Some(""), None).details(), "No additional details");
    }
}
