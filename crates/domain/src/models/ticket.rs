//! Service ticket domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Completed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Completed => "completed",
        }
    }

    /// Completed tickets accept no further status change.
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        match self {
            TicketStatus::Completed => false,
            TicketStatus::Open => true,
            TicketStatus::InProgress => next != TicketStatus::Open,
        }
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "open" => Ok(TicketStatus::Open),
            "in_progress" => Ok(TicketStatus::InProgress),
            "completed" => Ok(TicketStatus::Completed),
            _ => Err(format!("Invalid ticket status: {}", s)),
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A service visit request for a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: i64,
    pub location_id: i64,
    pub company_id: i64,
    /// Cleared if the device is later removed.
    pub device_id: Option<i64>,
    pub created_by: i64,
    pub problem: String,
    pub visit_date: NaiveDate,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
    pub location_id: i64,
    pub device_id: i64,
    pub created_by: i64,
    pub problem: String,
    pub visit_date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit_date: Option<NaiveDate>,
}

impl TicketChanges {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.problem.is_none() && self.visit_date.is_none()
    }
}

/// Request payload for opening a ticket.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub location_id: Option<i64>,
    pub device_id: Option<i64>,

    #[validate(length(
        min = 1,
        max = 2000,
        message = "Problem must be between 1 and 2000 characters"
    ))]
    pub problem: Option<String>,

    pub visit_date: Option<NaiveDate>,
}

/// Request payload for updating a ticket.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    pub status: Option<TicketStatus>,

    #[validate(length(
        min = 1,
        max = 2000,
        message = "Problem must be between 1 and 2000 characters"
    ))]
    pub problem: Option<String>,

    pub visit_date: Option<NaiveDate>,
}

impl From<UpdateTicketRequest> for TicketChanges {
    fn from(req: UpdateTicketRequest) -> Self {
        Self {
            status: req.status,
            problem: req.problem.map(|p| p.trim().to_string()),
            visit_date: req.visit_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_status_parse() {
        assert_eq!(
            "in-progress".parse::<TicketStatus>().unwrap(),
            TicketStatus::InProgress
        );
        assert!("closed".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn test_ticket_transitions() {
        assert!(TicketStatus::Open.can_transition_to(TicketStatus::InProgress));
        assert!(TicketStatus::Open.can_transition_to(TicketStatus::Completed));
        assert!(TicketStatus::InProgress.can_transition_to(TicketStatus::Completed));
        assert!(!TicketStatus::InProgress.can_transition_to(TicketStatus::Open));
        assert!(!TicketStatus::Completed.can_transition_to(TicketStatus::Open));
        assert!(!TicketStatus::Completed.can_transition_to(TicketStatus::Completed));
    }
}
