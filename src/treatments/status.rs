//! Treatment lifecycle.
//!
//! `scheduled → communicated → in_execution → completed`, with `cancelled`
//! reachable from any non-terminal state. Transitions themselves are not
//! policed here (manual corrections are allowed); what is enforced is that
//! the communication and execution timestamps are latched the first time the
//! matching status is reached and never overwritten afterwards.

use super::models::TreatmentStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

impl TreatmentStatus {
    pub const ALL: [TreatmentStatus; 5] = [
        TreatmentStatus::Scheduled,
        TreatmentStatus::Communicated,
        TreatmentStatus::InExecution,
        TreatmentStatus::Completed,
        TreatmentStatus::Cancelled,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, TreatmentStatus::Completed | TreatmentStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TreatmentStatus::Scheduled => "scheduled",
            TreatmentStatus::Communicated => "communicated",
            TreatmentStatus::InExecution => "in_execution",
            TreatmentStatus::Completed => "completed",
            TreatmentStatus::Cancelled => "cancelled",
        }
    }
}

/// The status-related part of a treatment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle {
    pub status: TreatmentStatus,
    pub communicated_at: Option<DateTime<Utc>>,
    pub executed_at: Option<DateTime<Utc>>,
}

impl Lifecycle {
    /// Moves to `target`, latching timestamps that are still unset
    #[must_use]
    pub fn transition(self, target: TreatmentStatus, now: DateTime<Utc>) -> Self {
        let mut next = Self {
            status: target,
            ..self
        };
        match target {
            TreatmentStatus::Communicated if next.communicated_at.is_none() => {
                next.communicated_at = Some(now);
            }
            TreatmentStatus::Completed if next.executed_at.is_none() => {
                next.executed_at = Some(now);
            }
            _ => {}
        }
        next
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Communicate,
    Complete,
    Cancel,
}

impl BulkAction {
    /// Workflow guard applied by bulk operations only
    pub fn allows(self, status: TreatmentStatus) -> bool {
        match self {
            BulkAction::Communicate => status == TreatmentStatus::Scheduled,
            BulkAction::Complete => matches!(
                status,
                TreatmentStatus::Communicated | TreatmentStatus::InExecution
            ),
            BulkAction::Cancel => !status.is_terminal(),
        }
    }

    pub fn target_status(self) -> TreatmentStatus {
        match self {
            BulkAction::Communicate => TreatmentStatus::Communicated,
            BulkAction::Complete => TreatmentStatus::Completed,
            BulkAction::Cancel => TreatmentStatus::Cancelled,
        }
    }
}
