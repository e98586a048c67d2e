use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime, Time};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "walk_session_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WalkSessionStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    Rejected,
}

impl WalkSessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            WalkSessionStatus::Completed
                | WalkSessionStatus::Cancelled
                | WalkSessionStatus::Rejected
        )
    }

    /// Forward-only lifecycle; terminal states are frozen.
    pub fn can_transition_to(self, next: WalkSessionStatus) -> bool {
        use WalkSessionStatus::*;
        matches!(
            (self, next),
            (Scheduled, Confirmed)
                | (Scheduled, Cancelled)
                | (Scheduled, Rejected)
                | (Confirmed, InProgress)
                | (Confirmed, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }

    /// Status label used by the mobile clients.
    pub fn client_label(self) -> &'static str {
        match self {
            WalkSessionStatus::Scheduled => "pending",
            WalkSessionStatus::Confirmed => "accepted",
            WalkSessionStatus::InProgress => "in-progress",
            WalkSessionStatus::Completed => "completed",
            WalkSessionStatus::Cancelled => "cancelled",
            WalkSessionStatus::Rejected => "rejected",
        }
    }

    pub fn from_client_label(label: &str) -> Option<Self> {
        match label {
            "pending" => Some(WalkSessionStatus::Scheduled),
            "accepted" => Some(WalkSessionStatus::Confirmed),
            "in-progress" => Some(WalkSessionStatus::InProgress),
            "completed" => Some(WalkSessionStatus::Completed),
            "cancelled" => Some(WalkSessionStatus::Cancelled),
            "rejected" => Some(WalkSessionStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct WalkSession {
    pub id: Uuid,
    pub elderly_id: Uuid,
    pub nurse_id: Uuid,
    pub scheduled_date: Date,
    pub scheduled_time: Time,
    pub duration_minutes: i32,
    pub status: WalkSessionStatus,
    pub cancellation_reason: Option<String>,
    pub actual_start_time: Option<OffsetDateTime>,
    pub actual_end_time: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewWalkSession {
    pub elderly_id: Uuid,
    pub nurse_id: Uuid,
    pub scheduled_date: Date,
    pub scheduled_time: Time,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchingMode {
    Auto,
    Manual,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalksPayload {
    #[validate(length(min = 1, message = "At least one scheduled date is required"))]
    pub scheduled_dates: Vec<Date>,
    pub scheduled_time: String,
    #[validate(range(min = 15, max = 120, message = "Duration must be 15-120 minutes"))]
    pub duration: i32,
    pub matching_mode: MatchingMode,
    pub nurse_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MatchWalkPayload {
    pub scheduled_date: Date,
    pub scheduled_time: String,
    #[validate(range(min = 15, max = 120, message = "Duration must be 15-120 minutes"))]
    pub duration: i32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWalkStatusPayload {
    pub status: String,
    pub cancellation_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_moves_forward_only() {
        use WalkSessionStatus::*;
        assert!(Scheduled.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Scheduled.can_transition_to(Rejected));

        assert!(!Confirmed.can_transition_to(Scheduled));
        assert!(!InProgress.can_transition_to(Confirmed));
        assert!(!Scheduled.can_transition_to(Completed));
    }

    #[test]
    fn terminal_states_are_frozen() {
        use WalkSessionStatus::*;
        for terminal in [Completed, Cancelled, Rejected] {
            assert!(terminal.is_terminal());
            for next in [Scheduled, Confirmed, InProgress, Completed, Cancelled, Rejected] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn client_labels_round_trip() {
        use WalkSessionStatus::*;
        for status in [Scheduled, Confirmed, InProgress, Completed, Cancelled, Rejected] {
            assert_eq!(
                WalkSessionStatus::from_client_label(status.client_label()),
                Some(status)
            );
        }
        assert_eq!(WalkSessionStatus::from_client_label("unknown"), None);
    }
}
