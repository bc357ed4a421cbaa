//! Request orchestration
//!
//! Each operation validates its input, talks to the `RecordStore`, applies the
//! gamification engine and returns a serializable view. Nothing here knows
//! about HTTP.

pub mod accounts;
pub mod pickups;
pub mod pledges;
pub mod stats;

pub use accounts::{login, register, LoginRequest, LoginResponse, RegisterRequest};
pub use pickups::{complete, list_for, schedule, PickupView, SchedulePickupRequest};
pub use pledges::{add as add_pledge, list_recent as list_pledges, AddPledgeRequest, PledgeView};
pub use stats::{community_goal, leaderboard, user_stats, CommunityGoal, LeaderboardEntry, UserStats};

use crate::types::{GreenpointError, Result};

/// Reject blank required fields, returning the trimmed value
pub(crate) fn required<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(GreenpointError::Validation(format!(
            "Missing required field: {}",
            field
        )))
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("  a@x.y ", "email").unwrap(), "a@x.y");
        assert!(matches!(
            required("   ", "email"),
            Err(GreenpointError::Validation(msg)) if msg.contains("email")
        ));
    }
}
