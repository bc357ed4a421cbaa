//! User statistics, leaderboard and community goal

use serde::Serialize;
use tracing::debug;

use super::required;
use crate::gamification::{
    badge_display, compute_impact, derive_badges, impact_from_items, reconcile_badges,
    ImpactStats,
};
use crate::logging::{ActivityEvent, ActivityJournal, ActivityKind};
use crate::store::RecordStore;
use crate::types::{GreenpointError, Result};

/// Number of users shown on the leaderboard
pub const LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(flatten)]
    pub impact: ImpactStats,
    pub xp: i64,
    /// Number of pickups on record, any status
    pub pickups: usize,
    pub streak: i64,
    /// Comma-separated badge labels, or "None"
    pub badges: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub email: String,
    pub xp: i64,
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommunityGoal {
    pub items_recycled: u64,
    pub total_carbon_offset_kg: i64,
}

/// Impact and progress summary for one user
///
/// Also reconciles the stored badge list against the user's current XP.
pub async fn user_stats(
    store: &dyn RecordStore,
    journal: &ActivityJournal,
    email: &str,
) -> Result<UserStats> {
    let email = required(email, "email")?;

    let user = store
        .find_user(email)
        .await?
        .ok_or_else(|| GreenpointError::NotFound(format!("User {} not found", email)))?;

    let pickups = store.pickups_for(email).await?;
    let impact = compute_impact(&pickups);
    let badges = derive_badges(user.xp);

    if let Some(written) = reconcile_badges(store, &user, &badges).await? {
        journal
            .record(ActivityEvent::new(ActivityKind::BadgesUpdated, &user.email).with_badges(written))
            .await;
    }

    debug!(
        "Stats for {}: {} items, {} xp",
        email, impact.items_recycled, user.xp
    );

    Ok(UserStats {
        impact,
        xp: user.xp,
        pickups: pickups.len(),
        streak: user.streak,
        badges: badge_display(&badges),
    })
}

/// Top users by XP
pub async fn leaderboard(store: &dyn RecordStore) -> Result<Vec<LeaderboardEntry>> {
    let users = store.top_users(LEADERBOARD_SIZE).await?;
    Ok(users
        .into_iter()
        .map(|user| LeaderboardEntry {
            email: user.email,
            xp: user.xp,
            badges: user.badges,
        })
        .collect())
}

/// Carbon offset across every pickup in the system
pub async fn community_goal(store: &dyn RecordStore) -> Result<CommunityGoal> {
    let impact = impact_from_items(store.total_material_count().await?);
    Ok(CommunityGoal {
        items_recycled: impact.items_recycled,
        total_carbon_offset_kg: impact.carbon_offset_kg,
    })
}
