//! Gamification engine
//!
//! Turns stored records into XP awards, badges and environmental impact
//! figures. The derivations here are pure; the only writes are the atomic
//! increments and badge replacement issued through a `RecordStore`.
//!
//! ## Policy
//!
//! | Action            | XP  | Streak |
//! |-------------------|-----|--------|
//! | Pickup scheduled  | +10 | -      |
//! | Pickup completed  | +20 | +1     |
//! | Pledge submitted  | +5  | -      |
//!
//! Badges unlock at 100, 200 and 500 XP and are never pruned.

use serde::Serialize;
use tracing::{debug, info};

use crate::db::schemas::{PickupDoc, UserDoc};
use crate::store::RecordStore;
use crate::types::Result;

/// Average mass of one recycled item
pub const KG_PER_ITEM: f64 = 0.5;

/// CO2 avoided per kilogram recycled
pub const CO2_PER_KG: f64 = 2.5;

/// Badge thresholds in ascending XP order
pub const BADGE_THRESHOLDS: [(i64, &str); 3] = [
    (100, "Plastic Buster"),
    (200, "Paper Saver"),
    (500, "Eco Warrior"),
];

/// Actions that earn XP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XpAction {
    PickupScheduled,
    PickupCompleted,
    PledgeSubmitted,
}

/// What an action adds to a user's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpAward {
    pub xp: i64,
    pub streak: i64,
}

impl XpAction {
    pub fn award(self) -> XpAward {
        match self {
            Self::PickupScheduled => XpAward { xp: 10, streak: 0 },
            Self::PickupCompleted => XpAward { xp: 20, streak: 1 },
            Self::PledgeSubmitted => XpAward { xp: 5, streak: 0 },
        }
    }
}

/// Derived environmental impact
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactStats {
    pub items_recycled: u64,
    /// One decimal place
    pub total_weight_kg: f64,
    pub carbon_offset_kg: i64,
}

/// Impact figures for a raw item count
pub fn impact_from_items(items_recycled: u64) -> ImpactStats {
    let weight = items_recycled as f64 * KG_PER_ITEM;

    ImpactStats {
        items_recycled,
        total_weight_kg: (weight * 10.0).round() / 10.0,
        carbon_offset_kg: (weight * CO2_PER_KG).round() as i64,
    }
}

/// Impact figures over a set of pickups, whatever their status
pub fn compute_impact(pickups: &[PickupDoc]) -> ImpactStats {
    impact_from_items(pickups.iter().map(PickupDoc::item_count).sum())
}

/// Every badge the given XP qualifies for, lowest threshold first
pub fn derive_badges(xp: i64) -> Vec<String> {
    BADGE_THRESHOLDS
        .iter()
        .filter(|(threshold, _)| xp >= *threshold)
        .map(|(_, label)| label.to_string())
        .collect()
}

/// Badge list to persist, if any
///
/// Only the counts are compared: a fresh list replaces the stored one when it
/// is strictly longer. Equal counts with different labels leave storage alone.
pub fn badges_to_persist(stored: &[String], fresh: &[String]) -> Option<Vec<String>> {
    if fresh.len() > stored.len() {
        Some(fresh.to_vec())
    } else {
        None
    }
}

/// Persist freshly derived badges when the count-only rule calls for it
///
/// `user` may be stale. The store repeats the count check against its current
/// copy, so a longer list written by a concurrent request is never replaced.
/// Returns the list written, if a write happened.
pub async fn reconcile_badges(
    store: &dyn RecordStore,
    user: &UserDoc,
    fresh: &[String],
) -> Result<Option<Vec<String>>> {
    let Some(badges) = badges_to_persist(&user.badges, fresh) else {
        return Ok(None);
    };

    if !store
        .replace_badges_if_longer(&user.email, badges.clone())
        .await?
    {
        debug!("Badges for {} already current", user.email);
        return Ok(None);
    }

    info!("Badges updated for {}: {}", user.email, badges.join(", "));
    Ok(Some(badges))
}

/// Apply an action's award as a single store-side increment
///
/// Never reads XP back; concurrent awards for one user cannot lose updates.
/// Returns whether a user matched.
pub async fn award_xp(store: &dyn RecordStore, email: &str, action: XpAction) -> Result<bool> {
    let award = action.award();
    store.increment_user(email, award.xp, award.streak).await
}

/// Display form of a badge list
pub fn badge_display(badges: &[String]) -> String {
    if badges.is_empty() {
        "None".to_string()
    } else {
        badges.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn pickup_with(n: usize) -> PickupDoc {
        PickupDoc {
            materials: vec!["plastic".to_string(); n],
            ..Default::default()
        }
    }

    #[test]
    fn test_impact_sums_material_counts() {
        let pickups = vec![pickup_with(3), pickup_with(0), pickup_with(4)];
        let impact = compute_impact(&pickups);

        assert_eq!(impact.items_recycled, 7);
        assert_eq!(impact.total_weight_kg, 3.5);
        // 3.5 * 2.5 = 8.75
        assert_eq!(impact.carbon_offset_kg, 9);
    }

    #[test]
    fn test_impact_empty() {
        let impact = compute_impact(&[]);
        assert_eq!(impact.items_recycled, 0);
        assert_eq!(impact.total_weight_kg, 0.0);
        assert_eq!(impact.carbon_offset_kg, 0);
    }

    #[test]
    fn test_carbon_rounds_half_up() {
        // 2 items -> 1.0 kg -> 2.5 kg CO2
        assert_eq!(impact_from_items(2).carbon_offset_kg, 3);
        // 1 item -> 0.5 kg -> 1.25 kg CO2
        assert_eq!(impact_from_items(1).carbon_offset_kg, 1);
        assert_eq!(impact_from_items(1).total_weight_kg, 0.5);
    }

    #[test]
    fn test_badge_thresholds() {
        assert!(derive_badges(50).is_empty());
        assert_eq!(derive_badges(99), Vec::<String>::new());
        assert_eq!(derive_badges(100), vec!["Plastic Buster"]);
        assert_eq!(derive_badges(200), vec!["Plastic Buster", "Paper Saver"]);
        assert_eq!(
            derive_badges(500),
            vec!["Plastic Buster", "Paper Saver", "Eco Warrior"]
        );
        assert_eq!(derive_badges(10_000).len(), 3);
    }

    #[test]
    fn test_count_only_reconciliation() {
        let fresh = derive_badges(150);
        assert_eq!(badges_to_persist(&[], &fresh), Some(vec!["Plastic Buster".to_string()]));

        let stored = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let fresh = derive_badges(600);
        assert_eq!(badges_to_persist(&stored, &fresh), None);

        // Losing qualification never prunes
        assert_eq!(badges_to_persist(&stored, &[]), None);
    }

    #[test]
    fn test_award_table() {
        assert_eq!(XpAction::PickupScheduled.award(), XpAward { xp: 10, streak: 0 });
        assert_eq!(XpAction::PickupCompleted.award(), XpAward { xp: 20, streak: 1 });
        assert_eq!(XpAction::PledgeSubmitted.award(), XpAward { xp: 5, streak: 0 });
    }

    #[test]
    fn test_badge_display() {
        assert_eq!(badge_display(&[]), "None");
        assert_eq!(
            badge_display(&derive_badges(200)),
            "Plastic Buster, Paper Saver"
        );
    }

    #[tokio::test]
    async fn test_reconcile_persists_new_badges() {
        let store = MemoryStore::new();
        let user = store
            .insert_user(UserDoc::new("r@x.y".into(), "h".into()))
            .await
            .unwrap();

        let written = reconcile_badges(&store, &user, &derive_badges(150))
            .await
            .unwrap();
        assert_eq!(written, Some(vec!["Plastic Buster".to_string()]));

        let stored = store.find_user("r@x.y").await.unwrap().unwrap();
        assert_eq!(stored.badges, vec!["Plastic Buster"]);
    }

    #[tokio::test]
    async fn test_reconcile_leaves_equal_count_alone() {
        let store = MemoryStore::new();
        store
            .insert_user(UserDoc::new("eq@x.y".into(), "h".into()))
            .await
            .unwrap();
        let legacy = vec!["x".to_string(), "y".to_string(), "z".to_string()];
        store
            .replace_badges_if_longer("eq@x.y", legacy.clone())
            .await
            .unwrap();
        let user = store.find_user("eq@x.y").await.unwrap().unwrap();

        let written = reconcile_badges(&store, &user, &derive_badges(500))
            .await
            .unwrap();
        assert!(written.is_none());
        assert_eq!(store.find_user("eq@x.y").await.unwrap().unwrap().badges, legacy);
    }

    #[tokio::test]
    async fn test_reconcile_from_stale_user_never_shrinks() {
        let store = MemoryStore::new();
        store
            .insert_user(UserDoc::new("race@x.y".into(), "h".into()))
            .await
            .unwrap();
        store.increment_user("race@x.y", 150, 0).await.unwrap();
        let stale = store.find_user("race@x.y").await.unwrap().unwrap();

        store.increment_user("race@x.y", 100, 0).await.unwrap();
        let fresh = store.find_user("race@x.y").await.unwrap().unwrap();
        let written = reconcile_badges(&store, &fresh, &derive_badges(fresh.xp))
            .await
            .unwrap();
        assert_eq!(written.map(|b| b.len()), Some(2));

        // The stale copy still holds no badges, so it passes the local check
        let written = reconcile_badges(&store, &stale, &derive_badges(stale.xp))
            .await
            .unwrap();
        assert!(written.is_none());

        let stored = store.find_user("race@x.y").await.unwrap().unwrap();
        assert_eq!(stored.badges, vec!["Plastic Buster", "Paper Saver"]);
        assert_eq!(stored.xp, 250);
    }

    #[tokio::test]
    async fn test_award_xp_orphan_is_noop() {
        let store = MemoryStore::new();
        assert!(!award_xp(&store, "nobody@x.y", XpAction::PledgeSubmitted)
            .await
            .unwrap());
    }
}
