//! Pickup scheduling and completion

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::required;
use crate::db::schemas::{PickupDoc, PickupStatus};
use crate::gamification::{award_xp, XpAction};
use crate::logging::{ActivityEvent, ActivityJournal, ActivityKind};
use crate::store::RecordStore;
use crate::types::{GreenpointError, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePickupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "type", default)]
    pub pickup_type: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

/// Pickup as returned to clients
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PickupView {
    pub id: String,
    pub email: String,
    pub date: String,
    pub location: String,
    #[serde(rename = "type")]
    pub pickup_type: String,
    pub time: String,
    pub phone: String,
    pub materials: Vec<String>,
    pub notes: String,
    pub status: PickupStatus,
    pub created_at: String,
}

impl From<PickupDoc> for PickupView {
    fn from(doc: PickupDoc) -> Self {
        Self {
            id: doc.id_hex(),
            created_at: doc.metadata.created_rfc3339(),
            email: doc.email,
            date: doc.date,
            location: doc.location,
            pickup_type: doc.pickup_type,
            time: doc.time,
            phone: doc.phone,
            materials: doc.materials,
            notes: doc.notes,
            status: doc.status,
        }
    }
}

/// Record a pickup request and award the scheduling XP
///
/// The pickup is committed before the award. If the award fails the request
/// fails but the pickup stays.
pub async fn schedule(
    store: &dyn RecordStore,
    journal: &ActivityJournal,
    request: SchedulePickupRequest,
) -> Result<PickupView> {
    let email = required(&request.email, "email")?.to_string();
    let date = required(&request.date, "date")?.to_string();

    let pickup = store
        .insert_pickup(PickupDoc {
            email,
            date,
            location: request.location,
            pickup_type: request.pickup_type,
            time: request.time,
            phone: request.phone,
            materials: request.materials,
            notes: request.notes,
            status: PickupStatus::Scheduled,
            ..Default::default()
        })
        .await?;

    let award = XpAction::PickupScheduled.award();
    let applied = award_xp(store, &pickup.email, XpAction::PickupScheduled).await?;
    if !applied {
        warn!("Pickup {} owner {} has no account", pickup.id_hex(), pickup.email);
    }

    info!(
        "Scheduled pickup {} for {} ({} items)",
        pickup.id_hex(),
        pickup.email,
        pickup.item_count()
    );
    journal
        .record(
            ActivityEvent::new(ActivityKind::PickupScheduled, &pickup.email)
                .with_award(award.xp, award.streak)
                .with_pickup(pickup.id_hex())
                .with_applied(applied),
        )
        .await;

    Ok(pickup.into())
}

/// A user's pickups, newest first
pub async fn list_for(store: &dyn RecordStore, email: &str) -> Result<Vec<PickupView>> {
    let email = required(email, "email")?;
    let pickups = store.pickups_for(email).await?;
    Ok(pickups.into_iter().map(PickupView::from).collect())
}

/// Mark a pickup completed and award XP plus one streak to its owner
///
/// Not idempotent: completing the same pickup again awards again.
pub async fn complete(
    store: &dyn RecordStore,
    journal: &ActivityJournal,
    pickup_id: &str,
) -> Result<PickupView> {
    let id = ObjectId::parse_str(required(pickup_id, "id")?)?;

    let Some(pickup) = store.complete_pickup(id).await? else {
        return Err(GreenpointError::NotFound(format!("Pickup {} not found", id)));
    };

    let award = XpAction::PickupCompleted.award();
    let applied = award_xp(store, &pickup.email, XpAction::PickupCompleted).await?;

    info!("Completed pickup {} for {}", id, pickup.email);
    journal
        .record(
            ActivityEvent::new(ActivityKind::PickupCompleted, &pickup.email)
                .with_award(award.xp, award.streak)
                .with_pickup(id.to_hex())
                .with_applied(applied),
        )
        .await;

    Ok(pickup.into())
}
