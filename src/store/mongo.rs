//! MongoDB-backed record store

use bson::{doc, oid::ObjectId, Bson, DateTime};
use tracing::{debug, info};

use super::RecordStore;
use crate::db::schemas::{
    PickupDoc, PickupStatus, PledgeDoc, UserDoc, PICKUP_COLLECTION, PLEDGE_COLLECTION,
    USER_COLLECTION,
};
use crate::db::{MongoClient, MongoCollection};
use crate::types::{GreenpointError, Result};

/// Production store over three collections
pub struct MongoStore {
    client: MongoClient,
    users: MongoCollection<UserDoc>,
    pickups: MongoCollection<PickupDoc>,
    pledges: MongoCollection<PledgeDoc>,
}

impl MongoStore {
    /// Open all collections, creating indexes
    pub async fn open(client: MongoClient) -> Result<Self> {
        let users = client.collection::<UserDoc>(USER_COLLECTION).await?;
        let pickups = client.collection::<PickupDoc>(PICKUP_COLLECTION).await?;
        let pledges = client.collection::<PledgeDoc>(PLEDGE_COLLECTION).await?;

        info!(
            "Record store ready on database '{}' ({}, {}, {})",
            client.db_name(),
            USER_COLLECTION,
            PICKUP_COLLECTION,
            PLEDGE_COLLECTION
        );

        Ok(Self {
            client,
            users,
            pickups,
            pledges,
        })
    }
}

fn newest_first() -> bson::Document {
    doc! { "metadata.created_at": -1, "_id": -1 }
}

fn to_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait::async_trait]
impl RecordStore for MongoStore {
    async fn insert_user(&self, user: UserDoc) -> Result<UserDoc> {
        let email = user.email.clone();
        self.users.insert_one(user).await.map_err(|e| match e {
            GreenpointError::AlreadyExists(_) => {
                GreenpointError::AlreadyExists(format!("User {} already exists", email))
            }
            other => other,
        })
    }

    async fn find_user(&self, email: &str) -> Result<Option<UserDoc>> {
        self.users.find_one(doc! { "email": email }).await
    }

    async fn increment_user(&self, email: &str, xp: i64, streak: i64) -> Result<bool> {
        let result = self
            .users
            .update_one(
                doc! { "email": email },
                doc! {
                    "$inc": { "xp": xp, "streak": streak },
                    "$set": { "metadata.updated_at": DateTime::now() }
                },
            )
            .await?;

        if result.matched_count == 0 {
            debug!("No user {} to increment", email);
        }
        Ok(result.matched_count > 0)
    }

    async fn replace_badges_if_longer(&self, email: &str, badges: Vec<String>) -> Result<bool> {
        let Some(last) = badges.len().checked_sub(1) else {
            return Ok(false);
        };

        // Matches only while the stored list has fewer than badges.len() entries
        let mut filter = doc! { "email": email };
        filter.insert(format!("badges.{}", last), doc! { "$exists": false });

        let result = self
            .users
            .update_one(
                filter,
                doc! {
                    "$set": {
                        "badges": badges,
                        "metadata.updated_at": DateTime::now()
                    }
                },
            )
            .await?;

        Ok(result.modified_count > 0)
    }

    async fn top_users(&self, limit: usize) -> Result<Vec<UserDoc>> {
        self.users
            .find_many(doc! {}, Some(doc! { "xp": -1 }), Some(to_limit(limit)))
            .await
    }

    async fn insert_pickup(&self, pickup: PickupDoc) -> Result<PickupDoc> {
        self.pickups.insert_one(pickup).await
    }

    async fn pickups_for(&self, email: &str) -> Result<Vec<PickupDoc>> {
        self.pickups
            .find_many(doc! { "email": email }, Some(newest_first()), None)
            .await
    }

    async fn complete_pickup(&self, id: ObjectId) -> Result<Option<PickupDoc>> {
        self.pickups
            .find_one_and_update(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "status": PickupStatus::Completed.as_str(),
                        "metadata.updated_at": DateTime::now()
                    }
                },
            )
            .await
    }

    async fn total_material_count(&self) -> Result<u64> {
        let pipeline = vec![doc! {
            "$group": {
                "_id": Bson::Null,
                "total": { "$sum": { "$size": { "$ifNull": ["$materials", []] } } }
            }
        }];

        let rows = self.pickups.aggregate(pipeline).await?;
        let total = match rows.first().and_then(|row| row.get("total")) {
            Some(Bson::Int32(n)) => i64::from(*n),
            Some(Bson::Int64(n)) => *n,
            Some(Bson::Double(n)) => *n as i64,
            // No pickups at all
            _ => 0,
        };

        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn insert_pledge(&self, pledge: PledgeDoc) -> Result<PledgeDoc> {
        self.pledges.insert_one(pledge).await
    }

    async fn recent_pledges(&self, limit: usize) -> Result<Vec<PledgeDoc>> {
        self.pledges
            .find_many(doc! {}, Some(newest_first()), Some(to_limit(limit)))
            .await
    }

    async fn ping(&self) -> Result<()> {
        self.client.ping().await
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}
