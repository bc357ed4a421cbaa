//! Store doubles for service tests

use bson::oid::ObjectId;

use super::{MemoryStore, RecordStore};
use crate::db::schemas::{PickupDoc, PledgeDoc, UserDoc};
use crate::types::{GreenpointError, Result};

/// Memory store whose XP increments always fail
///
/// Records still commit, which models a store that drops between the insert
/// and the award.
#[derive(Default)]
pub struct FailingIncrements {
    pub inner: MemoryStore,
}

#[async_trait::async_trait]
impl RecordStore for FailingIncrements {
    async fn insert_user(&self, user: UserDoc) -> Result<UserDoc> {
        self.inner.insert_user(user).await
    }

    async fn find_user(&self, email: &str) -> Result<Option<UserDoc>> {
        self.inner.find_user(email).await
    }

    async fn increment_user(&self, _email: &str, _xp: i64, _streak: i64) -> Result<bool> {
        Err(GreenpointError::Database("connection reset".into()))
    }

    async fn replace_badges_if_longer(&self, email: &str, badges: Vec<String>) -> Result<bool> {
        self.inner.replace_badges_if_longer(email, badges).await
    }

    async fn top_users(&self, limit: usize) -> Result<Vec<UserDoc>> {
        self.inner.top_users(limit).await
    }

    async fn insert_pickup(&self, pickup: PickupDoc) -> Result<PickupDoc> {
        self.inner.insert_pickup(pickup).await
    }

    async fn pickups_for(&self, email: &str) -> Result<Vec<PickupDoc>> {
        self.inner.pickups_for(email).await
    }

    async fn complete_pickup(&self, id: ObjectId) -> Result<Option<PickupDoc>> {
        self.inner.complete_pickup(id).await
    }

    async fn total_material_count(&self) -> Result<u64> {
        self.inner.total_material_count().await
    }

    async fn insert_pledge(&self, pledge: PledgeDoc) -> Result<PledgeDoc> {
        self.inner.insert_pledge(pledge).await
    }

    async fn recent_pledges(&self, limit: usize) -> Result<Vec<PledgeDoc>> {
        self.inner.recent_pledges(limit).await
    }

    async fn ping(&self) -> Result<()> {
        self.inner.ping().await
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}
