//! Record store abstraction
//!
//! Handlers never touch a database handle directly; they get a
//! `RecordStore` trait object. `MongoStore` backs production and
//! `MemoryStore` backs dev mode and tests.
//!
//! There are no cross-collection transactions. A pickup can be saved while the
//! XP increment that follows it fails, and that record stays committed.

mod memory;
mod mongo;
#[cfg(test)]
pub(crate) mod testing;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use bson::oid::ObjectId;

use crate::db::schemas::{PickupDoc, PledgeDoc, UserDoc};
use crate::types::Result;

/// Persistence operations required by the service layer
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new user. Fails with `AlreadyExists` when the email is taken.
    async fn insert_user(&self, user: UserDoc) -> Result<UserDoc>;

    async fn find_user(&self, email: &str) -> Result<Option<UserDoc>>;

    /// Atomically add to a user's XP and streak.
    ///
    /// Returns `false` when no user has this email, which is not an error.
    async fn increment_user(&self, email: &str, xp: i64, streak: i64) -> Result<bool>;

    /// Replace the stored badge list, but only if it holds fewer entries
    /// than `badges`.
    ///
    /// The count comparison happens inside the store's update, so a caller
    /// holding a stale user can never shrink the list. Returns whether a
    /// write happened.
    async fn replace_badges_if_longer(&self, email: &str, badges: Vec<String>) -> Result<bool>;

    /// Users ordered by XP, highest first
    async fn top_users(&self, limit: usize) -> Result<Vec<UserDoc>>;

    async fn insert_pickup(&self, pickup: PickupDoc) -> Result<PickupDoc>;

    /// Pickups owned by `email`, newest first
    async fn pickups_for(&self, email: &str) -> Result<Vec<PickupDoc>>;

    /// Mark a pickup completed and return its new state, `None` if absent
    async fn complete_pickup(&self, id: ObjectId) -> Result<Option<PickupDoc>>;

    /// Sum of material counts over every pickup regardless of status
    async fn total_material_count(&self) -> Result<u64>;

    async fn insert_pledge(&self, pledge: PledgeDoc) -> Result<PledgeDoc>;

    /// Most recent pledges, newest first
    async fn recent_pledges(&self, limit: usize) -> Result<Vec<PledgeDoc>>;

    /// Check the backend is reachable
    async fn ping(&self) -> Result<()>;

    /// Short backend name for health output
    fn backend(&self) -> &'static str;
}
