//! In-memory record store
//!
//! Concurrent maps keyed like the Mongo unique keys. A per-store insertion
//! sequence stands in for creation time so ordering is deterministic even
//! when two records share a timestamp.

use bson::oid::ObjectId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use super::RecordStore;
use crate::db::schemas::{Metadata, PickupDoc, PickupStatus, PledgeDoc, UserDoc};
use crate::types::{GreenpointError, Result};

/// Stored record with its insertion sequence
#[derive(Debug, Clone)]
struct Sequenced<T> {
    seq: u64,
    doc: T,
}

/// DashMap-backed store for dev mode and tests
#[derive(Default)]
pub struct MemoryStore {
    /// email -> user
    users: DashMap<String, Sequenced<UserDoc>>,
    pickups: DashMap<ObjectId, Sequenced<PickupDoc>>,
    pledges: DashMap<ObjectId, Sequenced<PledgeDoc>>,
    next_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    #[cfg(test)]
    pub(crate) fn user_count(&self) -> usize {
        self.users.len()
    }
}

/// Sort newest first: higher sequence wins
fn newest_first<T: Clone>(mut records: Vec<Sequenced<T>>) -> Vec<T> {
    records.sort_by(|a, b| b.seq.cmp(&a.seq));
    records.into_iter().map(|r| r.doc).collect()
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn insert_user(&self, mut user: UserDoc) -> Result<UserDoc> {
        match self.users.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(GreenpointError::AlreadyExists(format!(
                "User {} already exists",
                user.email
            ))),
            Entry::Vacant(slot) => {
                user._id = Some(ObjectId::new());
                user.metadata = Metadata::new();
                let seq = self.next_seq();
                slot.insert(Sequenced {
                    seq,
                    doc: user.clone(),
                });
                Ok(user)
            }
        }
    }

    async fn find_user(&self, email: &str) -> Result<Option<UserDoc>> {
        Ok(self.users.get(email).map(|entry| entry.doc.clone()))
    }

    async fn increment_user(&self, email: &str, xp: i64, streak: i64) -> Result<bool> {
        // get_mut holds the shard lock, so the add is atomic per user
        match self.users.get_mut(email) {
            Some(mut entry) => {
                entry.doc.xp += xp;
                entry.doc.streak += streak;
                entry.doc.metadata.touch();
                Ok(true)
            }
            None => {
                debug!("No user {} to increment", email);
                Ok(false)
            }
        }
    }

    async fn replace_badges_if_longer(&self, email: &str, badges: Vec<String>) -> Result<bool> {
        let Some(mut entry) = self.users.get_mut(email) else {
            return Ok(false);
        };
        if entry.doc.badges.len() >= badges.len() {
            return Ok(false);
        }
        entry.doc.badges = badges;
        entry.doc.metadata.touch();
        Ok(true)
    }

    async fn top_users(&self, limit: usize) -> Result<Vec<UserDoc>> {
        let mut users: Vec<Sequenced<UserDoc>> =
            self.users.iter().map(|entry| entry.value().clone()).collect();
        // Ties keep registration order
        users.sort_by(|a, b| b.doc.xp.cmp(&a.doc.xp).then(a.seq.cmp(&b.seq)));
        Ok(users.into_iter().take(limit).map(|u| u.doc).collect())
    }

    async fn insert_pickup(&self, mut pickup: PickupDoc) -> Result<PickupDoc> {
        let id = ObjectId::new();
        pickup._id = Some(id);
        pickup.metadata = Metadata::new();
        let seq = self.next_seq();
        self.pickups.insert(
            id,
            Sequenced {
                seq,
                doc: pickup.clone(),
            },
        );
        Ok(pickup)
    }

    async fn pickups_for(&self, email: &str) -> Result<Vec<PickupDoc>> {
        let owned: Vec<Sequenced<PickupDoc>> = self
            .pickups
            .iter()
            .filter(|entry| entry.doc.email == email)
            .map(|entry| entry.value().clone())
            .collect();
        Ok(newest_first(owned))
    }

    async fn complete_pickup(&self, id: ObjectId) -> Result<Option<PickupDoc>> {
        Ok(self.pickups.get_mut(&id).map(|mut entry| {
            entry.doc.status = PickupStatus::Completed;
            entry.doc.metadata.touch();
            entry.doc.clone()
        }))
    }

    async fn total_material_count(&self) -> Result<u64> {
        Ok(self.pickups.iter().map(|entry| entry.doc.item_count()).sum())
    }

    async fn insert_pledge(&self, mut pledge: PledgeDoc) -> Result<PledgeDoc> {
        let id = ObjectId::new();
        pledge._id = Some(id);
        pledge.metadata = Metadata::new();
        let seq = self.next_seq();
        self.pledges.insert(
            id,
            Sequenced {
                seq,
                doc: pledge.clone(),
            },
        );
        Ok(pledge)
    }

    async fn recent_pledges(&self, limit: usize) -> Result<Vec<PledgeDoc>> {
        let all: Vec<Sequenced<PledgeDoc>> =
            self.pledges.iter().map(|entry| entry.value().clone()).collect();
        Ok(newest_first(all).into_iter().take(limit).collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
