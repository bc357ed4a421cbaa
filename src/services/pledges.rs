//! Pledges

use serde::{Deserialize, Serialize};
use tracing::info;

use super::required;
use crate::db::schemas::PledgeDoc;
use crate::gamification::{award_xp, XpAction};
use crate::logging::{ActivityEvent, ActivityJournal, ActivityKind};
use crate::store::RecordStore;
use crate::types::Result;

/// Size of the public pledge feed
pub const PLEDGE_FEED_SIZE: usize = 20;

#[derive(Debug, Default, Deserialize)]
pub struct AddPledgeRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub pledge: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PledgeView {
    pub id: String,
    pub email: String,
    pub pledge: String,
    pub created_at: String,
}

impl From<PledgeDoc> for PledgeView {
    fn from(doc: PledgeDoc) -> Self {
        Self {
            id: doc._id.map(|id| id.to_hex()).unwrap_or_default(),
            created_at: doc.metadata.created_rfc3339(),
            email: doc.email,
            pledge: doc.pledge,
        }
    }
}

/// Store a pledge and award its XP
pub async fn add(
    store: &dyn RecordStore,
    journal: &ActivityJournal,
    request: AddPledgeRequest,
) -> Result<PledgeView> {
    let email = required(&request.email, "email")?.to_string();
    let text = required(&request.pledge, "pledge")?.to_string();

    let pledge = store.insert_pledge(PledgeDoc::new(email, text)).await?;

    let award = XpAction::PledgeSubmitted.award();
    let applied = award_xp(store, &pledge.email, XpAction::PledgeSubmitted).await?;

    info!("Pledge recorded for {}", pledge.email);
    journal
        .record(
            ActivityEvent::new(ActivityKind::PledgeSubmitted, &pledge.email)
                .with_award(award.xp, award.streak)
                .with_applied(applied),
        )
        .await;

    Ok(pledge.into())
}

/// The public feed, newest first
pub async fn list_recent(store: &dyn RecordStore) -> Result<Vec<PledgeView>> {
    let pledges = store.recent_pledges(PLEDGE_FEED_SIZE).await?;
    Ok(pledges.into_iter().map(PledgeView::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::UserDoc;
    use crate::store::testing::FailingIncrements;
    use crate::store::MemoryStore;
    use crate::types::GreenpointError;

    fn pledge(email: &str, text: &str) -> AddPledgeRequest {
        AddPledgeRequest {
            email: email.into(),
            pledge: text.into(),
        }
    }

    #[tokio::test]
    async fn test_pledge_awards_five_xp() {
        let store = MemoryStore::new();
        store
            .insert_user(UserDoc::new("p@x.y".into(), "h".into()))
            .await
            .unwrap();

        let view = add(&store, &ActivityJournal::new(), pledge("p@x.y", "No more straws"))
            .await
            .unwrap();
        assert_eq!(view.pledge, "No more straws");
        assert_eq!(store.find_user("p@x.y").await.unwrap().unwrap().xp, 5);
    }

    #[tokio::test]
    async fn test_failed_award_keeps_pledge() {
        let store = FailingIncrements::default();
        store
            .insert_user(UserDoc::new("f@x.y".into(), "h".into()))
            .await
            .unwrap();

        let err = add(&store, &ActivityJournal::new(), pledge("f@x.y", "Compost weekly"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "STORE_ERROR");
        assert_eq!(err.status_code(), hyper::StatusCode::SERVICE_UNAVAILABLE);

        let feed = list_recent(&store).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].pledge, "Compost weekly");
        assert_eq!(store.find_user("f@x.y").await.unwrap().unwrap().xp, 0);
    }

    #[tokio::test]
    async fn test_feed_is_capped_and_newest_first() {
        let store = MemoryStore::new();
        let journal = ActivityJournal::new();
        for i in 0..25 {
            add(&store, &journal, pledge("f@x.y", &format!("pledge {}", i)))
                .await
                .unwrap();
        }

        let feed = list_recent(&store).await.unwrap();
        assert_eq!(feed.len(), PLEDGE_FEED_SIZE);
        assert_eq!(feed[0].pledge, "pledge 24");
        assert_eq!(feed[19].pledge, "pledge 5");
    }

    #[tokio::test]
    async fn test_blank_pledge_rejected() {
        let store = MemoryStore::new();
        let result = add(&store, &ActivityJournal::new(), pledge("p@x.y", "   ")).await;
        assert!(matches!(result, Err(GreenpointError::Validation(_))));
    }
}
