//! In-process review change notifications.
//!
//! Publishing a `reviewAdded` signal never carries the review itself; each
//! subscriber waits a short delay and re-reads the list from the catalog, so
//! delivery is refresh-on-signal and eventually consistent.

use std::time::Duration;

use futures::stream::{self, Stream};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use trailblazer_core::Review;
use trailblazer_db::Catalog;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "reviewAdded", rename_all = "camelCase")]
pub struct ReviewAdded {
    pub shoe_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct ReviewEvents {
    sender: broadcast::Sender<ReviewAdded>,
}

impl Default for ReviewEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewEvents {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ReviewAdded> {
        self.sender.subscribe()
    }

    /// Signals that `shoe_id` has a new review. Returns how many subscribers
    /// were listening.
    pub fn review_added(&self, shoe_id: Uuid) -> usize {
        match self.sender.send(ReviewAdded { shoe_id }) {
            Ok(listeners) => listeners,
            Err(_) => {
                tracing::trace!(%shoe_id, "reviewAdded with no subscribers");
                0
            }
        }
    }
}

/// Yields the refreshed review list for `shoe_id` after each matching
/// signal, waiting `delay` first. A lagged receiver refreshes once for
/// whatever it missed. The stream ends when the channel closes.
pub fn review_updates(
    catalog: Catalog,
    receiver: broadcast::Receiver<ReviewAdded>,
    shoe_id: Uuid,
    delay: Duration,
) -> impl Stream<Item = Vec<Review>> {
    stream::unfold((catalog, receiver), move |(catalog, mut receiver)| async move {
        loop {
            match receiver.recv().await {
                Ok(event) if event.shoe_id == shoe_id => break,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(%shoe_id, skipped, "review subscriber lagged; refreshing");
                    break;
                }
                Err(RecvError::Closed) => return None,
            }
        }

        tokio::time::sleep(delay).await;
        let reviews = catalog.list_reviews(shoe_id).await;
        Some((reviews, (catalog, receiver)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use trailblazer_core::{NewReview, ReviewerProfile};
    use trailblazer_db::LocalStore;

    fn make_review(shoe_id: Uuid, content: &str) -> NewReview {
        NewReview::from_profile(
            shoe_id,
            ReviewerProfile {
                user_id: "u-1".to_string(),
                ..ReviewerProfile::default()
            },
            content,
        )
        .expect("review")
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let events = ReviewEvents::new();
        assert_eq!(events.review_added(Uuid::new_v4()), 0);
    }

    #[test]
    fn event_serializes_as_review_added() {
        let id = Uuid::nil();
        let json = serde_json::to_value(ReviewAdded { shoe_id: id }).expect("serialize");
        assert_eq!(json["type"], "reviewAdded");
        assert_eq!(json["shoeId"], id.to_string());
    }

    #[tokio::test]
    async fn signal_triggers_refetch_for_matching_shoe() {
        let catalog = Catalog::local(LocalStore::in_memory());
        let events = ReviewEvents::new();
        let shoe_id = Uuid::new_v4();
        let other_id = Uuid::new_v4();

        let updates = review_updates(
            catalog.clone(),
            events.subscribe(),
            shoe_id,
            Duration::from_millis(5),
        );
        futures::pin_mut!(updates);

        let added = catalog
            .add_review(make_review(shoe_id, "fresh"))
            .await
            .expect("add");
        assert_eq!(events.review_added(other_id), 1);
        assert_eq!(events.review_added(shoe_id), 1);

        let reviews = updates.next().await.expect("update");
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].id, added.id);
    }

    #[tokio::test]
    async fn stream_ends_when_channel_closes() {
        let catalog = Catalog::local(LocalStore::in_memory());
        let events = ReviewEvents::new();
        let receiver = events.subscribe();
        drop(events);

        let updates = review_updates(catalog, receiver, Uuid::new_v4(), Duration::ZERO);
        futures::pin_mut!(updates);
        assert!(updates.next().await.is_none());
    }
}
