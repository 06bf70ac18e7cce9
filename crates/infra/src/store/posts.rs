//! Social post storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use postpilot_core::{ContentItemId, SocialPostId};
use postpilot_content::{PostStatus, SocialPost};

use super::StoreError;

/// Post store abstraction.
///
/// The transition operations apply their field pair (status + scheduled_for,
/// or status + published_at) atomically; partial updates are unrepresentable.
pub trait PostStore: Send + Sync {
    /// Insert a new post.
    fn insert(&self, post: SocialPost) -> Result<SocialPostId, StoreError>;

    /// Get a post by id.
    fn get(&self, id: SocialPostId) -> Result<Option<SocialPost>, StoreError>;

    /// All posts of a content item, in creation order.
    fn list_for_content_item(&self, item: ContentItemId) -> Result<Vec<SocialPost>, StoreError>;

    /// Scheduled posts whose slot has passed, ascending by `scheduled_for`.
    fn due_for_publish(&self, now: DateTime<Utc>) -> Result<Vec<SocialPost>, StoreError>;

    /// Draft → Scheduled with the given slot.
    fn transition_to_scheduled(
        &self,
        id: SocialPostId,
        slot: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Conditional Scheduled → Publishing claim.
    ///
    /// Returns `Ok(false)` when the post is not in Scheduled anymore (another
    /// trigger cycle won the race, or the post is terminal); the caller
    /// skips it rather than treating that as an error.
    fn claim_for_publish(&self, id: SocialPostId) -> Result<bool, StoreError>;

    /// Record the outcome of a publish attempt: Published + `published_at`,
    /// or Failed with `published_at` cleared. Terminal states are frozen.
    fn record_publish_result(
        &self,
        id: SocialPostId,
        success: bool,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

/// In-memory post store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPostStore {
    posts: RwLock<HashMap<SocialPostId, SocialPost>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
        }
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn with_post<T>(
        &self,
        id: SocialPostId,
        f: impl FnOnce(&mut SocialPost) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut posts = self.posts.write().unwrap();
        let post = posts
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        f(post)
    }
}

impl PostStore for InMemoryPostStore {
    fn insert(&self, post: SocialPost) -> Result<SocialPostId, StoreError> {
        let mut posts = self.posts.write().unwrap();
        let id = post.id_typed();
        if posts.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }
        posts.insert(id, post);
        Ok(id)
    }

    fn get(&self, id: SocialPostId) -> Result<Option<SocialPost>, StoreError> {
        Ok(self.posts.read().unwrap().get(&id).cloned())
    }

    fn list_for_content_item(&self, item: ContentItemId) -> Result<Vec<SocialPost>, StoreError> {
        let posts = self.posts.read().unwrap();
        let mut result: Vec<_> = posts
            .values()
            .filter(|p| p.content_item_id() == item)
            .cloned()
            .collect();

        // Creation order; ids are v7 so they tie-break identical timestamps.
        result.sort_by_key(|p| (p.created_at(), p.id_typed()));
        Ok(result)
    }

    fn due_for_publish(&self, now: DateTime<Utc>) -> Result<Vec<SocialPost>, StoreError> {
        let posts = self.posts.read().unwrap();
        let mut result: Vec<_> = posts
            .values()
            .filter(|p| p.is_due(now))
            .cloned()
            .collect();

        result.sort_by_key(|p| (p.scheduled_for(), p.id_typed()));
        Ok(result)
    }

    fn transition_to_scheduled(
        &self,
        id: SocialPostId,
        slot: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.with_post(id, |post| {
            post.schedule_at(slot)?;
            Ok(())
        })
    }

    fn claim_for_publish(&self, id: SocialPostId) -> Result<bool, StoreError> {
        self.with_post(id, |post| {
            if post.status() != PostStatus::Scheduled {
                return Ok(false);
            }
            post.claim_for_publish()?;
            Ok(true)
        })
    }

    fn record_publish_result(
        &self,
        id: SocialPostId,
        success: bool,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.with_post(id, |post| {
            post.record_publish_result(success, now)?;
            Ok(())
        })
    }
}

impl<T: PostStore + ?Sized> PostStore for Arc<T> {
    fn insert(&self, post: SocialPost) -> Result<SocialPostId, StoreError> {
        (**self).insert(post)
    }

    fn get(&self, id: SocialPostId) -> Result<Option<SocialPost>, StoreError> {
        (**self).get(id)
    }

    fn list_for_content_item(&self, item: ContentItemId) -> Result<Vec<SocialPost>, StoreError> {
        (**self).list_for_content_item(item)
    }

    fn due_for_publish(&self, now: DateTime<Utc>) -> Result<Vec<SocialPost>, StoreError> {
        (**self).due_for_publish(now)
    }

    fn transition_to_scheduled(
        &self,
        id: SocialPostId,
        slot: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        (**self).transition_to_scheduled(id, slot)
    }

    fn claim_for_publish(&self, id: SocialPostId) -> Result<bool, StoreError> {
        (**self).claim_for_publish(id)
    }

    fn record_publish_result(
        &self,
        id: SocialPostId,
        success: bool,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        (**self).record_publish_result(id, success, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use postpilot_content::Channel;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, h, 0, 0).unwrap()
    }

    fn draft(item: ContentItemId, channel: Channel) -> SocialPost {
        SocialPost::new_draft(
            SocialPostId::new(),
            item,
            channel,
            "body",
            None,
            None,
            vec![],
            t(8),
        )
        .unwrap()
    }

    #[test]
    fn insert_rejects_duplicates() {
        let store = InMemoryPostStore::new();
        let post = draft(ContentItemId::new(), Channel::Linkedin);

        store.insert(post.clone()).unwrap();
        assert!(matches!(
            store.insert(post),
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[test]
    fn list_for_content_item_is_in_creation_order() {
        let store = InMemoryPostStore::new();
        let item = ContentItemId::new();

        let mut ids = Vec::new();
        for _ in 0..4 {
            let post = draft(item, Channel::Instagram);
            ids.push(store.insert(post).unwrap());
        }
        // A post for another item must not appear.
        store.insert(draft(ContentItemId::new(), Channel::Instagram)).unwrap();

        let listed: Vec<_> = store
            .list_for_content_item(item)
            .unwrap()
            .into_iter()
            .map(|p| p.id_typed())
            .collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn due_returns_only_ripe_scheduled_posts_in_slot_order() {
        let store = InMemoryPostStore::new();
        let item = ContentItemId::new();

        let late = store.insert(draft(item, Channel::Linkedin)).unwrap();
        let early = store.insert(draft(item, Channel::Linkedin)).unwrap();
        let future = store.insert(draft(item, Channel::Linkedin)).unwrap();
        let never = store.insert(draft(item, Channel::Linkedin)).unwrap();

        store.transition_to_scheduled(late, t(11)).unwrap();
        store.transition_to_scheduled(early, t(9)).unwrap();
        store.transition_to_scheduled(future, t(18)).unwrap();
        let _ = never; // stays Draft

        let due: Vec<_> = store
            .due_for_publish(t(12))
            .unwrap()
            .into_iter()
            .map(|p| p.id_typed())
            .collect();
        assert_eq!(due, vec![early, late]);
    }

    #[test]
    fn transition_to_scheduled_is_guarded() {
        let store = InMemoryPostStore::new();
        let id = store
            .insert(draft(ContentItemId::new(), Channel::Tiktok))
            .unwrap();

        store.transition_to_scheduled(id, t(10)).unwrap();
        assert!(matches!(
            store.transition_to_scheduled(id, t(11)),
            Err(StoreError::Domain(_))
        ));

        assert!(matches!(
            store.transition_to_scheduled(SocialPostId::new(), t(10)),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn claim_succeeds_once_then_reports_contention() {
        let store = InMemoryPostStore::new();
        let id = store
            .insert(draft(ContentItemId::new(), Channel::Facebook))
            .unwrap();
        store.transition_to_scheduled(id, t(9)).unwrap();

        assert!(store.claim_for_publish(id).unwrap());
        assert!(!store.claim_for_publish(id).unwrap());

        let post = store.get(id).unwrap().unwrap();
        assert_eq!(post.status(), PostStatus::Publishing);
    }

    #[test]
    fn record_result_reaches_terminal_states() {
        let store = InMemoryPostStore::new();
        let item = ContentItemId::new();

        let ok = store.insert(draft(item, Channel::Linkedin)).unwrap();
        let bad = store.insert(draft(item, Channel::Linkedin)).unwrap();
        store.transition_to_scheduled(ok, t(9)).unwrap();
        store.transition_to_scheduled(bad, t(9)).unwrap();

        store.record_publish_result(ok, true, t(10)).unwrap();
        store.record_publish_result(bad, false, t(10)).unwrap();

        let ok = store.get(ok).unwrap().unwrap();
        assert_eq!(ok.status(), PostStatus::Published);
        assert_eq!(ok.published_at(), Some(t(10)));

        let bad = store.get(bad).unwrap().unwrap();
        assert_eq!(bad.status(), PostStatus::Failed);
        assert_eq!(bad.published_at(), None);

        // Terminal states are frozen.
        assert!(matches!(
            store.record_publish_result(ok.id_typed(), false, t(11)),
            Err(StoreError::Domain(_))
        ));
    }
}
