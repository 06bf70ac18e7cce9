//! Publish trigger cycle: find due posts, publish, record outcomes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use postpilot_core::SocialPostId;
use postpilot_content::{Channel, SocialPost};

use crate::store::PostStore;

use super::SchedulerError;

/// Outbound publish failure.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("channel rejected the post: {0}")]
    Rejected(String),
    #[error("network failure: {0}")]
    Network(String),
}

/// Seam to the social networks. The real per-channel API calls live behind
/// this trait; the service only cares about success/failure.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, post: &SocialPost) -> Result<(), PublishError>;
}

/// Publisher that accepts everything. Stands in for the channel APIs in dev.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubPublisher;

#[async_trait]
impl Publisher for StubPublisher {
    async fn publish(&self, post: &SocialPost) -> Result<(), PublishError> {
        info!(
            post_id = %post.id_typed(),
            channel = %post.channel(),
            "stub publish (no channel API configured)"
        );
        Ok(())
    }
}

/// Outcome of one post within a trigger cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostOutcome {
    pub post_id: SocialPostId,
    pub channel: Channel,
    /// `published`, `failed`, or `skipped` (lost the claim race).
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of one trigger cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub processed: usize,
    pub results: Vec<PostOutcome>,
}

/// Executes one trigger cycle over the due posts.
///
/// Driven externally (cron hitting the API); holds no loop of its own. Each
/// post is claimed (Scheduled → Publishing) before the outbound call so
/// overlapping cycles cannot double-publish, and each post's
/// publish-and-record sequence is isolated: an error there marks that post
/// Failed and the cycle moves on.
pub struct PublishRunner<P, Pub> {
    posts: P,
    publisher: Pub,
}

impl<P, Pub> PublishRunner<P, Pub>
where
    P: PostStore,
    Pub: Publisher,
{
    pub fn new(posts: P, publisher: Pub) -> Self {
        Self { posts, publisher }
    }

    /// The read-only half of the cycle, exposed for the API.
    pub fn posts_ready_to_publish(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<SocialPost>, SchedulerError> {
        Ok(self.posts.due_for_publish(now)?)
    }

    /// Record a publish outcome for a single post.
    pub fn mark_post_published(
        &self,
        id: SocialPostId,
        success: bool,
        now: DateTime<Utc>,
    ) -> Result<(), SchedulerError> {
        Ok(self.posts.record_publish_result(id, success, now)?)
    }

    /// Run one cycle: claim and publish every due post, recording outcomes.
    ///
    /// Only the initial due query can fail the cycle as a whole; per-post
    /// errors are absorbed into that post's outcome.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<RunReport, SchedulerError> {
        let due = self.posts.due_for_publish(now)?;
        let mut report = RunReport {
            processed: due.len(),
            results: Vec::with_capacity(due.len()),
        };

        for post in due {
            report.results.push(self.process_one(post, now).await);
        }

        info!(
            processed = report.processed,
            published = report.results.iter().filter(|r| r.status == "published").count(),
            failed = report.results.iter().filter(|r| r.status == "failed").count(),
            "publish cycle finished"
        );
        Ok(report)
    }

    async fn process_one(&self, post: SocialPost, now: DateTime<Utc>) -> PostOutcome {
        let id = post.id_typed();
        let channel = post.channel();

        match self.try_publish(&post, now).await {
            Ok(true) => PostOutcome {
                post_id: id,
                channel,
                status: "published",
                error: None,
            },
            Ok(false) => {
                debug!(post_id = %id, "post already claimed by another cycle, skipping");
                PostOutcome {
                    post_id: id,
                    channel,
                    status: "skipped",
                    error: None,
                }
            }
            Err(error) => {
                warn!(post_id = %id, %channel, error = %error, "publish failed");
                // Best effort: the post may already be terminal if the failure
                // happened after recording.
                if let Err(mark_err) = self.posts.record_publish_result(id, false, now) {
                    warn!(post_id = %id, error = %mark_err, "failed to mark post as failed");
                }
                PostOutcome {
                    post_id: id,
                    channel,
                    status: "failed",
                    error: Some(error),
                }
            }
        }
    }

    /// Ok(false): lost the claim race. Err: the attempt failed and the post
    /// should be marked Failed.
    async fn try_publish(&self, post: &SocialPost, now: DateTime<Utc>) -> Result<bool, String> {
        let id = post.id_typed();

        if !self
            .posts
            .claim_for_publish(id)
            .map_err(|e| e.to_string())?
        {
            return Ok(false);
        }

        self.publisher
            .publish(post)
            .await
            .map_err(|e| e.to_string())?;

        self.posts
            .record_publish_result(id, true, now)
            .map_err(|e| e.to_string())?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::TimeZone;

    use postpilot_core::ContentItemId;
    use postpilot_content::PostStatus;

    use crate::store::InMemoryPostStore;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, h, 0, 0).unwrap()
    }

    fn scheduled_post(store: &InMemoryPostStore, channel: Channel, slot: DateTime<Utc>) -> SocialPostId {
        let id = store
            .insert(
                SocialPost::new_draft(
                    SocialPostId::new(),
                    ContentItemId::new(),
                    channel,
                    "body",
                    None,
                    None,
                    vec![],
                    t(0),
                )
                .unwrap(),
            )
            .unwrap();
        store.transition_to_scheduled(id, slot).unwrap();
        id
    }

    /// Fails for a configured channel, counts calls.
    struct FlakyPublisher {
        fail_channel: Channel,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Publisher for &FlakyPublisher {
        async fn publish(&self, post: &SocialPost) -> Result<(), PublishError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if post.channel() == self.fail_channel {
                Err(PublishError::Rejected("simulated channel error".into()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn publishes_due_posts_and_records_success() {
        let store = InMemoryPostStore::arc();
        let id = scheduled_post(&store, Channel::Linkedin, t(9));
        let runner = PublishRunner::new(store.clone(), StubPublisher);

        let report = runner.run_once(t(10)).await.unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.results[0].status, "published");

        let post = store.get(id).unwrap().unwrap();
        assert_eq!(post.status(), PostStatus::Published);
        assert_eq!(post.published_at(), Some(t(10)));
    }

    #[tokio::test]
    async fn future_posts_are_left_alone() {
        let store = InMemoryPostStore::arc();
        let id = scheduled_post(&store, Channel::Linkedin, t(18));
        let runner = PublishRunner::new(store.clone(), StubPublisher);

        let report = runner.run_once(t(10)).await.unwrap();
        assert_eq!(report.processed, 0);

        let post = store.get(id).unwrap().unwrap();
        assert_eq!(post.status(), PostStatus::Scheduled);
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_cycle() {
        let store = InMemoryPostStore::arc();
        let failing = scheduled_post(&store, Channel::Instagram, t(8));
        let ok_before = scheduled_post(&store, Channel::Linkedin, t(7));
        let ok_after = scheduled_post(&store, Channel::Linkedin, t(9));

        let publisher = FlakyPublisher {
            fail_channel: Channel::Instagram,
            calls: AtomicUsize::new(0),
        };
        let runner = PublishRunner::new(store.clone(), &publisher);

        let report = runner.run_once(t(10)).await.unwrap();
        assert_eq!(report.processed, 3);
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 3);

        assert_eq!(
            store.get(ok_before).unwrap().unwrap().status(),
            PostStatus::Published
        );
        assert_eq!(
            store.get(ok_after).unwrap().unwrap().status(),
            PostStatus::Published
        );

        let failed = store.get(failing).unwrap().unwrap();
        assert_eq!(failed.status(), PostStatus::Failed);
        assert_eq!(failed.published_at(), None);

        let outcome = report
            .results
            .iter()
            .find(|r| r.post_id == failing)
            .unwrap();
        assert_eq!(outcome.status, "failed");
        assert!(outcome.error.as_deref().unwrap_or("").contains("simulated"));
    }

    /// Claims `victim` while publishing some other post, impersonating an
    /// overlapping trigger cycle.
    struct RacingPublisher {
        store: Arc<InMemoryPostStore>,
        victim: SocialPostId,
    }

    #[async_trait]
    impl Publisher for &RacingPublisher {
        async fn publish(&self, post: &SocialPost) -> Result<(), PublishError> {
            if post.id_typed() != self.victim {
                let _ = self.store.claim_for_publish(self.victim);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn posts_claimed_by_a_concurrent_cycle_are_skipped() {
        let store = InMemoryPostStore::arc();
        let first = scheduled_post(&store, Channel::Linkedin, t(7));
        let victim = scheduled_post(&store, Channel::Linkedin, t(9));

        let publisher = RacingPublisher {
            store: store.clone(),
            victim,
        };
        let runner = PublishRunner::new(store.clone(), &publisher);

        // Both posts are due; the overlapping cycle steals the second one's
        // claim while the first is being published.
        let report = runner.run_once(t(10)).await.unwrap();
        assert_eq!(report.processed, 2);

        let by_id = |id| report.results.iter().find(|r| r.post_id == id).unwrap();
        assert_eq!(by_id(first).status, "published");
        assert_eq!(by_id(victim).status, "skipped");

        // The skipped post was not touched: still claimed by the other cycle.
        let post = store.get(victim).unwrap().unwrap();
        assert_eq!(post.status(), PostStatus::Publishing);
    }

    #[tokio::test]
    async fn mark_post_published_is_terminal() {
        let store = InMemoryPostStore::arc();
        let id = scheduled_post(&store, Channel::Facebook, t(9));
        let runner = PublishRunner::new(store.clone(), StubPublisher);

        runner.mark_post_published(id, true, t(10)).unwrap();
        let err = runner.mark_post_published(id, false, t(11)).unwrap_err();
        assert!(matches!(err, SchedulerError::Store(_)));
    }
}
