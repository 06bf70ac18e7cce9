//! Social post entity and its publication lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use postpilot_core::{ContentItemId, DomainError, DomainResult, Entity, SocialPostId};

use crate::channel::Channel;

/// Publication lifecycle of a post.
///
/// `Publishing` is the in-flight claim marker: a trigger cycle moves a due post
/// Scheduled → Publishing before calling the external network, so overlapping
/// cycles cannot both pick it up. `Published` and `Failed` are terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Publishing,
    Published,
    Failed,
}

impl PostStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PostStatus::Published | PostStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "DRAFT",
            PostStatus::Scheduled => "SCHEDULED",
            PostStatus::Publishing => "PUBLISHING",
            PostStatus::Published => "PUBLISHED",
            PostStatus::Failed => "FAILED",
        }
    }
}

impl core::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(PostStatus::Draft),
            "SCHEDULED" => Ok(PostStatus::Scheduled),
            "PUBLISHING" => Ok(PostStatus::Publishing),
            "PUBLISHED" => Ok(PostStatus::Published),
            "FAILED" => Ok(PostStatus::Failed),
            other => Err(DomainError::validation(format!("unknown post status: {other}"))),
        }
    }
}

/// Entity: a single social post belonging to one content item.
///
/// Invariants (enforced by every transition and by `restore`):
/// - `scheduled_for` is set iff status is Scheduled or Publishing.
/// - `published_at` is set iff status is Published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialPost {
    id: SocialPostId,
    content_item_id: ContentItemId,
    channel: Channel,
    body: String,
    cta_text: Option<String>,
    cta_url: Option<String>,
    hashtags: Vec<String>,
    status: PostStatus,
    scheduled_for: Option<DateTime<Utc>>,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl SocialPost {
    /// Create a new draft post.
    pub fn new_draft(
        id: SocialPostId,
        content_item_id: ContentItemId,
        channel: Channel,
        body: impl Into<String>,
        cta_text: Option<String>,
        cta_url: Option<String>,
        hashtags: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(DomainError::validation("post body cannot be empty"));
        }

        Ok(Self {
            id,
            content_item_id,
            channel,
            body,
            cta_text,
            cta_url,
            hashtags,
            status: PostStatus::Draft,
            scheduled_for: None,
            published_at: None,
            created_at,
        })
    }

    /// Rebuild a post from persisted fields, checking the status invariants.
    ///
    /// Used at the storage boundary; rejects rows that could not have been
    /// produced by the transitions below.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: SocialPostId,
        content_item_id: ContentItemId,
        channel: Channel,
        body: String,
        cta_text: Option<String>,
        cta_url: Option<String>,
        hashtags: Vec<String>,
        status: PostStatus,
        scheduled_for: Option<DateTime<Utc>>,
        published_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let wants_slot = matches!(status, PostStatus::Scheduled | PostStatus::Publishing);
        if wants_slot != scheduled_for.is_some() {
            return Err(DomainError::invariant(
                "scheduled_for must be set exactly for SCHEDULED/PUBLISHING posts",
            ));
        }
        if (status == PostStatus::Published) != published_at.is_some() {
            return Err(DomainError::invariant(
                "published_at must be set exactly for PUBLISHED posts",
            ));
        }

        Ok(Self {
            id,
            content_item_id,
            channel,
            body,
            cta_text,
            cta_url,
            hashtags,
            status,
            scheduled_for,
            published_at,
            created_at,
        })
    }

    pub fn id_typed(&self) -> SocialPostId {
        self.id
    }

    pub fn content_item_id(&self) -> ContentItemId {
        self.content_item_id
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn cta_text(&self) -> Option<&str> {
        self.cta_text.as_deref()
    }

    pub fn cta_url(&self) -> Option<&str> {
        self.cta_url.as_deref()
    }

    pub fn hashtags(&self) -> &[String] {
        &self.hashtags
    }

    pub fn status(&self) -> PostStatus {
        self.status
    }

    pub fn scheduled_for(&self) -> Option<DateTime<Utc>> {
        self.scheduled_for
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// A post the assigner may still hand a slot to.
    pub fn is_awaiting_slot(&self) -> bool {
        self.status == PostStatus::Draft && self.scheduled_for.is_none()
    }

    /// A post whose scheduled time has passed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == PostStatus::Scheduled
            && self.scheduled_for.is_some_and(|at| at <= now)
    }

    /// Draft → Scheduled. Sets the slot and the status together.
    pub fn schedule_at(&mut self, slot: DateTime<Utc>) -> DomainResult<()> {
        if self.status != PostStatus::Draft {
            return Err(DomainError::conflict(format!(
                "only DRAFT posts can be scheduled (post is {})",
                self.status
            )));
        }

        self.scheduled_for = Some(slot);
        self.status = PostStatus::Scheduled;
        Ok(())
    }

    /// Scheduled → Publishing. The claim a trigger cycle takes before the
    /// external publish call; fails if another cycle got there first.
    pub fn claim_for_publish(&mut self) -> DomainResult<()> {
        if self.status != PostStatus::Scheduled {
            return Err(DomainError::conflict(format!(
                "only SCHEDULED posts can be claimed (post is {})",
                self.status
            )));
        }

        self.status = PostStatus::Publishing;
        Ok(())
    }

    /// Scheduled/Publishing → Published or Failed. Terminal either way.
    pub fn record_publish_result(
        &mut self,
        success: bool,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        match self.status {
            PostStatus::Scheduled | PostStatus::Publishing => {}
            PostStatus::Draft => {
                return Err(DomainError::conflict(
                    "DRAFT posts have no publish attempt to record",
                ));
            }
            PostStatus::Published | PostStatus::Failed => {
                return Err(DomainError::conflict(format!(
                    "post is already terminal ({})",
                    self.status
                )));
            }
        }

        if success {
            self.status = PostStatus::Published;
            self.published_at = Some(now);
        } else {
            self.status = PostStatus::Failed;
            self.published_at = None;
        }
        self.scheduled_for = None;
        Ok(())
    }
}

impl Entity for SocialPost {
    type Id = SocialPostId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
