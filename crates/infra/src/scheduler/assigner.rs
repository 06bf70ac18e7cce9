//! Slot assignment: pair a content item's draft posts with planned slots.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use postpilot_core::ContentItemId;
use postpilot_content::Channel;
use postpilot_scheduling::compute_slots;

use crate::store::{ContentStore, PostStore, ScheduleStore};

use super::SchedulerError;

/// What one assignment pass did, per channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelAssignment {
    pub channel: Channel,
    /// Posts that received a slot and moved to Scheduled.
    pub assigned: usize,
    /// Posts left Draft because the week's slots ran out.
    pub left_draft: usize,
}

/// Summary of one `assign_for_content_item` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssignmentReport {
    pub assigned: usize,
    pub channels: Vec<ChannelAssignment>,
}

/// Assigns planned slots to a content item's unscheduled draft posts.
///
/// Invoked once per content item after its draft posts are created. Each
/// enabled schedule of the item's company covers one channel; posts beyond
/// the week's slot count stay Draft and wait for a later invocation.
pub struct ScheduleAssigner<C, P, S> {
    content: C,
    posts: P,
    schedules: S,
}

impl<C, P, S> ScheduleAssigner<C, P, S>
where
    C: ContentStore,
    P: PostStore,
    S: ScheduleStore,
{
    pub fn new(content: C, posts: P, schedules: S) -> Self {
        Self {
            content,
            posts,
            schedules,
        }
    }

    /// Assign slots to the item's draft posts, one channel at a time.
    ///
    /// Fails with `ContentItemNotFound` before any side effect if the item is
    /// absent. Each post's (status, scheduled_for) update is atomic in the
    /// store; a store failure mid-pass propagates without compensation.
    pub fn assign_for_content_item<R: Rng + ?Sized>(
        &self,
        item_id: ContentItemId,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<AssignmentReport, SchedulerError> {
        let item = self
            .content
            .get_item(item_id)?
            .ok_or(SchedulerError::ContentItemNotFound)?;

        let schedules = self.schedules.enabled_for_company(item.company_id())?;
        let posts = self.posts.list_for_content_item(item_id)?;

        let mut report = AssignmentReport::default();

        for schedule in schedules {
            let candidates: Vec<_> = posts
                .iter()
                .filter(|p| p.channel() == schedule.channel() && p.is_awaiting_slot())
                .collect();

            if candidates.is_empty() {
                debug!(
                    content_item = %item_id,
                    channel = %schedule.channel(),
                    "no unscheduled drafts for channel, skipping"
                );
                continue;
            }

            let slots = compute_slots(schedule.cadence(), now, rng);
            let assigned = candidates.len().min(slots.len());

            // Earliest post gets the earliest slot; both sides are ordered.
            for (post, slot) in candidates.iter().zip(slots) {
                self.posts.transition_to_scheduled(post.id_typed(), slot)?;
            }

            info!(
                content_item = %item_id,
                channel = %schedule.channel(),
                assigned,
                left_draft = candidates.len() - assigned,
                "assigned publication slots"
            );

            report.assigned += assigned;
            report.channels.push(ChannelAssignment {
                channel: schedule.channel(),
                assigned,
                left_draft: candidates.len() - assigned,
            });
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use postpilot_core::{CompanyId, ScheduleId, SocialPostId};
    use postpilot_content::{Company, ContentItem, PostStatus, SocialPost};
    use postpilot_scheduling::{Cadence, Schedule};

    use crate::store::{InMemoryContentStore, InMemoryPostStore, InMemoryScheduleStore};

    type TestAssigner = ScheduleAssigner<
        std::sync::Arc<InMemoryContentStore>,
        std::sync::Arc<InMemoryPostStore>,
        std::sync::Arc<InMemoryScheduleStore>,
    >;

    struct Fixture {
        posts: std::sync::Arc<InMemoryPostStore>,
        schedules: std::sync::Arc<InMemoryScheduleStore>,
        assigner: TestAssigner,
        company: CompanyId,
        item: ContentItemId,
    }

    /// Wednesday, 2024-06-05. Next week's Monday is 2024-06-10.
    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 5, 10, 30, 0).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    fn fixture() -> Fixture {
        let content = InMemoryContentStore::arc();
        let posts = InMemoryPostStore::arc();
        let schedules = InMemoryScheduleStore::arc();

        let company = content
            .insert_company(
                Company::new(CompanyId::new(), "Acme", None, None, fixed_now()).unwrap(),
            )
            .unwrap();
        let item = content
            .insert_item(
                ContentItem::new(
                    ContentItemId::new(),
                    company,
                    None,
                    "Launch week",
                    None,
                    fixed_now(),
                )
                .unwrap(),
            )
            .unwrap();

        let assigner = ScheduleAssigner::new(content, posts.clone(), schedules.clone());

        Fixture {
            posts,
            schedules,
            assigner,
            company,
            item,
        }
    }

    fn add_schedule(fx: &Fixture, channel: Channel, posts_per_week: u8, enabled: bool) {
        fx.schedules
            .upsert(Schedule::new(
                ScheduleId::new(),
                fx.company,
                channel,
                enabled,
                Cadence::from_parts(posts_per_week, [1, 3, 5], [9, 17], "UTC", false).unwrap(),
                fixed_now(),
            ))
            .unwrap();
    }

    fn add_drafts(fx: &Fixture, channel: Channel, count: usize) -> Vec<SocialPostId> {
        (0..count)
            .map(|i| {
                fx.posts
                    .insert(
                        SocialPost::new_draft(
                            SocialPostId::new(),
                            fx.item,
                            channel,
                            format!("post {i}"),
                            None,
                            None,
                            vec![],
                            fixed_now(),
                        )
                        .unwrap(),
                    )
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn missing_item_fails_without_side_effects() {
        let fx = fixture();
        add_schedule(&fx, Channel::Linkedin, 3, true);
        let ids = add_drafts(&fx, Channel::Linkedin, 2);

        let err = fx
            .assigner
            .assign_for_content_item(ContentItemId::new(), fixed_now(), &mut rng())
            .unwrap_err();
        assert!(matches!(err, SchedulerError::ContentItemNotFound));

        for id in ids {
            let post = fx.posts.get(id).unwrap().unwrap();
            assert_eq!(post.status(), PostStatus::Draft);
        }
    }

    #[test]
    fn assigns_slots_in_creation_order() {
        let fx = fixture();
        add_schedule(&fx, Channel::Linkedin, 3, true);
        let ids = add_drafts(&fx, Channel::Linkedin, 3);

        let report = fx
            .assigner
            .assign_for_content_item(fx.item, fixed_now(), &mut rng())
            .unwrap();
        assert_eq!(report.assigned, 3);

        // Mon/Wed/Fri at 09:00 UTC, matched to posts in creation order.
        let expected = [
            Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 14, 9, 0, 0).unwrap(),
        ];
        for (id, slot) in ids.iter().zip(expected) {
            let post = fx.posts.get(*id).unwrap().unwrap();
            assert_eq!(post.status(), PostStatus::Scheduled);
            assert_eq!(post.scheduled_for(), Some(slot));
        }
    }

    #[test]
    fn surplus_drafts_stay_draft() {
        let fx = fixture();
        add_schedule(&fx, Channel::Linkedin, 3, true);
        let ids = add_drafts(&fx, Channel::Linkedin, 5);

        let report = fx
            .assigner
            .assign_for_content_item(fx.item, fixed_now(), &mut rng())
            .unwrap();
        assert_eq!(report.assigned, 3);
        assert_eq!(report.channels[0].left_draft, 2);

        let statuses: Vec<_> = ids
            .iter()
            .map(|id| fx.posts.get(*id).unwrap().unwrap().status())
            .collect();
        assert_eq!(
            statuses,
            vec![
                PostStatus::Scheduled,
                PostStatus::Scheduled,
                PostStatus::Scheduled,
                PostStatus::Draft,
                PostStatus::Draft,
            ]
        );
    }

    #[test]
    fn disabled_schedules_and_other_channels_are_ignored() {
        let fx = fixture();
        add_schedule(&fx, Channel::Linkedin, 3, false);
        add_schedule(&fx, Channel::Instagram, 3, true);
        let linkedin = add_drafts(&fx, Channel::Linkedin, 2);
        let tiktok = add_drafts(&fx, Channel::Tiktok, 2);

        let report = fx
            .assigner
            .assign_for_content_item(fx.item, fixed_now(), &mut rng())
            .unwrap();
        // Instagram is enabled but has no drafts; LinkedIn has drafts but is
        // disabled; TikTok has no schedule at all.
        assert_eq!(report.assigned, 0);
        assert!(report.channels.is_empty());

        for id in linkedin.iter().chain(&tiktok) {
            let post = fx.posts.get(*id).unwrap().unwrap();
            assert_eq!(post.status(), PostStatus::Draft);
        }
    }

    #[test]
    fn already_scheduled_posts_are_never_reassigned() {
        let fx = fixture();
        add_schedule(&fx, Channel::Linkedin, 3, true);
        let ids = add_drafts(&fx, Channel::Linkedin, 2);

        let pinned = Utc.with_ymd_and_hms(2024, 6, 11, 8, 0, 0).unwrap();
        fx.posts.transition_to_scheduled(ids[0], pinned).unwrap();

        let report = fx
            .assigner
            .assign_for_content_item(fx.item, fixed_now(), &mut rng())
            .unwrap();
        assert_eq!(report.assigned, 1);

        let first = fx.posts.get(ids[0]).unwrap().unwrap();
        assert_eq!(first.scheduled_for(), Some(pinned));
    }

    #[test]
    fn reinvocation_schedules_the_leftovers() {
        let fx = fixture();
        add_schedule(&fx, Channel::Linkedin, 2, true);
        add_drafts(&fx, Channel::Linkedin, 5);

        let first = fx
            .assigner
            .assign_for_content_item(fx.item, fixed_now(), &mut rng())
            .unwrap();
        assert_eq!(first.assigned, 2);

        let second = fx
            .assigner
            .assign_for_content_item(fx.item, fixed_now(), &mut rng())
            .unwrap();
        assert_eq!(second.assigned, 2);

        let drafts: usize = fx
            .posts
            .list_for_content_item(fx.item)
            .unwrap()
            .iter()
            .filter(|p| p.status() == PostStatus::Draft)
            .count();
        assert_eq!(drafts, 1);
    }
}
