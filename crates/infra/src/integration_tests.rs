//! Integration tests for the full scheduling pipeline.
//!
//! Drafts → ScheduleAssigner → due query → PublishRunner → terminal states,
//! over the in-memory stores with pinned clocks.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use postpilot_core::{Clock, CompanyId, ContentItemId, FixedClock, ScheduleId, SocialPostId};
use postpilot_content::{Channel, Company, ContentItem, PostStatus, SocialPost};
use postpilot_scheduling::{Cadence, Schedule};

use crate::scheduler::{PublishRunner, ScheduleAssigner, StubPublisher};
use crate::store::{
    ContentStore, InMemoryContentStore, InMemoryPostStore, InMemoryScheduleStore, PostStore,
    ScheduleStore,
};

struct Pipeline {
    content: Arc<InMemoryContentStore>,
    posts: Arc<InMemoryPostStore>,
    schedules: Arc<InMemoryScheduleStore>,
    assigner: ScheduleAssigner<
        Arc<InMemoryContentStore>,
        Arc<InMemoryPostStore>,
        Arc<InMemoryScheduleStore>,
    >,
    runner: PublishRunner<Arc<InMemoryPostStore>, StubPublisher>,
    company: CompanyId,
    item: ContentItemId,
}

/// Wednesday, 2024-06-05. Slots land in the week of Monday 2024-06-10.
fn assign_time() -> DateTime<Utc> {
    FixedClock::at(Utc.with_ymd_and_hms(2024, 6, 5, 10, 0, 0).unwrap()).now()
}

/// Well past every planned slot.
fn publish_time() -> DateTime<Utc> {
    FixedClock::at(Utc.with_ymd_and_hms(2024, 6, 17, 0, 0, 0).unwrap()).now()
}

fn pipeline() -> Pipeline {
    let content = InMemoryContentStore::arc();
    let posts = InMemoryPostStore::arc();
    let schedules = InMemoryScheduleStore::arc();

    let company = content
        .insert_company(Company::new(CompanyId::new(), "Acme", None, None, assign_time()).unwrap())
        .unwrap();
    let item = content
        .insert_item(
            ContentItem::new(ContentItemId::new(), company, None, "Launch", None, assign_time())
                .unwrap(),
        )
        .unwrap();

    let assigner = ScheduleAssigner::new(content.clone(), posts.clone(), schedules.clone());
    let runner = PublishRunner::new(posts.clone(), StubPublisher);

    Pipeline {
        content,
        posts,
        schedules,
        assigner,
        runner,
        company,
        item,
    }
}

fn add_schedule(p: &Pipeline, channel: Channel, posts_per_week: u8) {
    p.schedules
        .upsert(Schedule::new(
            ScheduleId::new(),
            p.company,
            channel,
            true,
            Cadence::from_parts(posts_per_week, [1, 3, 5], [9, 17], "UTC", false).unwrap(),
            assign_time(),
        ))
        .unwrap();
}

fn add_drafts(p: &Pipeline, channel: Channel, count: usize) -> Vec<SocialPostId> {
    (0..count)
        .map(|i| {
            p.posts
                .insert(
                    SocialPost::new_draft(
                        SocialPostId::new(),
                        p.item,
                        channel,
                        format!("post {i}"),
                        None,
                        None,
                        vec![],
                        assign_time(),
                    )
                    .unwrap(),
                )
                .unwrap()
        })
        .collect()
}

#[tokio::test]
async fn drafts_flow_to_published_through_the_whole_pipeline() {
    let p = pipeline();
    add_schedule(&p, Channel::Linkedin, 3);
    add_schedule(&p, Channel::Instagram, 2);
    let linkedin = add_drafts(&p, Channel::Linkedin, 3);
    let instagram = add_drafts(&p, Channel::Instagram, 2);

    let report = p
        .assigner
        .assign_for_content_item(p.item, assign_time(), &mut StdRng::seed_from_u64(3))
        .unwrap();
    assert_eq!(report.assigned, 5);

    // Nothing is due yet at assignment time.
    assert!(p.posts.due_for_publish(assign_time()).unwrap().is_empty());

    // A week later every slot has passed, ordered by slot time.
    let due = p.posts.due_for_publish(publish_time()).unwrap();
    assert_eq!(due.len(), 5);
    for pair in due.windows(2) {
        assert!(pair[0].scheduled_for() <= pair[1].scheduled_for());
    }

    let run = p.runner.run_once(publish_time()).await.unwrap();
    assert_eq!(run.processed, 5);
    assert!(run.results.iter().all(|r| r.status == "published"));

    for id in linkedin.iter().chain(&instagram) {
        let post = p.posts.get(*id).unwrap().unwrap();
        assert_eq!(post.status(), PostStatus::Published);
        assert_eq!(post.published_at(), Some(publish_time()));
        assert_eq!(post.scheduled_for(), None);
    }

    // A second cycle finds nothing left to do.
    let rerun = p.runner.run_once(publish_time()).await.unwrap();
    assert_eq!(rerun.processed, 0);
}

#[tokio::test]
async fn unknown_item_leaves_the_pipeline_untouched() {
    let p = pipeline();
    add_schedule(&p, Channel::Linkedin, 3);
    add_drafts(&p, Channel::Linkedin, 2);

    let err = p
        .assigner
        .assign_for_content_item(ContentItemId::new(), assign_time(), &mut StdRng::seed_from_u64(3))
        .unwrap_err();
    assert!(matches!(err, crate::scheduler::SchedulerError::ContentItemNotFound));

    assert!(p.posts.due_for_publish(publish_time()).unwrap().is_empty());
}

#[tokio::test]
async fn two_content_items_do_not_steal_each_others_slots() {
    let p = pipeline();
    add_schedule(&p, Channel::Linkedin, 3);
    let first_item_posts = add_drafts(&p, Channel::Linkedin, 3);

    let other_item = p
        .content
        .insert_item(
            ContentItem::new(
                ContentItemId::new(),
                p.company,
                None,
                "Second campaign",
                None,
                assign_time(),
            )
            .unwrap(),
        )
        .unwrap();
    let other_post = p
        .posts
        .insert(
            SocialPost::new_draft(
                SocialPostId::new(),
                other_item,
                Channel::Linkedin,
                "other",
                None,
                None,
                vec![],
                assign_time(),
            )
            .unwrap(),
        )
        .unwrap();

    p.assigner
        .assign_for_content_item(p.item, assign_time(), &mut StdRng::seed_from_u64(3))
        .unwrap();

    for id in &first_item_posts {
        assert_eq!(
            p.posts.get(*id).unwrap().unwrap().status(),
            PostStatus::Scheduled
        );
    }
    // The other item was not part of the call and keeps its draft.
    assert_eq!(
        p.posts.get(other_post).unwrap().unwrap().status(),
        PostStatus::Draft
    );
}
