//! Service wiring: stores + scheduler services behind one handle.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use postpilot_core::{Clock, ContentItemId, SystemClock};
use postpilot_content::SocialPost;
use postpilot_infra::{
    scheduler::{AssignmentReport, PublishRunner, RunReport, ScheduleAssigner, SchedulerError},
    store::{ContentStore, InMemoryContentStore, InMemoryPostStore, InMemoryScheduleStore, PostStore, ScheduleStore},
    StubPublisher,
};
#[cfg(feature = "postgres")]
use postpilot_infra::store::{PostgresContentStore, PostgresPostStore, PostgresScheduleStore};
#[cfg(feature = "postgres")]
use sqlx::PgPool;

type SharedContentStore = Arc<dyn ContentStore>;
type SharedPostStore = Arc<dyn PostStore>;
type SharedScheduleStore = Arc<dyn ScheduleStore>;

/// Everything the handlers need, built once at startup.
pub struct AppServices {
    clock: Arc<dyn Clock>,
    content: SharedContentStore,
    posts: SharedPostStore,
    schedules: SharedScheduleStore,
    assigner: ScheduleAssigner<SharedContentStore, SharedPostStore, SharedScheduleStore>,
    runner: PublishRunner<SharedPostStore, StubPublisher>,
}

impl AppServices {
    fn from_stores(
        content: SharedContentStore,
        posts: SharedPostStore,
        schedules: SharedScheduleStore,
    ) -> Self {
        let assigner =
            ScheduleAssigner::new(content.clone(), posts.clone(), schedules.clone());
        let runner = PublishRunner::new(posts.clone(), StubPublisher);

        Self {
            clock: Arc::new(SystemClock),
            content,
            posts,
            schedules,
            assigner,
            runner,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn content(&self) -> &SharedContentStore {
        &self.content
    }

    pub fn posts(&self) -> &SharedPostStore {
        &self.posts
    }

    pub fn schedules(&self) -> &SharedScheduleStore {
        &self.schedules
    }

    /// Assign publication slots to a content item's draft posts.
    pub fn schedule_posts(
        &self,
        item: ContentItemId,
    ) -> Result<AssignmentReport, SchedulerError> {
        let mut rng = rand::thread_rng();
        self.assigner
            .assign_for_content_item(item, self.clock.now(), &mut rng)
    }

    /// Posts whose scheduled time has passed (read-only).
    pub fn posts_ready_to_publish(&self) -> Result<Vec<SocialPost>, SchedulerError> {
        self.runner.posts_ready_to_publish(self.clock.now())
    }

    /// Run one publish trigger cycle.
    pub async fn run_publish_cycle(&self) -> Result<RunReport, SchedulerError> {
        self.runner.run_once(self.clock.now()).await
    }
}

/// Build services: in-memory by default, Postgres-backed when the `postgres`
/// feature is on and `DATABASE_URL` is set.
pub async fn build_services() -> AppServices {
    #[cfg(feature = "postgres")]
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return build_postgres_services(&url).await;
    }

    build_in_memory_services()
}

fn build_in_memory_services() -> AppServices {
    AppServices::from_stores(
        InMemoryContentStore::arc(),
        InMemoryPostStore::arc(),
        InMemoryScheduleStore::arc(),
    )
}

#[cfg(feature = "postgres")]
async fn build_postgres_services(database_url: &str) -> AppServices {
    let pool = PgPool::connect(database_url)
        .await
        .expect("failed to connect to Postgres");

    AppServices::from_stores(
        Arc::new(PostgresContentStore::new(pool.clone())),
        Arc::new(PostgresPostStore::new(pool.clone())),
        Arc::new(PostgresScheduleStore::new(pool)),
    )
}
