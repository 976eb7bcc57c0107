#![allow(dead_code)]

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use tidings::application::comments::CommentService;
use tidings::application::feed::FeedService;
use tidings::application::follow::FollowService;
use tidings::application::groups::{CreateGroupCommand, GroupService};
use tidings::application::pagination::Paginator;
use tidings::application::posts::{CreatePostCommand, PostService};
use tidings::application::repos::{AuthorsWriteRepo, CreateAuthorParams};
use tidings::cache::PageCache;
use tidings::domain::entities::{AuthorRecord, GroupRecord, PostRecord};
use tidings::domain::types::Viewer;
use tidings::infra::memory::MemoryRepositories;

pub const TEST_TTL: Duration = Duration::from_secs(20);

/// Services wired onto one in-memory store.
pub struct Harness {
    pub repos: Arc<MemoryRepositories>,
    pub cache: Option<Arc<PageCache>>,
    pub feeds: FeedService,
    pub posts: PostService,
    pub comments: CommentService,
    pub follows: FollowService,
    pub groups: GroupService,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(10, Some(TEST_TTL))
    }

    pub fn with_page_size(page_size: u32) -> Self {
        Self::build(page_size, Some(TEST_TTL))
    }

    pub fn uncached() -> Self {
        Self::build(10, None)
    }

    fn build(page_size: u32, ttl: Option<Duration>) -> Self {
        let repos = Arc::new(MemoryRepositories::new());
        let cache = ttl.map(|ttl| Arc::new(PageCache::with_ttl(ttl)));
        let paginator = Paginator::new(NonZeroU32::new(page_size).expect("non-zero page size"));

        let feeds = FeedService::new(
            repos.clone(),
            repos.clone(),
            repos.clone(),
            repos.clone(),
            repos.clone(),
            paginator,
        )
        .with_cache_opt(cache.clone());

        Self {
            posts: PostService::new(repos.clone(), repos.clone(), repos.clone()),
            comments: CommentService::new(repos.clone(), repos.clone(), repos.clone()),
            follows: FollowService::new(repos.clone(), repos.clone(), repos.clone()),
            groups: GroupService::new(repos.clone(), repos.clone()),
            feeds,
            cache,
            repos,
        }
    }

    pub async fn author(&self, username: &str) -> AuthorRecord {
        self.repos
            .create_author(CreateAuthorParams {
                username: username.to_string(),
            })
            .await
            .expect("author should be created")
    }

    pub async fn group(&self, title: &str) -> GroupRecord {
        self.groups
            .create(CreateGroupCommand {
                title: title.to_string(),
                ..Default::default()
            })
            .await
            .expect("group should be created")
    }

    pub async fn publish(
        &self,
        author: &AuthorRecord,
        text: &str,
        group: Option<&GroupRecord>,
    ) -> PostRecord {
        self.posts
            .create(
                Viewer::Authenticated(author.id),
                CreatePostCommand {
                    group_id: group.map(|group| group.id),
                    text: text.to_string(),
                    image: None,
                },
            )
            .await
            .expect("post should be created")
    }

    pub async fn publish_many(&self, author: &AuthorRecord, count: usize) -> Vec<PostRecord> {
        let mut posts = Vec::with_capacity(count);
        for index in 0..count {
            posts.push(self.publish(author, &format!("post {index}"), None).await);
        }
        posts
    }
}
