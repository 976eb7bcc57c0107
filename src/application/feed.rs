//! Feed composition: candidate selection, pagination, and global page caching.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::application::pagination::{PageMeta, Paginator};
use crate::application::repos::{
    AuthorsRepo, CommentsRepo, FollowsRepo, GroupsRepo, PostListScope, PostsRepo, RepoError,
};
use crate::cache::{PageCache, PageCacheKey};
use crate::domain::entities::{AuthorRecord, CommentRecord, GroupRecord, PostRecord};
use crate::domain::types::{FeedKind, Viewer};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("group `{0}` not found")]
    UnknownGroup(String),
    #[error("author `{0}` not found")]
    UnknownAuthor(String),
    #[error("post `{0}` not found")]
    UnknownPost(Uuid),
    #[error("{0} feed requires a filter value")]
    MissingFilter(&'static str),
    #[error("subscription feed requires an authenticated viewer")]
    Unauthorized,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl FeedError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FeedError::UnknownGroup(_) | FeedError::UnknownAuthor(_) | FeedError::UnknownPost(_)
        )
    }
}

/// Feed-specific data handed to the renderer next to the posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedExtra {
    None,
    Group(GroupRecord),
    Profile {
        author: AuthorRecord,
        post_count: u64,
        /// `None` for anonymous viewers.
        following: Option<bool>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedPage {
    pub kind: FeedKind,
    pub items: Vec<PostRecord>,
    pub page: PageMeta,
    pub extra: FeedExtra,
}

/// A single feed request as it arrives from a transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub kind: FeedKind,
    /// Group slug for [`FeedKind::Group`], author username for [`FeedKind::Profile`].
    pub filter: Option<String>,
    pub page: u32,
    pub viewer: Viewer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetail {
    pub post: PostRecord,
    pub comments: Vec<CommentRecord>,
    pub author_post_count: u64,
}

#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostsRepo>,
    groups: Arc<dyn GroupsRepo>,
    authors: Arc<dyn AuthorsRepo>,
    follows: Arc<dyn FollowsRepo>,
    comments: Arc<dyn CommentsRepo>,
    paginator: Paginator,
    cache: Option<Arc<PageCache>>,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        groups: Arc<dyn GroupsRepo>,
        authors: Arc<dyn AuthorsRepo>,
        follows: Arc<dyn FollowsRepo>,
        comments: Arc<dyn CommentsRepo>,
        paginator: Paginator,
    ) -> Self {
        Self {
            posts,
            groups,
            authors,
            follows,
            comments,
            paginator,
            cache: None,
        }
    }

    /// Serve the global feed through the given page cache.
    pub fn with_cache(mut self, cache: Arc<PageCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_cache_opt(mut self, cache: Option<Arc<PageCache>>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> Option<&Arc<PageCache>> {
        self.cache.as_ref()
    }

    pub fn paginator(&self) -> Paginator {
        self.paginator
    }

    /// Drop every cached page so the next global request recomputes.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    pub async fn load(&self, request: &FeedRequest) -> Result<FeedPage, FeedError> {
        match request.kind {
            FeedKind::Global => self.global(request.page).await,
            FeedKind::Group => {
                let slug = request
                    .filter
                    .as_deref()
                    .ok_or(FeedError::MissingFilter("group"))?;
                self.group(slug, request.page).await
            }
            FeedKind::Profile => {
                let username = request
                    .filter
                    .as_deref()
                    .ok_or(FeedError::MissingFilter("profile"))?;
                self.profile(username, request.viewer, request.page).await
            }
            FeedKind::Subscription => self.subscriptions(request.viewer, request.page).await,
        }
    }

    /// All posts. The only cached feed: a hit is served as-is even if newer posts exist.
    ///
    /// Entries are keyed by the page actually served, so out-of-range requests
    /// share the entry of the last page instead of adding their own.
    pub async fn global(&self, page: u32) -> Result<FeedPage, FeedError> {
        let requested = page.max(1);
        if let Some(cached) = self.cached_global(requested) {
            return Ok(cached);
        }

        let meta = self.locate(PostListScope::All, requested).await?;
        if meta.number != requested
            && let Some(cached) = self.cached_global(meta.number)
        {
            return Ok(cached);
        }

        let (items, meta) = self.list(PostListScope::All, requested, meta).await?;
        let feed = FeedPage {
            kind: FeedKind::Global,
            items,
            page: meta,
            extra: FeedExtra::None,
        };

        if let Some(cache) = &self.cache {
            cache.put(PageCacheKey::global(meta.number), feed.clone());
        }

        Ok(feed)
    }

    pub async fn group(&self, slug: &str, page: u32) -> Result<FeedPage, FeedError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| FeedError::UnknownGroup(slug.to_string()))?;

        let (items, meta) = self.fetch(PostListScope::Group(group.id), page).await?;
        Ok(FeedPage {
            kind: FeedKind::Group,
            items,
            page: meta,
            extra: FeedExtra::Group(group),
        })
    }

    /// Any viewer may read a profile; `following` only personalizes the result.
    pub async fn profile(
        &self,
        username: &str,
        viewer: Viewer,
        page: u32,
    ) -> Result<FeedPage, FeedError> {
        let author = self
            .authors
            .find_by_username(username)
            .await?
            .ok_or_else(|| FeedError::UnknownAuthor(username.to_string()))?;

        let (items, meta) = self.fetch(PostListScope::Author(author.id), page).await?;
        let following = match viewer.author_id() {
            Some(viewer_id) => Some(self.follows.is_following(viewer_id, author.id).await?),
            None => None,
        };

        Ok(FeedPage {
            kind: FeedKind::Profile,
            items,
            page: meta,
            extra: FeedExtra::Profile {
                post_count: meta.total_items,
                author,
                following,
            },
        })
    }

    pub async fn subscriptions(&self, viewer: Viewer, page: u32) -> Result<FeedPage, FeedError> {
        let viewer_id = viewer.author_id().ok_or(FeedError::Unauthorized)?;

        let (items, meta) = self
            .fetch(PostListScope::FollowedBy(viewer_id), page)
            .await?;
        Ok(FeedPage {
            kind: FeedKind::Subscription,
            items,
            page: meta,
            extra: FeedExtra::None,
        })
    }

    pub async fn post_detail(&self, post_id: Uuid) -> Result<PostDetail, FeedError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(FeedError::UnknownPost(post_id))?;

        let (comments, author_post_count) = tokio::try_join!(
            self.comments.list_for_post(post.id),
            self.posts.count_posts(PostListScope::Author(post.author_id)),
        )?;

        Ok(PostDetail {
            post,
            comments,
            author_post_count,
        })
    }

    async fn fetch(
        &self,
        scope: PostListScope,
        requested: u32,
    ) -> Result<(Vec<PostRecord>, PageMeta), FeedError> {
        let meta = self.locate(scope, requested).await?;
        self.list(scope, requested, meta).await
    }

    fn cached_global(&self, number: u32) -> Option<FeedPage> {
        self.cache
            .as_ref()
            .and_then(|cache| cache.get(&PageCacheKey::global(number)))
    }

    async fn locate(&self, scope: PostListScope, requested: u32) -> Result<PageMeta, FeedError> {
        let total = self.posts.count_posts(scope).await?;
        Ok(self.paginator.locate(total, requested))
    }

    /// Count and listing are separate reads; `len` always reflects the items returned.
    async fn list(
        &self,
        scope: PostListScope,
        requested: u32,
        mut meta: PageMeta,
    ) -> Result<(Vec<PostRecord>, PageMeta), FeedError> {
        let items = if meta.len == 0 {
            Vec::new()
        } else {
            self.posts.list_posts(scope, meta.window()).await?
        };
        meta.len = u32::try_from(items.len()).unwrap_or(meta.page_size);

        debug!(
            ?scope,
            requested,
            page = meta.number,
            total_pages = meta.total_pages,
            items = items.len(),
            "feed page resolved"
        );

        Ok((items, meta))
    }
}
