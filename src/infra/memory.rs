//! In-process repository implementations.
//!
//! Every table sits behind its own `RwLock`. Operations that touch several
//! tables take the locks in declaration order (authors, groups, posts,
//! comments, follows) so cascades cannot deadlock against each other.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageWindow;
use crate::application::repos::{
    AuthorsRepo, AuthorsWriteRepo, CommentsRepo, CommentsWriteRepo, CreateAuthorParams,
    CreateCommentParams, CreateGroupParams, CreatePostParams, FollowsRepo, FollowsWriteRepo,
    GroupsRepo, GroupsWriteRepo, PostListScope, PostsRepo, PostsWriteRepo, RepoError,
    UpdatePostParams,
};
use crate::cache::{rw_read, rw_write};
use crate::domain::entities::{
    AuthorRecord, CommentRecord, FollowRecord, GroupRecord, PostGroupRef, PostRecord,
};
use crate::domain::posts::sort_for_feed;
use crate::domain::types::MediaRef;

const SOURCE: &str = "infra::memory";

#[derive(Debug, Clone)]
struct StoredPost {
    id: Uuid,
    seq: i64,
    author_id: Uuid,
    group_id: Option<Uuid>,
    text: String,
    image: Option<MediaRef>,
    pub_date: OffsetDateTime,
    updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
struct StoredComment {
    id: Uuid,
    seq: i64,
    post_id: Option<Uuid>,
    author_id: Option<Uuid>,
    text: String,
    created_at: OffsetDateTime,
}

#[derive(Default)]
pub struct MemoryRepositories {
    authors: RwLock<HashMap<Uuid, AuthorRecord>>,
    groups: RwLock<HashMap<Uuid, GroupRecord>>,
    posts: RwLock<HashMap<Uuid, StoredPost>>,
    comments: RwLock<Vec<StoredComment>>,
    follows: RwLock<Vec<FollowRecord>>,
    seq: AtomicI64,
}

impl MemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> i64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn join_post(
        post: &StoredPost,
        authors: &HashMap<Uuid, AuthorRecord>,
        groups: &HashMap<Uuid, GroupRecord>,
    ) -> Result<PostRecord, RepoError> {
        let author = authors.get(&post.author_id).ok_or_else(|| RepoError::Integrity {
            message: format!("post `{}` references a missing author", post.id),
        })?;
        let group = post
            .group_id
            .and_then(|id| groups.get(&id))
            .map(PostGroupRef::from);

        Ok(PostRecord {
            id: post.id,
            seq: post.seq,
            author_id: post.author_id,
            author_username: author.username.clone(),
            group,
            text: post.text.clone(),
            image: post.image.clone(),
            pub_date: post.pub_date,
            updated_at: post.updated_at,
        })
    }

    fn load_post(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let authors = rw_read(&self.authors, SOURCE, "load_post.authors");
        let groups = rw_read(&self.groups, SOURCE, "load_post.groups");
        let posts = rw_read(&self.posts, SOURCE, "load_post.posts");
        posts
            .get(&id)
            .map(|post| Self::join_post(post, &authors, &groups))
            .transpose()
    }

    /// Every post in `scope`, in feed order.
    fn scoped_posts(&self, scope: PostListScope) -> Result<Vec<PostRecord>, RepoError> {
        let authors = rw_read(&self.authors, SOURCE, "scoped_posts.authors");
        let groups = rw_read(&self.groups, SOURCE, "scoped_posts.groups");
        let posts = rw_read(&self.posts, SOURCE, "scoped_posts.posts");

        let followed: Vec<Uuid> = match scope {
            PostListScope::FollowedBy(user_id) => {
                rw_read(&self.follows, SOURCE, "scoped_posts.follows")
                    .iter()
                    .filter(|edge| edge.user_id == user_id)
                    .map(|edge| edge.author_id)
                    .collect()
            }
            _ => Vec::new(),
        };

        let mut selected = posts
            .values()
            .filter(|post| match scope {
                PostListScope::All => true,
                PostListScope::Group(group_id) => post.group_id == Some(group_id),
                PostListScope::Author(author_id) => post.author_id == author_id,
                PostListScope::FollowedBy(_) => followed.contains(&post.author_id),
            })
            .map(|post| Self::join_post(post, &authors, &groups))
            .collect::<Result<Vec<_>, _>>()?;

        sort_for_feed(&mut selected);
        Ok(selected)
    }

    fn join_comment(
        comment: &StoredComment,
        authors: &HashMap<Uuid, AuthorRecord>,
    ) -> CommentRecord {
        CommentRecord {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            author_username: comment
                .author_id
                .and_then(|id| authors.get(&id))
                .map(|author| author.username.clone()),
            text: comment.text.clone(),
            created_at: comment.created_at,
        }
    }
}

#[async_trait]
impl AuthorsRepo for MemoryRepositories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthorRecord>, RepoError> {
        Ok(rw_read(&self.authors, SOURCE, "authors.find_by_id")
            .get(&id)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<AuthorRecord>, RepoError> {
        Ok(rw_read(&self.authors, SOURCE, "authors.find_by_username")
            .values()
            .find(|author| author.username == username)
            .cloned())
    }
}

#[async_trait]
impl AuthorsWriteRepo for MemoryRepositories {
    async fn create_author(&self, params: CreateAuthorParams) -> Result<AuthorRecord, RepoError> {
        let mut authors = rw_write(&self.authors, SOURCE, "create_author");
        if authors
            .values()
            .any(|author| author.username == params.username)
        {
            return Err(RepoError::Duplicate {
                constraint: "authors_username_key".to_string(),
            });
        }

        let author = AuthorRecord {
            id: Uuid::new_v4(),
            username: params.username,
            created_at: OffsetDateTime::now_utc(),
        };
        authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn delete_author(&self, id: Uuid) -> Result<(), RepoError> {
        let mut authors = rw_write(&self.authors, SOURCE, "delete_author.authors");
        let mut posts = rw_write(&self.posts, SOURCE, "delete_author.posts");
        let mut comments = rw_write(&self.comments, SOURCE, "delete_author.comments");
        let mut follows = rw_write(&self.follows, SOURCE, "delete_author.follows");

        if authors.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }

        let removed_posts: Vec<Uuid> = posts
            .values()
            .filter(|post| post.author_id == id)
            .map(|post| post.id)
            .collect();
        for post_id in &removed_posts {
            posts.remove(post_id);
        }

        for comment in comments.iter_mut() {
            if comment.author_id == Some(id) {
                comment.author_id = None;
            }
            if comment
                .post_id
                .is_some_and(|post_id| removed_posts.contains(&post_id))
            {
                comment.post_id = None;
            }
        }

        follows.retain(|edge| edge.user_id != id && edge.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl GroupsRepo for MemoryRepositories {
    async fn list_groups(&self) -> Result<Vec<GroupRecord>, RepoError> {
        let mut groups: Vec<GroupRecord> = rw_read(&self.groups, SOURCE, "list_groups")
            .values()
            .cloned()
            .collect();
        groups.sort_by(|left, right| {
            left.title
                .to_lowercase()
                .cmp(&right.title.to_lowercase())
                .then_with(|| left.slug.cmp(&right.slug))
        });
        Ok(groups)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<GroupRecord>, RepoError> {
        Ok(rw_read(&self.groups, SOURCE, "groups.find_by_id")
            .get(&id)
            .cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<GroupRecord>, RepoError> {
        Ok(rw_read(&self.groups, SOURCE, "groups.find_by_slug")
            .values()
            .find(|group| group.slug == slug)
            .cloned())
    }
}

#[async_trait]
impl GroupsWriteRepo for MemoryRepositories {
    async fn create_group(&self, params: CreateGroupParams) -> Result<GroupRecord, RepoError> {
        let mut groups = rw_write(&self.groups, SOURCE, "create_group");
        if groups.values().any(|group| group.slug == params.slug) {
            return Err(RepoError::Duplicate {
                constraint: "post_groups_slug_key".to_string(),
            });
        }

        let group = GroupRecord {
            id: Uuid::new_v4(),
            title: params.title,
            slug: params.slug,
            description: params.description,
            created_at: OffsetDateTime::now_utc(),
        };
        groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn delete_group(&self, id: Uuid) -> Result<(), RepoError> {
        let mut groups = rw_write(&self.groups, SOURCE, "delete_group.groups");
        let mut posts = rw_write(&self.posts, SOURCE, "delete_group.posts");

        if groups.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        for post in posts.values_mut() {
            if post.group_id == Some(id) {
                post.group_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PostsRepo for MemoryRepositories {
    async fn list_posts(
        &self,
        scope: PostListScope,
        window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let posts = self.scoped_posts(scope)?;
        Ok(window.slice(&posts).to_vec())
    }

    async fn count_posts(&self, scope: PostListScope) -> Result<u64, RepoError> {
        Ok(self.scoped_posts(scope)?.len() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        self.load_post(id)
    }
}

#[async_trait]
impl PostsWriteRepo for MemoryRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let authors = rw_read(&self.authors, SOURCE, "create_post.authors");
        let groups = rw_read(&self.groups, SOURCE, "create_post.groups");
        let mut posts = rw_write(&self.posts, SOURCE, "create_post.posts");

        if !authors.contains_key(&params.author_id) {
            return Err(RepoError::InvalidInput {
                message: format!("author `{}` does not exist", params.author_id),
            });
        }
        if let Some(group_id) = params.group_id
            && !groups.contains_key(&group_id)
        {
            return Err(RepoError::InvalidInput {
                message: format!("group `{group_id}` does not exist"),
            });
        }

        let now = OffsetDateTime::now_utc();
        let post = StoredPost {
            id: Uuid::new_v4(),
            seq: self.next_seq(),
            author_id: params.author_id,
            group_id: params.group_id,
            text: params.text,
            image: params.image,
            pub_date: now,
            updated_at: now,
        };
        let record = Self::join_post(&post, &authors, &groups)?;
        posts.insert(post.id, post);
        Ok(record)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let authors = rw_read(&self.authors, SOURCE, "update_post.authors");
        let groups = rw_read(&self.groups, SOURCE, "update_post.groups");
        let mut posts = rw_write(&self.posts, SOURCE, "update_post.posts");

        if let Some(group_id) = params.group_id
            && !groups.contains_key(&group_id)
        {
            return Err(RepoError::InvalidInput {
                message: format!("group `{group_id}` does not exist"),
            });
        }

        let post = posts.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        post.group_id = params.group_id;
        post.text = params.text;
        post.image = params.image;
        post.updated_at = OffsetDateTime::now_utc();

        Self::join_post(post, &authors, &groups)
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let mut posts = rw_write(&self.posts, SOURCE, "delete_post.posts");
        let mut comments = rw_write(&self.comments, SOURCE, "delete_post.comments");

        if posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        for comment in comments.iter_mut() {
            if comment.post_id == Some(id) {
                comment.post_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CommentsRepo for MemoryRepositories {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, RepoError> {
        let authors = rw_read(&self.authors, SOURCE, "list_for_post.authors");
        let comments = rw_read(&self.comments, SOURCE, "list_for_post.comments");

        let mut selected: Vec<&StoredComment> = comments
            .iter()
            .filter(|comment| comment.post_id == Some(post_id))
            .collect();
        selected.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.seq.cmp(&right.seq))
        });

        Ok(selected
            .into_iter()
            .map(|comment| Self::join_comment(comment, &authors))
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CommentRecord>, RepoError> {
        let authors = rw_read(&self.authors, SOURCE, "comments.find_by_id.authors");
        let comments = rw_read(&self.comments, SOURCE, "comments.find_by_id.comments");
        Ok(comments
            .iter()
            .find(|comment| comment.id == id)
            .map(|comment| Self::join_comment(comment, &authors)))
    }
}

#[async_trait]
impl CommentsWriteRepo for MemoryRepositories {
    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let authors = rw_read(&self.authors, SOURCE, "create_comment.authors");
        let posts = rw_read(&self.posts, SOURCE, "create_comment.posts");
        let mut comments = rw_write(&self.comments, SOURCE, "create_comment.comments");

        if !posts.contains_key(&params.post_id) {
            return Err(RepoError::InvalidInput {
                message: format!("post `{}` does not exist", params.post_id),
            });
        }
        if !authors.contains_key(&params.author_id) {
            return Err(RepoError::InvalidInput {
                message: format!("author `{}` does not exist", params.author_id),
            });
        }

        let comment = StoredComment {
            id: Uuid::new_v4(),
            seq: self.next_seq(),
            post_id: Some(params.post_id),
            author_id: Some(params.author_id),
            text: params.text,
            created_at: OffsetDateTime::now_utc(),
        };
        let record = Self::join_comment(&comment, &authors);
        comments.push(comment);
        Ok(record)
    }
}

#[async_trait]
impl FollowsRepo for MemoryRepositories {
    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        Ok(rw_read(&self.follows, SOURCE, "is_following")
            .iter()
            .any(|edge| edge.user_id == user_id && edge.author_id == author_id))
    }

    async fn count_edges(&self, user_id: Uuid, author_id: Uuid) -> Result<u64, RepoError> {
        Ok(rw_read(&self.follows, SOURCE, "count_edges")
            .iter()
            .filter(|edge| edge.user_id == user_id && edge.author_id == author_id)
            .count() as u64)
    }

    async fn list_following(&self, user_id: Uuid) -> Result<Vec<AuthorRecord>, RepoError> {
        let authors = rw_read(&self.authors, SOURCE, "list_following.authors");
        let follows = rw_read(&self.follows, SOURCE, "list_following.follows");

        let mut followed: Vec<AuthorRecord> = follows
            .iter()
            .filter(|edge| edge.user_id == user_id)
            .filter_map(|edge| authors.get(&edge.author_id).cloned())
            .collect();
        followed.sort_by(|left, right| left.username.cmp(&right.username));
        Ok(followed)
    }
}

#[async_trait]
impl FollowsWriteRepo for MemoryRepositories {
    async fn insert_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let authors = rw_read(&self.authors, SOURCE, "insert_follow.authors");
        let mut follows = rw_write(&self.follows, SOURCE, "insert_follow.follows");

        if !authors.contains_key(&user_id) || !authors.contains_key(&author_id) {
            return Err(RepoError::InvalidInput {
                message: "follow edge references a missing author".to_string(),
            });
        }
        if follows
            .iter()
            .any(|edge| edge.user_id == user_id && edge.author_id == author_id)
        {
            return Ok(false);
        }

        follows.push(FollowRecord {
            id: Uuid::new_v4(),
            user_id,
            author_id,
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(true)
    }

    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let mut follows = rw_write(&self.follows, SOURCE, "delete_follow");
        let before = follows.len();
        follows.retain(|edge| !(edge.user_id == user_id && edge.author_id == author_id));
        Ok(follows.len() != before)
    }
}
