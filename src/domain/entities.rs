//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::posts;
use crate::domain::types::MediaRef;

/// Identity handle supplied by the identity subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorRecord {
    pub id: Uuid,
    pub username: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRecord {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Group columns joined onto a post for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostGroupRef {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
}

impl From<&GroupRecord> for PostGroupRef {
    fn from(group: &GroupRecord) -> Self {
        Self {
            id: group.id,
            slug: group.slug.clone(),
            title: group.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostRecord {
    pub id: Uuid,
    /// Monotonic creation sequence; breaks `pub_date` ties.
    pub seq: i64,
    pub author_id: Uuid,
    pub author_username: String,
    pub group: Option<PostGroupRef>,
    pub text: String,
    pub image: Option<MediaRef>,
    pub pub_date: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl PostRecord {
    pub fn group_id(&self) -> Option<Uuid> {
        self.group.as_ref().map(|group| group.id)
    }

    pub fn headline(&self) -> &str {
        posts::headline(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRecord {
    pub id: Uuid,
    pub post_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub author_username: Option<String>,
    pub text: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_id: Uuid,
    pub created_at: OffsetDateTime,
}
