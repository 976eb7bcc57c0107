//! Follow graph operations.
//!
//! Following is two ordered checks: a viewer may never follow themselves, and
//! an existing edge makes a repeated follow a successful no-op. The store
//! itself accepts `user == author`; the self-follow rule lives only here.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::application::repos::{AuthorsRepo, FollowsRepo, FollowsWriteRepo, RepoError};
use crate::domain::entities::AuthorRecord;
use crate::domain::types::Viewer;

#[derive(Debug, Error)]
pub enum FollowError {
    #[error("authentication required")]
    Unauthorized,
    #[error("authors cannot follow themselves")]
    SelfFollow,
    #[error("author `{0}` not found")]
    UnknownAuthor(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// What a follow or unfollow call changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Created,
    Removed,
    Unchanged,
}

#[derive(Clone)]
pub struct FollowService {
    reader: Arc<dyn FollowsRepo>,
    writer: Arc<dyn FollowsWriteRepo>,
    authors: Arc<dyn AuthorsRepo>,
}

impl FollowService {
    pub fn new(
        reader: Arc<dyn FollowsRepo>,
        writer: Arc<dyn FollowsWriteRepo>,
        authors: Arc<dyn AuthorsRepo>,
    ) -> Self {
        Self {
            reader,
            writer,
            authors,
        }
    }

    #[instrument(skip(self))]
    pub async fn follow(
        &self,
        viewer: Viewer,
        username: &str,
    ) -> Result<FollowOutcome, FollowError> {
        let user_id = viewer.author_id().ok_or(FollowError::Unauthorized)?;
        let author = self.resolve(username).await?;
        if author.id == user_id {
            return Err(FollowError::SelfFollow);
        }

        if self.writer.insert_follow(user_id, author.id).await? {
            info!(%user_id, author_id = %author.id, "follow created");
            Ok(FollowOutcome::Created)
        } else {
            debug!(%user_id, author_id = %author.id, "follow already present");
            Ok(FollowOutcome::Unchanged)
        }
    }

    #[instrument(skip(self))]
    pub async fn unfollow(
        &self,
        viewer: Viewer,
        username: &str,
    ) -> Result<FollowOutcome, FollowError> {
        let user_id = viewer.author_id().ok_or(FollowError::Unauthorized)?;
        let author = self.resolve(username).await?;

        if self.writer.delete_follow(user_id, author.id).await? {
            info!(%user_id, author_id = %author.id, "follow removed");
            Ok(FollowOutcome::Removed)
        } else {
            Ok(FollowOutcome::Unchanged)
        }
    }

    /// Anonymous viewers never follow anyone.
    pub async fn is_following(&self, viewer: Viewer, author_id: Uuid) -> Result<bool, FollowError> {
        match viewer.author_id() {
            Some(user_id) => Ok(self.reader.is_following(user_id, author_id).await?),
            None => Ok(false),
        }
    }

    pub async fn following(&self, viewer: Viewer) -> Result<Vec<AuthorRecord>, FollowError> {
        let user_id = viewer.author_id().ok_or(FollowError::Unauthorized)?;
        self.reader
            .list_following(user_id)
            .await
            .map_err(FollowError::from)
    }

    async fn resolve(&self, username: &str) -> Result<AuthorRecord, FollowError> {
        self.authors
            .find_by_username(username)
            .await?
            .ok_or_else(|| FollowError::UnknownAuthor(username.to_string()))
    }
}
