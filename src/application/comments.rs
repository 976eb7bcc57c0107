use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::repos::{
    CommentsRepo, CommentsWriteRepo, CreateCommentParams, PostsRepo, RepoError,
};
use crate::domain::entities::CommentRecord;
use crate::domain::error::DomainError;
use crate::domain::posts;
use crate::domain::types::Viewer;

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("authentication required")]
    Unauthorized,
    #[error("post `{0}` not found")]
    UnknownPost(Uuid),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct CommentService {
    reader: Arc<dyn CommentsRepo>,
    writer: Arc<dyn CommentsWriteRepo>,
    posts: Arc<dyn PostsRepo>,
}

impl CommentService {
    pub fn new(
        reader: Arc<dyn CommentsRepo>,
        writer: Arc<dyn CommentsWriteRepo>,
        posts: Arc<dyn PostsRepo>,
    ) -> Self {
        Self {
            reader,
            writer,
            posts,
        }
    }

    #[instrument(skip(self, text))]
    pub async fn add(
        &self,
        viewer: Viewer,
        post_id: Uuid,
        text: &str,
    ) -> Result<CommentRecord, CommentError> {
        let author_id = viewer.author_id().ok_or(CommentError::Unauthorized)?;
        let text = posts::validate_comment_text(text)?;
        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(CommentError::UnknownPost(post_id));
        }

        let comment = self
            .writer
            .create_comment(CreateCommentParams {
                post_id,
                author_id,
                text,
            })
            .await?;

        info!(comment_id = %comment.id, %post_id, "comment added");
        Ok(comment)
    }

    /// Comments in the order they were written.
    pub async fn list(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, CommentError> {
        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(CommentError::UnknownPost(post_id));
        }
        self.reader
            .list_for_post(post_id)
            .await
            .map_err(CommentError::from)
    }
}
