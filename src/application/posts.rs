//! Post authoring: create, edit, and delete on behalf of a viewer.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::repos::{
    CreatePostParams, GroupsRepo, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::PostRecord;
use crate::domain::error::DomainError;
use crate::domain::posts;
use crate::domain::types::{MediaRef, Viewer};

#[derive(Debug, Error)]
pub enum PostError {
    #[error("authentication required")]
    Unauthorized,
    #[error("post `{0}` belongs to another author")]
    Forbidden(Uuid),
    #[error("post `{0}` not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Default)]
pub struct CreatePostCommand {
    pub group_id: Option<Uuid>,
    pub text: String,
    pub image: Option<MediaRef>,
}

#[derive(Debug, Clone)]
pub struct UpdatePostCommand {
    pub id: Uuid,
    pub group_id: Option<Uuid>,
    pub text: String,
    pub image: Option<MediaRef>,
}

#[derive(Clone)]
pub struct PostService {
    reader: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
    groups: Arc<dyn GroupsRepo>,
}

impl PostService {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        groups: Arc<dyn GroupsRepo>,
    ) -> Self {
        Self {
            reader,
            writer,
            groups,
        }
    }

    /// Publishes a post. Cached global pages are left as they are.
    #[instrument(skip(self, command), fields(group_id = ?command.group_id))]
    pub async fn create(
        &self,
        viewer: Viewer,
        command: CreatePostCommand,
    ) -> Result<PostRecord, PostError> {
        let author_id = viewer.author_id().ok_or(PostError::Unauthorized)?;
        let text = posts::validate_post_text(&command.text)?;
        self.ensure_group(command.group_id).await?;

        let post = self
            .writer
            .create_post(CreatePostParams {
                author_id,
                group_id: command.group_id,
                text,
                image: command.image,
            })
            .await?;

        info!(post_id = %post.id, %author_id, "post created");
        Ok(post)
    }

    /// Replaces text, group, and image. `pub_date` never changes.
    #[instrument(skip(self, command), fields(post_id = %command.id))]
    pub async fn edit(
        &self,
        viewer: Viewer,
        command: UpdatePostCommand,
    ) -> Result<PostRecord, PostError> {
        let author_id = viewer.author_id().ok_or(PostError::Unauthorized)?;
        self.owned_post(author_id, command.id).await?;
        let text = posts::validate_post_text(&command.text)?;
        self.ensure_group(command.group_id).await?;

        let post = self
            .writer
            .update_post(UpdatePostParams {
                id: command.id,
                group_id: command.group_id,
                text,
                image: command.image,
            })
            .await?;

        info!(post_id = %post.id, "post updated");
        Ok(post)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, viewer: Viewer, id: Uuid) -> Result<(), PostError> {
        let author_id = viewer.author_id().ok_or(PostError::Unauthorized)?;
        self.owned_post(author_id, id).await?;
        self.writer.delete_post(id).await?;
        info!(post_id = %id, "post deleted");
        Ok(())
    }

    pub async fn find(&self, id: Uuid) -> Result<PostRecord, PostError> {
        self.reader
            .find_by_id(id)
            .await?
            .ok_or(PostError::NotFound(id))
    }
}

impl PostService {
    async fn owned_post(&self, author_id: Uuid, id: Uuid) -> Result<PostRecord, PostError> {
        let post = self.find(id).await?;
        if post.author_id != author_id {
            return Err(PostError::Forbidden(id));
        }
        Ok(post)
    }

    async fn ensure_group(&self, group_id: Option<Uuid>) -> Result<(), PostError> {
        let Some(group_id) = group_id else {
            return Ok(());
        };
        if self.groups.find_by_id(group_id).await?.is_none() {
            return Err(DomainError::validation(
                "group",
                format!("group `{group_id}` does not exist"),
            )
            .into());
        }
        Ok(())
    }
}
