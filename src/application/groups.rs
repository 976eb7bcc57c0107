//! Group administration.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::repos::{CreateGroupParams, GroupsRepo, GroupsWriteRepo, RepoError};
use crate::domain::entities::GroupRecord;
use crate::domain::error::DomainError;
use crate::domain::posts;
use crate::domain::slug::{self, SlugAsyncError, SlugError};

#[derive(Debug, Error)]
pub enum GroupError {
    #[error("group `{0}` not found")]
    NotFound(String),
    #[error("slug `{0}` is already taken")]
    SlugTaken(String),
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<SlugAsyncError<RepoError>> for GroupError {
    fn from(err: SlugAsyncError<RepoError>) -> Self {
        match err {
            SlugAsyncError::Slug(err) => GroupError::Slug(err),
            SlugAsyncError::Predicate(err) => GroupError::Repo(err),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateGroupCommand {
    pub title: String,
    /// Derived from the title when absent.
    pub slug: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct GroupService {
    reader: Arc<dyn GroupsRepo>,
    writer: Arc<dyn GroupsWriteRepo>,
}

impl GroupService {
    pub fn new(reader: Arc<dyn GroupsRepo>, writer: Arc<dyn GroupsWriteRepo>) -> Self {
        Self { reader, writer }
    }

    #[instrument(skip(self, command), fields(title = %command.title))]
    pub async fn create(&self, command: CreateGroupCommand) -> Result<GroupRecord, GroupError> {
        let title = posts::validate_group_title(&command.title)?;

        let slug = match command.slug.as_deref().map(str::trim) {
            Some(explicit) if !explicit.is_empty() => {
                slug::validate_slug(explicit)?;
                if self.reader.find_by_slug(explicit).await?.is_some() {
                    return Err(GroupError::SlugTaken(explicit.to_string()));
                }
                explicit.to_string()
            }
            _ => {
                let reader = self.reader.clone();
                slug::generate_unique_slug_async(&title, move |candidate| {
                    let reader = reader.clone();
                    let candidate = candidate.to_string();
                    async move {
                        reader
                            .find_by_slug(&candidate)
                            .await
                            .map(|existing| existing.is_none())
                    }
                })
                .await?
            }
        };

        let description = command
            .description
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let group = self
            .writer
            .create_group(CreateGroupParams {
                title,
                slug,
                description,
            })
            .await?;

        info!(group_id = %group.id, slug = %group.slug, "group created");
        Ok(group)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<GroupRecord, GroupError> {
        self.reader
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| GroupError::NotFound(slug.to_string()))
    }

    pub async fn list(&self) -> Result<Vec<GroupRecord>, GroupError> {
        self.reader.list_groups().await.map_err(GroupError::from)
    }

    /// Removes the group. Its posts stay published without a group.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), GroupError> {
        if self.reader.find_by_id(id).await?.is_none() {
            return Err(GroupError::NotFound(id.to_string()));
        }
        self.writer.delete_group(id).await?;
        info!(group_id = %id, "group deleted");
        Ok(())
    }
}
