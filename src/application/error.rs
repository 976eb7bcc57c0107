use std::error::Error as StdError;

use thiserror::Error;

use crate::application::comments::CommentError;
use crate::application::feed::FeedError;
use crate::application::follow::FollowError;
use crate::application::groups::GroupError;
use crate::application::posts::PostError;
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;
use crate::infra::error::InfraError;

/// Error chain flattened for logging, outermost message first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }

    /// One-line chain; a cause already quoted by the message before it is skipped.
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        for message in &self.messages {
            if summary.ends_with(message.as_str()) {
                continue;
            }
            if !summary.is_empty() {
                summary.push_str(": ");
            }
            summary.push_str(message);
        }
        summary
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("authentication required")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::Domain(DomainError::Validation { .. }) | AppError::Validation(_) => {
                "validation"
            }
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::Repo(_) => "repository",
            AppError::Infra(InfraError::Database { .. } | InfraError::Migration { .. }) => {
                "database"
            }
            AppError::Infra(_) => "infrastructure",
            AppError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<FeedError> for AppError {
    fn from(error: FeedError) -> Self {
        match error {
            FeedError::Unauthorized => AppError::Unauthorized,
            FeedError::Repo(err) => AppError::Repo(err),
            FeedError::MissingFilter(_) => AppError::validation(error.to_string()),
            other => AppError::not_found(other.to_string()),
        }
    }
}

impl From<PostError> for AppError {
    fn from(error: PostError) -> Self {
        match error {
            PostError::Unauthorized => AppError::Unauthorized,
            PostError::Forbidden(_) => AppError::Forbidden(error.to_string()),
            PostError::NotFound(_) => AppError::not_found(error.to_string()),
            PostError::Domain(err) => AppError::Domain(err),
            PostError::Repo(err) => AppError::Repo(err),
        }
    }
}

impl From<CommentError> for AppError {
    fn from(error: CommentError) -> Self {
        match error {
            CommentError::Unauthorized => AppError::Unauthorized,
            CommentError::UnknownPost(_) => AppError::not_found(error.to_string()),
            CommentError::Domain(err) => AppError::Domain(err),
            CommentError::Repo(err) => AppError::Repo(err),
        }
    }
}

impl From<FollowError> for AppError {
    fn from(error: FollowError) -> Self {
        match error {
            FollowError::Unauthorized => AppError::Unauthorized,
            FollowError::SelfFollow => AppError::validation(error.to_string()),
            FollowError::UnknownAuthor(_) => AppError::not_found(error.to_string()),
            FollowError::Repo(err) => AppError::Repo(err),
        }
    }
}

impl From<GroupError> for AppError {
    fn from(error: GroupError) -> Self {
        match error {
            GroupError::NotFound(_) => AppError::not_found(error.to_string()),
            GroupError::SlugTaken(_) | GroupError::Slug(_) => {
                AppError::validation(error.to_string())
            }
            GroupError::Domain(err) => AppError::Domain(err),
            GroupError::Repo(err) => AppError::Repo(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_errors_map_to_app_kinds() {
        assert_eq!(AppError::from(FeedError::Unauthorized).kind(), "unauthorized");
        assert_eq!(
            AppError::from(FeedError::UnknownGroup("cats".into())).kind(),
            "not_found"
        );
        assert_eq!(
            AppError::from(FeedError::MissingFilter("group")).kind(),
            "validation"
        );
    }

    #[test]
    fn report_walks_the_source_chain() {
        let error = AppError::from(InfraError::from(std::io::Error::other("disk gone")));
        let report = ErrorReport::from_error("test", &error);
        assert_eq!(
            report.messages.first().map(String::as_str),
            Some("io error: disk gone")
        );
        assert_eq!(report.summary(), "io error: disk gone");
    }

    #[test]
    fn summary_joins_distinct_causes() {
        let report = ErrorReport {
            source: "test",
            messages: vec![
                "failed to load configuration".to_string(),
                "missing field `url`".to_string(),
            ],
        };
        assert_eq!(
            report.summary(),
            "failed to load configuration: missing field `url`"
        );
    }
}
