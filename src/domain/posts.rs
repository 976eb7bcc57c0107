//! Post and comment invariants shared by every store adapter.

use std::cmp::Ordering;

use crate::domain::entities::PostRecord;
use crate::domain::error::DomainError;

/// Number of characters shown when a post is summarised in one line.
pub const HEADLINE_CHARS: usize = 15;
pub const MAX_COMMENT_CHARS: usize = 2000;
pub const MAX_GROUP_TITLE_CHARS: usize = 200;
pub const MAX_GROUP_SLUG_CHARS: usize = 200;

/// Default feed ordering: newest `pub_date` first, later creation first on ties.
pub fn feed_order(left: &PostRecord, right: &PostRecord) -> Ordering {
    right
        .pub_date
        .cmp(&left.pub_date)
        .then(right.seq.cmp(&left.seq))
}

pub fn sort_for_feed(posts: &mut [PostRecord]) {
    posts.sort_by(feed_order);
}

pub fn headline(text: &str) -> &str {
    match text.char_indices().nth(HEADLINE_CHARS) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

pub fn validate_post_text(text: &str) -> Result<String, DomainError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("text", "post text must not be empty"));
    }
    Ok(trimmed.to_string())
}

pub fn validate_comment_text(text: &str) -> Result<String, DomainError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(
            "text",
            "comment text must not be empty",
        ));
    }
    let length = trimmed.chars().count();
    if length > MAX_COMMENT_CHARS {
        return Err(DomainError::validation(
            "text",
            format!("comment is {length} characters, limit is {MAX_COMMENT_CHARS}"),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn validate_group_title(title: &str) -> Result<String, DomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("title", "group title must not be empty"));
    }
    if trimmed.chars().count() > MAX_GROUP_TITLE_CHARS {
        return Err(DomainError::validation(
            "title",
            format!("group title exceeds {MAX_GROUP_TITLE_CHARS} characters"),
        ));
    }
    Ok(trimmed.to_string())
}
