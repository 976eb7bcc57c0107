//! Feed composition and pagination core for a small blogging platform.
//!
//! Authors publish posts, optionally filed under groups; readers comment and
//! follow authors. Four feeds (global, group, profile, subscription) are
//! served as numbered pages, and the global feed is memoized by a page cache
//! that only refreshes on expiry or an explicit clear.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
