//! Per-card comment threads.
//!
//! Each feed card lazily gets a [`CommentThread`] the first time its
//! comment sheet opens. Threads are cached for the life of the feed
//! session with a strict cache-hit policy (reopening never refetches)
//! and are destroyed when their owning card is removed. Pagination is
//! strictly sequential per card; different cards are fully independent.

mod cache;

pub use cache::{Comment, CommentCache, CommentThread, OpenOutcome};
