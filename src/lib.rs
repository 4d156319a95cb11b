//! Feed aggregation and optimistic interaction engine for the Trail
//! habit-tracking app.
//!
//! Trail users complete daily routines, photograph proof, and share the
//! results ("challenges") into a social feed. This crate is the engine
//! behind that feed screen:
//!
//! - **Aggregation**: merges the independently paginated `trending` and
//!   `friends` collections into one ordered, ratio-interleaved card list
//! - **Optimistic likes**: flips like state locally before the server
//!   answers, with request-identity-gated reconciliation so a stale
//!   response can never clobber a newer tap
//! - **Comment threads**: per-card, lazily loaded, paginated comment
//!   lists with a strict cache-hit policy on reopen
//!
//! # Architecture
//!
//! The crate is organized into three areas:
//!
//! - [`api`] - Wire DTOs, the [`api::SocialApi`] backend contract, and a
//!   reqwest-backed implementation
//! - [`feed`] - Cursors, the interleaver, the card store, like gating,
//!   and [`feed::FeedService`], the composition root the UI talks to
//! - [`comments`] - Per-card comment thread state and cache
//!
//! Rendering, session management, and image upload live in the app
//! shell; this crate only ever hands out cloned snapshots of its state.
//!
//! # Example
//!
//! ```ignore
//! use trailfeed::{FeedConfig, FeedService, HttpSocialApi};
//!
//! let config = FeedConfig::load(&path)?;
//! let api = HttpSocialApi::from_config(&config)?;
//! let feed = FeedService::new(api, &config);
//!
//! feed.load_feed().await?;
//! for card in feed.cards().await {
//!     println!("{}: {}", card.author_name, card.caption);
//! }
//! ```

pub mod api;
pub mod comments;
pub mod config;
pub mod feed;

pub use api::{ApiError, HttpSocialApi, SocialApi};
pub use comments::Comment;
pub use config::{ConfigError, FeedConfig};
pub use feed::{FeedCard, FeedService, InterleaveRatio, LikePhase};
