//! The merged social feed: aggregation, ordering, and optimistic
//! interaction.
//!
//! Two upstream collections — `trending` and `friends` — are paginated
//! independently and merged into one ordered card list:
//!
//! - [`PageCursor`] - page/size/exhausted tracking per source
//! - [`interleave`] - deterministic ratio merge of two ordered pages
//! - [`FeedStore`] - owner of the card list and sole mutation point
//! - [`LikeGate`] - request-identity gating for optimistic like toggles
//! - [`FeedService`] - the composition root the UI collaborator calls
//!
//! # Example
//!
//! ```ignore
//! let feed = FeedService::new(api, &config);
//! feed.load_feed().await?;        // first load resets
//! feed.load_feed().await?;        // further loads append
//! feed.toggle_like(42, true).await?;
//! ```

mod card;
mod cursor;
mod interleave;
mod like;
mod service;
mod store;

pub use card::FeedCard;
pub use cursor::PageCursor;
pub use interleave::{interleave, InterleaveRatio};
pub use like::{LikeGate, LikePhase, LikeTicket};
pub use service::FeedService;
pub use store::FeedStore;
