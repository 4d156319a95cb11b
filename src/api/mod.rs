//! Backend contract for the Trail social feed.
//!
//! The engine consumes the server through exactly one seam, the
//! [`SocialApi`] trait: one feed fetch covering both paginated source
//! collections, like toggles for challenges and comments, and the
//! comment CRUD calls. [`HttpSocialApi`] is the production
//! implementation; tests substitute scripted fakes.
//!
//! Request signing, retry-by-transport, and session refresh belong to
//! the app shell's HTTP stack, not to this crate: each call here is
//! one request with one outcome.

mod http;
mod types;

use thiserror::Error;

pub use http::HttpSocialApi;
pub use types::{
    CommentDraft, CommentItem, CommentLikeAck, FeedBatch, FeedItem, LikeAck, Page, PageRequest,
    PostCommentAck,
};

// ============================================================================
// Error Types
// ============================================================================

/// Errors surfaced by a backend call.
///
/// Local "card/comment no longer present" situations are not errors:
/// the store and cache absorb those as silent no-ops.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level error (DNS, connection, TLS, body read).
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request exceeded the per-call deadline.
    #[error("Request timed out")]
    Timeout,
    /// Server answered with a non-2xx status.
    #[error("Server rejected request: status {status}: {message}")]
    Rejected { status: u16, message: String },
    /// Response body exceeded the size cap.
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// Response body did not decode into the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),
    /// Base URL could not be parsed.
    #[error("Invalid base URL")]
    InvalidBaseUrl,
    /// Base URL must be HTTPS (except localhost for testing).
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
}

impl ApiError {
    /// Returns true for transport-shaped failures, as opposed to an
    /// explicit server rejection.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ApiError::Network(_)
                | ApiError::Timeout
                | ApiError::ResponseTooLarge(_)
                | ApiError::Decode(_)
        )
    }
}

// ============================================================================
// Backend Contract
// ============================================================================

/// The narrow request/response contract the feed engine consumes.
///
/// One method per upstream operation. Implementations perform the I/O;
/// the engine owns all shared state and applies each call's outcome on
/// its own control flow.
#[allow(async_fn_in_trait)]
pub trait SocialApi {
    /// Fetch one page from each requested source collection. A `None`
    /// request omits that source entirely.
    async fn fetch_feed(
        &self,
        trending: Option<PageRequest>,
        friends: Option<PageRequest>,
    ) -> Result<FeedBatch, ApiError>;

    /// Set the liked state of a challenge to `liked`.
    async fn set_challenge_like(&self, challenge_id: i64, liked: bool)
        -> Result<LikeAck, ApiError>;

    /// Delete a challenge the viewer owns.
    async fn delete_challenge(&self, challenge_id: i64) -> Result<(), ApiError>;

    /// Fetch one page of a challenge's comment thread.
    async fn fetch_comments(
        &self,
        challenge_id: i64,
        request: PageRequest,
    ) -> Result<Page<CommentItem>, ApiError>;

    /// Post a comment (or reply) to a challenge. Returns the
    /// server-assigned comment identity.
    async fn post_comment(
        &self,
        challenge_id: i64,
        draft: CommentDraft,
    ) -> Result<PostCommentAck, ApiError>;

    /// Delete a comment the viewer owns.
    async fn delete_comment(&self, challenge_id: i64, comment_id: i64) -> Result<(), ApiError>;

    /// Set the liked state of a comment to `liked`.
    async fn set_comment_like(
        &self,
        comment_id: i64,
        liked: bool,
    ) -> Result<CommentLikeAck, ApiError>;
}
