use crate::api::FeedItem;
use chrono::{DateTime, Utc};

/// One challenge card in the merged feed.
///
/// Identity is `challenge_id` (server-assigned, unique within a feed)
/// and never changes after creation. `is_liked` and `like_count` are
/// the only fields mutated after creation, and only ever by the
/// [`FeedStore`](super::FeedStore). Removal is terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedCard {
    pub challenge_id: i64,
    /// Proof photos, in the order the author attached them.
    pub image_urls: Vec<String>,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub author_name: String,
    pub author_avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_liked: bool,
    pub like_count: u32,
    /// Whether the viewer owns this challenge (controls the edit/delete
    /// affordance).
    pub is_mine: bool,
}

impl FeedCard {
    /// Convert a wire item into a card.
    ///
    /// Conversion is best-effort: a missing or malformed timestamp
    /// falls back to the Unix epoch rather than failing the page.
    pub fn from_item(item: FeedItem) -> Self {
        let created_at = match item.created_at.as_deref() {
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(parsed) => parsed.with_timezone(&Utc),
                Err(e) => {
                    tracing::debug!(
                        challenge_id = item.challenge_id,
                        raw = %raw,
                        error = %e,
                        "Unparseable creation timestamp, using epoch"
                    );
                    DateTime::UNIX_EPOCH
                }
            },
            None => DateTime::UNIX_EPOCH,
        };

        Self {
            challenge_id: item.challenge_id,
            image_urls: item.image_urls,
            caption: item.caption,
            hashtags: item.hashtags,
            author_name: item.author_name,
            author_avatar_url: item.author_avatar_url,
            created_at,
            is_liked: item.is_liked,
            like_count: item.like_count,
            is_mine: item.is_mine,
        }
    }
}
