use serde::{Deserialize, Serialize};

// ============================================================================
// Pagination
// ============================================================================

/// Page coordinates for one upstream collection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

/// One page of a paginated upstream collection.
///
/// `is_last_page` is the server's own "nothing after this" signal.
/// Comment pagination trusts it; feed-source exhaustion is driven by
/// empty pages instead, so the two are decoupled.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub is_last_page: bool,
}

impl<T> Page<T> {
    /// An empty, terminal page. Stands in for a source the server
    /// omitted from its response.
    pub fn empty() -> Self {
        Self {
            content: Vec::new(),
            is_last_page: true,
        }
    }
}

// ============================================================================
// Feed Wire Types
// ============================================================================

/// Both source pages returned by one feed request.
///
/// A source that was not requested (exhausted cursor) is omitted from
/// the request and comes back absent here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedBatch {
    #[serde(default)]
    pub trending: Option<Page<FeedItem>>,
    #[serde(default)]
    pub friends: Option<Page<FeedItem>>,
}

/// A single challenge as the server serializes it into either feed
/// collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub challenge_id: i64,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    pub author_name: String,
    #[serde(default)]
    pub author_avatar_url: Option<String>,
    /// RFC 3339 creation timestamp. Parsed leniently into the model.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub is_mine: bool,
}

/// Acknowledgement for a challenge like toggle.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeAck {
    pub challenge_id: i64,
    #[serde(default)]
    pub like_id: Option<i64>,
}

// ============================================================================
// Comment Wire Types
// ============================================================================

/// A single comment as the server serializes it.
///
/// Replies carry `parent_comment_id`; the legacy `reply_to_name` field
/// is still delivered for display purposes but is never used to link
/// replies to parents.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentItem {
    pub comment_id: i64,
    pub author_name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub parent_comment_id: Option<i64>,
    #[serde(default)]
    pub reply_to_name: Option<String>,
    #[serde(default)]
    pub is_mine: bool,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub like_count: u32,
}

/// Request body for posting a comment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDraft {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_name: Option<String>,
}

/// Acknowledgement for a posted comment: the server-assigned identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCommentAck {
    pub comment_id: i64,
}

/// Acknowledgement for a comment like toggle.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentLikeAck {
    pub comment_id: i64,
    #[serde(default)]
    pub like_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_deserializes_camel_case() {
        let json = r#"{"content": [{"challengeId": 7, "authorName": "ana"}], "isLastPage": true}"#;
        let page: Page<FeedItem> = serde_json::from_str(json).unwrap();
        assert_eq!(page.content.len(), 1);
        assert!(page.is_last_page);
        assert_eq!(page.content[0].challenge_id, 7);
        assert_eq!(page.content[0].author_name, "ana");
    }

    #[test]
    fn test_page_missing_fields_default() {
        let page: Page<FeedItem> = serde_json::from_str("{}").unwrap();
        assert!(page.content.is_empty());
        assert!(!page.is_last_page);
    }

    #[test]
    fn test_feed_item_optional_fields_default() {
        let json = r#"{"challengeId": 3, "authorName": "ben"}"#;
        let item: FeedItem = serde_json::from_str(json).unwrap();
        assert!(item.image_urls.is_empty());
        assert!(item.caption.is_empty());
        assert!(item.hashtags.is_empty());
        assert!(item.author_avatar_url.is_none());
        assert!(item.created_at.is_none());
        assert!(!item.is_liked);
        assert_eq!(item.like_count, 0);
        assert!(!item.is_mine);
    }

    #[test]
    fn test_feed_batch_omitted_source_is_none() {
        let json = r#"{"trending": {"content": [], "isLastPage": true}}"#;
        let batch: FeedBatch = serde_json::from_str(json).unwrap();
        assert!(batch.trending.is_some());
        assert!(batch.friends.is_none());
    }

    #[test]
    fn test_comment_item_reply_linkage() {
        let json = r#"{
            "commentId": 12,
            "authorName": "cho",
            "content": "nice climb",
            "parentCommentId": 9,
            "replyToName": "ana",
            "isMine": true,
            "isLiked": true,
            "likeCount": 2
        }"#;
        let item: CommentItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.comment_id, 12);
        assert_eq!(item.parent_comment_id, Some(9));
        assert_eq!(item.reply_to_name.as_deref(), Some("ana"));
        assert!(item.is_mine);
        assert_eq!(item.like_count, 2);
    }

    #[test]
    fn test_comment_draft_skips_absent_optionals() {
        let draft = CommentDraft {
            content: "great pace".to_string(),
            parent_comment_id: None,
            reply_to_name: None,
        };
        let json = serde_json::to_string(&draft).unwrap();
        assert_eq!(json, r#"{"content":"great pace"}"#);

        let reply = CommentDraft {
            content: "thanks!".to_string(),
            parent_comment_id: Some(4),
            reply_to_name: Some("ana".to_string()),
        };
        let json = serde_json::to_string(&reply).unwrap();
        assert!(json.contains(r#""parentCommentId":4"#));
        assert!(json.contains(r#""replyToName":"ana""#));
    }
}
