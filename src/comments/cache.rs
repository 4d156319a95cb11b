use crate::api::{CommentItem, Page, PageRequest};
use std::collections::HashMap;

/// One comment in a card's thread.
///
/// Replies reference their parent through `parent_comment_id`;
/// `reply_to_name` is carried for display only and never used for
/// linkage.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub comment_id: i64,
    pub author_name: String,
    pub content: String,
    pub parent_comment_id: Option<i64>,
    pub reply_to_name: Option<String>,
    pub is_mine: bool,
    pub is_liked: bool,
    pub like_count: u32,
}

impl Comment {
    pub fn from_item(item: CommentItem) -> Self {
        Self {
            comment_id: item.comment_id,
            author_name: item.author_name,
            content: item.content,
            parent_comment_id: item.parent_comment_id,
            reply_to_name: item.reply_to_name,
            is_mine: item.is_mine,
            is_liked: item.is_liked,
            like_count: item.like_count,
        }
    }

    pub fn is_reply(&self) -> bool {
        self.parent_comment_id.is_some()
    }
}

/// Paginated comment state for one card.
///
/// Created on the first comment-sheet open (cache miss), lives until
/// the owning card is removed. Server order is preserved; confirmed
/// posts are prepended (newest first by convention).
#[derive(Debug, Default)]
pub struct CommentThread {
    comments: Vec<Comment>,
    next_page: u32,
    has_more: bool,
    /// True while the initial load or a load-more is outstanding.
    /// Pagination for one card is strictly sequential.
    fetching: bool,
    /// First page has landed.
    loaded: bool,
}

/// What a comment-sheet open should do next.
#[derive(Debug)]
pub enum OpenOutcome {
    /// Thread already loaded: the cached list, no network call.
    Hit(Vec<Comment>),
    /// Cache miss: fetch this page, then report back.
    Fetch(PageRequest),
    /// The initial fetch for this card is already outstanding.
    Busy,
}

/// Per-card comment thread cache.
///
/// Exclusively owns every [`CommentThread`]; all comment-list mutation
/// funnels through here. The cache itself never performs I/O: callers
/// ask what to fetch (`begin_*`), do the network call, and report the
/// outcome (`complete_*`/`abort_*`), so each await point leaves the
/// guard flags consistent even when a card is deleted mid-fetch.
#[derive(Debug)]
pub struct CommentCache {
    threads: HashMap<i64, CommentThread>,
    page_size: u32,
}

impl CommentCache {
    /// A zero `page_size` is clamped to 1.
    pub fn new(page_size: u32) -> Self {
        Self {
            threads: HashMap::new(),
            page_size: page_size.max(1),
        }
    }

    /// Resolve a comment-sheet open: a strict cache hit when the thread
    /// is loaded, the first-page request on a miss, `Busy` while the
    /// initial fetch is outstanding.
    pub fn begin_open(&mut self, challenge_id: i64) -> OpenOutcome {
        if let Some(thread) = self.threads.get(&challenge_id) {
            if thread.loaded {
                tracing::debug!(challenge_id, "Comment cache hit");
                return OpenOutcome::Hit(thread.comments.clone());
            }
            return OpenOutcome::Busy;
        }

        tracing::debug!(challenge_id, "Comment cache miss, fetching first page");
        self.threads.insert(
            challenge_id,
            CommentThread {
                fetching: true,
                ..CommentThread::default()
            },
        );
        OpenOutcome::Fetch(PageRequest {
            page: 0,
            size: self.page_size,
        })
    }

    /// Populate a thread from its first page. A no-op if the owning
    /// card was removed while the fetch was in flight.
    pub fn complete_open(&mut self, challenge_id: i64, page: Page<CommentItem>) {
        let Some(thread) = self.threads.get_mut(&challenge_id) else {
            tracing::debug!(challenge_id, "First comment page for removed card discarded");
            return;
        };
        let empty = page.content.is_empty();
        thread.comments = page.content.into_iter().map(Comment::from_item).collect();
        thread.has_more = !page.is_last_page;
        thread.next_page = if empty { 0 } else { 1 };
        thread.fetching = false;
        thread.loaded = true;
    }

    /// Roll a failed first-page fetch back to `NotLoaded` so a later
    /// open retries.
    pub fn abort_open(&mut self, challenge_id: i64) {
        if let Some(thread) = self.threads.get(&challenge_id) {
            if !thread.loaded {
                self.threads.remove(&challenge_id);
            }
        }
    }

    /// Next page to fetch, or `None` when the thread is not loaded,
    /// already fetching, or has nothing more.
    pub fn begin_load_more(&mut self, challenge_id: i64) -> Option<PageRequest> {
        let thread = self.threads.get_mut(&challenge_id)?;
        if !thread.loaded || thread.fetching || !thread.has_more {
            return None;
        }
        thread.fetching = true;
        Some(PageRequest {
            page: thread.next_page,
            size: self.page_size,
        })
    }

    /// Append a fetched page. `has_more` follows the server's
    /// is-last-page signal; the page counter only advances when the
    /// page actually contained results.
    pub fn complete_load_more(&mut self, challenge_id: i64, page: Page<CommentItem>) {
        let Some(thread) = self.threads.get_mut(&challenge_id) else {
            tracing::debug!(challenge_id, "Comment page for removed card discarded");
            return;
        };
        thread.fetching = false;
        thread.has_more = !page.is_last_page;
        if !page.content.is_empty() {
            thread.next_page += 1;
            thread
                .comments
                .extend(page.content.into_iter().map(Comment::from_item));
        }
    }

    /// Clear the fetching flag after a failed load-more; the thread and
    /// its cursor are left as they were.
    pub fn abort_load_more(&mut self, challenge_id: i64) {
        if let Some(thread) = self.threads.get_mut(&challenge_id) {
            thread.fetching = false;
        }
    }

    /// Prepend a server-confirmed comment (write-through post).
    pub fn insert_confirmed(&mut self, challenge_id: i64, comment: Comment) {
        let Some(thread) = self.threads.get_mut(&challenge_id) else {
            tracing::debug!(challenge_id, "Confirmed comment for absent thread dropped");
            return;
        };
        thread.comments.insert(0, comment);
    }

    /// Remove a confirmed-deleted comment. Deleting a top-level comment
    /// also removes its replies, matched by `parent_comment_id`.
    /// Returns how many comments were removed.
    pub fn remove_comment(&mut self, challenge_id: i64, comment_id: i64) -> usize {
        let Some(thread) = self.threads.get_mut(&challenge_id) else {
            return 0;
        };
        let before = thread.comments.len();
        thread
            .comments
            .retain(|c| c.comment_id != comment_id && c.parent_comment_id != Some(comment_id));
        before - thread.comments.len()
    }

    /// Flip a comment's like flag ahead of confirmation. Returns false
    /// when the comment is not cached (benign race; caller skips the
    /// remote call).
    pub fn set_comment_liked(&mut self, challenge_id: i64, comment_id: i64, liked: bool) -> bool {
        match self.comment_mut(challenge_id, comment_id) {
            Some(comment) => {
                comment.is_liked = liked;
                true
            }
            None => {
                tracing::debug!(challenge_id, comment_id, "Like on absent comment ignored");
                false
            }
        }
    }

    /// Adjust the count for a confirmed comment like. There is no
    /// rollback path here: on failure the caller reverts visually.
    pub fn confirm_comment_like(&mut self, challenge_id: i64, comment_id: i64, liked: bool) {
        if let Some(comment) = self.comment_mut(challenge_id, comment_id) {
            comment.like_count = if liked {
                comment.like_count.saturating_add(1)
            } else {
                comment.like_count.saturating_sub(1)
            };
        }
    }

    /// Cloned snapshot of a thread's comments (empty when absent).
    pub fn snapshot(&self, challenge_id: i64) -> Vec<Comment> {
        self.threads
            .get(&challenge_id)
            .map(|t| t.comments.clone())
            .unwrap_or_default()
    }

    pub fn has_more(&self, challenge_id: i64) -> bool {
        self.threads
            .get(&challenge_id)
            .map(|t| t.has_more)
            .unwrap_or(false)
    }

    /// Destroy a removed card's thread, even mid-fetch.
    pub fn discard(&mut self, challenge_id: i64) {
        self.threads.remove(&challenge_id);
    }

    /// Destroy every thread (feed reset replaces all cards).
    pub fn clear(&mut self) {
        self.threads.clear();
    }

    fn comment_mut(&mut self, challenge_id: i64, comment_id: i64) -> Option<&mut Comment> {
        self.threads
            .get_mut(&challenge_id)?
            .comments
            .iter_mut()
            .find(|c| c.comment_id == comment_id)
    }
}
