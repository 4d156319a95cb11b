use super::card::FeedCard;
use super::cursor::PageCursor;
use super::interleave::InterleaveRatio;
use super::like::{LikeGate, LikePhase};
use super::store::FeedStore;
use crate::api::{ApiError, CommentDraft, FeedItem, Page, PageRequest, SocialApi};
use crate::comments::{Comment, CommentCache, OpenOutcome};
use crate::config::FeedConfig;
use tokio::sync::Mutex;

/// Everything that belongs to one feed session: the card store and the
/// two source cursors, plus the in-flight load guard.
struct Session {
    store: FeedStore,
    trending: PageCursor,
    friends: PageCursor,
    loading: bool,
    initialized: bool,
}

/// Composition root of the feed engine; the surface the UI talks to.
///
/// Wires the source cursors, the interleaving card store, like gating,
/// and the comment cache over a generic backend. Network calls run
/// concurrently (one feed load plus any number of per-card like and
/// comment calls may be outstanding at once), but every completion
/// re-acquires the relevant lock before touching shared state, so all
/// mutations are linearized. Locks are held only for state access,
/// never across a network await; lock order is session, then likes,
/// then comments.
///
/// The UI only ever receives cloned snapshots, never references into
/// internal state.
pub struct FeedService<A> {
    api: A,
    session: Mutex<Session>,
    comments: Mutex<CommentCache>,
    likes: Mutex<LikeGate>,
    silent_like_failures: bool,
    viewer_name: String,
}

impl<A: SocialApi> FeedService<A> {
    pub fn new(api: A, config: &FeedConfig) -> Self {
        let ratio = InterleaveRatio::new(config.ratio_trending, config.ratio_friends);
        Self {
            api,
            session: Mutex::new(Session {
                store: FeedStore::new(ratio),
                trending: PageCursor::new(config.trending_page_size),
                friends: PageCursor::new(config.friends_page_size),
                loading: false,
                initialized: false,
            }),
            comments: Mutex::new(CommentCache::new(config.comment_page_size)),
            likes: Mutex::new(LikeGate::new()),
            silent_like_failures: config.silent_like_failures,
            viewer_name: String::new(),
        }
    }

    /// Configure the placeholder cards served when a feed reset merges
    /// to an empty result.
    pub fn with_placeholders(self, placeholders: Vec<FeedCard>) -> Self {
        let Self {
            api,
            session,
            comments,
            likes,
            silent_like_failures,
            viewer_name,
        } = self;
        let mut session = session.into_inner();
        session.store = session.store.with_placeholders(placeholders);
        Self {
            api,
            session: Mutex::new(session),
            comments,
            likes,
            silent_like_failures,
            viewer_name,
        }
    }

    /// Display name used for comments the viewer posts (`is_mine`
    /// construction); the session layer owns the actual identity.
    pub fn with_viewer_name(mut self, name: impl Into<String>) -> Self {
        self.viewer_name = name.into();
        self
    }

    // ========================================================================
    // Feed loading
    // ========================================================================

    /// Load the next feed page from both sources and merge it in.
    ///
    /// The first call of a session resets the store; later calls
    /// append. Guarded by an in-flight flag: a call while a load is
    /// outstanding is a no-op. Once both sources are exhausted this
    /// does nothing until [`refresh_feed`](FeedService::refresh_feed).
    pub async fn load_feed(&self) -> Result<(), ApiError> {
        self.load_inner(false).await
    }

    /// Pull-to-refresh: restart both cursors at page 0 and replace the
    /// card list. Comment threads and like tracking for the replaced
    /// cards are discarded. On failure nothing is touched: cursors are
    /// only reset once the fresh pages have actually arrived.
    pub async fn refresh_feed(&self) -> Result<(), ApiError> {
        self.load_inner(true).await
    }

    async fn load_inner(&self, want_reset: bool) -> Result<(), ApiError> {
        let (reset, trending_req, friends_req) = {
            let mut session = self.session.lock().await;
            if session.loading {
                tracing::debug!("Feed load already in flight, ignoring");
                return Ok(());
            }
            let reset = want_reset || !session.initialized;
            let (trending_req, friends_req) = if reset {
                (
                    Some(PageRequest {
                        page: 0,
                        size: session.trending.size(),
                    }),
                    Some(PageRequest {
                        page: 0,
                        size: session.friends.size(),
                    }),
                )
            } else {
                (
                    session.trending.next_request(),
                    session.friends.next_request(),
                )
            };
            if trending_req.is_none() && friends_req.is_none() {
                tracing::debug!("Both sources exhausted, nothing to load");
                return Ok(());
            }
            session.loading = true;
            (reset, trending_req, friends_req)
        };

        let result = self.api.fetch_feed(trending_req, friends_req).await;

        let mut session = self.session.lock().await;
        session.loading = false;

        let batch = match result {
            Ok(batch) => batch,
            Err(e) => {
                // A failed load preserves whatever cards are present
                tracing::warn!(error = %e, "Feed load failed, keeping current cards");
                return Err(e);
            }
        };

        if reset {
            session.trending.reset();
            session.friends.reset();
        }
        let trending_cards = consume_source(&mut session.trending, trending_req, batch.trending);
        let friends_cards = consume_source(&mut session.friends, friends_req, batch.friends);

        tracing::info!(
            trending = trending_cards.len(),
            friends = friends_cards.len(),
            reset = reset,
            "Feed page merged"
        );

        if reset {
            session.store.reset_and_load(trending_cards, friends_cards);
            session.initialized = true;
            self.likes.lock().await.reset();
            self.comments.lock().await.clear();
        } else {
            session.store.append_loaded(trending_cards, friends_cards);
        }

        Ok(())
    }

    // ========================================================================
    // Likes
    // ========================================================================

    /// Toggle a card's like state to `desired`, optimistically.
    ///
    /// The flag flips immediately; the count follows only on server
    /// confirmation. A repeated tap while a request is in flight is
    /// accepted, and reconciliation is gated on request identity so
    /// only the last-issued toggle settles the card. Failures roll
    /// back the flag; whether the error is also returned is controlled
    /// by the `silent_like_failures` policy.
    pub async fn toggle_like(&self, challenge_id: i64, desired: bool) -> Result<(), ApiError> {
        let ticket = {
            let mut session = self.session.lock().await;
            if session.store.find_card(challenge_id).is_none() {
                tracing::debug!(challenge_id, "Like toggle for absent card ignored");
                return Ok(());
            }
            let mut likes = self.likes.lock().await;
            session.store.apply_like_optimistic(challenge_id, desired);
            likes.begin(challenge_id)
        };

        let result = self.api.set_challenge_like(challenge_id, desired).await;
        let success = result.is_ok();

        {
            let mut session = self.session.lock().await;
            let mut likes = self.likes.lock().await;
            if likes.settle(ticket, success) {
                session.store.confirm_like(challenge_id, desired, success);
            }
        }

        match result {
            Ok(_) => Ok(()),
            Err(e) if self.silent_like_failures => {
                tracing::debug!(challenge_id, error = %e, "Like failed, rolled back silently");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Toggle a comment's like state. Fire-and-confirm: the flag flips
    /// optimistically and the count follows confirmation, but on
    /// failure the cache is left as-is and the error returned; the
    /// sheet UI owns the visual revert.
    pub async fn toggle_comment_like(
        &self,
        challenge_id: i64,
        comment_id: i64,
        desired: bool,
    ) -> Result<(), ApiError> {
        {
            let mut comments = self.comments.lock().await;
            if !comments.set_comment_liked(challenge_id, comment_id, desired) {
                return Ok(());
            }
        }

        match self.api.set_comment_like(comment_id, desired).await {
            Ok(_) => {
                self.comments
                    .lock()
                    .await
                    .confirm_comment_like(challenge_id, comment_id, desired);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    // ========================================================================
    // Comments
    // ========================================================================

    /// Open a card's comment sheet.
    ///
    /// First open fetches page 0 and caches the thread; every later
    /// open returns the cached list without a network call. An open
    /// for a card whose initial fetch is still outstanding returns an
    /// empty snapshot and lets that fetch finish.
    pub async fn open_comments(&self, challenge_id: i64) -> Result<Vec<Comment>, ApiError> {
        let request = {
            let session = self.session.lock().await;
            if session.store.find_card(challenge_id).is_none() {
                tracing::debug!(challenge_id, "Comment open for absent card ignored");
                return Ok(Vec::new());
            }
            let mut comments = self.comments.lock().await;
            match comments.begin_open(challenge_id) {
                OpenOutcome::Hit(list) => return Ok(list),
                OpenOutcome::Busy => return Ok(Vec::new()),
                OpenOutcome::Fetch(request) => request,
            }
        };

        match self.api.fetch_comments(challenge_id, request).await {
            Ok(page) => {
                let mut comments = self.comments.lock().await;
                comments.complete_open(challenge_id, page);
                Ok(comments.snapshot(challenge_id))
            }
            Err(e) => {
                self.comments.lock().await.abort_open(challenge_id);
                Err(e)
            }
        }
    }

    /// Fetch the next comment page for a card. No-op (returning the
    /// current snapshot) while a fetch for the card is outstanding or
    /// when the server said there is nothing more.
    pub async fn load_more_comments(
        &self,
        challenge_id: i64,
    ) -> Result<(Vec<Comment>, bool), ApiError> {
        let request = {
            let mut comments = self.comments.lock().await;
            match comments.begin_load_more(challenge_id) {
                Some(request) => request,
                None => {
                    return Ok((
                        comments.snapshot(challenge_id),
                        comments.has_more(challenge_id),
                    ))
                }
            }
        };

        match self.api.fetch_comments(challenge_id, request).await {
            Ok(page) => {
                let mut comments = self.comments.lock().await;
                comments.complete_load_more(challenge_id, page);
                Ok((
                    comments.snapshot(challenge_id),
                    comments.has_more(challenge_id),
                ))
            }
            Err(e) => {
                self.comments.lock().await.abort_load_more(challenge_id);
                Err(e)
            }
        }
    }

    /// Post a comment (or a reply, when `parent_comment_id` is given).
    ///
    /// Write-through: the comment enters the cache only after the
    /// server assigns its identity; the returned value is the confirmed
    /// comment as cached. Failures are surfaced for user-visible
    /// messaging.
    pub async fn post_comment(
        &self,
        challenge_id: i64,
        content: &str,
        parent_comment_id: Option<i64>,
        reply_to_name: Option<&str>,
    ) -> Result<Comment, ApiError> {
        let draft = CommentDraft {
            content: content.to_string(),
            parent_comment_id,
            reply_to_name: reply_to_name.map(str::to_string),
        };
        let ack = self.api.post_comment(challenge_id, draft).await?;

        let comment = Comment {
            comment_id: ack.comment_id,
            author_name: self.viewer_name.clone(),
            content: content.to_string(),
            parent_comment_id,
            reply_to_name: reply_to_name.map(str::to_string),
            is_mine: true,
            is_liked: false,
            like_count: 0,
        };
        self.comments
            .lock()
            .await
            .insert_confirmed(challenge_id, comment.clone());
        Ok(comment)
    }

    /// Delete a comment after server confirmation. Returns whether
    /// anything was removed locally; replies to a deleted top-level
    /// comment are removed with it. Failures are surfaced.
    pub async fn delete_comment(
        &self,
        challenge_id: i64,
        comment_id: i64,
    ) -> Result<bool, ApiError> {
        self.api.delete_comment(challenge_id, comment_id).await?;
        let removed = self
            .comments
            .lock()
            .await
            .remove_comment(challenge_id, comment_id);
        tracing::debug!(challenge_id, comment_id, removed, "Comment deleted");
        Ok(removed > 0)
    }

    // ========================================================================
    // Card deletion
    // ========================================================================

    /// Delete a challenge the viewer owns. Only a confirmed server
    /// delete removes the card; its comment thread and like tracking
    /// go with it (any of their in-flight responses will be discarded
    /// on arrival). On failure the card is left untouched and the
    /// error surfaced.
    pub async fn delete_card(&self, challenge_id: i64) -> Result<(), ApiError> {
        self.api.delete_challenge(challenge_id).await?;

        let mut session = self.session.lock().await;
        session.store.remove_card(challenge_id);
        self.likes.lock().await.clear(challenge_id);
        self.comments.lock().await.discard(challenge_id);
        tracing::info!(challenge_id, "Card deleted");
        Ok(())
    }

    // ========================================================================
    // Read accessors
    // ========================================================================

    /// Cloned snapshot of the current ordered card list.
    pub async fn cards(&self) -> Vec<FeedCard> {
        self.session.lock().await.store.snapshot()
    }

    /// True when the card list is the configured placeholder set rather
    /// than backend content.
    pub async fn showing_placeholders(&self) -> bool {
        self.session.lock().await.store.showing_placeholders()
    }

    /// True while a feed load is outstanding.
    pub async fn is_loading(&self) -> bool {
        self.session.lock().await.loading
    }

    /// Cloned snapshot of a card's cached comments (empty when the
    /// thread was never opened).
    pub async fn comments(&self, challenge_id: i64) -> Vec<Comment> {
        self.comments.lock().await.snapshot(challenge_id)
    }

    /// Whether a card's thread has more pages to fetch.
    pub async fn has_more_comments(&self, challenge_id: i64) -> bool {
        self.comments.lock().await.has_more(challenge_id)
    }

    /// The like reconciliation phase for a card (pending-state
    /// affordance).
    pub async fn like_phase(&self, challenge_id: i64) -> LikePhase {
        self.likes.lock().await.phase(challenge_id)
    }
}

/// Fold one source's returned page into its cursor and convert the
/// items. A source that was not requested contributes nothing and its
/// cursor is untouched; a requested source the server omitted counts
/// as an empty (exhausting) page.
fn consume_source(
    cursor: &mut PageCursor,
    requested: Option<PageRequest>,
    page: Option<Page<FeedItem>>,
) -> Vec<FeedCard> {
    if requested.is_none() {
        return Vec::new();
    }
    let page = page.unwrap_or_else(Page::empty);
    cursor.advance(page.content.len());
    page.content.into_iter().map(FeedCard::from_item).collect()
}
