use super::card::FeedCard;
use super::interleave::{interleave, InterleaveRatio};

/// Owner of the ordered card list and the single mutation point for
/// card fields.
///
/// Everything else in the crate reads cards through snapshots; no
/// component holds a second mutable copy. All operations are local and
/// infallible — operating on an id that is no longer present is a
/// silent no-op, since the card may have been removed by a concurrent
/// delete.
#[derive(Debug)]
pub struct FeedStore {
    cards: Vec<FeedCard>,
    ratio: InterleaveRatio,
    /// Served instead of an empty feed on reset, when configured.
    placeholders: Vec<FeedCard>,
    showing_placeholders: bool,
}

impl FeedStore {
    pub fn new(ratio: InterleaveRatio) -> Self {
        Self {
            cards: Vec::new(),
            ratio,
            placeholders: Vec::new(),
            showing_placeholders: false,
        }
    }

    /// Configure a placeholder set to fall back to when a reset merges
    /// to an empty feed.
    pub fn with_placeholders(mut self, placeholders: Vec<FeedCard>) -> Self {
        self.placeholders = placeholders;
        self
    }

    /// Replace the entire card list with the interleaved merge of two
    /// fresh pages. Used for first load and pull-to-refresh.
    ///
    /// When the merge is empty and a placeholder set is configured, the
    /// placeholders are served instead and
    /// [`showing_placeholders`](FeedStore::showing_placeholders) is set
    /// so the UI can tell placeholder state from a truly empty backend.
    pub fn reset_and_load(&mut self, trending: Vec<FeedCard>, friends: Vec<FeedCard>) {
        let merged = interleave(trending, friends, self.ratio);
        if merged.is_empty() && !self.placeholders.is_empty() {
            tracing::info!("Feed reset came back empty, serving placeholders");
            self.cards = self.placeholders.clone();
            self.showing_placeholders = true;
        } else {
            self.cards = merged;
            self.showing_placeholders = false;
        }
    }

    /// Interleave two further pages and append them; prior cards are
    /// untouched. A pending placeholder set is dropped first so real
    /// cards never mix with placeholders.
    pub fn append_loaded(&mut self, trending: Vec<FeedCard>, friends: Vec<FeedCard>) {
        if self.showing_placeholders {
            self.cards.clear();
            self.showing_placeholders = false;
        }
        let merged = interleave(trending, friends, self.ratio);
        self.cards.extend(merged);
    }

    pub fn find_card(&self, challenge_id: i64) -> Option<&FeedCard> {
        self.cards.iter().find(|c| c.challenge_id == challenge_id)
    }

    /// Flip the like flag immediately, ahead of server confirmation.
    /// The count is only adjusted once the toggle is confirmed.
    pub fn apply_like_optimistic(&mut self, challenge_id: i64, liked: bool) {
        match self.card_mut(challenge_id) {
            Some(card) => card.is_liked = liked,
            None => {
                tracing::debug!(challenge_id, "Optimistic like on absent card ignored");
            }
        }
    }

    /// Reconcile the winning like request for a card.
    ///
    /// On success the count follows the confirmed state: incremented
    /// when liked, decremented (floored at 0) when unliked. On failure
    /// the flag reverts to its pre-toggle value and the count is never
    /// touched.
    pub fn confirm_like(&mut self, challenge_id: i64, desired: bool, success: bool) {
        let Some(card) = self.card_mut(challenge_id) else {
            tracing::debug!(challenge_id, "Like confirmation for absent card ignored");
            return;
        };

        if success {
            card.is_liked = desired;
            card.like_count = if desired {
                card.like_count.saturating_add(1)
            } else {
                card.like_count.saturating_sub(1)
            };
        } else {
            card.is_liked = !desired;
        }
    }

    /// Delete a card. Removing an absent id is a no-op, not an error;
    /// removal is terminal.
    pub fn remove_card(&mut self, challenge_id: i64) {
        let before = self.cards.len();
        self.cards.retain(|c| c.challenge_id != challenge_id);
        if self.cards.len() == before {
            tracing::debug!(challenge_id, "Remove of absent card ignored");
        }
    }

    /// Cloned snapshot of the ordered card list for the UI.
    pub fn snapshot(&self) -> Vec<FeedCard> {
        self.cards.clone()
    }

    pub fn showing_placeholders(&self) -> bool {
        self.showing_placeholders
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn card_mut(&mut self, challenge_id: i64) -> Option<&mut FeedCard> {
        self.cards
            .iter_mut()
            .find(|c| c.challenge_id == challenge_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn card(challenge_id: i64, like_count: u32) -> FeedCard {
        FeedCard {
            challenge_id,
            image_urls: Vec::new(),
            caption: format!("challenge {challenge_id}"),
            hashtags: Vec::new(),
            author_name: "ana".to_string(),
            author_avatar_url: None,
            created_at: DateTime::UNIX_EPOCH,
            is_liked: false,
            like_count,
            is_mine: false,
        }
    }

    fn store() -> FeedStore {
        FeedStore::new(InterleaveRatio::new(1, 3))
    }

    #[test]
    fn test_reset_interleaves() {
        let mut store = store();
        store.reset_and_load(vec![card(1, 0)], vec![card(2, 0), card(3, 0), card(4, 0)]);
        let ids: Vec<i64> = store.snapshot().iter().map(|c| c.challenge_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_append_preserves_prior_cards() {
        let mut store = store();
        store.reset_and_load(vec![card(1, 0)], vec![card(2, 0)]);
        store.append_loaded(vec![card(3, 0)], vec![card(4, 0)]);
        let ids: Vec<i64> = store.snapshot().iter().map(|c| c.challenge_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_reset_without_placeholders_is_truly_empty() {
        let mut store = store();
        store.reset_and_load(Vec::new(), Vec::new());
        assert!(store.is_empty());
        assert!(!store.showing_placeholders());
    }

    #[test]
    fn test_empty_reset_with_placeholders_serves_them() {
        let mut store = store().with_placeholders(vec![card(100, 0)]);
        store.reset_and_load(Vec::new(), Vec::new());
        assert_eq!(store.len(), 1);
        assert!(store.showing_placeholders());
    }

    #[test]
    fn test_append_after_placeholders_replaces_them() {
        let mut store = store().with_placeholders(vec![card(100, 0)]);
        store.reset_and_load(Vec::new(), Vec::new());
        store.append_loaded(vec![card(1, 0)], Vec::new());
        let ids: Vec<i64> = store.snapshot().iter().map(|c| c.challenge_id).collect();
        assert_eq!(ids, vec![1]);
        assert!(!store.showing_placeholders());
    }

    #[test]
    fn test_nonempty_reset_clears_placeholder_flag() {
        let mut store = store().with_placeholders(vec![card(100, 0)]);
        store.reset_and_load(Vec::new(), Vec::new());
        assert!(store.showing_placeholders());
        store.reset_and_load(vec![card(1, 0)], Vec::new());
        assert!(!store.showing_placeholders());
    }

    #[test]
    fn test_optimistic_like_leaves_count_alone() {
        let mut store = store();
        store.reset_and_load(vec![card(1, 5)], Vec::new());
        store.apply_like_optimistic(1, true);
        let snapshot = store.snapshot();
        assert!(snapshot[0].is_liked);
        assert_eq!(snapshot[0].like_count, 5);
    }

    #[test]
    fn test_confirmed_like_increments_count() {
        let mut store = store();
        store.reset_and_load(vec![card(1, 5)], Vec::new());
        store.apply_like_optimistic(1, true);
        store.confirm_like(1, true, true);
        let snapshot = store.snapshot();
        assert!(snapshot[0].is_liked);
        assert_eq!(snapshot[0].like_count, 6);
    }

    #[test]
    fn test_confirmed_unlike_decrements_floored_at_zero() {
        let mut store = store();
        store.reset_and_load(vec![card(1, 0)], Vec::new());
        store.apply_like_optimistic(1, false);
        store.confirm_like(1, false, true);
        assert_eq!(store.snapshot()[0].like_count, 0);
    }

    #[test]
    fn test_failed_like_reverts_flag_and_keeps_count() {
        let mut store = store();
        store.reset_and_load(vec![card(1, 5)], Vec::new());
        store.apply_like_optimistic(1, true);
        store.confirm_like(1, true, false);
        let snapshot = store.snapshot();
        assert!(!snapshot[0].is_liked);
        assert_eq!(snapshot[0].like_count, 5);
    }

    #[test]
    fn test_remove_card_idempotent() {
        let mut store = store();
        store.reset_and_load(vec![card(1, 0)], vec![card(2, 0)]);

        store.remove_card(1);
        let after_first: Vec<i64> = store.snapshot().iter().map(|c| c.challenge_id).collect();
        store.remove_card(1);
        let after_second: Vec<i64> = store.snapshot().iter().map(|c| c.challenge_id).collect();

        assert_eq!(after_first, after_second);
        assert_eq!(after_first, vec![2]);

        // Never-present id is a no-op too
        store.remove_card(999);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_mutations_on_absent_cards_are_silent() {
        let mut store = store();
        store.apply_like_optimistic(42, true);
        store.confirm_like(42, true, true);
        store.remove_card(42);
        assert!(store.is_empty());
    }
}
