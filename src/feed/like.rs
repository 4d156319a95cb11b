use std::collections::HashMap;

/// Where a card's like toggle currently stands.
///
/// `Confirmed` and `RolledBack` describe the outcome of the most
/// recently settled toggle; both accept a new user action exactly like
/// `Idle` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LikePhase {
    #[default]
    Idle,
    Pending,
    Confirmed,
    RolledBack,
}

/// Identity of one issued like request. Reconciliation keys off this,
/// not off the card, so only the last-issued request for a card is
/// allowed to mutate final state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeTicket {
    challenge_id: i64,
    seq: u64,
}

impl LikeTicket {
    pub fn challenge_id(&self) -> i64 {
        self.challenge_id
    }
}

#[derive(Debug, Default)]
struct CardGate {
    next_seq: u64,
    latest: u64,
    in_flight: u32,
    phase: LikePhase,
}

/// Request-identity gating for optimistic like toggles.
///
/// Each user action gets a monotonically increasing per-card sequence
/// number. A repeated tap while a request is in flight is accepted (it
/// reflects intent to flip again); when responses come back, only the
/// one matching the last-issued sequence settles the card. Earlier
/// responses arriving late are discarded, which closes the double-tap
/// race where a slow first response would clobber the newer state.
#[derive(Debug, Default)]
pub struct LikeGate {
    cards: HashMap<i64, CardGate>,
}

impl LikeGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new user action on a card. The returned ticket must
    /// be settled exactly once when the remote call completes.
    pub fn begin(&mut self, challenge_id: i64) -> LikeTicket {
        let gate = self.cards.entry(challenge_id).or_default();
        gate.next_seq += 1;
        gate.latest = gate.next_seq;
        gate.in_flight += 1;
        gate.phase = LikePhase::Pending;
        LikeTicket {
            challenge_id,
            seq: gate.next_seq,
        }
    }

    /// Reconcile one completed request. Returns true when this ticket
    /// is the last-issued one for its card and may mutate final state;
    /// false means the response is stale (or the card is gone) and must
    /// be discarded wholesale.
    pub fn settle(&mut self, ticket: LikeTicket, success: bool) -> bool {
        let Some(gate) = self.cards.get_mut(&ticket.challenge_id) else {
            tracing::debug!(
                challenge_id = ticket.challenge_id,
                "Like response for cleared card discarded"
            );
            return false;
        };

        gate.in_flight = gate.in_flight.saturating_sub(1);

        if ticket.seq != gate.latest {
            tracing::debug!(
                challenge_id = ticket.challenge_id,
                seq = ticket.seq,
                latest = gate.latest,
                "Stale like response discarded"
            );
            return false;
        }

        gate.phase = if success {
            LikePhase::Confirmed
        } else {
            LikePhase::RolledBack
        };
        true
    }

    /// The current phase for a card; `Idle` for cards never toggled.
    pub fn phase(&self, challenge_id: i64) -> LikePhase {
        self.cards
            .get(&challenge_id)
            .map(|gate| gate.phase)
            .unwrap_or_default()
    }

    /// Drop all tracking for a removed card. Any response still in
    /// flight for it will be discarded on arrival.
    pub fn clear(&mut self, challenge_id: i64) {
        self.cards.remove(&challenge_id);
    }

    /// Drop everything (feed reset).
    pub fn reset(&mut self) {
        self.cards.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_toggle_settles() {
        let mut gate = LikeGate::new();
        assert_eq!(gate.phase(1), LikePhase::Idle);

        let ticket = gate.begin(1);
        assert_eq!(gate.phase(1), LikePhase::Pending);

        assert!(gate.settle(ticket, true));
        assert_eq!(gate.phase(1), LikePhase::Confirmed);
    }

    #[test]
    fn test_failure_rolls_back() {
        let mut gate = LikeGate::new();
        let ticket = gate.begin(1);
        assert!(gate.settle(ticket, false));
        assert_eq!(gate.phase(1), LikePhase::RolledBack);
    }

    #[test]
    fn test_stale_response_discarded_in_issue_order() {
        let mut gate = LikeGate::new();
        let first = gate.begin(1);
        let second = gate.begin(1);

        // Responses arrive in issue order: first is already stale.
        assert!(!gate.settle(first, true));
        assert_eq!(gate.phase(1), LikePhase::Pending);
        assert!(gate.settle(second, true));
        assert_eq!(gate.phase(1), LikePhase::Confirmed);
    }

    #[test]
    fn test_stale_response_discarded_in_reversed_order() {
        let mut gate = LikeGate::new();
        let first = gate.begin(1);
        let second = gate.begin(1);

        // Reversed arrival: the last-issued request settles, then the
        // slow first response shows up and is discarded.
        assert!(gate.settle(second, true));
        assert_eq!(gate.phase(1), LikePhase::Confirmed);
        assert!(!gate.settle(first, true));
        assert_eq!(gate.phase(1), LikePhase::Confirmed);
    }

    #[test]
    fn test_cards_are_independent() {
        let mut gate = LikeGate::new();
        let on_one = gate.begin(1);
        let on_two = gate.begin(2);

        assert!(gate.settle(on_one, true));
        assert!(gate.settle(on_two, false));
        assert_eq!(gate.phase(1), LikePhase::Confirmed);
        assert_eq!(gate.phase(2), LikePhase::RolledBack);
    }

    #[test]
    fn test_cleared_card_discards_in_flight_response() {
        let mut gate = LikeGate::new();
        let ticket = gate.begin(1);
        gate.clear(1);
        assert!(!gate.settle(ticket, true));
        assert_eq!(gate.phase(1), LikePhase::Idle);
    }
}
