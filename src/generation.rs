use std::sync::atomic::{AtomicU64, Ordering};

/// Issued when a request starts; only the newest ticket may apply its
/// response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Per-page request generation counter. Starting a request or unmounting
/// the page bumps the generation, so responses of older requests are
/// recognised as stale.
#[derive(Debug, Default)]
pub struct RequestGeneration {
    current: AtomicU64,
}

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Ticket {
        Ticket(self.current.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.current.load(Ordering::Acquire) == ticket.0
    }

    /// Drops every in-flight ticket.
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older() {
        let generation = RequestGeneration::new();
        let first = generation.begin();
        assert!(generation.is_current(&first));

        let second = generation.begin();
        assert!(!generation.is_current(&first));
        assert!(generation.is_current(&second));
    }

    #[test]
    fn invalidate_drops_in_flight_ticket() {
        let generation = RequestGeneration::new();
        let ticket = generation.begin();
        generation.invalidate();
        assert!(!generation.is_current(&ticket));
    }
}
