//! Fetch sequencing guard.
//!
//! Every fetch takes a ticket; only the most recently issued ticket may
//! apply its result. Older completions are discarded as stale.

/// Sequence number handed out when a fetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

/// Monotonic ticket issuer.
#[derive(Debug, Default)]
pub struct FetchGuard {
    latest: u64,
}

impl FetchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket that supersedes all earlier ones.
    pub fn issue(&mut self) -> FetchTicket {
        self.latest += 1;
        FetchTicket(self.latest)
    }

    /// Returns whether `ticket` is the latest issued.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }
}
