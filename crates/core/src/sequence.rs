use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one issued request of a [`RequestSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Monotonic request counter used to drop out-of-order completions.
///
/// Every fetch takes a ticket before it starts. When it completes, its result
/// may only be applied if no newer ticket was issued in the meantime.
/// `invalidate` stands in for cancellation: in-flight requests keep running
/// but none of their results will be applied.
#[derive(Debug, Default)]
pub struct RequestSequence {
    issued: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request. Supersedes every earlier ticket.
    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` is still the latest issued request.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Supersede every ticket issued so far without starting a request.
    pub fn invalidate(&self) {
        self.issued.fetch_add(1, Ordering::SeqCst);
    }
}
