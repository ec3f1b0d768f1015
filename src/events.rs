//! Synchronous results publisher
//!
//! A small observer list owned by whoever produces the results (the editor
//! session). Subscribers are plain callbacks invoked on the publishing
//! thread, in subscription order.

use log::trace;

/// Handle returned by [`ResultsPublisher::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Box<dyn Fn(&T)>;

/// Fan-out of values of type `T` to registered callbacks.
pub struct ResultsPublisher<T> {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T> Default for ResultsPublisher<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
        }
    }
}

impl<T> std::fmt::Debug for ResultsPublisher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultsPublisher")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<T> ResultsPublisher<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; it receives every value published afterwards.
    pub fn subscribe(&mut self, callback: impl Fn(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Deliver `value` to every subscriber.
    pub fn publish(&self, value: &T) {
        trace!("Publishing to {} subscriber(s)", self.subscribers.len());
        for (_, callback) in &self.subscribers {
            callback(value);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
