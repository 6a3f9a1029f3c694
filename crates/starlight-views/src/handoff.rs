//! Single-slot hand-off between a blocked render and the consumer that
//! supplies its content.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

/// The resolving half. Clones share the slot; the first resolution wins.
pub(crate) struct Handoff<V> {
    slot: Arc<Mutex<Option<oneshot::Sender<Option<V>>>>>,
}

impl<V> Clone for Handoff<V> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

/// Creates a hand-off and the receiver the blocked side awaits.
pub(crate) fn handoff<V>() -> (Handoff<V>, oneshot::Receiver<Option<V>>) {
    let (tx, rx) = oneshot::channel();
    let handoff = Handoff {
        slot: Arc::new(Mutex::new(Some(tx))),
    };
    (handoff, rx)
}

impl<V> Handoff<V> {
    /// Delivers `value`. Returns `false` if the slot was already used or the
    /// waiting side is gone.
    pub(crate) fn resolve(&self, value: V) -> bool {
        match self.slot.lock().take() {
            Some(tx) => tx.send(Some(value)).is_ok(),
            None => false,
        }
    }

    /// Resolves as empty. Returns `false` if the slot was already used.
    pub(crate) fn cancel(&self) -> bool {
        match self.slot.lock().take() {
            Some(tx) => tx.send(None).is_ok(),
            None => false,
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.slot.lock().as_ref().is_some_and(|tx| !tx.is_closed())
    }
}

/// Awaits the hand-off. A dropped resolver counts as empty.
pub(crate) async fn settle<V>(rx: oneshot::Receiver<Option<V>>) -> Option<V> {
    rx.await.ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_resolution_wins() {
        let (handoff, rx) = handoff();
        let other = handoff.clone();

        assert!(handoff.resolve("first"));
        assert!(!other.resolve("second"));
        assert!(!other.cancel());
        assert_eq!(settle(rx).await, Some("first"));
    }

    #[tokio::test]
    async fn test_cancel_settles_empty() {
        let (handoff, rx) = handoff::<u8>();
        assert!(handoff.is_pending());
        assert!(handoff.cancel());
        assert!(!handoff.is_pending());
        assert_eq!(settle(rx).await, None);
    }

    #[tokio::test]
    async fn test_dropped_resolver_settles_empty() {
        let (handoff, rx) = handoff::<u8>();
        drop(handoff);
        assert_eq!(settle(rx).await, None);
    }

    #[test]
    fn test_resolve_after_receiver_dropped() {
        let (handoff, rx) = handoff();
        drop(rx);
        assert!(!handoff.is_pending());
        assert!(!handoff.resolve(1));
    }
}
