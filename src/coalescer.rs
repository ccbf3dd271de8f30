//! Debounced collection of lookup misses.
//!
//! A session queues missed texts in a [`PendingQueue`] and nudges its worker
//! with a [`Signal`]. The worker runs [`debounce_loop`]: idle until the first
//! signal, then collecting until the channel has been quiet for the debounce
//! window, then it hands off to the session to drain the queue and spawn the
//! batch request.

use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Where a session's batching currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPhase {
    /// Nothing queued and nothing in flight
    Idle,
    /// Texts are queued and the debounce window is running
    Collecting,
    /// The queue is empty and at least one batch request is in flight
    Flushing,
}

/// Ordered set of texts waiting for the next batch.
#[derive(Debug, Default)]
pub(crate) struct PendingQueue {
    texts: Vec<String>,
    queued: HashSet<String>,
}

impl PendingQueue {
    /// Queue `text`. Returns `false` if it was already waiting.
    pub(crate) fn push(&mut self, text: &str) -> bool {
        if self.queued.contains(text) {
            return false;
        }
        self.queued.insert(text.to_string());
        self.texts.push(text.to_string());
        true
    }

    /// Take everything queued so far, leaving the queue empty
    pub(crate) fn drain(&mut self) -> Vec<String> {
        self.queued.clear();
        std::mem::take(&mut self.texts)
    }

    pub(crate) fn clear(&mut self) {
        self.queued.clear();
        self.texts.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.texts.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    /// A new text was queued; (re)start the window
    Enqueued,
    /// The queue was dropped; abandon the running window
    Cancelled,
}

/// Drive the Idle -> Collecting -> flush cycle until the sender side closes.
///
/// Every `Enqueued` received while collecting restarts the window, so a burst
/// of lookups produces a single `on_elapsed` call once the burst is over.
///
/// # Arguments
/// * `signals` - Nudges from the session, in the order its state changed
/// * `window` - Quiet period that closes a burst
/// * `has_pending` - Whether the queue currently holds anything
/// * `on_elapsed` - Called once per closed window
///
/// A `Cancelled` only abandons the window when the queue is empty. If texts
/// were queued after the cancelling switch, the window keeps running for them.
pub(crate) async fn debounce_loop<Q, F>(
    mut signals: mpsc::UnboundedReceiver<Signal>,
    window: Duration,
    has_pending: Q,
    mut on_elapsed: F,
) where
    Q: Fn() -> bool,
    F: FnMut(),
{
    'idle: while let Some(signal) = signals.recv().await {
        if signal == Signal::Cancelled && !has_pending() {
            continue;
        }

        loop {
            tokio::select! {
                signal = signals.recv() => match signal {
                    Some(Signal::Enqueued) => {}
                    Some(Signal::Cancelled) if has_pending() => {}
                    Some(Signal::Cancelled) => continue 'idle,
                    None => return,
                },
                _ = sleep(window) => break,
            }
        }

        on_elapsed();
    }
}
