use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// One attached consumer of a broadcast stream.
struct Subscriber<T> {
    tx: Sender<T>,
    /// Receiver clone used to evict the oldest queued item when full.
    evict: Receiver<T>,
    dropped: Arc<AtomicU64>,
}

/// Fan-out of one event stream to any number of bounded subscriptions.
///
/// Sending never blocks: a subscription that is full loses its oldest
/// queued item first. Disconnected subscribers are pruned on send.
pub(crate) struct Broadcast<T> {
    subs: Mutex<Vec<Subscriber<T>>>,
}

impl<T: Clone> Broadcast<T> {
    pub(crate) fn new() -> Self {
        Self {
            subs: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn subscribe(&self, capacity: usize) -> Subscription<T> {
        let (tx, rx) = bounded(capacity.max(1));
        let dropped = Arc::new(AtomicU64::new(0));
        if let Ok(mut subs) = self.subs.lock() {
            subs.push(Subscriber {
                tx,
                evict: rx.clone(),
                dropped: dropped.clone(),
            });
        }
        Subscription { rx, dropped }
    }

    /// Deliver `event` to every live subscriber.
    pub(crate) fn send(&self, event: &T) {
        let Ok(mut subs) = self.subs.lock() else {
            return;
        };
        subs.retain(|sub| {
            let mut item = event.clone();
            loop {
                match sub.tx.try_send(item) {
                    Ok(()) => return true,
                    Err(TrySendError::Full(returned)) => {
                        if sub.evict.try_recv().is_ok() {
                            sub.dropped.fetch_add(1, Ordering::Relaxed);
                        }
                        item = returned;
                    }
                    Err(TrySendError::Disconnected(_)) => return false,
                }
            }
        });
    }

    /// Disconnect every subscriber. Items already queued stay readable.
    pub(crate) fn close(&self) {
        if let Ok(mut subs) = self.subs.lock() {
            subs.clear();
        }
    }
}

/// Receiving end of a capture event stream.
///
/// Dropping the subscription unsubscribes; the sender prunes it on the
/// next delivery.
pub struct Subscription<T> {
    rx: Receiver<T>,
    dropped: Arc<AtomicU64>,
}

impl<T> Subscription<T> {
    /// Block until the next event. None once the stream is closed and
    /// drained.
    pub fn recv(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    /// Next event if one is already queued.
    pub fn try_recv(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Block up to `timeout`. None on timeout or closed stream.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Raw receiver, for use in `select!` loops.
    pub fn receiver(&self) -> &Receiver<T> {
        &self.rx
    }

    /// Events lost to the drop-oldest overflow policy so far.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
