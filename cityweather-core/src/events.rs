//! One-shot notifications for the presentation layer.
//!
//! Events are buffered until consumed and are never replayed: once a
//! subscriber has received an event, no later subscriber will see it. Only
//! one subscriber can be attached at a time.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, mpsc};

/// Capacity of the event buffer. Senders wait when it is full.
pub const EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ShowSnackbar(String),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<UiEvent>,
}

impl EventSender {
    pub async fn send(&self, event: UiEvent) {
        if self.tx.send(event).await.is_err() {
            tracing::debug!("event stream dropped, discarding event");
        }
    }

    /// Waits for a free slot in the buffer; `None` once the stream is gone.
    ///
    /// Nothing is queued until the permit is used, so a caller can hold one
    /// while it commits the change the event reports. Dropping it frees the
    /// slot.
    pub async fn reserve(&self) -> Option<mpsc::Permit<'_, UiEvent>> {
        match self.tx.reserve().await {
            Ok(permit) => Some(permit),
            Err(_) => {
                tracing::debug!("event stream dropped, no slot to reserve");
                None
            }
        }
    }
}

/// Receiving side of the event queue.
#[derive(Debug, Clone)]
pub struct EventStream {
    rx: Arc<Mutex<mpsc::Receiver<UiEvent>>>,
}

impl EventStream {
    /// Waits until no other subscriber is attached.
    pub async fn subscribe(&self) -> Subscription {
        let rx = self.rx.clone().lock_owned().await;
        Subscription { rx }
    }

    /// `None` while another subscriber is attached.
    pub fn try_subscribe(&self) -> Option<Subscription> {
        self.rx
            .clone()
            .try_lock_owned()
            .ok()
            .map(|rx| Subscription { rx })
    }
}

/// Exclusive handle on the event queue. Dropping it detaches.
#[derive(Debug)]
pub struct Subscription {
    rx: OwnedMutexGuard<mpsc::Receiver<UiEvent>>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<UiEvent> {
        self.rx.recv().await
    }

    /// Next buffered event, without waiting.
    pub fn try_recv(&mut self) -> Option<UiEvent> {
        self.rx.try_recv().ok()
    }

    /// Everything currently buffered.
    pub fn drain(&mut self) -> Vec<UiEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

pub fn event_channel() -> (EventSender, EventStream) {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let rx = Arc::new(Mutex::new(rx));
    (EventSender { tx }, EventStream { rx })
}
