//! StreamClient: one logical channel to the backend snapshot stream.
//!
//! A single worker task owns the channel. It parses every text frame into a
//! [`StreamEvent`], fans it out to subscribers in arrival order, and on any
//! close waits `reconnect_delay` before opening again. Subscribers also see
//! the locally synthesized `Connected` and `Disconnected` events.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use threatwatch_core::{StreamEvent, parse_stream_message};

use crate::config::LinkConfig;
use crate::transport::{Transport, WsTransport};

// ---------------------------------------------------------------------------
// Subscribers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Subscribers {
    next_id: AtomicU64,
    senders: Mutex<Vec<(u64, mpsc::UnboundedSender<StreamEvent>)>>,
}

impl Subscribers {
    fn lock(&self) -> MutexGuard<'_, Vec<(u64, mpsc::UnboundedSender<StreamEvent>)>> {
        self.senders.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn add(&self) -> (u64, mpsc::UnboundedReceiver<StreamEvent>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().push((id, tx));
        (id, rx)
    }

    fn remove(&self, id: u64) {
        self.lock().retain(|(sid, _)| *sid != id);
    }

    /// Deliver to every live subscriber; closed receivers are pruned.
    fn emit(&self, event: &StreamEvent) {
        self.lock().retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Handle returned by [`StreamClient::subscribe`]. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<StreamEvent>,
    registry: Weak<Subscribers>,
}

impl Subscription {
    /// Next event, or `None` once the client and its worker are gone.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<StreamEvent> {
        self.rx.try_recv().ok()
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

// ---------------------------------------------------------------------------
// StreamClient
// ---------------------------------------------------------------------------

/// One worker's emissions go through its gate. `close` cancels and emits the
/// final `Disconnected` under the same lock, so nothing from a closed worker
/// reaches subscribers after `disconnect` returns.
struct Gate {
    cancel: CancellationToken,
    open: Mutex<bool>,
    subscribers: Arc<Subscribers>,
}

impl Gate {
    fn new(subscribers: Arc<Subscribers>) -> Self {
        Self {
            cancel: CancellationToken::new(),
            open: Mutex::new(false),
            subscribers,
        }
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `false` once the gate is closed; the event is then dropped.
    fn emit(&self, event: &StreamEvent) -> bool {
        let mut open = self.lock();
        if self.cancel.is_cancelled() {
            return false;
        }
        match event {
            StreamEvent::Connected => *open = true,
            StreamEvent::Disconnected => *open = false,
            _ => {}
        }
        self.subscribers.emit(event);
        true
    }

    fn close(&self) {
        let mut open = self.lock();
        self.cancel.cancel();
        if std::mem::take(&mut *open) {
            self.subscribers.emit(&StreamEvent::Disconnected);
        }
    }
}

struct Worker {
    gate: Arc<Gate>,
    handle: JoinHandle<()>,
}

pub struct StreamClient<T: Transport = WsTransport> {
    config: LinkConfig,
    transport: Arc<T>,
    subscribers: Arc<Subscribers>,
    worker: Option<Worker>,
}

impl StreamClient<WsTransport> {
    pub fn new(config: LinkConfig) -> Self {
        Self::with_transport(config, Arc::new(WsTransport))
    }
}

impl<T: Transport> StreamClient<T> {
    pub fn with_transport(config: LinkConfig, transport: Arc<T>) -> Self {
        Self {
            config,
            transport,
            subscribers: Arc::new(Subscribers::default()),
            worker: None,
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Start the channel worker. No-op while a worker is alive, whether it
    /// is connected or waiting to reconnect. Must be called inside a Tokio
    /// runtime.
    pub fn connect(&mut self) {
        if self.is_running() {
            debug!("stream connect ignored, worker already running");
            return;
        }
        let gate = Arc::new(Gate::new(Arc::clone(&self.subscribers)));
        let handle = tokio::spawn(run_channel(
            Arc::clone(&self.transport),
            self.config.stream_url.clone(),
            self.config.reconnect_delay,
            Arc::clone(&gate),
        ));
        self.worker = Some(Worker { gate, handle });
    }

    /// Close the channel and cancel any pending reconnect. Subscribers get
    /// `Disconnected` before this returns if a channel was open.
    pub fn disconnect(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.gate.close();
            worker.handle.abort();
            info!(url = %self.config.stream_url, "stream closed by client");
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|w| !w.gate.cancel.is_cancelled() && !w.handle.is_finished())
    }

    pub fn subscribe(&self) -> Subscription {
        let (id, rx) = self.subscribers.add();
        Subscription {
            id,
            rx,
            registry: Arc::downgrade(&self.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T: Transport> Drop for StreamClient<T> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

async fn run_channel<T: Transport>(transport: Arc<T>, url: String, reconnect_delay: Duration, gate: Arc<Gate>) {
    let cancel = gate.cancel.clone();
    loop {
        let opened = tokio::select! {
            _ = cancel.cancelled() => return,
            opened = transport.open(&url) => opened,
        };

        match opened {
            Ok(mut frames) => {
                if !gate.emit(&StreamEvent::Connected) {
                    return;
                }
                info!(url = %url, "stream connected");
                loop {
                    let next = tokio::select! {
                        _ = cancel.cancelled() => return,
                        next = frames.next() => next,
                    };
                    match next {
                        Some(Ok(text)) => match parse_stream_message(&text) {
                            Ok(event) => {
                                if !gate.emit(&event) {
                                    return;
                                }
                            }
                            Err(e) => warn!(error = %e, "dropping malformed stream payload"),
                        },
                        Some(Err(e)) => {
                            warn!(url = %url, error = %e, "stream transport error");
                            break;
                        }
                        None => break,
                    }
                }
                info!(url = %url, "stream disconnected");
            }
            Err(e) => warn!(url = %url, error = %e, "stream open failed"),
        }

        if !gate.emit(&StreamEvent::Disconnected) {
            return;
        }
        info!(
            delay_ms = u64::try_from(reconnect_delay.as_millis()).unwrap_or(u64::MAX),
            "stream reconnect scheduled"
        );
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(reconnect_delay) => {}
        }
    }
}
