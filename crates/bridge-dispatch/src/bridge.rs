//! Lifecycle owner for the queue, the kind registry and the dispatcher.

use crate::dispatcher::{DispatchOptions, Dispatcher};
use crate::host::Host;
use bridge_kinds::{EventKind, KindRegistry, Registrar};
use bridge_queue::{Consumer, DEFAULT_CAPACITY, EventQueue, QueueStats};
use log::{info, warn};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, Debug)]
pub struct BridgeOptions {
    pub capacity: NonZeroUsize,
    pub dispatch: DispatchOptions,
    /// Upper bound for each blocking wait made through [`Bridge::consumer`].
    pub wait_timeout: Option<Duration>,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            dispatch: DispatchOptions::default(),
            wait_timeout: None,
        }
    }
}

/// One instance per windowing subsystem.
///
/// Built once with [`init`](Self::init), shared by reference between the host thread (which
/// calls [`dispatcher`](Self::dispatcher)) and application threads (which take a
/// [`consumer`](Self::consumer)), and torn down with [`shutdown`](Self::shutdown).
pub struct Bridge<H: Host> {
    queue: Arc<EventQueue>,
    kinds: Arc<KindRegistry>,
    dispatcher: Dispatcher<H>,
    wait_timeout: Option<Duration>,
}

impl<H: Host> Bridge<H> {
    /// Allocate the queue and register every event kind.
    pub fn init(host: H, registrar: Box<dyn Registrar>, options: BridgeOptions) -> Self {
        let queue = Arc::new(EventQueue::with_capacity(options.capacity));
        let kinds = Arc::new(KindRegistry::new(registrar));

        let resolved = kinds.preload();
        if resolved < EventKind::COUNT {
            warn!(
                "Only {}/{} event kinds registered; the rest will be skipped",
                resolved,
                EventKind::COUNT
            );
        }

        info!(
            "Bridge initialized (capacity {}, context menu also commands: {})",
            options.capacity, options.dispatch.context_menu_also_commands
        );

        Self {
            dispatcher: Dispatcher::new(host, queue.clone(), kinds.clone(), options.dispatch),
            queue,
            kinds,
            wait_timeout: options.wait_timeout,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<H> {
        &self.dispatcher
    }

    /// A new consumer handle with its own cancel token.
    pub fn consumer(&self) -> Consumer {
        Consumer::new(self.queue.clone()).with_timeout(self.wait_timeout)
    }

    /// Registered id for a raw kind key, or [`UNAVAILABLE`](bridge_kinds::UNAVAILABLE).
    pub fn resolve_kind(&self, key: u32) -> u32 {
        self.kinds.resolve(key)
    }

    pub fn kinds(&self) -> &Arc<KindRegistry> {
        &self.kinds
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    /// Close the queue and wake all waiters. Pending records remain drainable.
    pub fn shutdown(&self) -> QueueStats {
        self.queue.close();
        let stats = self.queue.stats();
        info!(
            "Bridge shut down: {} delivered to queue, {} dropped, {} pending",
            stats.enqueued, stats.dropped, stats.len
        );
        stats
    }

    /// Shuts the bridge down when dropped, including during unwinding, so consumers
    /// blocked in `wait` are released even if the host loop panics.
    pub fn shutdown_guard(&self) -> ShutdownGuard<'_, H> {
        ShutdownGuard { bridge: self }
    }
}

/// Returned by [`Bridge::shutdown_guard`].
pub struct ShutdownGuard<'a, H: Host> {
    bridge: &'a Bridge<H>,
}

impl<H: Host> Drop for ShutdownGuard<'_, H> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            warn!("Host loop panicked; closing the event queue");
        }
        self.bridge.shutdown();
    }
}
