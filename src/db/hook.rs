//! Platform suspension hook.
//!
//! Serverless and container hosts may pause or stop an instance between bursts
//! of traffic. Before that happens the pool's idle connections have to be
//! closed, otherwise the database keeps counting them as open clients.
//! Registration happens once per process, in Production only.

use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::DbPool;

/// Errors raised while registering a pool with the hosting platform.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// Registration needs a running tokio runtime to host the drain task.
    #[error("no async runtime available to host the pool drain task")]
    NoRuntime(#[source] tokio::runtime::TryCurrentError),

    /// The operating system refused the suspension signal listener.
    #[error("failed to listen for the platform suspension signal")]
    Signal(#[source] std::io::Error),

    #[error("a database pool is already attached to the suspension hook")]
    AlreadyAttached,
}

/// Capability to register a pool for draining before the host suspends the process.
///
/// This is a registration, not a query: after a successful `attach` the
/// implementation is responsible for closing the pool on its own.
pub trait SuspensionHook: Send + Sync {
    fn attach(&self, pool: &Arc<DbPool>) -> Result<(), HookError>;
}

type Trigger = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Drains the pool when the platform announces suspension.
///
/// The host signals suspension or shutdown with SIGTERM (Ctrl-C on non-unix
/// targets). On that signal the pool is closed: idle connections are dropped
/// right away, checked-out ones when they are returned, and new acquires fail.
///
/// The same SIGTERM also stops the HTTP server. [`SignalDrainHook::drain_after`]
/// holds the drain back until the server has finished its in-flight requests,
/// so they are not cut off from the pool halfway through.
#[derive(Default)]
pub struct SignalDrainHook {
    attached: AtomicBool,
    signal: Mutex<Option<Trigger>>,
    gate: Mutex<Option<Trigger>>,
}

impl fmt::Debug for SignalDrainHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalDrainHook")
            .field("attached", &self.attached.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl SignalDrainHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain only once `gate` has also completed after the signal.
    pub fn drain_after<F>(self, gate: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        *self.gate.lock().unwrap_or_else(PoisonError::into_inner) = Some(Box::pin(gate));
        self
    }

    /// Replace the OS signal with an arbitrary trigger.
    #[cfg(test)]
    fn with_signal<F>(signal: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let hook = Self::default();
        *hook.signal.lock().unwrap_or_else(PoisonError::into_inner) = Some(Box::pin(signal));
        hook
    }

    fn take(slot: &Mutex<Option<Trigger>>) -> Option<Trigger> {
        slot.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

impl SuspensionHook for SignalDrainHook {
    fn attach(&self, pool: &Arc<DbPool>) -> Result<(), HookError> {
        let handle = tokio::runtime::Handle::try_current().map_err(HookError::NoRuntime)?;

        if self.attached.swap(true, Ordering::SeqCst) {
            return Err(HookError::AlreadyAttached);
        }

        let suspended: Trigger = match Self::take(&self.signal) {
            Some(signal) => signal,
            None => {
                // Signal listeners must be created inside the runtime
                let _guard = handle.enter();
                match suspension_signal() {
                    Ok(signal) => Box::pin(signal),
                    Err(e) => {
                        self.attached.store(false, Ordering::SeqCst);
                        return Err(HookError::Signal(e));
                    }
                }
            }
        };
        let gate = Self::take(&self.gate);

        let pool = Arc::clone(pool);
        handle.spawn(async move {
            suspended.await;
            if let Some(gate) = gate {
                gate.await;
            }
            tracing::info!(
                idle = pool.num_idle(),
                size = pool.size(),
                "Suspension signal received, draining database pool"
            );
            pool.close().await;
            tracing::info!("Database pool drained");
        });

        tracing::info!("Database pool attached to suspension hook");
        Ok(())
    }
}

/// Future that resolves when the host announces suspension.
#[cfg(unix)]
fn suspension_signal() -> std::io::Result<impl Future<Output = ()> + Send> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    Ok(async move {
        terminate.recv().await;
    })
}

#[cfg(not(unix))]
fn suspension_signal() -> std::io::Result<impl Future<Output = ()> + Send> {
    Ok(async {
        // An error here means the listener could not be installed; treat as never signalled
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records every pool it is asked to attach.
    #[derive(Debug, Default)]
    pub struct RecordingHook {
        attached: Mutex<Vec<Arc<DbPool>>>,
        reject: bool,
    }

    impl RecordingHook {
        /// A hook that refuses every registration.
        pub fn rejecting() -> Self {
            Self {
                attached: Mutex::default(),
                reject: true,
            }
        }

        pub fn attached(&self) -> Vec<Arc<DbPool>> {
            self.attached.lock().unwrap().clone()
        }
    }

    impl SuspensionHook for RecordingHook {
        fn attach(&self, pool: &Arc<DbPool>) -> Result<(), HookError> {
            self.attached.lock().unwrap().push(Arc::clone(pool));
            if self.reject {
                return Err(HookError::AlreadyAttached);
            }
            Ok(())
        }
    }
}
