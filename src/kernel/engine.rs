//! Lazy engine activator.
//!
//! The editing engine is expensive to instantiate, so the workspace only
//! loads it on first use. `EngineGate` is a single-flight state machine:
//!
//! ```text
//! Idle --ensure_ready--> Loading --ok--> Ready
//!                          |
//!                          +--err--> Failed --ensure_ready--> Loading
//! ```
//!
//! Callers arriving while a load is in flight subscribe to the same state
//! channel and observe its outcome; they never start a second load.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use super::services::ports::{EditorEngine, EngineError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl EngineState {
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed(_))
    }
}

pub struct EngineGate {
    engine: Arc<dyn EditorEngine>,
    state: watch::Sender<EngineState>,
    loads: AtomicUsize,
    unreported_failure: Mutex<Option<String>>,
}

impl std::fmt::Debug for EngineGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineGate")
            .field("state", &*self.state.borrow())
            .field("loads", &self.loads.load(Ordering::Relaxed))
            .finish()
    }
}

/// Settles the gate as failed if the leading caller is dropped mid-load,
/// so waiters are never left parked on `Loading`.
struct LoadGuard<'a> {
    state: &'a watch::Sender<EngineState>,
    settled: bool,
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("engine activation abandoned before it settled");
            self.state
                .send_replace(EngineState::Failed("engine activation was cancelled".to_string()));
        }
    }
}

impl EngineGate {
    pub fn new(engine: Arc<dyn EditorEngine>) -> Self {
        let (state, _) = watch::channel(EngineState::Idle);
        Self {
            engine,
            state,
            loads: AtomicUsize::new(0),
            unreported_failure: Mutex::new(None),
        }
    }

    pub fn engine(&self) -> &Arc<dyn EditorEngine> {
        &self.engine
    }

    pub fn state(&self) -> EngineState {
        self.state.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), EngineState::Ready)
    }

    /// Number of underlying loads started so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Resolves once the engine is usable (`true`) or the in-flight load failed (`false`).
    pub async fn ensure_ready(&self) -> bool {
        let leads = self.state.send_if_modified(|state| match state {
            EngineState::Idle | EngineState::Failed(_) => {
                *state = EngineState::Loading;
                true
            }
            EngineState::Loading | EngineState::Ready => false,
        });

        if leads {
            self.load().await;
        }

        let mut rx = self.state.subscribe();
        let ready = match rx.wait_for(EngineState::is_settled).await {
            Ok(state) => matches!(*state, EngineState::Ready),
            Err(_) => false,
        };
        ready
    }

    /// Takes the message of the last failed load, once. Lets exactly one
    /// caller surface a failure that many callers observed.
    pub fn take_failure(&self) -> Option<String> {
        self.unreported_failure
            .lock()
            .ok()
            .and_then(|mut failure| failure.take())
    }

    async fn load(&self) {
        let mut guard = LoadGuard {
            state: &self.state,
            settled: false,
        };
        let attempt = self.loads.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(attempt, "engine activation started");

        match self.activate().await {
            Ok(()) => {
                tracing::info!(attempt, "engine ready");
                self.state.send_replace(EngineState::Ready);
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!(attempt, error = %message, "engine activation failed");
                if let Ok(mut failure) = self.unreported_failure.lock() {
                    *failure = Some(message.clone());
                }
                self.state.send_replace(EngineState::Failed(message));
            }
        }
        guard.settled = true;
    }

    async fn activate(&self) -> Result<(), EngineError> {
        self.engine.load().await?;
        self.engine.bind_container().await
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/engine.rs"]
mod tests;
