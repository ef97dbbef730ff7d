use crate::foundation::error::{FramepopError, FramepopResult};
use crate::foundation::tunables::MAX_INIT_ATTEMPTS;
use crate::mask::runtime::{ExecutionBackend, InferenceRuntime, ModelAsset, ModelSession};

/// Observable state of a [`ModelHandle`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandleStatus {
    Uninitialized,
    Ready(ExecutionBackend),
    /// The first attempt failed; the next acquire tries once more.
    RetryPending,
    /// Both attempts failed; the runtime is never asked again.
    Failed,
}

enum HandleState {
    Uninitialized,
    Ready {
        session: Box<dyn ModelSession>,
        backend: ExecutionBackend,
    },
    RetryPending,
    Failed {
        reason: String,
    },
}

/// Lazily-initialized model with a retry-once-then-fail lifecycle.
pub struct ModelHandle {
    asset: ModelAsset,
    cpu_threads: usize,
    attempts: u32,
    state: HandleState,
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("asset", &self.asset.name)
            .field("attempts", &self.attempts)
            .field("status", &self.status())
            .finish()
    }
}

impl ModelHandle {
    pub fn new(asset: ModelAsset, cpu_threads: usize) -> Self {
        Self {
            asset,
            cpu_threads: cpu_threads.max(1),
            attempts: 0,
            state: HandleState::Uninitialized,
        }
    }

    pub fn asset(&self) -> &ModelAsset {
        &self.asset
    }

    pub fn status(&self) -> HandleStatus {
        match &self.state {
            HandleState::Uninitialized => HandleStatus::Uninitialized,
            HandleState::Ready { backend, .. } => HandleStatus::Ready(*backend),
            HandleState::RetryPending => HandleStatus::RetryPending,
            HandleState::Failed { .. } => HandleStatus::Failed,
        }
    }

    /// Borrow the loaded session, initializing it first if needed.
    pub fn acquire(
        &mut self,
        runtime: &dyn InferenceRuntime,
    ) -> FramepopResult<&mut dyn ModelSession> {
        if matches!(
            self.state,
            HandleState::Uninitialized | HandleState::RetryPending
        ) {
            self.initialize(runtime)?;
        }
        match &mut self.state {
            HandleState::Ready { session, .. } => Ok(session.as_mut()),
            HandleState::Failed { reason } => Err(FramepopError::asset_load(format!(
                "model '{}' permanently unavailable: {reason}",
                self.asset.name
            ))),
            HandleState::Uninitialized | HandleState::RetryPending => Err(
                FramepopError::asset_load(format!("model '{}' not initialized", self.asset.name)),
            ),
        }
    }

    fn initialize(&mut self, runtime: &dyn InferenceRuntime) -> FramepopResult<()> {
        self.attempts += 1;
        match self.load(runtime) {
            Ok((session, backend)) => {
                tracing::info!(model = %self.asset.name, ?backend, attempt = self.attempts, "model ready");
                self.state = HandleState::Ready { session, backend };
                Ok(())
            }
            Err(e) if self.attempts >= MAX_INIT_ATTEMPTS => {
                tracing::warn!(model = %self.asset.name, error = %e, "model init failed permanently");
                self.state = HandleState::Failed {
                    reason: e.to_string(),
                };
                Err(e)
            }
            Err(e) => {
                tracing::warn!(model = %self.asset.name, error = %e, "model init failed; will retry once");
                self.state = HandleState::RetryPending;
                Err(e)
            }
        }
    }

    fn load(
        &self,
        runtime: &dyn InferenceRuntime,
    ) -> FramepopResult<(Box<dyn ModelSession>, ExecutionBackend)> {
        match runtime.load(&self.asset, ExecutionBackend::Accelerated) {
            Ok(session) => return Ok((session, ExecutionBackend::Accelerated)),
            Err(e) => tracing::warn!(
                model = %self.asset.name,
                error = %e,
                threads = self.cpu_threads,
                "accelerated backend unavailable; using CPU"
            ),
        }
        let backend = ExecutionBackend::Cpu {
            threads: self.cpu_threads,
        };
        runtime.load(&self.asset, backend).map(|s| (s, backend))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/handle.rs"]
mod tests;
