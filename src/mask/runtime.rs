use std::path::PathBuf;

use crate::foundation::error::{FramepopError, FramepopResult};
use crate::mask::tensor::{Tensor, TensorSpec};

/// Where a model is executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExecutionBackend {
    /// Hardware delegate (GPU/NPU), whatever the runtime offers.
    Accelerated,
    /// Plain CPU execution with a fixed worker count.
    Cpu { threads: usize },
}

/// Identifies a model file to load.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ModelAsset {
    pub name: String,
    pub path: PathBuf,
}

impl ModelAsset {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// A loaded model.
///
/// `run` takes `&mut self`: a session must never be driven from two threads at once.
pub trait ModelSession: Send {
    fn inputs(&self) -> &[TensorSpec];

    fn outputs(&self) -> &[TensorSpec];

    fn run(&mut self, inputs: Vec<Tensor>) -> FramepopResult<Vec<Tensor>>;
}

/// Tensor inference capability. The pipeline only orchestrates; the math lives behind this.
pub trait InferenceRuntime: Send + Sync {
    fn load(
        &self,
        asset: &ModelAsset,
        backend: ExecutionBackend,
    ) -> FramepopResult<Box<dyn ModelSession>>;
}

/// Runtime used when no inference engine is linked; every load fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableRuntime;

impl InferenceRuntime for UnavailableRuntime {
    fn load(
        &self,
        asset: &ModelAsset,
        backend: ExecutionBackend,
    ) -> FramepopResult<Box<dyn ModelSession>> {
        match backend {
            ExecutionBackend::Accelerated => Err(FramepopError::accelerator_unavailable(
                "no inference runtime linked",
            )),
            ExecutionBackend::Cpu { .. } => Err(FramepopError::asset_load(format!(
                "cannot load model '{}' from {}: no inference runtime linked",
                asset.name,
                asset.path.display()
            ))),
        }
    }
}
