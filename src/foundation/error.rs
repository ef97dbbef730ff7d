/// Convenience result type used across framepop.
pub type FramepopResult<T> = Result<T, FramepopError>;

/// Top-level error taxonomy used by engine APIs.
///
/// None of these ever reach the render loop: mask stages degrade to a prior stage's output,
/// and drawing errors skip a single frame.
#[derive(thiserror::Error, Debug)]
pub enum FramepopError {
    /// Missing or corrupt model or image asset.
    #[error("asset load failure: {0}")]
    AssetLoad(String),

    /// The accelerated inference backend could not be created.
    #[error("accelerator unavailable: {0}")]
    AcceleratorUnavailable(String),

    /// A tensor had a rank, layout or channel count outside the supported set.
    #[error("inference shape mismatch: {0}")]
    InferenceShapeMismatch(String),

    /// The inference runtime reported an error while running a model.
    #[error("inference error: {0}")]
    Inference(String),

    /// Zero-size or otherwise unusable dimensions were handed to a geometry routine.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Invalid user-provided configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while drawing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramepopError {
    /// Build a [`FramepopError::AssetLoad`] value.
    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoad(msg.into())
    }

    /// Build a [`FramepopError::AcceleratorUnavailable`] value.
    pub fn accelerator_unavailable(msg: impl Into<String>) -> Self {
        Self::AcceleratorUnavailable(msg.into())
    }

    /// Build a [`FramepopError::InferenceShapeMismatch`] value.
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::InferenceShapeMismatch(msg.into())
    }

    /// Build a [`FramepopError::Inference`] value.
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Build a [`FramepopError::DegenerateGeometry`] value.
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateGeometry(msg.into())
    }

    /// Build a [`FramepopError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FramepopError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
