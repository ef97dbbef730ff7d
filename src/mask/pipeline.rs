use std::sync::Arc;
use std::time::Instant;

use crate::assets::buffer::{ImageBuffer, Matte};
use crate::foundation::core::Extent;
use crate::foundation::error::{FramepopError, FramepopResult};
use crate::foundation::math::Fnv1a64;
use crate::foundation::tunables::{COARSE_THRESHOLD, CPU_INFERENCE_THREADS};
use crate::mask::gate::InferenceGate;
use crate::mask::handle::{HandleStatus, ModelHandle};
use crate::mask::runtime::{InferenceRuntime, ModelAsset, ModelSession};
use crate::mask::stages::{
    COARSE, MATTING, REFINE, StageDiagnostics, StageOutput, coarse_segmentation, deep_matting,
    foreground_refinement,
};

/// Matte returned when the coarse stage cannot run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Whole image is subject: geometry degrades to a centered frame.
    #[default]
    Opaque,
    /// No subject: depth-pop draws nothing.
    Transparent,
}

impl FallbackPolicy {
    fn alpha(self) -> u8 {
        match self {
            Self::Opaque => 255,
            Self::Transparent => 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaskPipelineOpts {
    pub coarse_model: ModelAsset,
    pub refine_model: ModelAsset,
    pub matting_model: ModelAsset,
    /// Stage-1 probabilities above this become foreground.
    pub coarse_threshold: f32,
    /// Worker threads for the CPU downgrade path.
    pub cpu_threads: usize,
    pub fallback: FallbackPolicy,
}

impl Default for MaskPipelineOpts {
    fn default() -> Self {
        Self {
            coarse_model: ModelAsset::new(COARSE, "models/coarse_segmentation.onnx"),
            refine_model: ModelAsset::new(REFINE, "models/foreground_refinement.onnx"),
            matting_model: ModelAsset::new(MATTING, "models/deep_matting.onnx"),
            coarse_threshold: COARSE_THRESHOLD,
            cpu_threads: CPU_INFERENCE_THREADS,
            fallback: FallbackPolicy::Opaque,
        }
    }
}

impl MaskPipelineOpts {
    pub fn from_reader<R: std::io::Read>(r: R) -> FramepopResult<Self> {
        let opts: MaskPipelineOpts = serde_json::from_reader(r)
            .map_err(|e| FramepopError::validation(format!("parse mask pipeline JSON: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> FramepopResult<()> {
        if !(self.coarse_threshold.is_finite() && (0.0..1.0).contains(&self.coarse_threshold)) {
            return Err(FramepopError::validation(format!(
                "coarse_threshold must be in [0, 1), got {}",
                self.coarse_threshold
            )));
        }
        if self.cpu_threads == 0 {
            return Err(FramepopError::validation("cpu_threads must be > 0"));
        }
        Ok(())
    }

    fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        for asset in [&self.coarse_model, &self.refine_model, &self.matting_model] {
            h.write_bytes(asset.name.as_bytes());
            h.write_u8(0);
            h.write_bytes(asset.path.as_os_str().as_encoded_bytes());
            h.write_u8(0);
        }
        h.write_u32(self.coarse_threshold.to_bits());
        h.write_u8(self.fallback.alpha());
        h.finish()
    }
}

/// Owned inference resources: runtime, the three model handles and the last computed matte.
///
/// Not shared between threads; hand it to one [`MaskWorker`](crate::MaskWorker) or keep it on
/// the calling thread.
pub struct MaskSession {
    runtime: Arc<dyn InferenceRuntime>,
    coarse: ModelHandle,
    refine: ModelHandle,
    matting: ModelHandle,
    /// Only the most recent image is kept; a new image replaces it.
    cache: Option<(u64, Matte)>,
    gate: Option<InferenceGate>,
}

impl std::fmt::Debug for MaskSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskSession")
            .field("coarse", &self.coarse)
            .field("refine", &self.refine)
            .field("matting", &self.matting)
            .field("cached", &self.cached_mattes())
            .finish()
    }
}

impl MaskSession {
    pub fn new(runtime: Arc<dyn InferenceRuntime>, opts: &MaskPipelineOpts) -> Self {
        Self {
            runtime,
            coarse: ModelHandle::new(opts.coarse_model.clone(), opts.cpu_threads),
            refine: ModelHandle::new(opts.refine_model.clone(), opts.cpu_threads),
            matting: ModelHandle::new(opts.matting_model.clone(), opts.cpu_threads),
            cache: None,
            gate: None,
        }
    }

    /// Serialize this session's runs through a gate shared with other sessions.
    pub fn with_gate(mut self, gate: InferenceGate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Handle states in stage order.
    pub fn statuses(&self) -> [HandleStatus; 3] {
        [
            self.coarse.status(),
            self.refine.status(),
            self.matting.status(),
        ]
    }

    pub fn cached_mattes(&self) -> usize {
        usize::from(self.cache.is_some())
    }

    pub fn clear_cache(&mut self) {
        self.cache = None;
    }
}

/// Result of one pipeline run with the per-stage records.
#[derive(Clone, Debug)]
pub struct MaskReport {
    pub matte: Matte,
    /// Successful stages, in order.
    pub stages: Vec<StageDiagnostics>,
    /// The coarse stage failed and the policy matte was returned.
    pub fallback: bool,
}

/// Three-stage segmentation and matting cascade.
#[derive(Clone, Debug, Default)]
pub struct MaskPipeline {
    opts: MaskPipelineOpts,
}

impl MaskPipeline {
    pub fn new(opts: MaskPipelineOpts) -> FramepopResult<Self> {
        opts.validate()?;
        Ok(Self { opts })
    }

    pub fn opts(&self) -> &MaskPipelineOpts {
        &self.opts
    }

    /// A fresh session with handles for this pipeline's models.
    pub fn session(&self, runtime: Arc<dyn InferenceRuntime>) -> MaskSession {
        MaskSession::new(runtime, &self.opts)
    }

    /// Compute (or fetch from the session cache) the matte for `image`. Never fails.
    pub fn run(&self, session: &mut MaskSession, image: &ImageBuffer) -> Matte {
        let key = self.cache_key(image);
        if let Some((cached, matte)) = &session.cache
            && *cached == key
        {
            tracing::debug!(key, "matte cache hit");
            return matte.clone();
        }
        let report = self.execute(session, image);
        // Fallback mattes are not cached so a later retry can still succeed.
        if !report.fallback {
            session.cache = Some((key, report.matte.clone()));
        }
        report.matte
    }

    /// Run every stage, bypassing the cache, and keep each stage's diagnostics.
    pub fn run_with_diagnostics(&self, session: &mut MaskSession, image: &ImageBuffer) -> MaskReport {
        self.execute(session, image)
    }

    #[tracing::instrument(skip_all, fields(width = image.extent().width, height = image.extent().height))]
    fn execute(&self, session: &mut MaskSession, image: &ImageBuffer) -> MaskReport {
        let _permit = session.gate.as_ref().map(InferenceGate::acquire);
        let runtime = session.runtime.as_ref();
        let mut stages = Vec::with_capacity(3);

        let Some(coarse) = run_stage(&mut session.coarse, runtime, COARSE, |s| {
            coarse_segmentation(s, image, self.opts.coarse_threshold)
        }) else {
            tracing::warn!(policy = ?self.opts.fallback, "coarse segmentation unavailable; using fallback matte");
            return MaskReport {
                matte: self.fallback_matte(image.extent()),
                stages,
                fallback: true,
            };
        };

        let refined = run_stage(&mut session.refine, runtime, REFINE, |s| {
            foreground_refinement(s, image, &coarse.matte)
        });

        let prior = refined.as_ref().map_or(&coarse.matte, |r| &r.matte);
        let matted = run_stage(&mut session.matting, runtime, MATTING, |s| {
            deep_matting(s, image, prior)
        });

        let mut best = coarse.matte;
        stages.push(coarse.diagnostics);
        if let Some(r) = refined {
            best = r.matte;
            stages.push(r.diagnostics);
        }
        if let Some(m) = matted {
            best = m.matte;
            stages.push(m.diagnostics);
        }
        MaskReport {
            matte: best,
            stages,
            fallback: false,
        }
    }

    fn fallback_matte(&self, extent: Extent) -> Matte {
        Matte::filled(extent, self.opts.fallback.alpha())
    }

    fn cache_key(&self, image: &ImageBuffer) -> u64 {
        let mut h = Fnv1a64::new(image.fingerprint());
        h.write_u64(self.opts.fingerprint());
        h.finish()
    }
}

/// Acquire the handle and run one stage; any failure is logged and becomes `None`.
fn run_stage<F>(
    handle: &mut ModelHandle,
    runtime: &dyn InferenceRuntime,
    name: &'static str,
    stage: F,
) -> Option<StageOutput>
where
    F: FnOnce(&mut dyn ModelSession) -> FramepopResult<StageOutput>,
{
    let started = Instant::now();
    match handle.acquire(runtime).and_then(stage) {
        Ok(out) => {
            tracing::debug!(
                stage = name,
                elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                shape = ?out.diagnostics.output_shape,
                min = out.diagnostics.min_activation,
                max = out.diagnostics.max_activation,
                "mask stage complete"
            );
            Some(out)
        }
        Err(e) => {
            tracing::warn!(stage = name, error = %e, "mask stage failed");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/pipeline.rs"]
mod tests;
