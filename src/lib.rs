//! Framepop renders a photo as an animated, subject-aware wallpaper frame.
//!
//! A three-stage segmentation cascade produces a matte for the subject. The matte drives the
//! clip geometry, an eased or spring-damped transition animates the reveal, and a depth-pop
//! layer redraws the subject above the clip. The public API is loop-oriented:
//!
//! - Build a [`MaskPipeline`] and a [`MaskSession`], and hand both to a [`MaskWorker`]
//! - Feed finished [`LoadedScene`]s into a [`RenderLoop`]
//! - [`RenderLoop::tick`] once per frame into a [`FrameSurface`]
#![forbid(unsafe_code)]

mod animation;
mod assets;
mod config;
mod foundation;
mod geometry;
mod mask;
mod render;
mod shape;

pub use crate::foundation::core::{Affine, BezPath, Extent, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{FramepopError, FramepopResult};
pub use crate::foundation::tunables;

pub use crate::animation::eased::EasedTransition;
pub use crate::animation::engine::{
    AnimationEngine, AnimationState, AnimationVariant, FrameTransforms,
};
pub use crate::animation::spring::SpringTransition;
pub use crate::assets::buffer::{ImageBuffer, Matte, MatteEncoding};
pub use crate::assets::decode::{decode_image, decode_matte, load_image, load_matte};
pub use crate::config::scene::SceneConfig;
pub use crate::geometry::subject::{
    SubjectBounds, UnifiedGeometry, calculate_subject_bounds, derive_unified_geometry,
};
pub use crate::mask::gate::{InferenceGate, InferencePermit};
pub use crate::mask::handle::{HandleStatus, ModelHandle};
pub use crate::mask::pipeline::{
    FallbackPolicy, MaskPipeline, MaskPipelineOpts, MaskReport, MaskSession,
};
pub use crate::mask::runtime::{
    ExecutionBackend, InferenceRuntime, ModelAsset, ModelSession, UnavailableRuntime,
};
pub use crate::mask::stages::{StageDiagnostics, StageOutput};
pub use crate::mask::tensor::{
    ElementType, Normalization, Plane, Tensor, TensorData, TensorLayout, TensorSpec, pack_planes,
};
pub use crate::mask::worker::{LoadedScene, MaskWorker};
pub use crate::render::compositor::{FrameCompositor, FrameInputs, render_icon};
pub use crate::render::frame_loop::{RenderLoop, TickOutcome};
pub use crate::render::surface::FrameSurface;
pub use crate::shape::path::{ShapeKind, clover_circles, icon_path, path_for};
