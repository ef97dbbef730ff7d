//! Named constants shared by the geometry, shape, animation, mask and render modules.
//!
//! These values are tuned for visual parity across devices; change them only together with the
//! reference renders.

use std::time::Duration;

// Subject geometry.

/// Matte pixels count as subject when their alpha byte is strictly above this value.
pub const MATTE_ALPHA_THRESHOLD: u8 = 40;
/// Shape bounds narrower than this (in image pixels) are treated as a degenerate mask.
pub const DEGENERATE_SIDE_PX: f64 = 50.0;
/// Replacement side for degenerate shape bounds, as a fraction of the image width.
pub const DEGENERATE_SIDE_FRACTION: f64 = 0.5;
/// Default padding applied around the subject bounds.
pub const DEFAULT_SUBJECT_PADDING: f64 = 1.2;

// Shape paths.

/// Squircle corner radius as a fraction of the width.
pub const SQUIRCLE_RADIUS_FRACTION: f64 = 0.22;
/// Arch crown radius as a fraction of the width.
pub const ARCH_RADIUS_FRACTION: f64 = 0.5;
/// Clover lobe radius is `width / CLOVER_LOBE_RADIUS_DIVISOR`.
pub const CLOVER_LOBE_RADIUS_DIVISOR: f64 = 3.4;
/// Clover lobe centers sit at `±width / CLOVER_LOBE_OFFSET_DIVISOR` from the center on both axes.
pub const CLOVER_LOBE_OFFSET_DIVISOR: f64 = 6.5;
/// Clover center disc radius is `width / CLOVER_CENTER_RADIUS_DIVISOR`.
pub const CLOVER_CENTER_RADIUS_DIVISOR: f64 = 5.0;
/// Badge scallop amplitude as a fraction of the width.
pub const BADGE_AMPLITUDE_FRACTION: f64 = 0.06;
/// Number of scallops around the badge rim.
pub const BADGE_LOBES: f64 = 8.0;
/// Polyline samples over one full turn of the badge rim.
pub const BADGE_STEPS: usize = 360;

// Eased transition.

/// Exponential approach rate, per second.
pub const EASED_SPEED: f64 = 8.5;
/// Progress within this distance of the target snaps to it.
pub const EASED_SETTLE_EPS: f64 = 1e-4;
/// Anchor blend window for the eased variant.
pub const EASED_ANCHOR_BLEND: f64 = 0.1;
/// Peak vertical float in pixels at full progress.
pub const FLOAT_AMPLITUDE_PX: f64 = 25.0;
/// Angular rate of the vertical float, rad/s.
pub const FLOAT_RATE: f64 = 1.6;
/// Peak horizontal sway in pixels at full progress.
pub const SWAY_AMPLITUDE_PX: f64 = 7.5;
/// Angular rate of the horizontal sway, rad/s.
pub const SWAY_RATE: f64 = 1.1;
/// Peak tilt in degrees at full progress.
pub const TILT_AMPLITUDE_DEG: f64 = 1.5;
/// Angular rate of the tilt oscillation, rad/s.
pub const TILT_RATE: f64 = 0.9;
/// Relative scale amplitude of the breathing term.
pub const BREATH_AMPLITUDE: f64 = 0.012;
/// Angular rate of the breathing term, rad/s.
pub const BREATH_RATE: f64 = 1.3;

// Shape expansion (assembly reveal).

/// Over-scale of the clip shape at progress 0.
pub const SHAPE_EXPANSION_START: f64 = 6.0;
/// Over-scale of the clip shape at progress 1.
pub const SHAPE_EXPANSION_END: f64 = 1.0;
/// Lower clamp for the over-scale while the spring overshoots past 1.
pub const SHAPE_EXPANSION_FLOOR: f64 = 0.2;

// Depth-pop layer.

/// Horizontal parallax of the pop layer at full progress, pixels.
pub const POP_PARALLAX_PX: f64 = 14.0;
/// Share of the vertical float applied to the pop layer.
pub const POP_VERTICAL_SHARE: f64 = 0.5;

// Spring-damper transition.

/// Spring stiffness.
pub const SPRING_TENSION: f64 = 340.0;
/// Spring damping.
pub const SPRING_FRICTION: f64 = 32.0;
/// Displacement and velocity below this count as settled.
pub const SPRING_SETTLE_EPS: f64 = 1e-4;
/// Longest single integration step, seconds. Explicit Euler diverges above friction / tension.
pub const SPRING_MAX_STEP: f64 = 1.0 / 60.0;
/// Sub-steps integrated per update at most; longer gaps only advance the clock.
pub const SPRING_MAX_SUBSTEPS: u32 = 60;
/// Velocity injected by an unlock from rest, per second.
pub const SPRING_UNLOCK_KICK: f64 = 9.0;
/// Velocity ceiling enforced on lock (a floor on recoil speed), per second.
pub const SPRING_LOCK_RECOIL: f64 = -4.0;
/// Anchor blend window for the spring variant.
pub const SPRING_ANCHOR_BLEND: f64 = 0.05;
/// Peak levitation in pixels at full progress.
pub const LEVITATE_AMPLITUDE_PX: f64 = 10.0;
/// Angular rate of the levitation, rad/s.
pub const LEVITATE_RATE: f64 = 0.8;
/// Peak counter-rotation in degrees, reached mid-flight.
pub const SPRING_TILT_DEG: f64 = 4.0;
/// The unlock kick only fires when progress is within this distance of 0...
pub const SPRING_REST_PROGRESS: f64 = 0.01;
/// ...and the speed is below this.
pub const SPRING_REST_VELOCITY: f64 = 0.01;

// Mask pipeline.

/// Stage-1 probability threshold for the binary coarse mask.
pub const COARSE_THRESHOLD: f32 = 0.5;
/// Intra-op threads for the CPU inference fallback.
pub const CPU_INFERENCE_THREADS: usize = 4;
/// Handle initialization attempts before a handle is permanently failed.
pub const MAX_INIT_ATTEMPTS: u32 = 2;
/// Simultaneous inference operations allowed by the default gate.
pub const DEFAULT_INFERENCE_PERMITS: usize = 2;

// Render loop.

/// Target cadence of the render loop while visible.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// Upper bound on a single tick's delta time, seconds.
pub const MAX_FRAME_DT: f64 = 0.1;
