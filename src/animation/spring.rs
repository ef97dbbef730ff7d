use crate::animation::engine::{AnimationState, Motion};
use crate::foundation::core::Vec2;
use crate::foundation::math::lerp;
use crate::foundation::tunables::{
    BREATH_AMPLITUDE, BREATH_RATE, LEVITATE_AMPLITUDE_PX, LEVITATE_RATE, POP_PARALLAX_PX,
    POP_VERTICAL_SHARE, SHAPE_EXPANSION_END, SHAPE_EXPANSION_FLOOR, SHAPE_EXPANSION_START,
    SPRING_ANCHOR_BLEND, SPRING_FRICTION, SPRING_LOCK_RECOIL, SPRING_MAX_STEP,
    SPRING_MAX_SUBSTEPS, SPRING_REST_PROGRESS, SPRING_REST_VELOCITY, SPRING_SETTLE_EPS,
    SPRING_TENSION, SPRING_TILT_DEG, SPRING_UNLOCK_KICK,
};

/// Spring-damper transition integrated with explicit Euler.
///
/// Progress may leave `[0, 1]` while the spring rings out.
#[derive(Clone, Debug, Default)]
pub struct SpringTransition {
    progress: f64,
    velocity: f64,
    target: f64,
    clock: f64,
}

impl SpringTransition {
    /// Advance by `dt` in equal sub-steps no longer than [`SPRING_MAX_STEP`].
    pub(crate) fn update(&mut self, dt: f64) {
        self.clock += dt;
        if dt <= 0.0 {
            return;
        }
        let steps = (dt / SPRING_MAX_STEP).ceil().clamp(1.0, f64::from(SPRING_MAX_SUBSTEPS));
        let h = dt.min(f64::from(SPRING_MAX_SUBSTEPS) * SPRING_MAX_STEP) / steps;
        for _ in 0..steps as u32 {
            if self.progress == self.target && self.velocity == 0.0 {
                return;
            }
            self.step(h);
        }
    }

    fn step(&mut self, h: f64) {
        let accel =
            -SPRING_TENSION * (self.progress - self.target) - SPRING_FRICTION * self.velocity;
        self.progress += self.velocity * h;
        self.velocity += accel * h;

        if (self.progress - self.target).abs() < SPRING_SETTLE_EPS
            && self.velocity.abs() < SPRING_SETTLE_EPS
        {
            self.progress = self.target;
            self.velocity = 0.0;
        }
    }

    /// Kicks only from rest near 0, so an unlock mid-flight does not re-trigger.
    pub(crate) fn on_unlock(&mut self) {
        self.target = 1.0;
        if self.progress.abs() < SPRING_REST_PROGRESS && self.velocity.abs() < SPRING_REST_VELOCITY
        {
            self.velocity = SPRING_UNLOCK_KICK;
        }
    }

    pub(crate) fn on_lock(&mut self) {
        self.target = 0.0;
        if self.progress > SPRING_REST_PROGRESS {
            self.velocity = self.velocity.min(SPRING_LOCK_RECOIL);
        }
    }

    pub(crate) fn state(&self) -> AnimationState {
        AnimationState {
            progress: self.progress,
            velocity: self.velocity,
            target: self.target,
        }
    }

    pub(crate) fn motion(&self) -> Motion {
        let p = self.progress;
        let t = self.clock;
        let float_y = LEVITATE_AMPLITUDE_PX * (t * LEVITATE_RATE).sin() * p;
        // Peaks mid-flight, vanishes at both poses, and flips sign while overshooting.
        let tilt_rad = -SPRING_TILT_DEG.to_radians() * 4.0 * p * (1.0 - p);
        Motion {
            progress: p,
            breath: BREATH_AMPLITUDE * (t * BREATH_RATE).sin(),
            float_y,
            sway_x: 0.0,
            tilt_rad,
            expansion: lerp(SHAPE_EXPANSION_START, SHAPE_EXPANSION_END, p)
                .max(SHAPE_EXPANSION_FLOOR),
            pop_offset: Vec2::new(POP_PARALLAX_PX * p, float_y * POP_VERTICAL_SHARE),
            anchor_window: SPRING_ANCHOR_BLEND,
        }
    }
}
