use crate::animation::engine::{AnimationState, Motion};
use crate::foundation::core::Vec2;
use crate::foundation::math::lerp;
use crate::foundation::tunables::{
    BREATH_AMPLITUDE, BREATH_RATE, EASED_ANCHOR_BLEND, EASED_SETTLE_EPS, EASED_SPEED,
    FLOAT_AMPLITUDE_PX, FLOAT_RATE, POP_PARALLAX_PX, POP_VERTICAL_SHARE, SHAPE_EXPANSION_END,
    SHAPE_EXPANSION_START, SWAY_AMPLITUDE_PX, SWAY_RATE, TILT_AMPLITUDE_DEG, TILT_RATE,
};

/// Exponential-easing transition: `progress += (target - progress) * speed * dt`.
#[derive(Clone, Debug, Default)]
pub struct EasedTransition {
    progress: f64,
    target: f64,
    /// Seconds of accumulated `dt`; drives the idle oscillations.
    clock: f64,
}

impl EasedTransition {
    pub(crate) fn update(&mut self, dt: f64) {
        self.clock += dt;
        if self.progress == self.target {
            return;
        }
        // A step factor above 1 would overshoot the target.
        let k = (EASED_SPEED * dt).min(1.0);
        self.progress += (self.target - self.progress) * k;
        if (self.target - self.progress).abs() < EASED_SETTLE_EPS {
            self.progress = self.target;
        }
        self.progress = self.progress.clamp(0.0, 1.0);
    }

    pub(crate) fn on_unlock(&mut self) {
        self.target = 1.0;
    }

    pub(crate) fn on_lock(&mut self) {
        self.target = 0.0;
    }

    pub(crate) fn state(&self) -> AnimationState {
        AnimationState {
            progress: self.progress,
            velocity: 0.0,
            target: self.target,
        }
    }

    pub(crate) fn motion(&self) -> Motion {
        let p = self.progress;
        let t = self.clock;
        let float_y = FLOAT_AMPLITUDE_PX * (t * FLOAT_RATE).sin() * p;
        Motion {
            progress: p,
            breath: BREATH_AMPLITUDE * (t * BREATH_RATE).sin(),
            float_y,
            sway_x: SWAY_AMPLITUDE_PX * (t * SWAY_RATE).cos() * p,
            tilt_rad: TILT_AMPLITUDE_DEG.to_radians() * (t * TILT_RATE).sin() * p,
            expansion: lerp(SHAPE_EXPANSION_START, SHAPE_EXPANSION_END, p),
            pop_offset: Vec2::new(POP_PARALLAX_PX * p, float_y * POP_VERTICAL_SHARE),
            anchor_window: EASED_ANCHOR_BLEND,
        }
    }
}
