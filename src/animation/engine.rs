use crate::animation::eased::EasedTransition;
use crate::animation::spring::SpringTransition;
use crate::foundation::core::{Affine, Extent, Vec2};
use crate::geometry::subject::UnifiedGeometry;

/// Transition dynamics, selected by configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationVariant {
    /// First-order exponential approach; never overshoots.
    #[default]
    Eased,
    /// Spring-damper; overshoots transiently.
    Spring,
}

/// Dynamic state of the transition scalar.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct AnimationState {
    /// 0 = resting pose, 1 = active pose. Unbounded for the spring variant.
    pub progress: f64,
    /// Always 0 for the eased variant.
    pub velocity: f64,
    /// 0 or 1.
    pub target: f64,
}

/// Everything the compositor needs for one frame, derived from scratch on every call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTransforms {
    pub state: AnimationState,
    /// Image space → screen, for the photo.
    pub body: Affine,
    /// Image space → screen, for the clip shape (before `shift_y`).
    pub shape: Affine,
    /// Image space → screen, for the depth-pop layer.
    pub pop: Affine,
    /// Opacity of the depth-pop layer.
    pub alpha: u8,
    /// Vertical offset applied to the clip shape after `shape`, pixels.
    pub shift_y: f64,
}

/// Per-variant motion terms at one instant.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Motion {
    pub(crate) progress: f64,
    /// Active-pose scale relative to `base_scale` (breathing).
    pub(crate) breath: f64,
    pub(crate) float_y: f64,
    pub(crate) sway_x: f64,
    pub(crate) tilt_rad: f64,
    pub(crate) expansion: f64,
    pub(crate) pop_offset: Vec2,
    /// Progress over which the anchor moves from image center to subject center.
    pub(crate) anchor_window: f64,
}

/// Transition engine with one capability set over two dynamics models.
#[derive(Clone, Debug)]
pub enum AnimationEngine {
    Eased(EasedTransition),
    Spring(SpringTransition),
}

impl AnimationEngine {
    pub fn new(variant: AnimationVariant) -> Self {
        match variant {
            AnimationVariant::Eased => Self::Eased(EasedTransition::default()),
            AnimationVariant::Spring => Self::Spring(SpringTransition::default()),
        }
    }

    pub fn variant(&self) -> AnimationVariant {
        match self {
            Self::Eased(_) => AnimationVariant::Eased,
            Self::Spring(_) => AnimationVariant::Spring,
        }
    }

    /// Swap to `variant` from rest, keeping the current lock/unlock target.
    ///
    /// No-op when the variant is unchanged.
    pub fn switch_variant(&mut self, variant: AnimationVariant) {
        if self.variant() == variant {
            return;
        }
        let unlocked = self.state().target >= 0.5;
        *self = Self::new(variant);
        if unlocked {
            self.on_unlock();
        }
    }

    /// Advance the dynamics by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        match self {
            Self::Eased(e) => e.update(dt),
            Self::Spring(s) => s.update(dt),
        }
    }

    pub fn on_unlock(&mut self) {
        match self {
            Self::Eased(e) => e.on_unlock(),
            Self::Spring(s) => s.on_unlock(),
        }
    }

    pub fn on_lock(&mut self) {
        match self {
            Self::Eased(e) => e.on_lock(),
            Self::Spring(s) => s.on_lock(),
        }
    }

    pub fn state(&self) -> AnimationState {
        match self {
            Self::Eased(e) => e.state(),
            Self::Spring(s) => s.state(),
        }
    }

    pub fn is_settled(&self) -> bool {
        let s = self.state();
        s.progress == s.target && s.velocity == 0.0
    }

    /// Derive this frame's transforms.
    ///
    /// `screen` and `image` must be non-empty; the render loop guarantees it by refusing to
    /// derive geometry for empty extents.
    pub fn calculate_state(
        &self,
        geometry: &UnifiedGeometry,
        screen: Extent,
        image: Extent,
        pop_enabled: bool,
    ) -> FrameTransforms {
        let motion = match self {
            Self::Eased(e) => e.motion(),
            Self::Spring(s) => s.motion(),
        };
        compose(self.state(), motion, geometry, screen, image, pop_enabled)
    }
}

fn compose(
    state: AnimationState,
    m: Motion,
    geometry: &UnifiedGeometry,
    screen: Extent,
    image: Extent,
    pop_enabled: bool,
) -> FrameTransforms {
    let p = m.progress;
    let fill_scale = (screen.w() / image.w()).max(screen.h() / image.h());
    let active_scale = geometry.base_scale * (1.0 + m.breath);
    let scale = fill_scale + (active_scale - fill_scale) * p;

    let anchor_t = if m.anchor_window > 0.0 && p < m.anchor_window {
        (p / m.anchor_window).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let anchor = image.center() - geometry.shift * anchor_t;

    let screen_center = screen.center().to_vec2();
    let base = Affine::translate(screen_center + Vec2::new(m.sway_x, 0.0))
        * Affine::rotate(m.tilt_rad)
        * Affine::scale(scale)
        * Affine::translate(-anchor.to_vec2());

    let body = Affine::translate(Vec2::new(0.0, m.float_y)) * base;

    let c = geometry.shape_bounds_rel.center().to_vec2();
    let shape = base
        * Affine::translate(c)
        * Affine::scale(m.expansion)
        * Affine::translate(-c);

    let pop = if pop_enabled {
        Affine::translate(m.pop_offset) * base
    } else {
        body
    };

    FrameTransforms {
        state,
        body,
        shape,
        pop,
        alpha: (p.clamp(0.0, 1.0) * 255.0).round() as u8,
        shift_y: m.float_y,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/engine.rs"]
mod tests;
