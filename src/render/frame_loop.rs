use std::time::Instant;

use crate::animation::engine::{AnimationEngine, AnimationVariant};
use crate::config::scene::SceneConfig;
use crate::foundation::core::Extent;
use crate::foundation::error::{FramepopError, FramepopResult};
use crate::foundation::tunables::{FRAME_INTERVAL, MAX_FRAME_DT};
use crate::geometry::subject::{UnifiedGeometry, derive_unified_geometry};
use crate::mask::worker::{LoadedScene, MaskWorker};
use crate::render::compositor::{FrameCompositor, FrameInputs};
use crate::render::surface::FrameSurface;

/// What a call to [`RenderLoop::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was drawn into the surface.
    Rendered,
    /// Drawing failed; the surface holds whatever the failed attempt left.
    Skipped,
    /// Not visible; nothing advanced.
    Suspended,
    /// Visible, but no scene has been installed yet.
    Idle,
}

/// Inputs that invalidate the cached geometry when they change.
#[derive(Clone, Copy, Debug, PartialEq)]
struct GeometryKey {
    generation: u64,
    screen: Extent,
    padding: f64,
    centering: bool,
}

/// Single-threaded per-frame driver: clock, animation state, geometry cache and compositor.
#[derive(Debug)]
pub struct RenderLoop {
    engine: AnimationEngine,
    compositor: FrameCompositor,
    scene: Option<LoadedScene>,
    geometry: Option<(GeometryKey, UnifiedGeometry)>,
    last_tick: Option<Instant>,
    visible: bool,
    frames: u64,
}

impl RenderLoop {
    pub fn new(variant: AnimationVariant) -> Self {
        Self {
            engine: AnimationEngine::new(variant),
            compositor: FrameCompositor::new(),
            scene: None,
            geometry: None,
            last_tick: None,
            visible: true,
            frames: 0,
        }
    }

    pub fn engine(&self) -> &AnimationEngine {
        &self.engine
    }

    pub fn scene(&self) -> Option<&LoadedScene> {
        self.scene.as_ref()
    }

    /// Geometry used for the most recent frame.
    pub fn geometry(&self) -> Option<&UnifiedGeometry> {
        self.geometry.as_ref().map(|(_, g)| g)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Replace the current scene unless `scene` is older. Returns whether it was installed.
    pub fn install_scene(&mut self, scene: LoadedScene) -> bool {
        if let Some(current) = &self.scene
            && current.generation >= scene.generation
        {
            tracing::debug!(
                current = current.generation,
                offered = scene.generation,
                "stale scene ignored"
            );
            return false;
        }
        tracing::info!(
            generation = scene.generation,
            image = ?scene.image.extent(),
            matte = ?scene.matte.extent(),
            "scene installed"
        );
        self.scene = Some(scene);
        true
    }

    /// Pick up the newest finished scene from `worker` without blocking.
    pub fn drain(&mut self, worker: &MaskWorker) -> bool {
        worker
            .try_latest()
            .is_some_and(|scene| self.install_scene(scene))
    }

    /// Suspend or resume. Resuming takes `now` as the new clock baseline.
    pub fn set_visible(&mut self, visible: bool, now: Instant) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        self.last_tick = visible.then_some(now);
        tracing::debug!(visible, "visibility changed");
    }

    pub fn on_unlock(&mut self) {
        self.engine.on_unlock();
    }

    pub fn on_lock(&mut self) {
        self.engine.on_lock();
    }

    /// When the next tick is due, if the loop is running.
    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.visible {
            return None;
        }
        Some(self.last_tick.map_or_else(Instant::now, |t| t + FRAME_INTERVAL))
    }

    /// Advance the animation to `now` and draw one frame.
    ///
    /// Drawing errors are logged and reported as [`TickOutcome::Skipped`]; they never escape.
    pub fn tick(&mut self, now: Instant, cfg: &SceneConfig, surface: &mut FrameSurface) -> TickOutcome {
        if !self.visible {
            return TickOutcome::Suspended;
        }
        let dt = self.last_tick.map_or(0.0, |prev| {
            now.saturating_duration_since(prev)
                .as_secs_f64()
                .min(MAX_FRAME_DT)
        });
        self.last_tick = Some(now);

        self.engine.switch_variant(cfg.animation_variant);
        self.engine.update(dt);

        if self.scene.is_none() {
            return TickOutcome::Idle;
        }
        match self.render(cfg, surface) {
            Ok(()) => {
                self.frames += 1;
                TickOutcome::Rendered
            }
            Err(e) => {
                tracing::warn!(error = %e, "frame skipped");
                TickOutcome::Skipped
            }
        }
    }

    fn render(&mut self, cfg: &SceneConfig, surface: &mut FrameSurface) -> FramepopResult<()> {
        cfg.validate()?;
        let scene = self
            .scene
            .as_ref()
            .ok_or_else(|| FramepopError::render("no scene installed"))?;
        let screen = surface.extent();
        let key = GeometryKey {
            generation: scene.generation,
            screen,
            padding: cfg.subject_padding_scale,
            centering: cfg.centering_enabled,
        };

        let geometry = match &self.geometry {
            Some((cached, g)) if *cached == key => *g,
            _ => {
                let g = derive_unified_geometry(
                    scene.image.extent(),
                    screen,
                    Some(&scene.matte),
                    cfg,
                )?;
                self.geometry = Some((key, g));
                g
            }
        };

        let transforms = self.engine.calculate_state(
            &geometry,
            screen,
            scene.image.extent(),
            cfg.depth_pop_enabled,
        );
        self.compositor.draw(
            surface,
            &FrameInputs {
                image: &scene.image,
                matte: Some(&scene.matte),
                geometry: &geometry,
                transforms: &transforms,
                config: cfg,
            },
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame_loop.rs"]
mod tests;
