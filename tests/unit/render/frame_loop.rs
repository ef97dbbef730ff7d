use super::*;

use std::time::Duration;

use image::{Rgba, RgbaImage};

use crate::assets::buffer::{ImageBuffer, Matte};

fn scene(generation: u64) -> LoadedScene {
    let image =
        ImageBuffer::new(RgbaImage::from_pixel(200, 200, Rgba([255, 0, 0, 255]))).unwrap();
    LoadedScene {
        generation,
        matte: Matte::filled(image.extent(), 255),
        image,
        inferred: false,
    }
}

fn surface() -> FrameSurface {
    FrameSurface::new(Extent::new(100, 100)).unwrap()
}

#[test]
fn idle_until_a_scene_arrives() {
    let mut rl = RenderLoop::new(AnimationVariant::Eased);
    let mut s = surface();
    let cfg = SceneConfig::default();
    let t0 = Instant::now();

    assert_eq!(rl.tick(t0, &cfg, &mut s), TickOutcome::Idle);
    assert!(rl.install_scene(scene(1)));
    assert_eq!(
        rl.tick(t0 + FRAME_INTERVAL, &cfg, &mut s),
        TickOutcome::Rendered
    );
    assert_eq!(rl.frames_rendered(), 1);
    assert!(rl.geometry().is_some());
}

#[test]
fn stale_generations_are_ignored() {
    let mut rl = RenderLoop::new(AnimationVariant::Eased);
    assert!(rl.install_scene(scene(3)));
    assert!(!rl.install_scene(scene(2)));
    assert!(!rl.install_scene(scene(3)));
    assert_eq!(rl.scene().unwrap().generation, 3);
    assert!(rl.install_scene(scene(4)));
}

#[test]
fn hidden_loop_is_suspended_and_resume_rebaselines_clock() {
    let mut rl = RenderLoop::new(AnimationVariant::Eased);
    let mut s = surface();
    let cfg = SceneConfig::default();
    let t0 = Instant::now();

    rl.tick(t0, &cfg, &mut s);
    rl.on_unlock();
    rl.set_visible(false, t0);
    assert!(!rl.is_visible());
    assert!(rl.next_deadline().is_none());

    let later = t0 + Duration::from_secs(10);
    assert_eq!(rl.tick(later, &cfg, &mut s), TickOutcome::Suspended);
    assert_eq!(rl.engine().state().progress, 0.0);

    rl.set_visible(true, later);
    assert_eq!(rl.next_deadline(), Some(later + FRAME_INTERVAL));
    rl.tick(later + FRAME_INTERVAL, &cfg, &mut s);
    let p = rl.engine().state().progress;
    assert!(p > 0.0 && p < 0.2, "progress {p}");
}

#[test]
fn long_gaps_are_clamped() {
    let mut rl = RenderLoop::new(AnimationVariant::Eased);
    let mut s = surface();
    let cfg = SceneConfig::default();
    let t0 = Instant::now();

    rl.tick(t0, &cfg, &mut s);
    rl.on_unlock();
    rl.tick(t0 + Duration::from_secs(10), &cfg, &mut s);
    let p = rl.engine().state().progress;
    assert!((p - 0.85).abs() < 1e-9, "progress {p}");
}

#[test]
fn variant_follows_config_without_losing_target() {
    let mut rl = RenderLoop::new(AnimationVariant::Eased);
    let mut s = surface();
    let t0 = Instant::now();
    rl.on_unlock();

    let cfg = SceneConfig {
        animation_variant: AnimationVariant::Spring,
        ..SceneConfig::default()
    };
    rl.tick(t0, &cfg, &mut s);
    assert_eq!(rl.engine().variant(), AnimationVariant::Spring);
    assert_eq!(rl.engine().state().target, 1.0);
}

#[test]
fn invalid_config_skips_the_frame() {
    let mut rl = RenderLoop::new(AnimationVariant::Eased);
    let mut s = surface();
    rl.install_scene(scene(1));
    let bad = SceneConfig {
        subject_padding_scale: -1.0,
        ..SceneConfig::default()
    };

    let t0 = Instant::now();
    assert_eq!(rl.tick(t0, &bad, &mut s), TickOutcome::Skipped);
    assert_eq!(rl.frames_rendered(), 0);
    assert_eq!(
        rl.tick(t0 + FRAME_INTERVAL, &SceneConfig::default(), &mut s),
        TickOutcome::Rendered
    );
}

#[test]
fn locked_frame_shows_photo_full_screen() {
    let mut rl = RenderLoop::new(AnimationVariant::Eased);
    let mut s = surface();
    rl.install_scene(scene(1));
    let cfg = SceneConfig {
        background_color: 0xFF00_00FF,
        ..SceneConfig::default()
    };
    assert_eq!(rl.tick(Instant::now(), &cfg, &mut s), TickOutcome::Rendered);
    // Locked: the clip is scaled up six-fold so the photo fills the screen, pop layer hidden.
    let px = s.pixel(50, 50).unwrap();
    assert!(px[0] > 200 && px[2] < 50, "pixel {px:?}");
}
