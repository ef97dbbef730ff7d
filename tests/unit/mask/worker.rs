use super::*;

use std::sync::Arc;

use image::{Rgba, RgbaImage};

use crate::foundation::core::Extent;
use crate::mask::runtime::{InferenceRuntime, UnavailableRuntime};
use crate::mask::scripted::{ScriptedRuntime, coarse_model, matting_model, refine_model};
use crate::mask::stages::{COARSE, MATTING, REFINE};

const WAIT: Duration = Duration::from_secs(10);

fn image(w: u32, h: u32) -> ImageBuffer {
    ImageBuffer::new(RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 255]))).unwrap()
}

fn worker(rt: Arc<dyn InferenceRuntime>) -> MaskWorker {
    let pipeline = MaskPipeline::default();
    let session = pipeline.session(rt);
    MaskWorker::spawn(pipeline, session).unwrap()
}

#[test]
fn precomputed_matte_bypasses_inference() {
    let rt = Arc::new(ScriptedRuntime::new());
    let mut w = worker(rt.clone());
    let matte = Matte::filled(Extent::new(3, 3), 128);

    let generation = w.submit(image(6, 6), Some(matte.clone())).unwrap();
    let scene = w.wait_latest(WAIT).unwrap();
    assert_eq!(scene.generation, generation);
    assert!(!scene.inferred);
    assert!(scene.matte.same_buffer(&matte));
    assert!(rt.loads().is_empty());
}

#[test]
fn inferred_scene_carries_pipeline_matte() {
    let rt = Arc::new(
        ScriptedRuntime::new()
            .model(COARSE, coarse_model(4, 4))
            .model(REFINE, refine_model(5, 5))
            .model(MATTING, matting_model(4, 4)),
    );
    let mut w = worker(rt);
    w.submit(image(4, 4), None).unwrap();
    let scene = w.wait_latest(WAIT).unwrap();
    assert!(scene.inferred);
    assert_eq!(scene.matte.extent(), Extent::new(4, 4));
    assert!(scene.matte.alpha(0, 0) > 0);
}

#[test]
fn newest_generation_wins() {
    let mut w = worker(Arc::new(UnavailableRuntime));
    let gens: Vec<u64> = (1..=4)
        .map(|i| w.submit(image(i, i), None).unwrap())
        .collect();
    assert_eq!(gens, vec![1, 2, 3, 4]);

    let mut newest = None;
    for _ in 0..4 {
        match w.wait_latest(WAIT) {
            Some(scene) => {
                let generation = scene.generation;
                newest = Some(scene);
                if generation == 4 {
                    break;
                }
            }
            None => break,
        }
    }
    let scene = newest.unwrap();
    assert_eq!(scene.generation, 4);
    assert_eq!(scene.image.extent(), Extent::new(4, 4));
    // No runtime: the opaque fallback stands in.
    assert_eq!(scene.matte.alpha(0, 0), 255);
    assert!(w.try_latest().is_none());
}
