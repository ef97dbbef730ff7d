use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::assets::buffer::{ImageBuffer, Matte};
use crate::foundation::error::{FramepopError, FramepopResult};
use crate::mask::pipeline::{MaskPipeline, MaskSession};

/// A completed image/matte pair, handed to the render loop as one value.
#[derive(Clone, Debug)]
pub struct LoadedScene {
    /// Increases with every submission; newer always wins.
    pub generation: u64,
    pub image: ImageBuffer,
    pub matte: Matte,
    /// False when a precomputed matte was supplied.
    pub inferred: bool,
}

struct SceneRequest {
    generation: u64,
    image: ImageBuffer,
    matte: Option<Matte>,
}

/// Runs the mask pipeline on one dedicated thread.
///
/// Submissions queued while a run is in progress collapse to the newest one.
pub struct MaskWorker {
    jobs: Option<Sender<SceneRequest>>,
    results: Receiver<LoadedScene>,
    next_generation: u64,
    thread: Option<JoinHandle<()>>,
}

impl MaskWorker {
    pub fn spawn(pipeline: MaskPipeline, mut session: MaskSession) -> FramepopResult<Self> {
        let (job_tx, job_rx) = mpsc::channel::<SceneRequest>();
        let (done_tx, done_rx) = mpsc::channel();

        let thread = std::thread::Builder::new()
            .name("framepop-mask".to_owned())
            .spawn(move || {
                while let Ok(first) = job_rx.recv() {
                    let req = job_rx.try_iter().last().unwrap_or(first);
                    let (matte, inferred) = match req.matte {
                        Some(m) => (m, false),
                        None => (pipeline.run(&mut session, &req.image), true),
                    };
                    tracing::debug!(generation = req.generation, inferred, "scene ready");
                    let scene = LoadedScene {
                        generation: req.generation,
                        image: req.image,
                        matte,
                        inferred,
                    };
                    if done_tx.send(scene).is_err() {
                        break;
                    }
                }
            })
            .map_err(|e| FramepopError::inference(format!("spawn mask worker: {e}")))?;

        Ok(Self {
            jobs: Some(job_tx),
            results: done_rx,
            next_generation: 1,
            thread: Some(thread),
        })
    }

    /// Queue `image` for masking; a precomputed `matte` skips inference. Returns the generation.
    pub fn submit(&mut self, image: ImageBuffer, matte: Option<Matte>) -> FramepopResult<u64> {
        let generation = self.next_generation;
        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| FramepopError::inference("mask worker stopped"))?;
        jobs.send(SceneRequest {
            generation,
            image,
            matte,
        })
        .map_err(|_| FramepopError::inference("mask worker stopped"))?;
        self.next_generation += 1;
        Ok(generation)
    }

    /// Newest completed scene, if any, without blocking.
    pub fn try_latest(&self) -> Option<LoadedScene> {
        self.results
            .try_iter()
            .max_by_key(|scene| scene.generation)
    }

    /// Block up to `timeout` for a completed scene, then drain anything newer.
    pub fn wait_latest(&self, timeout: Duration) -> Option<LoadedScene> {
        let first = self.results.recv_timeout(timeout).ok()?;
        Some(match self.try_latest() {
            Some(newer) if newer.generation > first.generation => newer,
            _ => first,
        })
    }
}

impl Drop for MaskWorker {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.jobs.take();
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::warn!("mask worker panicked");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/worker.rs"]
mod tests;
