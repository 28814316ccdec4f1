//! Detector simulator.
//!
//! Turns ground-truth cells into per-frame blob detections with:
//! - uniform position jitter of +/- `position_noise`
//! - miss probability (1 - `p_detection`)
//! - Poisson clutter (spurious blobs) uniformly over the frame

use crate::cell::FlowCell;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rdi_core::types::{Detection, Frame};
use serde::{Deserialize, Serialize};

/// Imaging and segmentation characteristics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorParams {
    /// Frame width along the flow axis (pixels)
    pub frame_width: f64,
    pub frame_height: f64,
    /// Probability a visible cell yields a blob
    pub p_detection: f64,
    /// Half-width of the uniform jitter on each coordinate (pixels)
    pub position_noise: f64,
    /// Relative half-width of the uniform jitter on mass
    pub mass_noise: f64,
    /// Mean number of clutter blobs per frame
    pub lambda_clutter: f64,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            frame_width: 250.0,
            frame_height: 400.0,
            p_detection: 1.0,
            position_noise: 0.5,
            mass_noise: 0.05,
            lambda_clutter: 0.0,
        }
    }
}

/// Generates detection frames from a set of cells.
pub struct DetectorSimulator {
    pub params: DetectorParams,
    rng: ChaCha8Rng,
}

impl DetectorSimulator {
    pub fn new(params: DetectorParams, seed: u64) -> Self {
        Self {
            params,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Image `cells` at `frame`. Cell blobs come first in cell order,
    /// clutter after.
    pub fn detect(&mut self, cells: &[FlowCell], frame: u64) -> Frame {
        let p = &self.params;
        let mut detections = Vec::new();

        for cell in cells {
            if !cell.is_active(frame, p.frame_width) {
                continue;
            }
            if self.rng.gen::<f64>() > p.p_detection {
                continue;
            }
            let (tx, ty) = cell.pos_2d();
            let x = tx + jitter(&mut self.rng, p.position_noise);
            let y = ty + jitter(&mut self.rng, p.position_noise);
            let mass = cell.mass * (1.0 + jitter(&mut self.rng, p.mass_noise));
            detections.push(Detection::new(
                frame,
                x.clamp(0.0, p.frame_width),
                y.clamp(0.0, p.frame_height),
                cell.size,
                mass.max(0.0),
            ));
        }

        for _ in 0..poisson(&mut self.rng, p.lambda_clutter) {
            let x = self.rng.gen::<f64>() * p.frame_width;
            let y = self.rng.gen::<f64>() * p.frame_height;
            let size = 2.0 + self.rng.gen::<f64>() * 6.0;
            detections.push(Detection::new(frame, x, y, size, size * 255.0));
        }

        Frame::new(frame, detections)
    }
}

/// Uniform sample in [-half_width, half_width].
fn jitter(rng: &mut ChaCha8Rng, half_width: f64) -> f64 {
    rng.gen::<f64>() * half_width * 2.0 - half_width
}

/// Poisson sample by multiplying uniforms until the product drops below
/// e^-lambda, capped at 50.
fn poisson(rng: &mut ChaCha8Rng, lambda: f64) -> usize {
    if lambda <= 0.0 {
        return 0;
    }
    let threshold = (-lambda).exp();
    let mut n = 0usize;
    let mut prod = rng.gen::<f64>();
    while prod > threshold && n < 50 {
        prod *= rng.gen::<f64>();
        n += 1;
    }
    n
}
