//! Scenario definitions.
//!
//! Each scenario is a named layout of cells flowing left to right through
//! the imaged channel plus a detector model. All scenarios are deterministic
//! given the same seed.

use crate::{
    cell::{FlowCell, FlowMotion},
    detector::{DetectorParams, DetectorSimulator},
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rdi_core::config::{AnalysisConfig, DEFAULT_FRAMES_PER_SECOND, DEFAULT_PIXELS_PER_MICRON};
use rdi_core::types::{DetectionSet, Frame};
use serde::{Deserialize, Serialize};

/// Which pre-defined scenario to load.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenarioKind {
    /// 6 cells in well-separated lanes, perfect detector
    Sparse,
    /// Bursts of 36 side-by-side cells; forces adaptive relaxation
    Crowded,
    /// 9 cells, 20% of blobs missed; exercises linker memory
    Dropout,
    /// Sparse cells plus spurious single-frame blobs
    Clutter,
}

/// A fully configured simulation scenario.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    /// Number of frames to image
    pub frames: u64,
    pub pixels_per_micron: f64,
    pub frames_per_second: f64,
    pub cells: Vec<FlowCell>,
    pub detector: DetectorParams,
}

/// Ground-truth position of one cell at one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellState {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthFrame {
    pub frame: u64,
    /// Cells inside the channel at this frame, detected or not
    pub cells: Vec<CellState>,
}

/// Output of [`Scenario::run`].
#[derive(Clone, Debug)]
pub struct SimulationRun {
    pub detections: DetectionSet,
    pub ground_truth: Vec<GroundTruthFrame>,
}

impl Scenario {
    /// Build the named scenario. Uses `seed` for repeatability.
    pub fn build(kind: ScenarioKind, seed: u64) -> Self {
        match kind {
            ScenarioKind::Sparse => Self::sparse(seed),
            ScenarioKind::Crowded => Self::crowded(seed),
            ScenarioKind::Dropout => Self::dropout(seed),
            ScenarioKind::Clutter => Self::clutter(seed),
        }
    }

    /// Analysis configuration matching this scenario's optics.
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig::for_channel(
            self.detector.frame_width,
            self.pixels_per_micron,
            self.frames_per_second,
        )
    }

    /// Image every frame: detect, record ground truth, then advance cells.
    pub fn run(&self) -> rdi_core::Result<SimulationRun> {
        let mut cells = self.cells.clone();
        let mut detector = DetectorSimulator::new(self.detector.clone(), self.seed);
        let mut frames: Vec<Frame> = Vec::with_capacity(self.frames as usize);
        let mut ground_truth = Vec::with_capacity(self.frames as usize);

        for frame in 0..self.frames {
            frames.push(detector.detect(&cells, frame));
            ground_truth.push(GroundTruthFrame {
                frame,
                cells: cells
                    .iter()
                    .filter(|c| c.is_active(frame, self.detector.frame_width))
                    .map(|c| CellState {
                        id: c.id,
                        x: c.state[0],
                        y: c.state[1],
                    })
                    .collect(),
            });
            for cell in &mut cells {
                cell.step(frame);
            }
        }

        Ok(SimulationRun {
            detections: DetectionSet::from_frames(frames)?,
            ground_truth,
        })
    }

    // -----------------------------------------------------------------------
    // Scenario 1: Sparse
    // -----------------------------------------------------------------------
    fn sparse(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
        let cells = staggered_cells(&mut rng, 6, 15);
        scenario("sparse", seed, 100, cells, DetectorParams::default())
    }

    // -----------------------------------------------------------------------
    // Scenario 2: Crowded
    // -----------------------------------------------------------------------
    fn crowded(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(2));
        // Bursts 6 frames apart at 20 px/frame keep consecutive bursts
        // further apart than the search radius.
        let cells = (0..6u64)
            .flat_map(|burst| (0..36u64).map(move |lane| (burst, lane)))
            .map(|(burst, lane)| {
                let x0 = 3.0 + rng.gen::<f64>() * 2.0;
                let y = 30.0 + 10.0 * lane as f64;
                FlowCell::new(burst * 36 + lane, burst * 6, [x0, y], [20.0, 0.0])
            })
            .collect();
        scenario("crowded", seed, 50, cells, DetectorParams::default())
    }

    // -----------------------------------------------------------------------
    // Scenario 3: Dropout
    // -----------------------------------------------------------------------
    fn dropout(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(3));
        let cells = staggered_cells(&mut rng, 9, 10);
        let detector = DetectorParams {
            p_detection: 0.8,
            ..Default::default()
        };
        scenario("dropout", seed, 110, cells, detector)
    }

    // -----------------------------------------------------------------------
    // Scenario 4: Clutter
    // -----------------------------------------------------------------------
    fn clutter(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(4));
        let cells = staggered_cells(&mut rng, 6, 15);
        let detector = DetectorParams {
            lambda_clutter: 1.0,
            ..Default::default()
        };
        scenario("clutter", seed, 100, cells, detector)
    }
}

// ---------------------------------------------------------------------------
// Builder helpers
// ---------------------------------------------------------------------------

fn scenario(
    name: &str,
    seed: u64,
    frames: u64,
    cells: Vec<FlowCell>,
    detector: DetectorParams,
) -> Scenario {
    Scenario {
        name: name.into(),
        seed,
        frames,
        pixels_per_micron: DEFAULT_PIXELS_PER_MICRON,
        frames_per_second: DEFAULT_FRAMES_PER_SECOND,
        cells,
        detector,
    }
}

/// `n` cells entering `spacing` frames apart in three lanes 120 px apart,
/// 15-25 px/frame. Every third cell wobbles slightly.
fn staggered_cells(rng: &mut ChaCha8Rng, n: u64, spacing: u64) -> Vec<FlowCell> {
    (0..n)
        .map(|i| {
            let speed = 15.0 + rng.gen::<f64>() * 10.0;
            let x0 = 2.0 + rng.gen::<f64>() * 6.0;
            let y = 60.0 + (i % 3) as f64 * 120.0;
            let size = 8.0 + rng.gen::<f64>() * 8.0;
            let cell = FlowCell::new(i, i * spacing, [x0, y], [speed, 0.0])
                .with_appearance(size, size * 255.0);
            if i % 3 == 2 {
                cell.with_motion(FlowMotion::Wobble {
                    amplitude: 2.0,
                    period: 6.0,
                })
            } else {
                cell
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_are_deterministic() {
        for kind in [
            ScenarioKind::Sparse,
            ScenarioKind::Crowded,
            ScenarioKind::Dropout,
            ScenarioKind::Clutter,
        ] {
            let a = Scenario::build(kind, 42).run().unwrap();
            let b = Scenario::build(kind, 42).run().unwrap();
            assert_eq!(a.detections, b.detections, "{kind:?}");
            assert_eq!(a.ground_truth, b.ground_truth, "{kind:?}");
        }
    }

    #[test]
    fn sparse_cells_all_cross_the_channel() {
        let s = Scenario::build(ScenarioKind::Sparse, 1);
        let run = s.run().unwrap();
        assert_eq!(run.detections.frame_count(), 100);
        // Every cell is seen at entry and gone by the last frame.
        let last = run.ground_truth.last().unwrap();
        assert!(last.cells.is_empty());
        for cell in &s.cells {
            let seen = run
                .ground_truth
                .iter()
                .filter(|g| g.cells.iter().any(|c| c.id == cell.id))
                .count();
            assert!(seen >= 10, "cell {} seen in {seen} frames", cell.id);
        }
    }

    #[test]
    fn perfect_detector_matches_ground_truth_counts() {
        let run = Scenario::build(ScenarioKind::Crowded, 9).run().unwrap();
        for (frame, truth) in run.detections.frames().iter().zip(&run.ground_truth) {
            assert_eq!(frame.detections.len(), truth.cells.len());
        }
    }

    #[test]
    fn config_follows_frame_width() {
        let cfg = Scenario::build(ScenarioKind::Sparse, 0).analysis_config();
        assert!((cfg.channel_width_microns - 200.0).abs() < 1e-12);
        assert!((cfg.linker.max_link_distance - 250.0 / 3.0).abs() < 1e-12);
    }
}
