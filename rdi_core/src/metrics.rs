//! Transit metrics: plausibility window, distance / time / RDI per
//! trajectory, and run-level summary statistics.

use crate::{config::AnalysisConfig, trajectory::Trajectory, types::TrajectoryId};
use serde::{Deserialize, Serialize};

/// One row of the metric table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitRecord {
    pub trajectory_id: TrajectoryId,
    pub start_frame: u64,
    pub end_frame: u64,
    /// Signed net displacement along the flow axis (µm)
    pub distance: f64,
    /// Transit time (s)
    pub time: f64,
    /// distance / time (µm/s)
    pub rdi: f64,
    /// Mean mass over the normalization constant (pixels)
    pub size: f64,
}

/// Open interval of plausible transit distances.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitWindow {
    pub lower: f64,
    pub upper: f64,
}

impl TransitWindow {
    /// Shorter than a third of the channel is ambiguous; longer than the
    /// channel is a linking error.
    pub fn for_channel(channel_width_microns: f64) -> Self {
        Self {
            lower: channel_width_microns / 3.0,
            upper: channel_width_microns,
        }
    }

    /// Both bounds exclusive.
    pub fn contains(&self, distance: f64) -> bool {
        distance > self.lower && distance < self.upper
    }
}

/// Compute the metric row for `trajectory`, or `None` if it has no positive
/// transit time or falls outside the plausibility window.
pub fn measure(trajectory: &Trajectory, config: &AnalysisConfig) -> Option<TransitRecord> {
    let distance = (trajectory.last().x - trajectory.first().x) / config.pixels_per_micron;
    let time = trajectory.frame_span() as f64 / config.frames_per_second;
    if time <= 0.0 {
        return None;
    }
    if !TransitWindow::for_channel(config.channel_width_microns).contains(distance) {
        return None;
    }
    Some(TransitRecord {
        trajectory_id: trajectory.id,
        start_frame: trajectory.start_frame(),
        end_frame: trajectory.end_frame(),
        distance,
        time,
        rdi: distance / time,
        size: trajectory.mean_mass() / config.mass_normalization,
    })
}

/// Keep plausible trajectories, paired with their metric rows, in input order.
pub fn filter_plausible(
    trajectories: Vec<Trajectory>,
    config: &AnalysisConfig,
) -> Vec<(Trajectory, TransitRecord)> {
    trajectories
        .into_iter()
        .filter_map(|t| measure(&t, config).map(|record| (t, record)))
        .collect()
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

/// Counts at each stage plus RDI / size statistics over accepted rows.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub frames: usize,
    pub detections: usize,
    pub linked_trajectories: usize,
    pub after_stub_filter: usize,
    pub accepted: usize,
    pub mean_rdi: Option<f64>,
    pub median_rdi: Option<f64>,
    pub mean_size: Option<f64>,
}

impl RunSummary {
    /// Fill the statistics fields from `records`.
    pub fn with_records(mut self, records: &[TransitRecord]) -> Self {
        self.accepted = records.len();
        self.mean_rdi = mean(records.iter().map(|r| r.rdi));
        self.median_rdi = median(records.iter().map(|r| r.rdi).collect());
        self.mean_size = mean(records.iter().map(|r| r.size));
        self
    }

    /// Pool several runs (e.g. every file in a directory).
    pub fn combine(summaries: &[RunSummary], records: &[TransitRecord]) -> Self {
        let base = RunSummary {
            frames: summaries.iter().map(|s| s.frames).sum(),
            detections: summaries.iter().map(|s| s.detections).sum(),
            linked_trajectories: summaries.iter().map(|s| s.linked_trajectories).sum(),
            after_stub_filter: summaries.iter().map(|s| s.after_stub_filter).sum(),
            ..Default::default()
        };
        base.with_records(records)
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
