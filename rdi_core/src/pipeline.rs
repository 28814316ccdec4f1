//! Analysis pipeline orchestrator.
//!
//! # Stages
//! 1. Validate the configuration
//! 2. Link detections into trajectories
//! 3. Drop stubs (too few frames)
//! 4. Drop implausible transits, compute distance / time / RDI / size
//! 5. Renumber accepted trajectories densely by first appearance
//! 6. Summarise
//!
//! Each stage takes ownership of the previous stage's collection and returns
//! a new one; nothing is shared between stages.

use crate::{
    config::AnalysisConfig,
    error::Result,
    filter::filter_stubs,
    linker::{link, FrameReport},
    metrics::{filter_plausible, RunSummary, TransitRecord},
    renumber::{renumber, AcceptedTrajectory},
    trajectory::Trajectory,
    types::{DetectionSet, TrajectoryId},
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One detection of one trajectory, flattened for tabular output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRow {
    pub trajectory_id: TrajectoryId,
    pub frame: u64,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub mass: f64,
}

/// Flatten trajectories into per-detection rows, trajectory by trajectory.
pub fn trajectory_rows<'a>(
    trajectories: impl IntoIterator<Item = &'a Trajectory>,
) -> Vec<TrajectoryRow> {
    trajectories
        .into_iter()
        .flat_map(|t| {
            t.detections().iter().map(move |d| TrajectoryRow {
                trajectory_id: t.id,
                frame: d.frame,
                x: d.x,
                y: d.y,
                size: d.size,
                mass: d.mass,
            })
        })
        .collect()
}

/// Results of one analysis run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AnalysisOutput {
    /// Every trajectory produced by the linker, linker ids, ascending
    pub linked: Vec<Trajectory>,
    /// Accepted trajectories, renumbered
    pub accepted: Vec<AcceptedTrajectory>,
    /// Metric table, one row per accepted trajectory, ascending id
    pub records: Vec<TransitRecord>,
    pub summary: RunSummary,
    pub frame_reports: Vec<FrameReport>,
}

impl AnalysisOutput {
    /// Per-detection rows of all linked trajectories (raw inspection).
    pub fn linked_rows(&self) -> Vec<TrajectoryRow> {
        trajectory_rows(&self.linked)
    }

    /// Per-detection rows of accepted trajectories, renumbered ids.
    pub fn accepted_rows(&self) -> Vec<TrajectoryRow> {
        trajectory_rows(self.accepted.iter().map(|a| &a.trajectory))
    }

    /// Labels to draw on `frame`: (renumbered id, x, y).
    pub fn frame_labels(&self, frame: u64) -> Vec<(TrajectoryId, f64, f64)> {
        self.accepted
            .iter()
            .filter_map(|a| {
                a.trajectory
                    .detections()
                    .iter()
                    .find(|d| d.frame == frame)
                    .map(|d| (a.id, d.x, d.y))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Run the full analysis on a validated detection set.
///
/// An empty result is a valid outcome. Errors only come from configuration.
pub fn analyze(detections: &DetectionSet, config: &AnalysisConfig) -> Result<AnalysisOutput> {
    config.validate()?;

    let link_output = link(detections, &config.linker)?;
    let linked = link_output.trajectories;

    let survivors = filter_stubs(linked.clone(), config.min_trajectory_frames);
    let after_stub_filter = survivors.len();

    let plausible = filter_plausible(survivors, config);
    let accepted = renumber(plausible);
    let records: Vec<TransitRecord> = accepted.iter().map(|a| a.record.clone()).collect();

    let summary = RunSummary {
        frames: detections.frame_count(),
        detections: detections.detection_count(),
        linked_trajectories: linked.len(),
        after_stub_filter,
        ..Default::default()
    }
    .with_records(&records);

    info!(
        linked = summary.linked_trajectories,
        after_stub_filter = summary.after_stub_filter,
        accepted = summary.accepted,
        mean_rdi = ?summary.mean_rdi,
        "analysis complete"
    );

    Ok(AnalysisOutput {
        linked,
        accepted,
        records,
        summary,
        frame_reports: link_output.reports,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
