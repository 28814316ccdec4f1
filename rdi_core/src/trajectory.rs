//! Trajectory: ordered detections of one cell, plus lifecycle status.

use crate::types::{Detection, Position, TrajectoryId};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a trajectory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrajectoryStatus {
    /// May still be extended by the linker
    Open,
    /// Unmatched for longer than the memory window, or the sequence ended
    Closed,
}

/// Detections believed to belong to one physical cell, in frame order.
///
/// Never empty: a trajectory is born from its first detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub id: TrajectoryId,
    pub status: TrajectoryStatus,
    detections: Vec<Detection>,
}

impl Trajectory {
    pub fn new(id: TrajectoryId, first: Detection) -> Self {
        Self {
            id,
            status: TrajectoryStatus::Open,
            detections: vec![first],
        }
    }

    /// Append a detection from a later frame.
    pub(crate) fn push(&mut self, det: Detection) {
        debug_assert!(det.frame > self.end_frame(), "frames must strictly increase");
        self.detections.push(det);
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    /// Number of member detections (frames observed).
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn first(&self) -> &Detection {
        &self.detections[0]
    }

    pub fn last(&self) -> &Detection {
        &self.detections[self.detections.len() - 1]
    }

    pub fn start_frame(&self) -> u64 {
        self.first().frame
    }

    pub fn end_frame(&self) -> u64 {
        self.last().frame
    }

    /// Frames elapsed between first and last member.
    pub fn frame_span(&self) -> u64 {
        self.end_frame() - self.start_frame()
    }

    /// Last known position (used for gating).
    pub fn position(&self) -> Position {
        self.last().position()
    }

    /// First-to-last displacement in pixels. Path length is ignored.
    pub fn net_displacement(&self) -> Position {
        self.last().position() - self.first().position()
    }

    pub fn mean_mass(&self) -> f64 {
        self.detections.iter().map(|d| d.mass).sum::<f64>() / self.detections.len() as f64
    }

    /// Largest frame gap between consecutive members.
    pub fn max_gap(&self) -> u64 {
        self.detections
            .windows(2)
            .map(|w| w[1].frame - w[0].frame)
            .max()
            .unwrap_or(0)
    }

    pub fn is_open(&self) -> bool {
        self.status == TrajectoryStatus::Open
    }
}
