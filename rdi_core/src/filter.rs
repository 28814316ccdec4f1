//! Stub filter: drops trajectories observed in too few frames.

use crate::trajectory::Trajectory;

pub fn is_stub(trajectory: &Trajectory, min_frames: usize) -> bool {
    trajectory.len() < min_frames
}

/// Keep trajectories with at least `min_frames` detections, in input order.
pub fn filter_stubs(trajectories: Vec<Trajectory>, min_frames: usize) -> Vec<Trajectory> {
    trajectories
        .into_iter()
        .filter(|t| !is_stub(t, min_frames))
        .collect()
}
