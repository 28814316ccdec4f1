//! Trajectory lifecycle management: birth, extension, memory-window closure.
//!
//! # Policy
//! - **Birth**: each detection left unmatched in a frame starts a trajectory.
//! - **Extension**: a matched detection is appended; trajectories never split.
//! - **Closure**: a trajectory last extended at frame `f` stays linkable up to
//!   frame `f + memory + 1`. Past that it is closed and leaves the open pool,
//!   but it is kept for output.

use crate::{
    trajectory::{Trajectory, TrajectoryStatus},
    types::{Detection, TrajectoryId},
};

/// Owns identifier allocation and the memory window.
#[derive(Clone, Debug)]
pub struct TrajectoryManager {
    memory: u64,
    next_id: u64,
}

impl TrajectoryManager {
    pub fn new(memory: u64) -> Self {
        Self { memory, next_id: 0 }
    }

    pub fn memory(&self) -> u64 {
        self.memory
    }

    fn next_trajectory_id(&mut self) -> TrajectoryId {
        let id = TrajectoryId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Start a new open trajectory from an unmatched detection.
    pub fn birth(&mut self, det: Detection) -> Trajectory {
        let id = self.next_trajectory_id();
        Trajectory::new(id, det)
    }

    /// Extend a trajectory with the detection it was matched to.
    pub fn register_hit(&self, trajectory: &mut Trajectory, det: Detection) {
        trajectory.push(det);
    }

    /// True if `trajectory` may still accept a detection from `frame`.
    pub fn is_linkable(&self, trajectory: &Trajectory, frame: u64) -> bool {
        let elapsed = frame.saturating_sub(trajectory.end_frame());
        trajectory.is_open() && elapsed <= self.memory.saturating_add(1)
    }

    /// Close `trajectory` if it can no longer be extended at `frame`.
    /// Returns true when it was closed by this call.
    pub fn register_miss(&self, trajectory: &mut Trajectory, frame: u64) -> bool {
        if trajectory.is_open() && !self.is_linkable(trajectory, frame) {
            trajectory.status = TrajectoryStatus::Closed;
            return true;
        }
        false
    }

    /// Move closed trajectories from `open` to `closed`, preserving order.
    /// Returns the number moved.
    pub fn prune_closed(open: &mut Vec<Trajectory>, closed: &mut Vec<Trajectory>) -> usize {
        let before = open.len();
        let (still_open, done): (Vec<_>, Vec<_>) =
            std::mem::take(open).into_iter().partition(|t| t.is_open());
        *open = still_open;
        closed.extend(done);
        before - open.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
