//! Dense, zero-based renumbering of the accepted trajectory set.
//!
//! The new identifiers follow first appearance (start frame, then linker id)
//! and are presentational only: they change with the input and parameters.

use crate::{metrics::TransitRecord, trajectory::Trajectory, types::TrajectoryId};
use serde::{Deserialize, Serialize};

/// An accepted trajectory with its presentational id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AcceptedTrajectory {
    /// Dense id in `[0, N)`
    pub id: TrajectoryId,
    /// Id assigned by the linker
    pub linker_id: TrajectoryId,
    /// Trajectory with `id` applied
    pub trajectory: Trajectory,
    /// Metric row with `trajectory_id` set to `id`
    pub record: TransitRecord,
}

/// Assign ids `0..N` ordered by (start frame, linker id).
pub fn renumber(accepted: Vec<(Trajectory, TransitRecord)>) -> Vec<AcceptedTrajectory> {
    let mut accepted = accepted;
    accepted.sort_by_key(|(t, _)| (t.start_frame(), t.id));
    accepted
        .into_iter()
        .enumerate()
        .map(|(i, (mut trajectory, mut record))| {
            let id = TrajectoryId(i as u64);
            let linker_id = trajectory.id;
            trajectory.id = id;
            record.trajectory_id = id;
            AcceptedTrajectory {
                id,
                linker_id,
                trajectory,
                record,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Detection;

    fn accepted(linker_id: u64, start: u64) -> (Trajectory, TransitRecord) {
        let t = Trajectory::new(
            TrajectoryId(linker_id),
            Detection::new(start, 0.0, 0.0, 0.0, 0.0),
        );
        let record = TransitRecord {
            trajectory_id: TrajectoryId(linker_id),
            start_frame: start,
            end_frame: start + 5,
            distance: 100.0,
            time: 0.2,
            rdi: 500.0,
            size: 1.0,
        };
        (t, record)
    }

    #[test]
    fn ids_follow_first_appearance() {
        let out = renumber(vec![accepted(9, 30), accepted(4, 10), accepted(2, 30), accepted(7, 0)]);
        let ids: Vec<u64> = out.iter().map(|a| a.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        let linker: Vec<u64> = out.iter().map(|a| a.linker_id.0).collect();
        assert_eq!(linker, vec![7, 4, 2, 9], "ties on start frame broken by linker id");
        for a in &out {
            assert_eq!(a.trajectory.id, a.id);
            assert_eq!(a.record.trajectory_id, a.id);
        }
    }

    #[test]
    fn input_order_does_not_matter() {
        let a = renumber(vec![accepted(1, 5), accepted(3, 2), accepted(0, 9)]);
        let b = renumber(vec![accepted(0, 9), accepted(1, 5), accepted(3, 2)]);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_set() {
        assert!(renumber(Vec::new()).is_empty());
    }
}
