//! Linker: the frame-by-frame association of detections into trajectories.
//!
//! # Processing steps per frame
//! 1. Close open trajectories whose memory window has expired
//! 2. Gate every open trajectory against the frame's detections (parallel)
//! 3. Build the sparse bipartite graph from gate-passing pairs
//! 4. Partition into connected components (union-find)
//! 5. Solve each component, relaxing the radius for crowded ones (parallel)
//! 6. Merge results in component order and enforce one-to-one links
//! 7. Extend matched trajectories
//! 8. Birth trajectories for unmatched detections
//!
//! Steps 2 and 5 read the open pool only; trajectories are mutated after the
//! whole frame's assignment is final, so results do not depend on thread
//! scheduling.

use crate::{
    association::{
        partition_components, resolve_conflicts, solve_adaptive, BipartiteGraph, SolveParams,
        SolvedComponent,
    },
    config::LinkerConfig,
    error::{RdiError, Result},
    gating::{gate_detections, index_detections},
    trajectory::{Trajectory, TrajectoryStatus},
    trajectory_manager::TrajectoryManager,
    types::{DetectionSet, Frame},
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What happened in one frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub frame: u64,
    pub detections: usize,
    /// Open trajectories after memory-window closure
    pub open_trajectories: usize,
    /// Gate-passing (trajectory, detection) pairs
    pub candidates: usize,
    pub components: usize,
    pub links: usize,
    pub births: usize,
    pub closures: usize,
    /// Radius shrink steps applied to crowded components
    pub relaxations: usize,
    /// Pairs dropped while enforcing one-to-one links
    pub conflicts: usize,
}

/// Everything the linker produced for a sequence.
#[derive(Clone, Debug, Default)]
pub struct LinkOutput {
    /// All trajectories, closed, in ascending id order
    pub trajectories: Vec<Trajectory>,
    pub reports: Vec<FrameReport>,
}

/// Stateful linker. Frames must be fed in strictly increasing index order.
pub struct Linker {
    config: LinkerConfig,
    manager: TrajectoryManager,
    /// Linkable trajectories, ascending id
    open: Vec<Trajectory>,
    closed: Vec<Trajectory>,
    last_frame: Option<u64>,
    reports: Vec<FrameReport>,
}

impl Linker {
    pub fn new(config: LinkerConfig) -> Result<Self> {
        config.validate()?;
        let manager = TrajectoryManager::new(config.memory);
        Ok(Self {
            config,
            manager,
            open: Vec::new(),
            closed: Vec::new(),
            last_frame: None,
            reports: Vec::new(),
        })
    }

    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    /// Trajectories that may still be extended.
    pub fn open_trajectories(&self) -> &[Trajectory] {
        &self.open
    }

    pub fn reports(&self) -> &[FrameReport] {
        &self.reports
    }

    /// Process one frame. The frame is validated first; a rejected frame
    /// leaves the linker unchanged.
    pub fn process_frame(&mut self, frame: &Frame) -> Result<FrameReport> {
        frame.validate()?;
        if let Some(previous) = self.last_frame {
            if frame.index <= previous {
                return Err(RdiError::NonMonotonicFrame {
                    frame: frame.index,
                    previous,
                });
            }
        }
        self.last_frame = Some(frame.index);

        let mut report = FrameReport {
            frame: frame.index,
            detections: frame.detections.len(),
            ..Default::default()
        };

        // ----------------------------------------------------------------
        // Step 1: memory-window closure
        // ----------------------------------------------------------------
        for trajectory in &mut self.open {
            if self.manager.register_miss(trajectory, frame.index) {
                report.closures += 1;
            }
        }
        TrajectoryManager::prune_closed(&mut self.open, &mut self.closed);
        report.open_trajectories = self.open.len();

        if frame.detections.is_empty() {
            debug!(frame = frame.index, closures = report.closures, "empty frame");
            self.reports.push(report.clone());
            return Ok(report);
        }

        // ----------------------------------------------------------------
        // Step 2-3: gating + bipartite graph
        // ----------------------------------------------------------------
        let radius = self.config.max_link_distance;
        let detections = &frame.detections;
        let grid = index_detections(detections, radius);

        let gated: Vec<Vec<(usize, f64)>> = self
            .open
            .par_iter()
            .map(|t| gate_detections(&grid, detections, &t.position(), radius))
            .collect();

        let mut graph = BipartiteGraph::new(self.open.len(), detections.len());
        for (ti, hits) in gated.into_iter().enumerate() {
            for (mi, d2) in hits {
                graph.add_edge(ti, mi, d2);
            }
        }
        report.candidates = graph.edges.len();

        // ----------------------------------------------------------------
        // Step 4-5: partition + solve per component
        // ----------------------------------------------------------------
        let components = partition_components(&graph);
        report.components = components.len();

        let params = SolveParams {
            strategy: self.config.assignment,
            subnet_size_limit: self.config.subnet_size_limit,
            adaptive_stop: self.config.adaptive_stop,
            adaptive_step: self.config.adaptive_step,
        };
        let solved: Vec<SolvedComponent> = components
            .par_iter()
            .map(|comp| solve_adaptive(comp, radius, &params))
            .collect();

        // ----------------------------------------------------------------
        // Step 6: merge in component order
        // ----------------------------------------------------------------
        let mut pairs = Vec::new();
        for s in solved {
            report.relaxations += s.relaxations;
            pairs.extend(s.assignment.pairs);
        }
        let (pairs, rejected) = resolve_conflicts(pairs);
        report.conflicts = rejected.len();

        // ----------------------------------------------------------------
        // Step 7: extend matched trajectories
        // ----------------------------------------------------------------
        let mut matched = vec![false; detections.len()];
        for pair in &pairs {
            self.manager
                .register_hit(&mut self.open[pair.track_idx], detections[pair.meas_idx].clone());
            matched[pair.meas_idx] = true;
        }
        report.links = pairs.len();

        // ----------------------------------------------------------------
        // Step 8: births, in detection order
        // ----------------------------------------------------------------
        for (det, _) in detections.iter().zip(&matched).filter(|(_, m)| !**m) {
            let trajectory = self.manager.birth(det.clone());
            self.open.push(trajectory);
            report.births += 1;
        }

        debug!(
            frame = report.frame,
            detections = report.detections,
            links = report.links,
            births = report.births,
            closures = report.closures,
            relaxations = report.relaxations,
            "frame linked"
        );
        self.reports.push(report.clone());
        Ok(report)
    }

    /// End the sequence: close every trajectory and hand them over in id order.
    pub fn finish(mut self) -> LinkOutput {
        for trajectory in &mut self.open {
            trajectory.status = TrajectoryStatus::Closed;
        }
        let mut trajectories = self.closed;
        trajectories.append(&mut self.open);
        trajectories.sort_by_key(|t| t.id);
        LinkOutput {
            trajectories,
            reports: self.reports,
        }
    }
}

/// Link a whole detection set.
pub fn link(detections: &DetectionSet, config: &LinkerConfig) -> Result<LinkOutput> {
    let mut linker = Linker::new(config.clone())?;
    for frame in detections.frames() {
        linker.process_frame(frame)?;
    }
    let output = linker.finish();
    info!(
        frames = detections.frame_count(),
        detections = detections.detection_count(),
        trajectories = output.trajectories.len(),
        "linking complete"
    );
    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
