//! `rdi_core`: linking blob detections of cells flowing through a narrow
//! channel into trajectories, and measuring their transit (RDI).
//!
//! # Module layout
//! - [`types`]              : Identifiers, detections, validated detection sets
//! - [`error`]              : Input-contract and configuration errors
//! - [`config`]             : Analysis and linker parameters
//! - [`trajectory`]         : Trajectory struct and status
//! - [`gating`]             : Search-radius gating over a spatial grid
//! - [`association`]        : Bipartite graph, components, Hungarian / greedy, adaptive relaxation
//! - [`trajectory_manager`] : Birth / extension / memory-window closure
//! - [`linker`]             : Frame-by-frame linking orchestrator
//! - [`filter`]             : Stub filter
//! - [`metrics`]            : Plausibility window, distance / time / RDI, run summary
//! - [`renumber`]           : Dense presentational ids
//! - [`pipeline`]           : End-to-end analysis and result tables
//! - [`sink`]               : Result sink interface

pub mod association;
pub mod config;
pub mod error;
pub mod filter;
pub mod gating;
pub mod linker;
pub mod metrics;
pub mod pipeline;
pub mod renumber;
pub mod sink;
pub mod trajectory;
pub mod trajectory_manager;
pub mod types;

pub use config::{AnalysisConfig, AssignmentStrategy, LinkerConfig};
pub use error::{RdiError, Result};
pub use linker::{link, FrameReport, LinkOutput, Linker};
pub use metrics::{RunSummary, TransitRecord};
pub use pipeline::{analyze, AnalysisOutput, TrajectoryRow};
pub use renumber::AcceptedTrajectory;
pub use sink::{sheet_label, MemorySink, ResultSink};
pub use trajectory::{Trajectory, TrajectoryStatus};
pub use types::{Detection, DetectionSet, Frame, Position, TrajectoryId};
