//! `flow_sim`: synthetic channel flow with cell motion, a detector model and detection logs.

pub mod cell;
pub mod detector;
pub mod log;
pub mod scenarios;

pub use cell::{FlowCell, FlowMotion};
pub use detector::{DetectorParams, DetectorSimulator};
pub use log::{load_log, save_log, DetectionLog};
pub use scenarios::{GroundTruthFrame, Scenario, ScenarioKind, SimulationRun};
