//! Detection logs: the on-disk form of a detection set, as produced by a
//! blob extractor or by [`Scenario::run`](crate::scenarios::Scenario::run).

use crate::scenarios::{GroundTruthFrame, Scenario, SimulationRun};
use anyhow::Context;
use rdi_core::types::DetectionSet;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// A recorded detection set plus optional acquisition metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetectionLog {
    /// Scenario name or source video
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Frame width along the flow axis; overrides the configured channel width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_width_px: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixels_per_micron: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames_per_second: Option<f64>,
    /// Validated on load
    pub detections: DetectionSet,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ground_truth: Vec<GroundTruthFrame>,
}

impl DetectionLog {
    pub fn from_run(scenario: &Scenario, run: SimulationRun) -> Self {
        Self {
            source: scenario.name.clone(),
            seed: Some(scenario.seed),
            channel_width_px: Some(scenario.detector.frame_width),
            pixels_per_micron: Some(scenario.pixels_per_micron),
            frames_per_second: Some(scenario.frames_per_second),
            detections: run.detections,
            ground_truth: run.ground_truth,
        }
    }
}

/// Save a detection log to a JSON file.
pub fn save_log(log: &DetectionLog, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, log)?;
    Ok(())
}

/// Load a detection log from a JSON file. Malformed detection sets
/// (non-increasing frames, negative mass, ...) are rejected here.
pub fn load_log(path: &Path) -> anyhow::Result<DetectionLog> {
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);
    let log: DetectionLog = serde_json::from_reader(reader)
        .with_context(|| format!("parsing detection log {}", path.display()))?;
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::ScenarioKind;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("flow_sim_{}_{name}", std::process::id()))
    }

    #[test]
    fn save_then_load_keeps_detections() {
        let scenario = Scenario::build(ScenarioKind::Dropout, 5);
        let log = DetectionLog::from_run(&scenario, scenario.run().unwrap());
        let path = temp_path("dropout.json");
        save_log(&log, &path).unwrap();
        let loaded = load_log(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.source, "dropout");
        assert_eq!(loaded.seed, Some(5));
        assert_eq!(loaded.detections, log.detections);
        assert_eq!(loaded.ground_truth.len(), log.ground_truth.len());
    }

    #[test]
    fn minimal_log_needs_only_detections() {
        let json = r#"{"detections": {"frames": [
            {"index": 0, "detections": [{"frame": 0, "x": 1.0, "y": 2.0, "mass": 255.0}]}
        ]}}"#;
        let log: DetectionLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.source, "");
        assert_eq!(log.channel_width_px, None);
        assert_eq!(log.detections.detection_count(), 1);
    }

    #[test]
    fn invalid_detections_fail_to_load() {
        let path = temp_path("bad.json");
        let json = r#"{"detections": {"frames": [
            {"index": 3, "detections": []},
            {"index": 1, "detections": []}
        ]}}"#;
        std::fs::write(&path, json).unwrap();
        let err = load_log(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(format!("{err:#}").contains("frame"));
    }
}
