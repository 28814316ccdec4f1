//! Analysis configuration: channel geometry, acquisition parameters and
//! linker tuning. Every field has a default matching the reference setup
//! (25 fps, 250 px per 200 µm, memory 1, adaptive step 0.95 down to 1 px).

use crate::error::{RdiError, Result};
use serde::{Deserialize, Serialize};

/// Reference channel width in pixels used by [`AnalysisConfig::default`].
pub const DEFAULT_CHANNEL_WIDTH_PX: f64 = 250.0;

/// Reference pixel scale (250 px over 200 µm).
pub const DEFAULT_PIXELS_PER_MICRON: f64 = 250.0 / 200.0;

pub const DEFAULT_FRAMES_PER_SECOND: f64 = 25.0;

/// 8-bit intensity ceiling; mean mass divided by this is an area proxy.
pub const MASS_NORMALIZATION: f64 = 255.0;

/// How each connected group of candidate pairs is resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    /// Hungarian assignment: most links, then least total squared distance.
    #[default]
    Optimal,
    /// Accept pairs by increasing distance, ties by trajectory id then
    /// detection order.
    Greedy,
}

/// Linker parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// Search radius in pixels. A detection exactly at this distance is a candidate.
    pub max_link_distance: f64,
    /// Frames a trajectory may go unmatched and still be extended
    pub memory: u64,
    /// Smallest radius adaptive relaxation may shrink to (pixels)
    pub adaptive_stop: f64,
    /// Radius shrink factor per relaxation step, in (0, 1)
    pub adaptive_step: f64,
    /// Components with more trajectories or detections than this are relaxed
    pub subnet_size_limit: usize,
    pub assignment: AssignmentStrategy,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            max_link_distance: DEFAULT_CHANNEL_WIDTH_PX / 3.0,
            memory: 1,
            adaptive_stop: 1.0,
            adaptive_step: 0.95,
            subnet_size_limit: 30,
            assignment: AssignmentStrategy::Optimal,
        }
    }
}

impl LinkerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.max_link_distance.is_finite() && self.max_link_distance > 0.0) {
            return Err(invalid(format!(
                "max_link_distance must be > 0, got {}",
                self.max_link_distance
            )));
        }
        if !(self.adaptive_stop.is_finite() && self.adaptive_stop > 0.0) {
            return Err(invalid(format!(
                "adaptive_stop must be > 0, got {}",
                self.adaptive_stop
            )));
        }
        if !(self.adaptive_step > 0.0 && self.adaptive_step < 1.0) {
            return Err(invalid(format!(
                "adaptive_step must be in (0, 1), got {}",
                self.adaptive_step
            )));
        }
        if self.subnet_size_limit == 0 {
            return Err(invalid("subnet_size_limit must be >= 1".to_string()));
        }
        Ok(())
    }
}

/// Full analysis configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub pixels_per_micron: f64,
    pub frames_per_second: f64,
    /// Physical width of the measurement region along the flow axis (µm)
    pub channel_width_microns: f64,
    /// Trajectories with fewer detections are stubs
    pub min_trajectory_frames: usize,
    pub mass_normalization: f64,
    pub linker: LinkerConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::for_channel(
            DEFAULT_CHANNEL_WIDTH_PX,
            DEFAULT_PIXELS_PER_MICRON,
            DEFAULT_FRAMES_PER_SECOND,
        )
    }
}

impl AnalysisConfig {
    /// Derive channel width and search radius from the frame width in pixels.
    ///
    /// The search radius is a third of the channel and the channel width in
    /// microns bounds plausible transits.
    pub fn for_channel(
        channel_width_px: f64,
        pixels_per_micron: f64,
        frames_per_second: f64,
    ) -> Self {
        Self {
            pixels_per_micron,
            frames_per_second,
            channel_width_microns: channel_width_px / pixels_per_micron,
            min_trajectory_frames: 3,
            mass_normalization: MASS_NORMALIZATION,
            linker: LinkerConfig {
                max_link_distance: channel_width_px / 3.0,
                ..LinkerConfig::default()
            },
        }
    }

    /// Re-derive the geometry-dependent fields for a new channel width,
    /// keeping the remaining settings.
    pub fn with_channel_width_px(mut self, channel_width_px: f64) -> Self {
        self.channel_width_microns = channel_width_px / self.pixels_per_micron;
        self.linker.max_link_distance = channel_width_px / 3.0;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("pixels_per_micron", self.pixels_per_micron),
            ("frames_per_second", self.frames_per_second),
            ("channel_width_microns", self.channel_width_microns),
            ("mass_normalization", self.mass_normalization),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("{name} must be > 0, got {value}")));
            }
        }
        if self.min_trajectory_frames == 0 {
            return Err(invalid("min_trajectory_frames must be >= 1".to_string()));
        }
        self.linker.validate()
    }
}

fn invalid(msg: String) -> RdiError {
    RdiError::InvalidConfig(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn default_matches_reference_geometry() {
        let cfg = AnalysisConfig::default();
        assert_abs_diff_eq!(cfg.channel_width_microns, 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(cfg.linker.max_link_distance, 250.0 / 3.0, epsilon = 1e-9);
        assert_eq!(cfg.linker.memory, 1);
        assert_eq!(cfg.min_trajectory_frames, 3);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn adaptive_step_must_be_fraction() {
        let mut cfg = AnalysisConfig::default();
        cfg.linker.adaptive_step = 1.0;
        assert!(matches!(cfg.validate(), Err(RdiError::InvalidConfig(_))));
        cfg.linker.adaptive_step = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_scale() {
        let cfg = AnalysisConfig {
            pixels_per_micron: 0.0,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("pixels_per_micron"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{"frames_per_second": 50.0, "linker": {"memory": 3}}"#;
        let cfg: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_abs_diff_eq!(cfg.frames_per_second, 50.0);
        assert_eq!(cfg.linker.memory, 3);
        assert_abs_diff_eq!(cfg.linker.adaptive_step, 0.95);
        assert_eq!(cfg.linker.assignment, AssignmentStrategy::Optimal);
    }

    #[test]
    fn channel_width_rederives_radius() {
        let cfg = AnalysisConfig::default().with_channel_width_px(300.0);
        assert_abs_diff_eq!(cfg.linker.max_link_distance, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(cfg.channel_width_microns, 240.0, epsilon = 1e-9);
    }
}
