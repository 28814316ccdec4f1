//! Fundamental types used across the workspace: identifiers, detections and
//! the validated per-frame detection set consumed by the linker.

use crate::error::{RdiError, Result};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 2D image-plane position in pixels.
pub type Position = Vector2<f64>;

// ---------------------------------------------------------------------------
// Identifier types
// ---------------------------------------------------------------------------

/// Trajectory identifier. Unique within one linking run; only the renumbered
/// identifiers of accepted trajectories are dense.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TrajectoryId(pub u64);

impl fmt::Display for TrajectoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// One blob observed in one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Index of the frame the blob was extracted from
    pub frame: u64,
    /// Centroid x in pixels (flow direction)
    pub x: f64,
    /// Centroid y in pixels
    pub y: f64,
    /// Blob size reported by the feature extractor
    #[serde(default)]
    pub size: f64,
    /// Integrated intensity ("mass"), roughly area × 255 for a binary frame
    pub mass: f64,
}

impl Detection {
    pub fn new(frame: u64, x: f64, y: f64, size: f64, mass: f64) -> Self {
        Self {
            frame,
            x,
            y,
            size,
            mass,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Squared Euclidean distance to `p` (pixels²).
    pub fn distance_sq_to(&self, p: &Position) -> f64 {
        (self.position() - p).norm_squared()
    }

    fn validate(&self, frame: u64, index: usize) -> Result<()> {
        let fields = [
            ("x", self.x),
            ("y", self.y),
            ("size", self.size),
            ("mass", self.mass),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(RdiError::NonFiniteField { frame, index, field });
            }
        }
        for (field, value) in [("size", self.size), ("mass", self.mass)] {
            if value < 0.0 {
                return Err(RdiError::NegativeField {
                    frame,
                    index,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Frame / DetectionSet
// ---------------------------------------------------------------------------

/// All detections extracted from one frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub index: u64,
    pub detections: Vec<Detection>,
}

impl Frame {
    pub fn new(index: u64, detections: Vec<Detection>) -> Self {
        Self { index, detections }
    }

    /// A frame with no blobs.
    pub fn empty(index: u64) -> Self {
        Self {
            index,
            detections: Vec::new(),
        }
    }

    /// Every detection carries this frame's index and finite, non-negative fields.
    pub(crate) fn validate(&self) -> Result<()> {
        for (i, det) in self.detections.iter().enumerate() {
            if det.frame != self.index {
                return Err(RdiError::FrameMismatch {
                    frame: self.index,
                    index: i,
                    found: det.frame,
                });
            }
            det.validate(self.index, i)?;
        }
        Ok(())
    }
}

/// A validated, frame-ordered sequence of detections.
///
/// Frame indices strictly increase; missing indices are treated as frames
/// with no detections by the linker.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DetectionSet {
    frames: Vec<Frame>,
}

impl DetectionSet {
    /// Validate and wrap a sequence of frames.
    pub fn from_frames(frames: Vec<Frame>) -> Result<Self> {
        let mut previous: Option<u64> = None;
        for frame in &frames {
            if let Some(prev) = previous {
                if frame.index <= prev {
                    return Err(RdiError::NonMonotonicFrame {
                        frame: frame.index,
                        previous: prev,
                    });
                }
            }
            frame.validate()?;
            previous = Some(frame.index);
        }
        Ok(Self { frames })
    }

    /// Group a flat, frame-ordered list of detections into frames.
    ///
    /// Consecutive detections sharing a frame index form one frame; a frame
    /// index lower than its predecessor is rejected.
    pub fn from_detections(detections: Vec<Detection>) -> Result<Self> {
        let mut frames: Vec<Frame> = Vec::new();
        for det in detections {
            match frames.last_mut() {
                Some(last) if last.index == det.frame => last.detections.push(det),
                Some(last) if det.frame < last.index => {
                    return Err(RdiError::NonMonotonicFrame {
                        frame: det.frame,
                        previous: last.index,
                    });
                }
                _ => frames.push(Frame::new(det.frame, vec![det])),
            }
        }
        Self::from_frames(frames)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn detection_count(&self) -> usize {
        self.frames.iter().map(|f| f.detections.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Iterate over every detection in frame order.
    pub fn detections(&self) -> impl Iterator<Item = &Detection> {
        self.frames.iter().flat_map(|f| f.detections.iter())
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl<'de> Deserialize<'de> for DetectionSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            frames: Vec<Frame>,
        }
        let raw = Raw::deserialize(deserializer)?;
        DetectionSet::from_frames(raw.frames).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
