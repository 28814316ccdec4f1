//! Error types for the linking core.
//!
//! Only input-contract violations and bad configuration are errors. Empty
//! frames, empty results and degenerate trajectories are ordinary outcomes
//! and never surface here.

use thiserror::Error;

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, RdiError>;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum RdiError {
    /// A frame index did not strictly increase over its predecessor.
    #[error("frame {frame}: index does not follow previous frame {previous}")]
    NonMonotonicFrame { frame: u64, previous: u64 },

    /// A detection grouped under `frame` carries a different frame index.
    #[error("frame {frame}, detection {index}: carries frame index {found}")]
    FrameMismatch { frame: u64, index: usize, found: u64 },

    /// `size` or `mass` below zero.
    #[error("frame {frame}, detection {index}: `{field}` is negative ({value})")]
    NegativeField {
        frame: u64,
        index: usize,
        field: &'static str,
        value: f64,
    },

    /// NaN or infinite coordinate / size / mass.
    #[error("frame {frame}, detection {index}: `{field}` is not finite")]
    NonFiniteField {
        frame: u64,
        index: usize,
        field: &'static str,
    },

    /// A configuration parameter is out of its valid range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
