//! Cell motion models and per-frame state propagation.
//!
//! Each cell has a planar true state [px, py, vx, vy] in pixels and pixels per
//! frame, and a `FlowMotion` describing how it moves through the channel.

use serde::{Deserialize, Serialize};

/// How a cell moves between frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FlowMotion {
    /// Constant velocity along the channel.
    Uniform,
    /// Velocity scaled by `factor` each frame, never below `min_speed`
    /// (cells deforming through a constriction).
    Decelerating { factor: f64, min_speed: f64 },
    /// Lateral oscillation of `amplitude` pixels with `period` frames on top
    /// of the axial drift.
    Wobble { amplitude: f64, period: f64 },
}

/// A simulated cell with ground-truth state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowCell {
    pub id: u64,
    /// True state [px, py, vx, vy]
    pub state: [f64; 4],
    pub motion: FlowMotion,
    /// First frame the cell is in the channel
    pub entry_frame: u64,
    /// Projected area in pixels
    pub size: f64,
    /// Integrated intensity
    pub mass: f64,
    /// Lateral rest position for `Wobble`
    lane: f64,
    age: u64,
}

impl FlowCell {
    pub fn new(id: u64, entry_frame: u64, position: [f64; 2], velocity: [f64; 2]) -> Self {
        Self {
            id,
            state: [position[0], position[1], velocity[0], velocity[1]],
            motion: FlowMotion::Uniform,
            entry_frame,
            size: 12.0,
            mass: 12.0 * 255.0,
            lane: position[1],
            age: 0,
        }
    }

    pub fn with_motion(mut self, motion: FlowMotion) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_appearance(mut self, size: f64, mass: f64) -> Self {
        self.size = size;
        self.mass = mass;
        self
    }

    /// Advance by one frame. No-op before `frame` reaches `entry_frame`.
    pub fn step(&mut self, frame: u64) {
        if frame < self.entry_frame {
            return;
        }
        self.age += 1;
        let s = &mut self.state;
        match self.motion {
            FlowMotion::Uniform => {
                s[0] += s[2];
                s[1] += s[3];
            }
            FlowMotion::Decelerating { factor, min_speed } => {
                s[0] += s[2];
                s[1] += s[3];
                let speed = (s[2] * factor).max(min_speed);
                s[2] = speed;
            }
            FlowMotion::Wobble { amplitude, period } => {
                s[0] += s[2];
                let phase = std::f64::consts::TAU * self.age as f64 / period;
                s[1] = self.lane + amplitude * phase.sin();
            }
        }
    }

    /// True while the cell has entered and is still left of `channel_width`.
    pub fn is_active(&self, frame: u64, channel_width: f64) -> bool {
        frame >= self.entry_frame && self.state[0] >= 0.0 && self.state[0] < channel_width
    }

    pub fn pos_2d(&self) -> (f64, f64) {
        (self.state[0], self.state[1])
    }

    /// Axial speed in pixels per frame.
    pub fn axial_speed(&self) -> f64 {
        self.state[2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn waits_for_entry_frame() {
        let mut c = FlowCell::new(0, 5, [3.0, 40.0], [20.0, 0.0]);
        assert!(!c.is_active(4, 250.0));
        c.step(4);
        assert_eq!(c.pos_2d(), (3.0, 40.0));
        assert!(c.is_active(5, 250.0));
        c.step(5);
        assert_eq!(c.pos_2d(), (23.0, 40.0));
    }

    #[test]
    fn leaves_channel() {
        let mut c = FlowCell::new(0, 0, [240.0, 0.0], [20.0, 0.0]);
        assert!(c.is_active(0, 250.0));
        c.step(0);
        assert!(!c.is_active(1, 250.0));
    }

    #[test]
    fn deceleration_floors_at_min_speed() {
        let mut c = FlowCell::new(0, 0, [0.0, 0.0], [20.0, 0.0]).with_motion(
            FlowMotion::Decelerating {
                factor: 0.5,
                min_speed: 8.0,
            },
        );
        c.step(0);
        assert_abs_diff_eq!(c.axial_speed(), 10.0);
        c.step(1);
        assert_abs_diff_eq!(c.axial_speed(), 8.0);
        assert_abs_diff_eq!(c.state[0], 30.0);
    }

    #[test]
    fn wobble_stays_around_lane() {
        let mut c = FlowCell::new(0, 0, [0.0, 100.0], [15.0, 0.0]).with_motion(
            FlowMotion::Wobble {
                amplitude: 4.0,
                period: 8.0,
            },
        );
        for f in 0..16 {
            c.step(f);
            assert!((c.state[1] - 100.0).abs() <= 4.0 + 1e-12);
        }
        assert_abs_diff_eq!(c.state[0], 240.0);
    }
}
