//! Windowed look-ahead path following and PD steering
//!
//! The look-ahead window performs a monotonic nearest-point search: the
//! window index never regresses, so loops in the path cannot pull the vehicle
//! backwards. Replacing the path resets the index to the start.

use shared::types::{wrap_pi, Pose};

/// Samples ahead of the nearest point used as the tracking target. Path
/// samples are spaced at cruise_speed / 10, so this is roughly one second of
/// flight regardless of vehicle speed.
const LOOKAHEAD_SAMPLES: usize = 10;

/// Width of the forward search window, in samples
const WINDOW_SAMPLES: usize = 40;

/// Result of one look-ahead query against the current path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lookahead {
    /// Point to steer toward
    pub point: [f64; 2],
    /// Path heading at the look-ahead point
    pub heading: f64,
    /// Nearest path sample to the vehicle (monotonic)
    pub nearest_index: usize,
    /// Cross-track distance from the vehicle to the nearest sample
    pub cross_track: f64,
    /// True once the nearest point has reached the final sample
    pub exhausted: bool,
}

/// Monotonic sliding window over the active path
#[derive(Debug, Default)]
pub struct LookaheadWindow {
    index: usize,
}

impl LookaheadWindow {
    pub fn new() -> Self {
        Self { index: 0 }
    }

    /// Reset to the path start; called whenever the path is replaced
    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Find the nearest path sample within the forward window and return the
    /// look-ahead target. `path` must be non-empty.
    pub fn advance(&mut self, path: &[[f64; 3]], pose: &Pose) -> Lookahead {
        let last = path.len() - 1;
        let window_end = (self.index + WINDOW_SAMPLES).min(last);

        let mut nearest = self.index;
        let mut nearest_dist = f64::INFINITY;
        for (i, sample) in path
            .iter()
            .enumerate()
            .take(window_end + 1)
            .skip(self.index)
        {
            let d = pose.distance_to([sample[0], sample[1]]);
            if d < nearest_dist {
                nearest_dist = d;
                nearest = i;
            }
        }
        // Never regress
        self.index = self.index.max(nearest);

        let target = (nearest + LOOKAHEAD_SAMPLES).min(last);
        Lookahead {
            point: [path[target][0], path[target][1]],
            heading: path[target][2],
            nearest_index: nearest,
            cross_track: nearest_dist,
            exhausted: nearest == last,
        }
    }
}

/// PD steering toward a look-ahead point, on wrapped heading error
#[derive(Debug)]
pub struct PdSteering {
    kp: f64,
    kd: f64,
    previous_error: Option<f64>,
}

impl Default for PdSteering {
    fn default() -> Self {
        // Gains carried over from the flight-tested tuning
        Self::new(3.0, 7.0)
    }
}

impl PdSteering {
    pub fn new(kp: f64, kd: f64) -> Self {
        Self {
            kp,
            kd,
            previous_error: None,
        }
    }

    /// Yaw-rate command steering `pose` toward `point`, clamped to the
    /// vehicle's maximum turn rate `omega_max`
    pub fn yaw_command(&mut self, pose: &Pose, point: [f64; 2], omega_max: f64) -> f64 {
        let desired = (point[1] - pose.y).atan2(point[0] - pose.x);
        let error = wrap_pi(desired - pose.heading);
        let derivative = match self.previous_error {
            Some(previous) => error - previous,
            None => 0.0,
        };
        self.previous_error = Some(error);
        (self.kp * error + self.kd * derivative).clamp(-omega_max, omega_max)
    }
}
