//! Recording flight stack for tests and dry runs

use super::{FlightMode, FlightStack};
use shared::types::Pose;

/// Flight stack that records the last command of each kind instead of flying
#[derive(Debug, Default)]
pub struct RecordingFlightStack {
    pub pose: Pose,
    pub altitude: f64,
    pub last_goto: Option<([f64; 3], f64)>,
    pub last_mode: Option<FlightMode>,
    pub last_velocity: Option<(f64, f64, f64)>,
}

impl FlightStack for RecordingFlightStack {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn altitude(&self) -> f64 {
        self.altitude
    }

    fn goto(&mut self, point: [f64; 3], heading: f64) {
        self.last_goto = Some((point, heading));
    }

    fn set_mode(&mut self, mode: FlightMode) {
        self.last_mode = Some(mode);
    }

    fn command_velocity(&mut self, forward: f64, yaw_rate: f64, vertical: f64) {
        self.last_velocity = Some((forward, yaw_rate, vertical));
    }
}
