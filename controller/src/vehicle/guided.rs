//! Guided-waypoint adapter for fixed-wing vehicles on a flight stack
//!
//! Streams the look-ahead point as a guided goto each tick; a hold request
//! drops the stack into loiter instead of stopping (a fixed-wing cannot).

use super::{FlightMode, FlightStack, VehicleAdapter};
use crate::path::follower::Lookahead;
use shared::types::Pose;

pub struct GuidedVehicle<F: FlightStack> {
    stack: F,
    /// Commanded flight altitude, meters
    altitude: f64,
}

impl<F: FlightStack> GuidedVehicle<F> {
    pub fn new(stack: F, altitude: f64) -> Self {
        Self { stack, altitude }
    }

    pub fn stack(&self) -> &F {
        &self.stack
    }
}

impl<F: FlightStack> VehicleAdapter for GuidedVehicle<F> {
    fn pose(&self) -> Pose {
        self.stack.pose()
    }

    fn advance(&mut self, lookahead: &Lookahead, speed_target: f64, _dt: f64) {
        if speed_target <= 0.0 {
            self.stack.set_mode(FlightMode::Loiter);
            return;
        }
        self.stack.goto(
            [lookahead.point[0], lookahead.point[1], self.altitude],
            lookahead.heading,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::RecordingFlightStack;

    fn lookahead() -> Lookahead {
        Lookahead {
            point: [50.0, 20.0],
            heading: 0.4,
            nearest_index: 3,
            cross_track: 1.0,
            exhausted: false,
        }
    }

    #[test]
    fn tracking_streams_goto_commands() {
        let mut vehicle = GuidedVehicle::new(RecordingFlightStack::default(), 15.0);
        vehicle.advance(&lookahead(), 10.0, 0.1);
        let stack = vehicle.stack();
        assert_eq!(stack.last_goto, Some(([50.0, 20.0, 15.0], 0.4)));
        assert!(stack.last_mode.is_none());
    }

    #[test]
    fn hold_switches_to_loiter() {
        let mut vehicle = GuidedVehicle::new(RecordingFlightStack::default(), 15.0);
        vehicle.advance(&lookahead(), 0.0, 0.1);
        let stack = vehicle.stack();
        assert_eq!(stack.last_mode, Some(FlightMode::Loiter));
        assert!(stack.last_goto.is_none());
    }
}
