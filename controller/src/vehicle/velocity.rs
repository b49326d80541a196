//! Body-frame velocity adapter for rotorcraft on a flight stack
//!
//! PD-steers toward the look-ahead point and issues raw (forward, yaw-rate,
//! climb) setpoints, holding altitude with a proportional vertical channel.

use super::{FlightStack, VehicleAdapter};
use crate::path::follower::{Lookahead, PdSteering};
use shared::types::Pose;

/// Proportional gain on the altitude-hold vertical channel
const ALTITUDE_HOLD_GAIN: f64 = 0.3;

pub struct VelocityBodyVehicle<F: FlightStack> {
    stack: F,
    cruise_speed: f64,
    min_turn_radius: f64,
    /// Altitude to hold, meters
    hold_altitude: f64,
    steering: PdSteering,
}

impl<F: FlightStack> VelocityBodyVehicle<F> {
    pub fn new(stack: F, cruise_speed: f64, min_turn_radius: f64, hold_altitude: f64) -> Self {
        Self {
            stack,
            cruise_speed,
            min_turn_radius,
            hold_altitude,
            steering: PdSteering::default(),
        }
    }

    pub fn stack(&self) -> &F {
        &self.stack
    }

    fn omega_max(&self) -> f64 {
        self.cruise_speed / self.min_turn_radius
    }
}

impl<F: FlightStack> VehicleAdapter for VelocityBodyVehicle<F> {
    fn pose(&self) -> Pose {
        self.stack.pose()
    }

    fn advance(&mut self, lookahead: &Lookahead, speed_target: f64, _dt: f64) {
        let vertical = ALTITUDE_HOLD_GAIN * (self.hold_altitude - self.stack.altitude());
        let (forward, yaw_rate) = if speed_target <= 0.0 {
            (0.0, 0.0)
        } else {
            let pose = self.stack.pose();
            let omega_max = self.omega_max();
            let yaw = self.steering.yaw_command(&pose, lookahead.point, omega_max);
            (speed_target, yaw)
        };
        self.stack.command_velocity(forward, yaw_rate, vertical);
    }
}
