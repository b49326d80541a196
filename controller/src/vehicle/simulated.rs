//! Simulated vehicle: PD steering over the unicycle-with-lag model

use super::{model, VehicleAdapter};
use crate::path::follower::{Lookahead, PdSteering};
use shared::types::Pose;

/// Pure-software vehicle integrating the kinematic model each tick
pub struct SimulatedVehicle {
    pose: Pose,
    cruise_speed: f64,
    min_turn_radius: f64,
    steering: PdSteering,
}

impl SimulatedVehicle {
    pub fn new(initial: Pose, cruise_speed: f64, min_turn_radius: f64) -> Self {
        Self {
            pose: initial,
            cruise_speed,
            min_turn_radius,
            steering: PdSteering::default(),
        }
    }

    fn omega_max(&self) -> f64 {
        self.cruise_speed / self.min_turn_radius
    }
}

impl VehicleAdapter for SimulatedVehicle {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn advance(&mut self, lookahead: &Lookahead, speed_target: f64, dt: f64) {
        let (v_cmd, yaw_cmd) = if speed_target <= 0.0 {
            (0.0, 0.0)
        } else {
            let yaw = self
                .steering
                .yaw_command(&self.pose, lookahead.point, self.omega_max());
            (speed_target, yaw)
        };
        model::step(&mut self.pose, v_cmd, yaw_cmd, dt);
    }
}
