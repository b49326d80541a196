//! Vehicle adapters: one polymorphic actuation seam for three vehicle kinds
//!
//! The controller runs the same tick state machine for every vehicle class;
//! only the final actuation differs. Each adapter consumes the look-ahead
//! sample and a speed target and issues its own flavor of commands. A
//! non-positive speed target means hold: stop dead (simulated, velocity-body)
//! or loiter (guided).

pub mod guided;
pub mod model;
pub mod simulated;
pub mod stub;
pub mod velocity;

pub use guided::GuidedVehicle;
pub use simulated::SimulatedVehicle;
pub use stub::RecordingFlightStack;
pub use velocity::VelocityBodyVehicle;

use crate::path::follower::Lookahead;
use shared::types::Pose;

/// Actuation capability bound to exactly one vehicle
pub trait VehicleAdapter: Send {
    /// Current planar pose as the controller should see it
    fn pose(&self) -> Pose;

    /// Consume one look-ahead sample and drive toward it for `dt` seconds.
    /// `speed_target <= 0.0` requests a hold.
    fn advance(&mut self, lookahead: &Lookahead, speed_target: f64, dt: f64);
}

/// Flight-stack modes the guided adapter switches between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightMode {
    Guided,
    Loiter,
}

/// Interface to an external flight stack. Low-level actuation specifics stay
/// behind this seam; the adapters only issue guided waypoints or body-frame
/// velocity setpoints and read the pose estimate back.
pub trait FlightStack: Send {
    fn pose(&self) -> Pose;
    fn altitude(&self) -> f64;
    /// Fly to a 3D point `[x, y, z]`, arriving on `heading`
    fn goto(&mut self, point: [f64; 3], heading: f64);
    fn set_mode(&mut self, mode: FlightMode);
    /// Body-frame velocity setpoint: forward speed, yaw rate, climb rate
    fn command_velocity(&mut self, forward: f64, yaw_rate: f64, vertical: f64);
}
