//! Discrete unicycle-with-lag kinematic model
//!
//! Used only by the simulated adapter. Position integrates the current
//! velocity along the heading; velocity and yaw rate relax toward their
//! setpoints through first-order lags, modeling bounded actuator response
//! rather than instantaneous tracking.

use shared::types::{wrap_pi, Pose};

/// First-order lag gain pulling velocity toward its setpoint
pub const VELOCITY_LAG_GAIN: f64 = 2.0;

/// First-order lag gain pulling yaw rate toward its setpoint
pub const YAW_RATE_LAG_GAIN: f64 = 5.0;

/// Integrate one tick of the model over `dt` seconds
pub fn step(pose: &mut Pose, v_cmd: f64, yaw_cmd: f64, dt: f64) {
    pose.x += pose.velocity * pose.heading.cos() * dt;
    pose.y += pose.velocity * pose.heading.sin() * dt;
    pose.heading = wrap_pi(pose.heading + pose.yaw_rate * dt);
    pose.velocity += VELOCITY_LAG_GAIN * (v_cmd - pose.velocity) * dt;
    pose.yaw_rate += YAW_RATE_LAG_GAIN * (yaw_cmd - pose.yaw_rate) * dt;
}
