//! Per-vehicle mission controller for the SEAD swarm
//!
//! One `MissionController` runs on every vehicle. Each tick it drains its
//! allocator worker, gossips its own state packet, merges peer packets into a
//! deterministic consensus election, and flies the elected plan through a
//! turning-radius-feasible path and a pluggable vehicle adapter.

pub mod config;
pub mod consensus;
pub mod controller;
pub mod error;
pub mod path;
pub mod services;
pub mod traits;
pub mod vehicle;

pub use config::{Scenario, VehicleInstance};
pub use controller::{MissionController, VehicleSpec};
pub use error::{ControllerError, ControllerResult};
