//! Shared types for the SEAD swarm coordination system
//!
//! Contains only the truly shared surface between the mission controller and
//! the task-allocation worker: the data model that crosses the two channels,
//! the gossip packet layout, shared errors, and logging helpers. Everything
//! component-internal (search populations, path samples, adapter state) stays
//! in its own crate.

pub mod errors;
pub mod logging;
pub mod messages;
pub mod types;

pub use errors::*;
pub use types::*;

// Re-export the allocator channel protocol at the crate root
pub use messages::{AllocatorCommand, Candidate, GroundEvent, MissionEvent};
