//! Controller <-> allocator channel protocol and link-visible mission events

use crate::types::{Chromosome, Roster, TaskRef, VehicleId};
use serde::{Deserialize, Serialize};

/// Commands sent from the mission controller to its allocator worker.
///
/// Exactly one writer (the controller) and one reader (the worker). The
/// worker treats `Shutdown` as the sole cancellation signal and observes it
/// only between search slices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AllocatorCommand {
    /// Fresh merged roster; the next search slice reseeds against it
    Roster(Roster),

    /// Terminate the worker loop after the in-flight slice completes
    Shutdown,
}

/// Best-so-far result published by the allocator after each search slice.
///
/// The controller drains its channel fully every tick and keeps only the last
/// candidate, so publishing is never throttled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub fitness: f64,
    pub solution: Chromosome,
}

/// Textual mission event reported over the link to the ground station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MissionEvent {
    /// A target pass was completed and moved to the terminated set
    TaskComplete { vehicle: VehicleId, task: TaskRef },

    /// An unknown target entered sensing range and joined the target set
    TargetDiscovered { vehicle: VehicleId, position: [f64; 2] },

    /// The final base waypoint was reached with no tasks outstanding
    MissionComplete { vehicle: VehicleId },
}

/// Timestamped mission event as delivered to the ground-station sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundEvent {
    /// Mission clock when the event was raised, seconds
    pub at: f64,
    pub event: MissionEvent,
}
