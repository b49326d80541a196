//! Path synthesis: elected assignment -> flyable sample sequence
//!
//! Filters the elected chromosome down to this vehicle's genes (preserving
//! solution order), appends the base as the terminal waypoint, and stitches
//! consecutive waypoints with sampled minimum-turn-radius Dubins curves.

pub mod dubins;
pub mod follower;

use crate::error::{ControllerError, ControllerResult};
use shared::types::{Chromosome, Target, TaskRef, VehicleId};

/// One waypoint of this vehicle's ordered task view. The terminal base
/// waypoint carries no task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencedWaypoint {
    pub x: f64,
    pub y: f64,
    /// Approach heading, radians
    pub heading: f64,
    pub task: Option<TaskRef>,
}

impl SequencedWaypoint {
    pub fn pose(&self) -> [f64; 3] {
        [self.x, self.y, self.heading]
    }
}

/// Build this vehicle's task sequence from an elected solution.
///
/// Genes whose target is no longer in the local target set are stale gossip
/// and dropped. The sequence always terminates at base.
pub fn task_sequence(
    solution: &Chromosome,
    vehicle: VehicleId,
    targets: &[Target],
    base: [f64; 3],
) -> Vec<SequencedWaypoint> {
    let mut sequence: Vec<SequencedWaypoint> = solution
        .for_vehicle(vehicle)
        .filter_map(|gene| {
            let target = targets.iter().find(|t| t.id == gene.target)?;
            Some(SequencedWaypoint {
                x: target.position[0],
                y: target.position[1],
                heading: gene.heading_deg.to_radians(),
                task: Some(TaskRef {
                    target: gene.target,
                    order: gene.order,
                }),
            })
        })
        .collect();
    sequence.push(SequencedWaypoint {
        x: base[0],
        y: base[1],
        heading: base[2],
        task: None,
    });
    sequence
}

/// Stitch the task sequence into one continuous sample run starting at the
/// vehicle's current pose. Samples are spaced `cruise_speed / 10` meters so
/// the look-ahead window sees ten samples per second of flight.
pub fn synthesize(
    pose: [f64; 3],
    sequence: &[SequencedWaypoint],
    min_turn_radius: f64,
    cruise_speed: f64,
) -> ControllerResult<Vec<[f64; 3]>> {
    let step = cruise_speed / 10.0;
    let mut waypoints = Vec::with_capacity(sequence.len() + 1);
    waypoints.push(pose);
    waypoints.extend(sequence.iter().map(|w| w.pose()));

    let mut path: Vec<[f64; 3]> = Vec::new();
    for pair in waypoints.windows(2) {
        let start = pair[0];
        let mut goal = pair[1];
        // Coincident consecutive waypoints: nudge the goal heading so a
        // positive-length curve still exists
        if start == goal {
            goal[2] -= 1e-5;
        }
        let curve = dubins::shortest_path(start, goal, min_turn_radius).ok_or_else(|| {
            ControllerError::PathSynthesis {
                reason: format!("no curve from {start:?} to {goal:?}"),
            }
        })?;
        let samples = curve.sample_many(step);
        // Drop the duplicated boundary sample between segments
        let skip = usize::from(!path.is_empty());
        path.extend(samples.into_iter().skip(skip));
    }
    Ok(path)
}
