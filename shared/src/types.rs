//! Core data model shared by the controller and the allocator worker

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vehicle identifier, unique across the swarm, assigned by the scenario.
pub type VehicleId = u32;

/// Target identifier. Targets are numbered from 1 in discovery order so every
/// vehicle that has merged the same discovery gossip agrees on the numbering.
pub type TargetId = u32;

/// Capability class of a vehicle in the swarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleClass {
    /// Armed fixed-wing attacker, carries a target sensor
    Combat,
    /// Unarmed scout, carries a target sensor
    Recon,
    /// Expendable munition platform, no sensor on board
    Munition,
}

impl VehicleClass {
    /// Whether this class can detect unknown targets within sensing range
    pub fn can_sense(&self) -> bool {
        !matches!(self, VehicleClass::Munition)
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleClass::Combat => write!(f, "combat"),
            VehicleClass::Recon => write!(f, "recon"),
            VehicleClass::Munition => write!(f, "munition"),
        }
    }
}

/// Planar vehicle state mutated every control tick by the active adapter
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    /// Heading in radians, wrapped to (-pi, pi]
    pub heading: f64,
    /// Ground speed, m/s
    pub velocity: f64,
    /// Turn rate, rad/s
    pub yaw_rate: f64,
}

impl Pose {
    pub fn at(x: f64, y: f64, heading: f64) -> Self {
        Self {
            x,
            y,
            heading,
            velocity: 0.0,
            yaw_rate: 0.0,
        }
    }

    /// Euclidean distance to a planar point
    pub fn distance_to(&self, point: [f64; 2]) -> f64 {
        ((self.x - point[0]).powi(2) + (self.y - point[1]).powi(2)).sqrt()
    }
}

/// Wrap an angle to (-pi, pi]
pub fn wrap_pi(angle: f64) -> f64 {
    let mut a = angle % std::f64::consts::TAU;
    if a > std::f64::consts::PI {
        a -= std::f64::consts::TAU;
    } else if a <= -std::f64::consts::PI {
        a += std::f64::consts::TAU;
    }
    a
}

/// A known target site
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub position: [f64; 2],
    /// Preferred attack heading in degrees, if the scenario constrains one
    pub heading_deg: Option<f64>,
}

impl Target {
    pub fn new(id: TargetId, position: [f64; 2]) -> Self {
        Self {
            id,
            position,
            heading_deg: None,
        }
    }
}

/// One assignment gene: vehicle `vehicle` performs pass `order` on target
/// `target`, approaching on `heading_deg`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub vehicle: VehicleId,
    pub target: TargetId,
    pub heading_deg: f64,
    pub order: u32,
}

/// Candidate target-to-vehicle assignment produced by the allocator.
///
/// Gene order is visiting order: filtering the genes of one vehicle while
/// preserving list order yields that vehicle's task sequence. Immutable once
/// elected.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Chromosome {
    pub genes: Vec<Assignment>,
}

impl Chromosome {
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Genes assigned to one vehicle, in visiting order
    pub fn for_vehicle(&self, vehicle: VehicleId) -> impl Iterator<Item = &Assignment> {
        self.genes.iter().filter(move |g| g.vehicle == vehicle)
    }
}

/// Reference to one completed (or in-flight) task: a single pass on a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskRef {
    pub target: TargetId,
    pub order: u32,
}

/// Per-vehicle broadcast snapshot, rebuilt every broadcast tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatePacket {
    pub id: VehicleId,
    pub class: VehicleClass,
    /// Cruise speed, m/s
    pub speed: f64,
    pub min_turn_radius: f64,
    /// Planar pose at broadcast time: x, y, heading (rad)
    pub position: [f64; 3],
    /// Home plate: x, y, arrival heading (rad)
    pub base: [f64; 3],
    pub lock: bool,
    /// Inverse fitness of the advertised solution; lower is better
    pub priority: f64,
    pub solution: Chromosome,
    pub terminated: Vec<TaskRef>,
    pub discovered: Vec<[f64; 2]>,
}

/// One peer's row in the merged roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: VehicleId,
    pub class: VehicleClass,
    pub speed: f64,
    pub min_turn_radius: f64,
    pub position: [f64; 3],
    pub base: [f64; 3],
    pub lock: bool,
    pub priority: f64,
    pub solution: Chromosome,
}

impl RosterEntry {
    pub fn from_packet(packet: &StatePacket) -> Self {
        Self {
            id: packet.id,
            class: packet.class,
            speed: packet.speed,
            min_turn_radius: packet.min_turn_radius,
            position: packet.position,
            base: packet.base,
            lock: packet.lock,
            priority: packet.priority,
            solution: packet.solution.clone(),
        }
    }
}

/// Swarm-wide merged view produced by one consensus round.
///
/// Input to the allocator worker; `targets` already contains every discovery
/// merged so far and `terminated` every task the swarm has finished, so the
/// search never redispatches a dead target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub vehicles: Vec<RosterEntry>,
    pub targets: Vec<Target>,
    pub terminated: Vec<TaskRef>,
}

impl Roster {
    /// Whether any vehicle in the roster currently holds a task lock
    pub fn any_lock(&self) -> bool {
        self.vehicles.iter().any(|v| v.lock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn wrap_pi_stays_in_range() {
        for k in -20..=20 {
            let a = wrap_pi(0.7 * k as f64);
            assert!(a > -PI && a <= PI, "wrap_pi(0.7*{k}) = {a}");
        }
        assert!((wrap_pi(3.0 * PI) - PI).abs() < 1e-12);
        assert!((wrap_pi(-PI) - PI).abs() < 1e-12);
    }

    #[test]
    fn chromosome_filters_by_vehicle_in_order() {
        let chromosome = Chromosome {
            genes: vec![
                Assignment { vehicle: 2, target: 3, heading_deg: 0.0, order: 1 },
                Assignment { vehicle: 1, target: 1, heading_deg: 90.0, order: 1 },
                Assignment { vehicle: 1, target: 2, heading_deg: 180.0, order: 1 },
            ],
        };
        let mine: Vec<TargetId> = chromosome.for_vehicle(1).map(|g| g.target).collect();
        assert_eq!(mine, vec![1, 2]);
    }

    #[test]
    fn munition_class_does_not_sense() {
        assert!(VehicleClass::Combat.can_sense());
        assert!(VehicleClass::Recon.can_sense());
        assert!(!VehicleClass::Munition.can_sense());
    }
}
