//! Roster merging and leaderless winner election
//!
//! Every vehicle folds the same gossiped packets into the same deterministic
//! ordering, so identical merged rosters elect identical solutions on every
//! vehicle. That ordering and the round-scoped buffers below are the entire
//! consensus mechanism; there is no leader.

use shared::types::{Roster, RosterEntry, StatePacket, Target, TaskRef, VehicleId};
use std::collections::BTreeMap;

/// Positions closer than this are the same gossiped target
const TARGET_MATCH_EPS: f64 = 1e-6;

/// Round-scoped accumulation of peers' accepted-task and discovered-target
/// lists. Cleared when a merged roster is forwarded to the allocator; never
/// allowed to leak across forwarded rounds.
#[derive(Debug, Default)]
pub struct RoundBuffers {
    pub accepted: Vec<TaskRef>,
    pub discovered: Vec<[f64; 2]>,
}

impl RoundBuffers {
    /// Fold one peer packet's lists into the running sets
    pub fn fold(&mut self, packet: &StatePacket) {
        for task in &packet.terminated {
            if !self.accepted.contains(task) {
                self.accepted.push(*task);
            }
        }
        for position in &packet.discovered {
            if !self
                .discovered
                .iter()
                .any(|p| same_position(*p, *position))
            {
                self.discovered.push(*position);
            }
        }
    }

    pub fn clear(&mut self) {
        self.accepted.clear();
        self.discovered.clear();
    }
}

/// Accumulates the freshest packet per vehicle between consensus rounds.
/// Keyed by id so iteration order is already the election tie-break order.
#[derive(Debug, Default)]
pub struct RosterBuilder {
    entries: BTreeMap<VehicleId, RosterEntry>,
}

impl RosterBuilder {
    /// Absorb a packet, replacing any older packet from the same vehicle
    pub fn absorb(&mut self, packet: &StatePacket) {
        self.entries.insert(packet.id, RosterEntry::from_packet(packet));
    }

    /// Whether any vehicle seen this round holds a task lock
    pub fn any_lock(&self) -> bool {
        self.entries.values().any(|e| e.lock)
    }

    /// Snapshot the merged roster for this round
    pub fn build(&self, targets: Vec<Target>, terminated: Vec<TaskRef>) -> Roster {
        Roster {
            vehicles: self.entries.values().cloned().collect(),
            targets,
            terminated,
        }
    }

    /// Drop all per-round state; must run after every consensus evaluation
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Elect the round winner: lowest priority value (highest fitness) wins,
/// ties broken by the smaller vehicle id.
///
/// Equivalent to a stable sort by `(priority, id)` taking the first entry.
/// `total_cmp` keeps the ordering total even for pathological floats.
pub fn elect(roster: &Roster) -> Option<&RosterEntry> {
    roster
        .vehicles
        .iter()
        .min_by(|a, b| a.priority.total_cmp(&b.priority).then(a.id.cmp(&b.id)))
}

pub fn same_position(a: [f64; 2], b: [f64; 2]) -> bool {
    (a[0] - b[0]).abs() < TARGET_MATCH_EPS && (a[1] - b[1]).abs() < TARGET_MATCH_EPS
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::{Chromosome, VehicleClass};

    fn packet(id: VehicleId, priority: f64, tag: u32) -> StatePacket {
        StatePacket {
            id,
            class: VehicleClass::Combat,
            speed: 10.0,
            min_turn_radius: 20.0,
            position: [0.0, 0.0, 0.0],
            base: [0.0, 0.0, 0.0],
            lock: false,
            priority,
            // Tag the solution so tests can tell winners apart
            solution: Chromosome {
                genes: vec![shared::types::Assignment {
                    vehicle: id,
                    target: tag,
                    heading_deg: 0.0,
                    order: 1,
                }],
            },
            terminated: Vec::new(),
            discovered: Vec::new(),
        }
    }

    fn build(packets: &[StatePacket]) -> Roster {
        let mut builder = RosterBuilder::default();
        for p in packets {
            builder.absorb(p);
        }
        builder.build(Vec::new(), Vec::new())
    }

    #[test]
    fn lower_priority_value_wins() {
        // Scenario A: id 1 prio 0.1, id 2 prio 0.05 -> vehicle 2's solution
        let roster = build(&[packet(1, 0.1, 101), packet(2, 0.05, 202)]);
        let winner = elect(&roster).unwrap();
        assert_eq!(winner.id, 2);
        assert_eq!(winner.solution.genes[0].target, 202);
    }

    #[test]
    fn priority_tie_breaks_on_smaller_id() {
        // Scenario B: equal priorities -> vehicle 1's solution
        let roster = build(&[packet(2, 0.1, 202), packet(1, 0.1, 101)]);
        let winner = elect(&roster).unwrap();
        assert_eq!(winner.id, 1);
        assert_eq!(winner.solution.genes[0].target, 101);
    }

    #[test]
    fn election_is_deterministic_for_identical_rosters() {
        let packets = [packet(3, 0.2, 303), packet(1, 0.1, 101), packet(2, 0.1, 202)];
        let first = elect(&build(&packets)).unwrap().solution.clone();
        let second = elect(&build(&packets)).unwrap().solution.clone();
        assert_eq!(first, second);
    }

    #[test]
    fn absorb_keeps_latest_packet_per_vehicle() {
        let mut builder = RosterBuilder::default();
        builder.absorb(&packet(1, 0.5, 101));
        builder.absorb(&packet(1, 0.2, 111));
        let roster = builder.build(Vec::new(), Vec::new());
        assert_eq!(roster.vehicles.len(), 1);
        assert!((roster.vehicles[0].priority - 0.2).abs() < 1e-12);
    }

    #[test]
    fn fold_is_idempotent_per_round() {
        let mut buffers = RoundBuffers::default();
        let mut p = packet(1, 0.5, 101);
        p.terminated.push(TaskRef { target: 4, order: 1 });
        p.discovered.push([10.0, 20.0]);
        buffers.fold(&p);
        buffers.fold(&p);
        assert_eq!(buffers.accepted.len(), 1);
        assert_eq!(buffers.discovered.len(), 1);
    }
}
