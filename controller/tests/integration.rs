//! End-to-end controller tests over the in-memory gossip bus
//!
//! Each test drives whole broadcast/consensus/control rounds through
//! `on_tick` with explicit mission times, against real simulated vehicles.

mod common;

use common::{candidate, gene, peer_packet, solution, spec, Swarm};
use controller::traits::Link;
use shared::messages::{AllocatorCommand, MissionEvent};
use shared::types::{Pose, Target, TaskRef, VehicleClass};

/// A vehicle that reaches base with no tasks left reports mission complete
/// exactly once and shuts its allocator down exactly once.
#[tokio::test]
async fn mission_complete_fires_once_at_base() {
    let mut swarm = Swarm::new();
    let mut vehicle = swarm.vehicle(
        spec(1, VehicleClass::Combat, [0.0, 0.0, 0.0]),
        Pose::at(0.0, 0.0, 0.0),
        Vec::new(),
        Vec::new(),
    );

    // An elected plan with no genes for this vehicle leaves only the base leg
    vehicle
        .mission
        .apply_solution(&solution(vec![gene(99, 1, 0.0, 1)]))
        .unwrap();

    vehicle.mission.on_tick(0.0).await.unwrap();
    vehicle.mission.on_tick(0.1).await.unwrap();
    vehicle.mission.on_tick(0.2).await.unwrap();

    let completions = swarm
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, MissionEvent::MissionComplete { vehicle: 1 }))
        .count();
    assert_eq!(completions, 1);

    let shutdowns = vehicle
        .drain_commands()
        .into_iter()
        .filter(|c| matches!(c, AllocatorCommand::Shutdown))
        .count();
    assert_eq!(shutdowns, 1);

    assert!(vehicle.mission.mission_complete());
    assert!(vehicle.mission.returning_to_base());
}

/// Two vehicles exchanging packets elect the same winner and both fly the
/// winning plan.
#[tokio::test]
async fn swarm_elects_a_single_winner() {
    let targets = vec![Target::new(1, [300.0, 300.0])];
    let mut swarm = Swarm::new();
    let mut v1 = swarm.vehicle(
        spec(1, VehicleClass::Combat, [0.0, -300.0, 0.0]),
        Pose::at(0.0, 0.0, 0.0),
        targets.clone(),
        Vec::new(),
    );
    let mut v2 = swarm.vehicle(
        spec(2, VehicleClass::Combat, [100.0, -300.0, 0.0]),
        Pose::at(100.0, 0.0, 0.0),
        targets,
        Vec::new(),
    );

    // Vehicle 1 advertises the better (higher-fitness, lower-priority) plan
    v1.updates
        .send(candidate(
            0.5,
            vec![gene(1, 1, 90.0, 1), gene(2, 1, 270.0, 2)],
        ))
        .unwrap();
    v2.updates.send(candidate(0.1, vec![gene(2, 1, 0.0, 1)])).unwrap();

    v1.mission.on_tick(0.0).await.unwrap();
    v2.mission.on_tick(0.0).await.unwrap();
    v1.mission.on_tick(0.6).await.unwrap();
    v2.mission.on_tick(0.6).await.unwrap();

    // Both controllers fly vehicle 1's plan
    assert_eq!(
        v1.mission.task_sequence()[0].task,
        Some(TaskRef { target: 1, order: 1 })
    );
    assert_eq!(
        v2.mission.task_sequence()[0].task,
        Some(TaskRef { target: 1, order: 2 })
    );

    // Each consensus round handed the full merged roster to its allocator
    for vehicle in [&mut v1, &mut v2] {
        let commands = vehicle.drain_commands();
        assert_eq!(commands.len(), 1);
        match &commands[0] {
            AllocatorCommand::Roster(roster) => {
                assert_eq!(roster.vehicles.len(), 2);
                assert_eq!(roster.targets.len(), 1);
            }
            other => panic!("expected a roster command, got {other:?}"),
        }
    }
}

/// A peer holding a task lock suppresses both the allocator feedback and the
/// election for the round, and the round after the lock clears still skips
/// the election once.
#[tokio::test]
async fn peer_lock_suppresses_election_for_one_round() {
    let mut swarm = Swarm::new();
    let mut v1 = swarm.vehicle(
        spec(1, VehicleClass::Combat, [0.0, -300.0, 0.0]),
        Pose::at(0.0, 0.0, 0.0),
        vec![Target::new(1, [300.0, 300.0])],
        Vec::new(),
    );
    let peer = swarm.bus.endpoint(2);
    let winning = solution(vec![gene(1, 1, 90.0, 1)]);

    // Round 1: the peer is committed to a task
    v1.mission.on_tick(0.0).await.unwrap();
    peer.broadcast(peer_packet(2, [100.0, 0.0, 0.0], true, 0.5, winning.clone()))
        .await
        .unwrap();
    v1.mission.on_tick(0.6).await.unwrap();
    assert!(v1.drain_commands().is_empty());
    assert!(v1.mission.task_sequence().is_empty());

    // Round 2: lock cleared; the roster flows again but the election stays
    // suppressed for one more round
    peer.broadcast(peer_packet(2, [100.0, 0.0, 0.0], false, 0.5, winning.clone()))
        .await
        .unwrap();
    v1.mission.on_tick(2.1).await.unwrap();
    v1.mission.on_tick(2.7).await.unwrap();
    let commands = v1.drain_commands();
    assert_eq!(commands.len(), 1);
    assert!(matches!(commands[0], AllocatorCommand::Roster(_)));
    assert!(v1.mission.task_sequence().is_empty());

    // Round 3: the peer's better plan finally wins the election
    peer.broadcast(peer_packet(2, [100.0, 0.0, 0.0], false, 0.5, winning))
        .await
        .unwrap();
    v1.mission.on_tick(4.2).await.unwrap();
    v1.mission.on_tick(4.8).await.unwrap();
    assert_eq!(v1.mission.task_sequence().len(), 2);
    assert_eq!(
        v1.mission.task_sequence()[0].task,
        Some(TaskRef { target: 1, order: 1 })
    );
    assert!(v1.mission.flight_path().len() > 1);
}

/// A sensing vehicle reports a hidden target entering range exactly once
#[tokio::test]
async fn sensing_vehicle_discovers_hidden_target_once() {
    let mut swarm = Swarm::new();
    let mut vehicle = swarm.vehicle(
        spec(1, VehicleClass::Recon, [600.0, 0.0, 0.0]),
        Pose::at(0.0, 0.0, 0.0),
        Vec::new(),
        vec![[30.0, 10.0]],
    );
    vehicle
        .mission
        .apply_solution(&solution(vec![gene(99, 1, 0.0, 1)]))
        .unwrap();

    vehicle.mission.on_tick(0.0).await.unwrap();
    vehicle.mission.on_tick(0.1).await.unwrap();

    let discoveries: Vec<_> = swarm
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, MissionEvent::TargetDiscovered { .. }))
        .collect();
    assert_eq!(
        discoveries,
        vec![MissionEvent::TargetDiscovered {
            vehicle: 1,
            position: [30.0, 10.0],
        }]
    );

    assert_eq!(vehicle.mission.targets().len(), 1);
    assert_eq!(vehicle.mission.targets()[0].id, 1);
}

/// A munition platform carries no sensor and never reports discoveries
#[tokio::test]
async fn munition_ignores_hidden_targets() {
    let mut swarm = Swarm::new();
    let mut vehicle = swarm.vehicle(
        spec(1, VehicleClass::Munition, [600.0, 0.0, 0.0]),
        Pose::at(0.0, 0.0, 0.0),
        Vec::new(),
        vec![[30.0, 10.0]],
    );
    vehicle
        .mission
        .apply_solution(&solution(vec![gene(99, 1, 0.0, 1)]))
        .unwrap();

    vehicle.mission.on_tick(0.0).await.unwrap();
    vehicle.mission.on_tick(0.1).await.unwrap();

    assert!(swarm.drain_events().is_empty());
    assert!(vehicle.mission.targets().is_empty());
}
