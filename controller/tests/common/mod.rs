//! Shared fixtures for the controller integration tests
//!
//! Builds miniature swarms on the in-memory gossip bus with real simulated
//! vehicles, so the tests drive whole consensus rounds through `on_tick`.

use controller::services::{BusLink, GossipBus};
use controller::vehicle::SimulatedVehicle;
use controller::{MissionController, VehicleSpec};
use shared::messages::{AllocatorCommand, Candidate, GroundEvent, MissionEvent};
use shared::types::{
    Assignment, Chromosome, Pose, StatePacket, Target, VehicleClass, VehicleId,
};
use tokio::sync::mpsc;

/// A gossip bus plus the ground-station event feed attached to it
pub struct Swarm {
    pub bus: GossipBus,
    pub events: mpsc::UnboundedReceiver<GroundEvent>,
}

/// One controller with both ends of its allocator channels exposed
pub struct Vehicle {
    pub mission: MissionController<SimulatedVehicle, BusLink>,
    pub commands: mpsc::UnboundedReceiver<AllocatorCommand>,
    pub updates: mpsc::UnboundedSender<Candidate>,
}

impl Swarm {
    pub fn new() -> Self {
        let (bus, events) = GossipBus::new();
        Self { bus, events }
    }

    /// Attach a simulated vehicle to the bus at the given start pose
    pub fn vehicle(
        &self,
        spec: VehicleSpec,
        start: Pose,
        targets: Vec<Target>,
        hidden_targets: Vec<[f64; 2]>,
    ) -> Vehicle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let adapter = SimulatedVehicle::new(start, spec.cruise_speed, spec.min_turn_radius);
        let link = self.bus.endpoint(spec.id);
        let mission = MissionController::new(
            spec,
            targets,
            hidden_targets,
            adapter,
            link,
            command_tx,
            update_rx,
        );
        Vehicle {
            mission,
            commands: command_rx,
            updates: update_tx,
        }
    }

    /// Events delivered so far, without blocking
    pub fn drain_events(&mut self) -> Vec<MissionEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event.event);
        }
        out
    }
}

impl Vehicle {
    /// Commands the allocator worker would have received so far
    pub fn drain_commands(&mut self) -> Vec<AllocatorCommand> {
        let mut out = Vec::new();
        while let Ok(command) = self.commands.try_recv() {
            out.push(command);
        }
        out
    }
}

pub fn spec(id: VehicleId, class: VehicleClass, base: [f64; 3]) -> VehicleSpec {
    VehicleSpec {
        id,
        class,
        cruise_speed: 10.0,
        min_turn_radius: 20.0,
        base,
        sensing_range: 50.0,
        waypoint_radius: 5.0,
    }
}

pub fn gene(vehicle: VehicleId, target: u32, heading_deg: f64, order: u32) -> Assignment {
    Assignment {
        vehicle,
        target,
        heading_deg,
        order,
    }
}

pub fn solution(genes: Vec<Assignment>) -> Chromosome {
    Chromosome { genes }
}

pub fn candidate(fitness: f64, genes: Vec<Assignment>) -> Candidate {
    Candidate {
        fitness,
        solution: solution(genes),
    }
}

/// Hand-built peer state packet for driving one side of a consensus round
pub fn peer_packet(
    id: VehicleId,
    position: [f64; 3],
    lock: bool,
    priority: f64,
    solution: Chromosome,
) -> StatePacket {
    StatePacket {
        id,
        class: VehicleClass::Combat,
        speed: 10.0,
        min_turn_radius: 20.0,
        position,
        base: [0.0, -300.0, 0.0],
        lock,
        priority,
        solution,
        terminated: Vec::new(),
        discovered: Vec::new(),
    }
}
