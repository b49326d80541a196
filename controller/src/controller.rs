//! Tick-driven mission controller state machine
//!
//! Four time-gated activities run to completion, never interleaved, every
//! tick: drain the allocator channel, broadcast own state, consensus-merge
//! peer state, execute control. The controller owns the only mutable copy of
//! the elected solution; the path synthesizer and the allocator feedback both
//! read from it.

use crate::consensus::{elect, same_position, RosterBuilder, RoundBuffers};
use crate::error::{ControllerError, ControllerResult};
use crate::path::{self, follower::LookaheadWindow, SequencedWaypoint};
use crate::traits::{elapsed_at_least, Link};
use crate::vehicle::VehicleAdapter;
use shared::messages::{AllocatorCommand, Candidate, GroundEvent, MissionEvent};
use shared::types::{Chromosome, StatePacket, Target, TargetId, TaskRef, VehicleClass, VehicleId};
use shared::{vehicle_debug, vehicle_info};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Own-state broadcast period, seconds
pub const BROADCAST_PERIOD: f64 = 2.0;

/// Consensus evaluation delay after a broadcast, seconds
pub const CONSENSUS_PERIOD: f64 = 0.5;

/// Control tick period, seconds
pub const CONTROL_PERIOD: f64 = 0.1;

/// Proportional gain shaping speed against remaining distance to base
const RETURN_SPEED_GAIN: f64 = 0.8;

/// Fitness floor advertised before the first allocator candidate arrives
const INITIAL_FITNESS: f64 = 1e-5;

/// Static description of this vehicle
#[derive(Debug, Clone)]
pub struct VehicleSpec {
    pub id: VehicleId,
    pub class: VehicleClass,
    pub cruise_speed: f64,
    pub min_turn_radius: f64,
    /// Home plate: x, y, arrival heading (rad)
    pub base: [f64; 3],
    pub sensing_range: f64,
    pub waypoint_radius: f64,
}

/// Per-vehicle mission controller
pub struct MissionController<A: VehicleAdapter, L: Link> {
    spec: VehicleSpec,
    adapter: A,
    link: L,
    command_tx: UnboundedSender<AllocatorCommand>,
    update_rx: UnboundedReceiver<Candidate>,

    /// Known target sites, grown by discovery gossip; single writer
    targets: Vec<Target>,
    /// Fixed environment of targets not yet known to anyone
    hidden_targets: Vec<[f64; 2]>,

    fitness: f64,
    best_solution: Chromosome,

    /// Own completed passes, accumulated for every future broadcast
    terminated_own: Vec<TaskRef>,
    /// Own discoveries, accumulated for every future broadcast
    discovered_own: Vec<[f64; 2]>,

    buffers: RoundBuffers,
    roster: RosterBuilder,

    packet_ready: bool,
    update_pending: bool,
    task_locked: bool,
    inside: bool,
    returning_to_base: bool,
    shutdown_sent: bool,

    task_sequence: Vec<SequencedWaypoint>,
    flight_path: Vec<[f64; 3]>,
    window: LookaheadWindow,

    last_broadcast: f64,
    last_control: Option<f64>,
}

impl<A: VehicleAdapter, L: Link> MissionController<A, L> {
    pub fn new(
        spec: VehicleSpec,
        targets: Vec<Target>,
        hidden_targets: Vec<[f64; 2]>,
        adapter: A,
        link: L,
        command_tx: UnboundedSender<AllocatorCommand>,
        update_rx: UnboundedReceiver<Candidate>,
    ) -> Self {
        Self {
            spec,
            adapter,
            link,
            command_tx,
            update_rx,
            targets,
            hidden_targets,
            fitness: INITIAL_FITNESS,
            best_solution: Chromosome::default(),
            terminated_own: Vec::new(),
            discovered_own: Vec::new(),
            buffers: RoundBuffers::default(),
            roster: RosterBuilder::default(),
            packet_ready: false,
            update_pending: true,
            task_locked: false,
            inside: false,
            returning_to_base: false,
            shutdown_sent: false,
            task_sequence: Vec::new(),
            flight_path: Vec::new(),
            window: LookaheadWindow::new(),
            last_broadcast: f64::NEG_INFINITY,
            last_control: None,
        }
    }

    /// Run the four time-gated activities for mission time `now` (seconds)
    pub async fn on_tick(&mut self, now: f64) -> ControllerResult<()> {
        self.drain();

        if elapsed_at_least(BROADCAST_PERIOD, self.last_broadcast, now) && !self.returning_to_base
        {
            self.broadcast(now).await?;
        }

        if self.packet_ready && elapsed_at_least(CONSENSUS_PERIOD, self.last_broadcast, now) {
            self.consensus().await?;
        }

        let control_due = match self.last_control {
            Some(prev) => elapsed_at_least(CONTROL_PERIOD, prev, now),
            None => true,
        };
        if !self.flight_path.is_empty() && control_due {
            self.control(now).await?;
        }
        Ok(())
    }

    /// Drain all pending allocator candidates, last write wins
    fn drain(&mut self) {
        while let Ok(candidate) = self.update_rx.try_recv() {
            self.fitness = candidate.fitness;
            self.best_solution = candidate.solution;
        }
    }

    /// Build and gossip this vehicle's state packet, absorbing it into the
    /// local roster as well
    async fn broadcast(&mut self, now: f64) -> ControllerResult<()> {
        let pose = self.adapter.pose();
        let packet = StatePacket {
            id: self.spec.id,
            class: self.spec.class,
            speed: self.spec.cruise_speed,
            min_turn_radius: self.spec.min_turn_radius,
            position: [pose.x, pose.y, pose.heading],
            base: self.spec.base,
            lock: self.task_locked,
            priority: 1.0 / self.fitness,
            solution: self.best_solution.clone(),
            terminated: self.terminated_own.clone(),
            discovered: self.discovered_own.clone(),
        };
        self.roster.absorb(&packet);
        self.buffers.fold(&packet);
        self.link.broadcast(packet).await?;
        self.packet_ready = true;
        self.last_broadcast = now;
        vehicle_debug!(self.spec.id, "state packet broadcast");
        Ok(())
    }

    /// Merge peer packets, elect the round winner, feed the roster back to
    /// the allocator. The roster snapshot is cleared unconditionally so no
    /// state leaks into the next round.
    async fn consensus(&mut self) -> ControllerResult<()> {
        for packet in self.link.poll() {
            if packet.id == self.spec.id {
                continue;
            }
            self.buffers.fold(&packet);
            self.roster.absorb(&packet);
        }

        // Any gossiped discovery unknown locally joins the target set
        let discovered = self.buffers.discovered.clone();
        for position in discovered {
            if !self.knows(position) {
                self.push_target(position);
            }
        }

        if !self.roster.any_lock() {
            let mut terminated = self.terminated_own.clone();
            for task in &self.buffers.accepted {
                if !terminated.contains(task) {
                    terminated.push(*task);
                }
            }
            let merged = self.roster.build(self.targets.clone(), terminated);
            self.command_tx
                .send(AllocatorCommand::Roster(merged.clone()))
                .map_err(|_| ControllerError::AllocatorGone)?;
            self.buffers.clear();

            if self.update_pending {
                if let Some(winner) = elect(&merged) {
                    let solution = winner.solution.clone();
                    self.apply_solution(&solution)?;
                }
            }
            self.update_pending = true;
        } else {
            // A committed vehicle exists; suppress re-election this round
            self.update_pending = false;
        }

        self.packet_ready = false;
        self.roster.clear();
        Ok(())
    }

    /// Regenerate this vehicle's task sequence and path from an elected
    /// solution. Resets the look-ahead window to the path start; lock and
    /// inside flags from the previous path intentionally persist.
    pub fn apply_solution(&mut self, solution: &Chromosome) -> ControllerResult<()> {
        if solution.is_empty() || self.returning_to_base {
            return Ok(());
        }
        let sequence = path::task_sequence(solution, self.spec.id, &self.targets, self.spec.base);
        let pose = self.adapter.pose();
        let flight_path = path::synthesize(
            [pose.x, pose.y, pose.heading],
            &sequence,
            self.spec.min_turn_radius,
            self.spec.cruise_speed,
        )?;
        self.task_sequence = sequence;
        self.flight_path = flight_path;
        self.window.reset();
        Ok(())
    }

    /// One control tick: task-progress state machine against the head of the
    /// task sequence, then path following and the discovery scan
    async fn control(&mut self, now: f64) -> ControllerResult<()> {
        let dt = match self.last_control {
            Some(prev) => now - prev,
            None => 0.0,
        };
        let pose = self.adapter.pose();
        let head = self.task_sequence[0];
        let head_dist = pose.distance_to([head.x, head.y]);

        // Reached
        if head_dist <= self.spec.waypoint_radius && !self.inside {
            if self.task_sequence.len() == 1 && !self.shutdown_sent {
                self.report(now, MissionEvent::MissionComplete { vehicle: self.spec.id })
                    .await?;
                self.command_tx
                    .send(AllocatorCommand::Shutdown)
                    .map_err(|_| ControllerError::AllocatorGone)?;
                self.shutdown_sent = true;
            }
            self.inside = true;
        }

        // Departed
        if head_dist >= self.spec.waypoint_radius && self.inside {
            if let Some(task) = head.task {
                self.terminated_own.push(task);
                self.report(now, MissionEvent::TaskComplete { vehicle: self.spec.id, task })
                    .await?;
                self.task_sequence.remove(0);
                self.task_locked = false;
                self.inside = false;
            }
        }

        // Lock
        let head = self.task_sequence[0];
        if pose.distance_to([head.x, head.y]) <= 2.0 * self.spec.min_turn_radius {
            if head.task.is_some() {
                self.task_locked = true;
            } else {
                self.returning_to_base = true;
            }
        }

        // Path following
        let lookahead = self.window.advance(&self.flight_path, &pose);
        let speed_target = if lookahead.exhausted && self.returning_to_base {
            0.0
        } else if self.returning_to_base {
            let to_base = pose.distance_to([self.spec.base[0], self.spec.base[1]]);
            (RETURN_SPEED_GAIN * to_base).min(self.spec.cruise_speed)
        } else {
            self.spec.cruise_speed
        };
        self.adapter.advance(&lookahead, speed_target, dt);
        self.last_control = Some(now);

        // Discovery scan over the fixed hidden-target environment
        if self.spec.class.can_sense() {
            let hidden = self.hidden_targets.clone();
            for position in hidden {
                if pose.distance_to(position) <= self.spec.sensing_range && !self.knows(position) {
                    self.push_target(position);
                    self.discovered_own.push(position);
                    self.report(
                        now,
                        MissionEvent::TargetDiscovered { vehicle: self.spec.id, position },
                    )
                    .await?;
                }
            }
        }
        Ok(())
    }

    async fn report(&self, now: f64, event: MissionEvent) -> ControllerResult<()> {
        vehicle_info!(self.spec.id, "mission event: {:?}", event);
        self.link
            .send_event(GroundEvent { at: now, event })
            .await?;
        Ok(())
    }

    fn knows(&self, position: [f64; 2]) -> bool {
        self.targets
            .iter()
            .any(|t| same_position(t.position, position))
    }

    /// Targets are numbered in discovery order so gossip-consistent peers
    /// agree on ids
    fn push_target(&mut self, position: [f64; 2]) {
        let id = (self.targets.len() + 1) as TargetId;
        self.targets.push(Target::new(id, position));
    }

    // Accessors used by the runner and tests

    pub fn spec(&self) -> &VehicleSpec {
        &self.spec
    }

    pub fn pose(&self) -> shared::types::Pose {
        self.adapter.pose()
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn task_sequence(&self) -> &[SequencedWaypoint] {
        &self.task_sequence
    }

    pub fn flight_path(&self) -> &[[f64; 3]] {
        &self.flight_path
    }

    pub fn task_locked(&self) -> bool {
        self.task_locked
    }

    pub fn returning_to_base(&self) -> bool {
        self.returning_to_base
    }

    pub fn mission_complete(&self) -> bool {
        self.shutdown_sent
    }
}
