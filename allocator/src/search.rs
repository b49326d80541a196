//! Warm-startable evolutionary assignment search
//!
//! Stands behind the `solve(time_budget, roster, reseed)` interface the
//! worker loop drives. The population is owned here and never leaves the
//! crate; the controller only ever sees the best `(fitness, solution)` pair.
//!
//! Representation: a permutation of outstanding task units (one unit per
//! remaining pass on a target), each unit carrying a vehicle gene and an
//! attack-heading gene. Fitness is the inverse of a makespan-weighted sum of
//! Euclidean tour lengths, so shorter and better-balanced plans win.

use crate::error::{AllocatorError, AllocatorResult};
use rand::prelude::*;
use rand::rngs::StdRng;
use shared::messages::Candidate;
use shared::types::{Assignment, Chromosome, Roster, Target, TargetId, VehicleId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Tunables for the assignment search
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub population_size: usize,
    /// Passes each target must receive before it is considered terminated
    pub passes_per_target: u32,
    pub tournament_size: usize,
    /// Per-gene probability of a point mutation after crossover
    pub mutation_rate: f64,
    /// Fixed RNG seed for reproducible searches in tests
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: 80,
            passes_per_target: 1,
            tournament_size: 4,
            mutation_rate: 0.3,
            seed: None,
        }
    }
}

/// One outstanding pass on one target
#[derive(Debug, Clone, Copy)]
struct Unit {
    target: TargetId,
    position: [f64; 2],
    fixed_heading: Option<f64>,
}

/// One gene of a genotype: fly unit `unit` with vehicle `vehicle`,
/// approaching on `heading_deg`
#[derive(Debug, Clone, Copy)]
struct Gene {
    unit: usize,
    vehicle: VehicleId,
    heading_deg: f64,
}

type Genotype = Vec<Gene>;

/// Evolutionary search state carried across solve calls
pub struct SeadSearch {
    config: SearchConfig,
    rng: StdRng,
    units: Vec<Unit>,
    /// Orders still to fly per target, ascending; consumed by appearance
    /// order when a genotype is encoded into a chromosome
    remaining_orders: HashMap<TargetId, Vec<u32>>,
    population: Vec<Genotype>,
    fitness: Vec<f64>,
}

impl SeadSearch {
    /// Create a search seeded by the mission's initial target set.
    ///
    /// The target list only matters until the first roster arrives; every
    /// reseed rebuilds the unit set from the roster's merged targets.
    pub fn new(_initial_targets: Vec<Target>, config: SearchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng,
            units: Vec::new(),
            remaining_orders: HashMap::new(),
            population: Vec::new(),
            fitness: Vec::new(),
        }
    }

    /// Run one time slice of search against `roster`.
    ///
    /// `reseed` rebuilds the unit set and population around the roster;
    /// otherwise the existing population keeps refining.
    pub fn solve(
        &mut self,
        time_budget: Duration,
        roster: &Roster,
        reseed: bool,
    ) -> AllocatorResult<Candidate> {
        let deadline = Instant::now() + time_budget;

        if roster.vehicles.is_empty() {
            return Err(AllocatorError::MalformedRoster {
                reason: "no vehicles".into(),
            });
        }

        if reseed || self.population.is_empty() {
            self.rebuild_units(roster);
            self.seed_population(roster);
        }

        if self.units.is_empty() {
            // Everything terminated; advertise the floor fitness so the
            // vehicle's priority stays finite and maximal
            return Ok(Candidate {
                fitness: 1e-5,
                solution: Chromosome::default(),
            });
        }

        while Instant::now() < deadline {
            let parent_a = self.tournament();
            let parent_b = self.tournament();
            let mut child = self.order_crossover(parent_a, parent_b);
            self.mutate(&mut child, roster);
            let child_fitness = self.evaluate(&child, roster);

            // Steady-state replacement of the current worst member
            let worst = self.worst_index();
            if child_fitness > self.fitness[worst] {
                self.population[worst] = child;
                self.fitness[worst] = child_fitness;
            }
        }

        let best = self.best_index();
        Ok(Candidate {
            fitness: self.fitness[best],
            solution: self.encode(&self.population[best].clone()),
        })
    }

    /// Rebuild the outstanding unit set from the roster's merged targets,
    /// skipping every pass the swarm already terminated
    fn rebuild_units(&mut self, roster: &Roster) {
        self.units.clear();
        self.remaining_orders.clear();
        for target in &roster.targets {
            let flown: Vec<u32> = roster
                .terminated
                .iter()
                .filter(|t| t.target == target.id)
                .map(|t| t.order)
                .collect();
            let orders: Vec<u32> = (1..=self.config.passes_per_target)
                .filter(|o| !flown.contains(o))
                .collect();
            for _ in &orders {
                self.units.push(Unit {
                    target: target.id,
                    position: target.position,
                    fixed_heading: target.heading_deg,
                });
            }
            if !orders.is_empty() {
                self.remaining_orders.insert(target.id, orders);
            }
        }
    }

    /// Build a fresh population: peers' advertised solutions first (warm
    /// start from gossip), random permutations for the rest
    fn seed_population(&mut self, roster: &Roster) {
        self.population.clear();
        self.fitness.clear();
        if self.units.is_empty() {
            return;
        }

        for entry in &roster.vehicles {
            if self.population.len() >= self.config.population_size {
                break;
            }
            if let Some(genotype) = self.adopt(&entry.solution, roster) {
                self.population.push(genotype);
            }
        }
        while self.population.len() < self.config.population_size {
            let genotype = self.random_genotype(roster);
            self.population.push(genotype);
        }

        self.fitness = self
            .population
            .iter()
            .map(|g| self.evaluate(g, roster))
            .collect();
    }

    /// Translate a gossiped chromosome into a genotype over the current unit
    /// set. Stale genes are dropped, missing units appended randomly; returns
    /// None when nothing of the solution survives.
    fn adopt(&mut self, solution: &Chromosome, roster: &Roster) -> Option<Genotype> {
        let mut used = vec![false; self.units.len()];
        let mut genotype = Genotype::new();

        for gene in &solution.genes {
            let slot = self
                .units
                .iter()
                .enumerate()
                .find(|(i, u)| !used[*i] && u.target == gene.target)
                .map(|(i, _)| i);
            if let Some(i) = slot {
                used[i] = true;
                let vehicle = if roster.vehicles.iter().any(|v| v.id == gene.vehicle) {
                    gene.vehicle
                } else {
                    self.random_vehicle(roster)
                };
                genotype.push(Gene {
                    unit: i,
                    vehicle,
                    heading_deg: gene.heading_deg,
                });
            }
        }
        if genotype.is_empty() {
            return None;
        }

        for i in 0..self.units.len() {
            if !used[i] {
                let gene = self.fresh_gene(i, roster);
                genotype.push(gene);
            }
        }
        Some(genotype)
    }

    fn random_genotype(&mut self, roster: &Roster) -> Genotype {
        let mut order: Vec<usize> = (0..self.units.len()).collect();
        order.shuffle(&mut self.rng);
        order.into_iter().map(|i| self.fresh_gene(i, roster)).collect()
    }

    fn fresh_gene(&mut self, unit: usize, roster: &Roster) -> Gene {
        let heading_deg = match self.units[unit].fixed_heading {
            Some(h) => h,
            None => self.rng.gen_range(0.0..360.0),
        };
        Gene {
            unit,
            vehicle: self.random_vehicle(roster),
            heading_deg,
        }
    }

    fn random_vehicle(&mut self, roster: &Roster) -> VehicleId {
        roster.vehicles[self.rng.gen_range(0..roster.vehicles.len())].id
    }

    /// Tournament selection over the cached fitness values
    fn tournament(&mut self) -> Genotype {
        let mut best = self.rng.gen_range(0..self.population.len());
        for _ in 1..self.config.tournament_size {
            let rival = self.rng.gen_range(0..self.population.len());
            if self.fitness[rival] > self.fitness[best] {
                best = rival;
            }
        }
        self.population[best].clone()
    }

    /// Order crossover: keep a slice of parent A, fill the remaining units in
    /// parent B's visiting order with B's vehicle/heading genes
    fn order_crossover(&mut self, parent_a: Genotype, parent_b: Genotype) -> Genotype {
        let n = parent_a.len();
        if n < 2 {
            return parent_a;
        }
        let cut_a = self.rng.gen_range(0..n);
        let cut_b = self.rng.gen_range(cut_a..n);

        let kept = &parent_a[cut_a..=cut_b.min(n - 1)];
        let mut child: Genotype = kept.to_vec();
        for gene in &parent_b {
            if !kept.iter().any(|k| k.unit == gene.unit) {
                child.push(*gene);
            }
        }
        child
    }

    fn mutate(&mut self, genotype: &mut Genotype, roster: &Roster) {
        let n = genotype.len();
        if n == 0 {
            return;
        }
        if self.rng.gen_bool(self.config.mutation_rate) {
            let i = self.rng.gen_range(0..n);
            let j = self.rng.gen_range(0..n);
            genotype.swap(i, j);
        }
        if self.rng.gen_bool(self.config.mutation_rate) {
            let i = self.rng.gen_range(0..n);
            genotype[i].vehicle = self.random_vehicle(roster);
        }
        if self.rng.gen_bool(self.config.mutation_rate) {
            let i = self.rng.gen_range(0..n);
            if self.units[genotype[i].unit].fixed_heading.is_none() {
                let jitter = self.rng.gen_range(-45.0..45.0);
                genotype[i].heading_deg = (genotype[i].heading_deg + jitter).rem_euclid(360.0);
            }
        }
    }

    /// Inverse tour cost: makespan dominates so load stays balanced, total
    /// distance breaks near-ties toward shorter plans
    fn evaluate(&self, genotype: &Genotype, roster: &Roster) -> f64 {
        let mut makespan: f64 = 0.0;
        let mut total = 0.0;
        for entry in &roster.vehicles {
            let mut at = [entry.position[0], entry.position[1]];
            let mut length = 0.0;
            for gene in genotype {
                if gene.vehicle != entry.id {
                    continue;
                }
                let next = self.units[gene.unit].position;
                length += dist(at, next);
                at = next;
            }
            length += dist(at, [entry.base[0], entry.base[1]]);
            let speed = entry.speed.max(1e-6);
            makespan = makespan.max(length / speed);
            total += length;
        }
        1.0 / (makespan + 0.01 * total + 1e-9)
    }

    fn best_index(&self) -> usize {
        self.fitness
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn worst_index(&self) -> usize {
        self.fitness
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Emit the wire chromosome: sequence-orders are assigned per target by
    /// appearance so pass k is always scheduled before pass k+1
    fn encode(&self, genotype: &Genotype) -> Chromosome {
        let mut next_order: HashMap<TargetId, usize> = HashMap::new();
        let mut genes = Vec::with_capacity(genotype.len());
        for gene in genotype {
            let target = self.units[gene.unit].target;
            let cursor = next_order.entry(target).or_insert(0);
            let orders = match self.remaining_orders.get(&target) {
                Some(orders) if *cursor < orders.len() => orders,
                _ => continue,
            };
            genes.push(Assignment {
                vehicle: gene.vehicle,
                target,
                heading_deg: gene.heading_deg,
                order: orders[*cursor],
            });
            *cursor += 1;
        }
        Chromosome { genes }
    }
}

fn dist(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::{RosterEntry, TaskRef};

    fn entry(id: VehicleId, x: f64) -> RosterEntry {
        RosterEntry {
            id,
            class: shared::types::VehicleClass::Combat,
            speed: 10.0,
            min_turn_radius: 20.0,
            position: [x, 0.0, 0.0],
            base: [0.0, 0.0, 0.0],
            lock: false,
            priority: 1e5,
            solution: Chromosome::default(),
        }
    }

    fn roster(targets: Vec<Target>, terminated: Vec<TaskRef>) -> Roster {
        Roster {
            vehicles: vec![entry(1, 0.0), entry(2, 100.0)],
            targets,
            terminated,
        }
    }

    #[test]
    fn empty_roster_is_rejected() {
        let mut search = SeadSearch::new(Vec::new(), SearchConfig::default());
        let bad = Roster {
            vehicles: Vec::new(),
            targets: Vec::new(),
            terminated: Vec::new(),
        };
        let result = search.solve(Duration::from_millis(5), &bad, true);
        assert!(matches!(result, Err(AllocatorError::MalformedRoster { .. })));
    }

    #[test]
    fn every_outstanding_target_is_scheduled_once() {
        let targets = vec![
            Target::new(1, [50.0, 50.0]),
            Target::new(2, [150.0, 20.0]),
            Target::new(3, [80.0, -40.0]),
        ];
        let mut search = SeadSearch::new(Vec::new(), SearchConfig {
            seed: Some(7),
            ..SearchConfig::default()
        });
        let candidate = search
            .solve(Duration::from_millis(30), &roster(targets, Vec::new()), true)
            .unwrap();

        let mut scheduled: Vec<TargetId> =
            candidate.solution.genes.iter().map(|g| g.target).collect();
        scheduled.sort_unstable();
        assert_eq!(scheduled, vec![1, 2, 3]);
        assert!(candidate.fitness > 0.0);
    }

    #[test]
    fn terminated_targets_are_never_redispatched() {
        let targets = vec![Target::new(1, [50.0, 50.0]), Target::new(2, [150.0, 20.0])];
        let terminated = vec![TaskRef { target: 1, order: 1 }];
        let mut search = SeadSearch::new(Vec::new(), SearchConfig {
            seed: Some(11),
            ..SearchConfig::default()
        });
        let candidate = search
            .solve(Duration::from_millis(20), &roster(targets, terminated), true)
            .unwrap();

        assert!(candidate.solution.genes.iter().all(|g| g.target != 1));
        assert!(candidate.solution.genes.iter().any(|g| g.target == 2));
    }

    #[test]
    fn all_terminated_yields_floor_fitness() {
        let targets = vec![Target::new(1, [50.0, 50.0])];
        let terminated = vec![TaskRef { target: 1, order: 1 }];
        let mut search = SeadSearch::new(Vec::new(), SearchConfig::default());
        let candidate = search
            .solve(Duration::from_millis(5), &roster(targets, terminated), true)
            .unwrap();
        assert!(candidate.solution.is_empty());
        assert!((candidate.fitness - 1e-5).abs() < f64::EPSILON);
    }
}
