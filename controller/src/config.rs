//! Scenario configuration for the simulation binary

use crate::controller::VehicleSpec;
use crate::error::{ControllerError, ControllerResult};
use serde::{Deserialize, Serialize};
use shared::types::{Target, VehicleClass};
use std::path::Path;

/// Full mission scenario: swarm, known targets, hidden targets, tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub vehicles: Vec<VehicleInstance>,
    /// Target sites known at mission init
    pub targets: Vec<[f64; 2]>,
    /// Targets that exist but must be discovered in flight
    #[serde(default)]
    pub hidden_targets: Vec<[f64; 2]>,
    #[serde(default = "default_waypoint_radius")]
    pub waypoint_radius: f64,
    #[serde(default = "default_sensing_range")]
    pub sensing_range: f64,
    /// Allocator search slice, milliseconds
    #[serde(default = "default_time_slice_ms")]
    pub time_slice_ms: u64,
    #[serde(default = "default_population_size")]
    pub population_size: usize,
}

/// One vehicle of the swarm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleInstance {
    pub id: u32,
    pub class: VehicleClass,
    pub cruise_speed: f64,
    pub min_turn_radius: f64,
    /// Initial pose: x, y, heading (rad)
    pub start: [f64; 3],
    /// Home plate: x, y, arrival heading (rad)
    pub base: [f64; 3],
}

fn default_waypoint_radius() -> f64 {
    5.0
}

fn default_sensing_range() -> f64 {
    50.0
}

fn default_time_slice_ms() -> u64 {
    300
}

fn default_population_size() -> usize {
    100
}

impl Scenario {
    pub fn from_file(path: &Path) -> ControllerResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let scenario: Scenario = serde_json::from_str(&raw)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> ControllerResult<()> {
        if self.vehicles.is_empty() {
            return Err(ControllerError::Scenario {
                reason: "no vehicles".to_string(),
            });
        }
        let mut ids: Vec<u32> = self.vehicles.iter().map(|v| v.id).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.len() != self.vehicles.len() {
            return Err(ControllerError::Scenario {
                reason: "duplicate vehicle ids".to_string(),
            });
        }
        if self
            .vehicles
            .iter()
            .any(|v| v.cruise_speed <= 0.0 || v.min_turn_radius <= 0.0)
        {
            return Err(ControllerError::Scenario {
                reason: "cruise speed and turn radius must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Initial known target set, numbered from 1 in listing order
    pub fn initial_targets(&self) -> Vec<Target> {
        self.targets
            .iter()
            .enumerate()
            .map(|(i, p)| Target::new((i + 1) as u32, *p))
            .collect()
    }

    pub fn spec_for(&self, vehicle: &VehicleInstance) -> VehicleSpec {
        VehicleSpec {
            id: vehicle.id,
            class: vehicle.class,
            cruise_speed: vehicle.cruise_speed,
            min_turn_radius: vehicle.min_turn_radius,
            base: vehicle.base,
            sensing_range: self.sensing_range,
            waypoint_radius: self.waypoint_radius,
        }
    }

    /// Built-in three-vehicle demo used when no scenario file is given
    pub fn demo() -> Self {
        Self {
            vehicles: vec![
                VehicleInstance {
                    id: 1,
                    class: VehicleClass::Combat,
                    cruise_speed: 12.0,
                    min_turn_radius: 25.0,
                    start: [0.0, 0.0, 0.0],
                    base: [0.0, 0.0, std::f64::consts::PI],
                },
                VehicleInstance {
                    id: 2,
                    class: VehicleClass::Combat,
                    cruise_speed: 10.0,
                    min_turn_radius: 20.0,
                    start: [50.0, -20.0, 0.5],
                    base: [50.0, -20.0, std::f64::consts::PI],
                },
                VehicleInstance {
                    id: 3,
                    class: VehicleClass::Munition,
                    cruise_speed: 14.0,
                    min_turn_radius: 30.0,
                    start: [-40.0, 30.0, -0.5],
                    base: [-40.0, 30.0, std::f64::consts::PI],
                },
            ],
            targets: vec![[400.0, 300.0], [550.0, -100.0], [250.0, 450.0], [600.0, 200.0]],
            hidden_targets: vec![[350.0, 100.0]],
            waypoint_radius: default_waypoint_radius(),
            sensing_range: default_sensing_range(),
            time_slice_ms: default_time_slice_ms(),
            population_size: default_population_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_scenario_is_valid() {
        let scenario = Scenario::demo();
        assert!(scenario.validate().is_ok());
        assert_eq!(scenario.initial_targets().len(), 4);
        assert_eq!(scenario.initial_targets()[0].id, 1);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut scenario = Scenario::demo();
        scenario.vehicles[1].id = scenario.vehicles[0].id;
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn scenario_round_trips_through_json() {
        let scenario = Scenario::demo();
        let json = serde_json::to_string(&scenario).unwrap();
        let back: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(back.vehicles.len(), scenario.vehicles.len());
        assert_eq!(back.targets, scenario.targets);
    }
}
