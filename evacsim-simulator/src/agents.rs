use glam::{dvec2, DVec2};
use log::debug;
use serde::Serialize;

use crate::{
    sampler::PositionSampler,
    scenario::{PhysicalConstants, PopulationConfig, RoomConfig},
};

/// Agent instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Agent {
    pub position: DVec2,
    pub velocity: DVec2,
    /// Set once the agent reaches the exit. Never cleared.
    pub exited: bool,
}

impl Agent {
    pub fn new(position: DVec2, velocity: DVec2) -> Self {
        Agent {
            position,
            velocity,
            exited: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.exited
    }
}

/// Snapshot of every agent after `step` integration steps.
///
/// Agents are addressed by their index, which stays stable for the whole run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationState {
    pub step: usize,
    pub agents: Vec<Agent>,
}

impl SimulationState {
    pub fn new(agents: Vec<Agent>) -> Self {
        SimulationState { step: 0, agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_active()).count()
    }

    /// Iterate over the indices and records of agents that have not exited.
    pub fn active(&self) -> impl Iterator<Item = (usize, &Agent)> {
        self.agents.iter().enumerate().filter(|(_, a)| a.is_active())
    }
}

/// Create the initial population.
///
/// Positions come from `sampler`, drawn within `spawn_margin` of the walls. Each agent starts
/// moving towards the exit at `initial_speed_factor` times the maximum desired speed.
pub fn initialize_agents(
    population: &PopulationConfig,
    room: &RoomConfig,
    constants: &PhysicalConstants,
    sampler: &mut dyn PositionSampler,
) -> SimulationState {
    let margin = population.spawn_margin;
    let min = dvec2(margin, margin);
    let max = DVec2::splat(room.size - margin);
    let exit_center = room.exit_center();
    let initial_speed = population.initial_speed_factor * constants.max_desired_speed;

    let agents = (0..population.count)
        .map(|_| {
            let position = sampler.sample(min, max);
            let direction = (exit_center - position).normalize_or_zero();
            Agent::new(position, initial_speed * direction)
        })
        .collect();

    debug!("Initialized {} agents", population.count);

    SimulationState::new(agents)
}
