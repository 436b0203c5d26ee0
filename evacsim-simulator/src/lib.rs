pub mod agents;
pub mod diagnostic;
pub mod error;
pub mod geometry;
pub mod integrator;
pub mod models;
mod neighbor_grid;
pub mod sampler;
pub mod scenario;
pub mod trajectory;
pub mod util;

use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

use agents::{initialize_agents, SimulationState};
use diagnostic::{DiagnosticLog, StepMetrics};
use error::{ConfigError, Result};
use geometry::Geometry;
use glam::DVec2;
use integrator::integrate;
use log::{debug, info, warn};
use models::{compute_forces, ForceModel, SocialForceModel};
use sampler::{FixedPositions, PositionSampler, UniformSampler};
use scenario::Scenario;
use trajectory::Trajectory;

/// Simulator instance.
///
/// Owns the only mutable copy of the agent states. Each [`tick`](Simulator::tick) evaluates
/// forces on the current snapshot, integrates them into a fresh snapshot and appends it to
/// the trajectory.
pub struct Simulator {
    pub scenario: Scenario,
    pub options: SimulatorOptions,
    pub geometry: Geometry,
    pub model: Box<dyn ForceModel>,
    pub state: SimulationState,
    pub trajectory: Trajectory,
    pub diagnostic_log: DiagnosticLog,
}

impl Simulator {
    /// Create a simulator with agents placed as the scenario's population describes.
    pub fn new(scenario: Scenario, options: SimulatorOptions) -> Result<Self> {
        let population = &scenario.population;
        let mut sampler: Box<dyn PositionSampler> = if !population.positions.is_empty() {
            Box::new(FixedPositions::new(population.positions.clone()))
        } else if let Some(seed) = population.seed {
            Box::new(UniformSampler::with_seed(seed))
        } else {
            Box::new(UniformSampler::new())
        };

        Self::with_sampler(scenario, options, sampler.as_mut())
    }

    /// Create a simulator with agents placed by `sampler`.
    pub fn with_sampler(
        scenario: Scenario,
        options: SimulatorOptions,
        sampler: &mut dyn PositionSampler,
    ) -> Result<Self> {
        scenario.validate()?;
        let initial = initialize_agents(
            &scenario.population,
            &scenario.room,
            &scenario.constants,
            sampler,
        );

        Self::with_initial_state(scenario, options, initial)
    }

    /// Create a simulator starting from explicit agent states.
    ///
    /// The population count of `scenario` is ignored in favour of `initial`.
    pub fn with_initial_state(
        scenario: Scenario,
        options: SimulatorOptions,
        initial: SimulationState,
    ) -> Result<Self> {
        let geometry = Self::check(&scenario, &initial)?;
        let model = SocialForceModel::new(&options, &scenario, &geometry);

        Ok(Self::assemble(
            scenario,
            options,
            geometry,
            initial,
            Box::new(model),
        ))
    }

    /// Create a simulator driven by a custom force model.
    pub fn with_model(
        scenario: Scenario,
        options: SimulatorOptions,
        initial: SimulationState,
        model: Box<dyn ForceModel>,
    ) -> Result<Self> {
        let geometry = Self::check(&scenario, &initial)?;

        Ok(Self::assemble(scenario, options, geometry, initial, model))
    }

    fn check(scenario: &Scenario, initial: &SimulationState) -> Result<Geometry> {
        scenario.room.validate()?;
        scenario.constants.validate()?;
        if scenario.iterations == 0 {
            return Err(ConfigError::NoIterations);
        }
        if initial.is_empty() {
            return Err(ConfigError::NoAgents);
        }

        Geometry::from_room(&scenario.room)
    }

    fn assemble(
        scenario: Scenario,
        options: SimulatorOptions,
        geometry: Geometry,
        initial: SimulationState,
        model: Box<dyn ForceModel>,
    ) -> Self {
        info!("Simulator initialization finished");
        info!(
            "Room size: {}, exit: ({}, {}) on the {:?} wall, wall points: {}, agents: {}",
            geometry.size,
            geometry.exit_center.x,
            geometry.exit_center.y,
            geometry.exit_side,
            geometry.wall_points.len(),
            initial.len(),
        );
        info!("Simulator options: {options:#?}");

        let diagnostic_log = DiagnosticLog {
            scenario: toml::to_string(&scenario).unwrap_or_default(),
            ..Default::default()
        };

        Simulator {
            scenario,
            options,
            geometry,
            model,
            trajectory: Trajectory::new(initial.clone()),
            state: initial,
            diagnostic_log,
        }
    }

    /// Number of steps taken so far.
    pub fn step(&self) -> usize {
        self.state.step
    }

    pub fn is_finished(&self) -> bool {
        self.state.step >= self.scenario.iterations
    }

    /// Advance the simulation by one step.
    ///
    /// Returns `None` without touching the state once every iteration has run.
    pub fn tick(&mut self) -> Option<StepMetrics> {
        if self.is_finished() {
            return None;
        }

        let instant = Instant::now();

        self.model.prepare(&self.state);
        let agent_forces = compute_forces(self.model.as_ref(), &self.state, self.options.parallel);

        let time_calc_forces = instant.elapsed().as_secs_f64();
        let instant = Instant::now();

        let mut forces: Vec<DVec2> = Vec::with_capacity(agent_forces.len());
        let mut contact_count = 0;
        for agent_force in agent_forces {
            forces.push(agent_force.force);
            contact_count += agent_force.contacts.len();
            self.diagnostic_log.extend_contacts(agent_force.contacts);
        }
        let mass = self.scenario.constants.agent_mass;
        let accelerations: Vec<DVec2> = forces.iter().map(|&force| force / mass).collect();

        let next = integrate(
            &self.state,
            &forces,
            &self.scenario.constants,
            self.geometry.exit_center,
        );

        let time_integrate = instant.elapsed().as_secs_f64();

        let mut exited_count = 0;
        for (i, (prev, agent)) in self.state.agents.iter().zip(&next.agents).enumerate() {
            if agent.exited && !prev.exited {
                info!("Agent {i} exited at step {}", next.step);
                exited_count += 1;
            }
        }

        let metrics = StepMetrics {
            step: next.step,
            active_agent_count: next.active_count(),
            exited_count,
            contact_count,
            time_calc_forces,
            time_integrate,
        };
        debug!(
            "Step: {:6}, Active agents: {:4}, Contacts: {:4}",
            metrics.step, metrics.active_agent_count, metrics.contact_count
        );

        self.trajectory.push(accelerations, next.clone());
        self.state = next;
        self.diagnostic_log.push(metrics.clone());

        Some(metrics)
    }

    /// Run the remaining iterations.
    pub fn run(&mut self) -> &Trajectory {
        while self.tick().is_some() {}
        &self.trajectory
    }

    /// Run the remaining iterations, stopping early once `cancel` is set.
    ///
    /// The flag is checked between steps. Returns `true` when every iteration completed.
    pub fn run_with_cancel(&mut self, cancel: &AtomicBool) -> bool {
        while !self.is_finished() {
            if cancel.load(Ordering::SeqCst) {
                warn!(
                    "Simulation cancelled after {} of {} steps",
                    self.step(),
                    self.scenario.iterations
                );
                return false;
            }
            self.tick();
        }
        true
    }

    pub fn into_trajectory(self) -> Trajectory {
        self.trajectory
    }
}

/// Run `scenario` to completion with default options and return the full history.
pub fn run_simulation(scenario: Scenario) -> Result<Trajectory> {
    let mut simulator = Simulator::new(scenario, SimulatorOptions::default())?;
    simulator.run();
    Ok(simulator.into_trajectory())
}

/// Simulator options.
#[derive(Debug, Clone)]
pub struct SimulatorOptions {
    /// Whether to use the neighbor search grid for agent-agent interactions.
    pub use_neighbor_grid: bool,
    /// Whether to evaluate forces on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        SimulatorOptions {
            use_neighbor_grid: true,
            parallel: true,
        }
    }
}
