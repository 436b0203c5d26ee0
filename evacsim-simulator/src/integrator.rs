use glam::DVec2;

use crate::{
    agents::{Agent, SimulationState},
    scenario::PhysicalConstants,
};

/// Whether an agent at `position` has reached the exit.
pub fn has_exited(position: DVec2, exit_center: DVec2, exit_radius: f64) -> bool {
    position.distance(exit_center) <= exit_radius
}

/// Advance every active agent of `state` by one time step under `forces`.
///
/// All agents are updated from `state` simultaneously and written to a new snapshot:
///
/// ```text
/// position' = position + dt * velocity
/// velocity' = velocity + dt * 0.5 * force / mass
/// ```
///
/// Agents landing within the exit radius are marked as exited. Exited agents are copied over
/// unchanged.
pub fn integrate(
    state: &SimulationState,
    forces: &[DVec2],
    constants: &PhysicalConstants,
    exit_center: DVec2,
) -> SimulationState {
    debug_assert_eq!(state.len(), forces.len());

    let dt = constants.time_step;
    let agents = state
        .agents
        .iter()
        .zip(forces)
        .map(|(agent, &force)| {
            if agent.exited {
                return *agent;
            }

            let acceleration = force / constants.agent_mass;
            let position = agent.position + dt * agent.velocity;
            let velocity = agent.velocity + dt * 0.5 * acceleration;

            Agent {
                position,
                velocity,
                exited: has_exited(position, exit_center, constants.exit_radius),
            }
        })
        .collect();

    SimulationState {
        step: state.step + 1,
        agents,
    }
}
