mod sfm;

use glam::DVec2;
use rayon::prelude::*;

use crate::{
    agents::SimulationState, diagnostic::ContactEvent, geometry::Geometry, scenario::Scenario,
    SimulatorOptions,
};

pub use self::sfm::SocialForceModel;

pub trait ForceModel: Send + Sync {
    fn new(options: &SimulatorOptions, scenario: &Scenario, geometry: &Geometry) -> Self
    where
        Self: Sized;

    /// Refresh lookup structures for the snapshot about to be evaluated.
    fn prepare(&mut self, _state: &SimulationState) {}

    /// Net force on the active agent `index`, computed from `state` alone.
    fn agent_force(&self, index: usize, state: &SimulationState) -> AgentForce;
}

/// Force acting on one agent and the contacts found while computing it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentForce {
    pub force: DVec2,
    pub contacts: Vec<ContactEvent>,
}

/// Evaluate the force on every agent of `state`.
///
/// Exited agents get a zero force. Every entry depends on `state` only, so the agents can be
/// evaluated in parallel without changing the result.
pub fn compute_forces(
    model: &dyn ForceModel,
    state: &SimulationState,
    parallel: bool,
) -> Vec<AgentForce> {
    let force = |i: usize| {
        if state.agents[i].exited {
            AgentForce::default()
        } else {
            model.agent_force(i, state)
        }
    };

    if parallel {
        (0..state.len()).into_par_iter().map(force).collect()
    } else {
        (0..state.len()).map(force).collect()
    }
}
