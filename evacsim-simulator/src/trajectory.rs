use glam::DVec2;
use serde::Serialize;

use crate::agents::SimulationState;

/// Time-ordered history of simulation snapshots.
///
/// Index `k` holds the state after `k` steps, so a finished run of `n` iterations has `n + 1`
/// entries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Trajectory {
    pub states: Vec<SimulationState>,
    /// `accelerations[k][i]` is the acceleration agent `i` was integrated with when going from
    /// `states[k]` to `states[k + 1]`. Zero for agents that had already exited.
    pub accelerations: Vec<Vec<DVec2>>,
}

impl Trajectory {
    pub fn new(initial: SimulationState) -> Self {
        Trajectory {
            states: vec![initial],
            accelerations: Vec::new(),
        }
    }

    /// Append the state reached by integrating the last one with `accelerations`.
    pub fn push(&mut self, accelerations: Vec<DVec2>, state: SimulationState) {
        debug_assert_eq!(accelerations.len(), state.len());
        self.accelerations.push(accelerations);
        self.states.push(state);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn final_state(&self) -> Option<&SimulationState> {
        self.states.last()
    }

    /// First step at which `agent` is marked as exited.
    pub fn exit_step(&self, agent: usize) -> Option<usize> {
        self.states
            .iter()
            .position(|s| s.agents.get(agent).is_some_and(|a| a.exited))
    }

    pub fn exited_count(&self) -> usize {
        self.final_state()
            .map_or(0, |s| s.len() - s.active_count())
    }

    /// Positions of `agent` over time.
    pub fn path(&self, agent: usize) -> impl Iterator<Item = DVec2> + '_ {
        self.states
            .iter()
            .filter_map(move |s| s.agents.get(agent).map(|a| a.position))
    }
}

#[cfg(test)]
mod tests {
    use glam::dvec2;

    use super::*;
    use crate::agents::Agent;

    fn state(step: usize, agents: &[(f64, bool)]) -> SimulationState {
        SimulationState {
            step,
            agents: agents
                .iter()
                .map(|&(x, exited)| Agent {
                    position: dvec2(x, 0.0),
                    velocity: DVec2::ZERO,
                    exited,
                })
                .collect(),
        }
    }

    #[test]
    fn test_exit_bookkeeping() {
        let mut trajectory = Trajectory::new(state(0, &[(3.0, false), (5.0, false)]));
        trajectory.push(
            vec![dvec2(-1.0, 0.0); 2],
            state(1, &[(2.0, false), (4.0, false)]),
        );
        trajectory.push(
            vec![dvec2(-1.0, 0.0); 2],
            state(2, &[(1.0, true), (3.0, false)]),
        );

        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.accelerations.len(), 2);
        assert_eq!(trajectory.exit_step(0), Some(2));
        assert_eq!(trajectory.exit_step(1), None);
        assert_eq!(trajectory.exit_step(7), None);
        assert_eq!(trajectory.exited_count(), 1);

        let xs: Vec<f64> = trajectory.path(0).map(|p| p.x).collect();
        assert_eq!(xs, vec![3.0, 2.0, 1.0]);
    }
}
