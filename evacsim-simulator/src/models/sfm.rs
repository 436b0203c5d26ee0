use glam::DVec2;

use crate::{
    agents::{Agent, SimulationState},
    diagnostic::{ContactEvent, ContactTarget},
    geometry::Geometry,
    neighbor_grid::NeighborGrid,
    scenario::{PhysicalConstants, Scenario},
    util::{contact_indicator, interaction_direction},
    SimulatorOptions,
};

use super::{AgentForce, ForceModel};

/// Social force model with exponential repulsion and penalty contact.
///
/// The net force on an agent is the sum of
/// - a desired force relaxing its velocity towards the exit at maximum desired speed,
/// - a social force repelling it from nearby agents and wall points,
/// - a contact force pushing it out of agents and wall points it overlaps.
pub struct SocialForceModel {
    constants: PhysicalConstants,
    exit_center: DVec2,
    room_center: DVec2,
    wall_points: Vec<DVec2>,
    wall_interaction_radius: f64,
    neighbor_grid: Option<NeighborGrid>,
}

impl ForceModel for SocialForceModel {
    fn new(options: &SimulatorOptions, scenario: &Scenario, geometry: &Geometry) -> Self {
        let constants = scenario.constants.clone();
        let wall_interaction_radius = constants
            .wall_interaction_radius
            .unwrap_or(0.5 * geometry.size);
        let neighbor_grid = options
            .use_neighbor_grid
            .then(|| NeighborGrid::new(geometry.size, constants.agent_interaction_range()));

        SocialForceModel {
            constants,
            exit_center: geometry.exit_center,
            room_center: DVec2::splat(0.5 * geometry.size),
            wall_points: geometry.wall_points.clone(),
            wall_interaction_radius,
            neighbor_grid,
        }
    }

    fn prepare(&mut self, state: &SimulationState) {
        if let Some(grid) = &mut self.neighbor_grid {
            grid.update_only_active(&state.agents);
        }
    }

    fn agent_force(&self, index: usize, state: &SimulationState) -> AgentForce {
        let agent = &state.agents[index];
        let mut contacts = Vec::new();

        let force = self.desired_force(agent)
            + self.social_force(index, state)
            + self.contact_force(index, state, &mut contacts);

        AgentForce { force, contacts }
    }
}

/// Direction agent `j` pushes agent `index` in when the two sit on the same point.
///
/// Antisymmetric in the pair, so that coincident agents are driven apart.
fn coincident_direction(index: usize, j: usize) -> DVec2 {
    if index < j {
        DVec2::X
    } else {
        DVec2::NEG_X
    }
}

impl SocialForceModel {
    fn direction(&self, p: DVec2, q: DVec2, coincident: impl FnOnce() -> DVec2) -> DVec2 {
        interaction_direction(
            p,
            q,
            self.constants.direction_epsilon,
            self.constants.direction_fallback_scale,
            coincident,
        )
    }

    /// Unit vector from the wall point `w` into the room.
    fn inward(&self, w: DVec2) -> DVec2 {
        (self.room_center - w).try_normalize().unwrap_or(DVec2::X)
    }

    /// Active agents other than `index` that may interact with it, in ascending order.
    fn partners(&self, index: usize, state: &SimulationState) -> Vec<usize> {
        let candidates = match &self.neighbor_grid {
            Some(grid) => grid.neighbors(state.agents[index].position),
            None => (0..state.len()).collect(),
        };

        candidates
            .into_iter()
            .filter(|&j| j != index && state.agents[j].is_active())
            .collect()
    }

    /// Force relaxing the velocity of `agent` towards the exit at maximum desired speed.
    pub fn desired_force(&self, agent: &Agent) -> DVec2 {
        let c = &self.constants;
        let e = (self.exit_center - agent.position).normalize_or_zero();
        let desired_velocity = c.max_desired_speed * e;

        (c.agent_mass / c.relaxation_time) * (desired_velocity - agent.velocity)
    }

    /// Social repulsion exerted by an agent at `q` on an agent at `p`.
    ///
    /// Zero once the centers are a diameter apart or farther. `coincident` is the push
    /// direction used when `p == q`.
    pub fn pair_social_force(&self, p: DVec2, q: DVec2, coincident: DVec2) -> DVec2 {
        let c = &self.constants;
        let reach = 2.0 * c.agent_radius;
        let distance = p.distance(q);

        if distance < reach {
            c.social_strength
                * ((reach - distance) / c.social_range).exp()
                * self.direction(p, q, || coincident)
        } else {
            DVec2::ZERO
        }
    }

    /// Social repulsion exerted by the wall point `w` on an agent at `p`.
    pub fn wall_social_force(&self, p: DVec2, w: DVec2) -> DVec2 {
        let c = &self.constants;
        let distance = p.distance(w);

        if distance - c.agent_radius <= self.wall_interaction_radius {
            c.social_strength
                * ((c.agent_radius - distance) / c.social_range).exp()
                * self.direction(p, w, || self.inward(w))
        } else {
            DVec2::ZERO
        }
    }

    /// Total social repulsion on agent `index` from active agents and walls.
    pub fn social_force(&self, index: usize, state: &SimulationState) -> DVec2 {
        let p = state.agents[index].position;

        let from_agents: DVec2 = self
            .partners(index, state)
            .into_iter()
            .map(|j| {
                let q = state.agents[j].position;
                self.pair_social_force(p, q, coincident_direction(index, j))
            })
            .sum();
        let from_walls: DVec2 = self
            .wall_points
            .iter()
            .map(|&w| self.wall_social_force(p, w))
            .sum();

        from_agents + from_walls
    }

    /// Total contact force on agent `index`.
    ///
    /// Each overlapping agent or wall point is recorded in `contacts`.
    pub fn contact_force(
        &self,
        index: usize,
        state: &SimulationState,
        contacts: &mut Vec<ContactEvent>,
    ) -> DVec2 {
        let c = &self.constants;
        let p = state.agents[index].position;
        let mut force = DVec2::ZERO;

        let mut touch = |q: DVec2, radius: f64, stiffness: f64, target: ContactTarget| {
            let gap = p.distance(q) - radius - c.contact_margin;
            if gap > 0.0 {
                return;
            }
            contacts.push(ContactEvent {
                step: state.step,
                agent: index,
                target,
                gap,
            });
            let coincident = || match target {
                ContactTarget::Agent(j) => coincident_direction(index, j),
                ContactTarget::Wall(_) => self.inward(q),
            };
            force += stiffness * -contact_indicator(gap) * self.direction(p, q, coincident);
        };

        for j in self.partners(index, state) {
            touch(
                state.agents[j].position,
                2.0 * c.agent_radius,
                c.agent_contact_stiffness,
                ContactTarget::Agent(j),
            );
        }
        for (w, &q) in self.wall_points.iter().enumerate() {
            touch(
                q,
                c.agent_radius,
                c.wall_contact_stiffness,
                ContactTarget::Wall(w),
            );
        }

        force
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;
    use glam::dvec2;

    use super::*;

    fn model_with(options: &SimulatorOptions, scenario: &Scenario) -> SocialForceModel {
        let geometry = Geometry::from_room(&scenario.room).unwrap();
        SocialForceModel::new(options, scenario, &geometry)
    }

    fn model() -> SocialForceModel {
        let options = SimulatorOptions {
            use_neighbor_grid: false,
            ..Default::default()
        };
        model_with(&options, &Scenario::default())
    }

    fn state(positions: &[DVec2]) -> SimulationState {
        SimulationState::new(
            positions
                .iter()
                .map(|&p| Agent::new(p, DVec2::ZERO))
                .collect(),
        )
    }

    #[test]
    fn test_desired_force() {
        let model = model();
        let c = PhysicalConstants::default();

        let agent = Agent::new(dvec2(10.0, 25.0), DVec2::ZERO);
        let f = model.desired_force(&agent);
        assert_float_relative_eq!(f.x, -150.0 * c.max_desired_speed);
        assert_float_absolute_eq!(f.y, 0.0);

        let agent = Agent::new(dvec2(10.0, 25.0), dvec2(-c.max_desired_speed, 0.0));
        assert_float_absolute_eq!(model.desired_force(&agent).length(), 0.0, 1e-6);
    }

    #[test]
    fn test_pair_social_force_symmetric() {
        let model = model();
        let p = dvec2(20.0, 20.0);
        let q = dvec2(20.6, 20.3);

        let f_pq = model.pair_social_force(p, q, DVec2::X);
        let f_qp = model.pair_social_force(q, p, DVec2::NEG_X);
        assert!(f_pq.length() > 0.0);
        assert_float_relative_eq!(f_pq.x, -f_qp.x);
        assert_float_relative_eq!(f_pq.y, -f_qp.y);
        // Pushes p away from q.
        assert!(f_pq.dot(p - q) > 0.0);
    }

    #[test]
    fn test_pair_social_force_decreases_to_zero() {
        let model = model();
        let p = dvec2(20.0, 20.0);

        let mut prev = f64::INFINITY;
        for k in 1..100 {
            let d = k as f64 * 0.01;
            let f = model.pair_social_force(p, p + dvec2(d, 0.0), DVec2::X).length();
            assert!(f < prev, "not decreasing at d = {d}");
            prev = f;
        }

        for d in [1.0, 1.0001, 1.5, 3.0] {
            assert_eq!(
                model.pair_social_force(p, p + dvec2(0.0, d), DVec2::X),
                DVec2::ZERO
            );
        }
    }

    #[test]
    fn test_social_force_ignores_exited_agents() {
        let model = model();
        let mut state = state(&[dvec2(25.0, 25.0), dvec2(25.5, 25.0)]);

        let before = model.social_force(0, &state);
        assert!(before.x < -1000.0);

        state.agents[1].exited = true;
        let after = model.social_force(0, &state);
        assert!(after.length() < 1e-6);
    }

    #[test]
    fn test_wall_social_force_range() {
        let model = model();
        let p = dvec2(25.0, 0.6);

        let near = model.wall_social_force(p, dvec2(25.0, 0.0));
        assert_float_relative_eq!(near.y, 2000.0 * (-0.1f64 / 0.08).exp());
        assert_float_absolute_eq!(near.x, 0.0);

        // Beyond half the room size plus a radius.
        assert_eq!(
            model.wall_social_force(p, dvec2(25.0, 26.2)),
            DVec2::ZERO
        );
    }

    #[test]
    fn test_agent_contact() {
        let model = model();
        let state = state(&[dvec2(25.0, 25.0), dvec2(26.5, 25.0), dvec2(30.0, 25.0)]);

        let mut contacts = Vec::new();
        let f0 = model.contact_force(0, &state, &mut contacts);
        let f1 = model.contact_force(1, &state, &mut contacts);

        assert_float_relative_eq!(f0.x, -1.2e6 * 0.5);
        assert_float_relative_eq!(f1.x, 1.2e6 * 0.5);
        assert_float_absolute_eq!(f0.y, 0.0);
        assert_eq!(
            contacts,
            vec![
                ContactEvent {
                    step: 0,
                    agent: 0,
                    target: ContactTarget::Agent(1),
                    gap: -0.5
                },
                ContactEvent {
                    step: 0,
                    agent: 1,
                    target: ContactTarget::Agent(0),
                    gap: -0.5
                },
            ]
        );

        let mut contacts = Vec::new();
        let f2 = model.contact_force(2, &state, &mut contacts);
        assert_eq!(f2, DVec2::ZERO);
        assert!(contacts.is_empty());
    }

    #[test]
    fn test_wall_contact() {
        let model = model();
        let state = state(&[dvec2(1.2, 10.0)]);

        let mut contacts = Vec::new();
        let f = model.contact_force(0, &state, &mut contacts);

        assert!(f.x > 0.0);
        assert_float_absolute_eq!(f.y, 0.0, 1e-6);
        assert!(!contacts.is_empty());
        assert!(contacts
            .iter()
            .all(|e| matches!(e.target, ContactTarget::Wall(_)) && e.gap <= 0.0));
    }

    #[test]
    fn test_coincident_agents() {
        let model = model();
        let state = state(&[dvec2(25.0, 25.0), dvec2(25.0, 25.0)]);

        let AgentForce { force, contacts } = model.agent_force(0, &state);
        assert!(force.is_finite());
        assert!(force.x > 1e20);
        assert_eq!(contacts.len(), 1);

        // Equal and opposite up to the shared desired and wall terms.
        let other = model.agent_force(1, &state).force;
        assert!(other.x < -1e20);
        assert!((force + other).length() < 1e-9 * force.length());
    }

    #[test]
    fn test_agent_on_wall_point_pushed_inward() {
        let model = model();
        let state = state(&[dvec2(0.0, 10.0)]);

        let mut contacts = Vec::new();
        let f = model.contact_force(0, &state, &mut contacts);

        assert!(f.is_finite());
        assert!(f.x > 1e20);
        assert!(contacts.iter().any(|e| e.gap < -1.0));
    }

    #[test]
    fn test_neighbor_grid_matches_all_pairs() {
        let scenario = Scenario::default();
        let mut with_grid = model_with(&SimulatorOptions::default(), &scenario);
        let without_grid = model();

        let mut rng = fastrand::Rng::with_seed(11);
        let positions: Vec<DVec2> = (0..150)
            .map(|_| dvec2(rng.f64() * 12.0 - 1.0, rng.f64() * 12.0 + 20.0))
            .collect();
        let mut state = state(&positions);
        for i in (0..150).step_by(7) {
            state.agents[i].exited = true;
        }

        with_grid.prepare(&state);
        for (i, _) in state.active() {
            assert_eq!(
                with_grid.agent_force(i, &state),
                without_grid.agent_force(i, &state)
            );
        }
    }
}
