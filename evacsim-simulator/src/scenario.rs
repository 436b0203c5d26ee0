use glam::{dvec2, DVec2};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    geometry::ExitSide,
};

/// Scenario data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub room: RoomConfig,
    pub population: PopulationConfig,
    pub constants: PhysicalConstants,
    /// Number of integration steps to run.
    pub iterations: usize,
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario {
            room: RoomConfig::default(),
            population: PopulationConfig::default(),
            constants: PhysicalConstants::default(),
            iterations: 100,
        }
    }
}

impl Scenario {
    /// Reject configurations the simulator cannot run.
    pub fn validate(&self) -> Result<()> {
        self.room.validate()?;
        self.population.validate(&self.room)?;
        self.constants.validate()?;

        if self.iterations == 0 {
            return Err(ConfigError::NoIterations);
        }

        Ok(())
    }
}

/// Square room with a single exit gap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Side length. (meters)
    pub size: f64,
    /// Center of the exit gap. Defaults to the middle of the left wall.
    pub exit_center: Option<DVec2>,
    /// Width of the exit gap. (meters)
    pub exit_width: f64,
    /// Number of segments each wall is divided into.
    pub wall_divisions: usize,
    /// Accept an exit at least as wide as the room, which removes its wall entirely.
    pub allow_degenerate_exit: bool,
}

impl Default for RoomConfig {
    fn default() -> Self {
        RoomConfig {
            size: 50.0,
            exit_center: None,
            exit_width: 2.0,
            wall_divisions: 200,
            allow_degenerate_exit: false,
        }
    }
}

impl RoomConfig {
    pub fn exit_center(&self) -> DVec2 {
        self.exit_center
            .unwrap_or_else(|| dvec2(0.0, self.size * 0.5))
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(ConfigError::RoomSize(self.size));
        }
        if !(self.exit_width.is_finite() && self.exit_width > 0.0) {
            return Err(ConfigError::ExitWidth(self.exit_width));
        }
        if self.wall_divisions == 0 {
            return Err(ConfigError::WallDivisions);
        }
        ExitSide::locate(self.size, self.exit_center())?;
        if self.exit_width >= self.size && !self.allow_degenerate_exit {
            return Err(ConfigError::DegenerateExit {
                width: self.exit_width,
                size: self.size,
            });
        }

        Ok(())
    }
}

/// Initial population of the room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub count: usize,
    /// Distance from the walls kept free when sampling initial positions. (meters)
    pub spawn_margin: f64,
    /// Seed of the placement sampler. A random seed is used when absent.
    pub seed: Option<u64>,
    /// Initial speed towards the exit as a fraction of the maximum desired speed.
    pub initial_speed_factor: f64,
    /// Explicit initial positions. When non-empty it replaces sampling and must hold
    /// exactly `count` entries.
    pub positions: Vec<DVec2>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        PopulationConfig {
            count: 20,
            spawn_margin: 5.0,
            seed: None,
            initial_speed_factor: 0.5,
            positions: Vec::new(),
        }
    }
}

impl PopulationConfig {
    pub fn validate(&self, room: &RoomConfig) -> Result<()> {
        if self.count == 0 {
            return Err(ConfigError::NoAgents);
        }

        if self.positions.is_empty() {
            if !(self.spawn_margin.is_finite() && 2.0 * self.spawn_margin < room.size) {
                return Err(ConfigError::SpawnMargin {
                    margin: self.spawn_margin,
                    size: room.size,
                });
            }
        } else if self.positions.len() != self.count {
            return Err(ConfigError::PositionCount {
                given: self.positions.len(),
                count: self.count,
            });
        }

        Ok(())
    }
}

/// Physical constants of the force model.
///
/// The contact margin and exit radius are empirical values carried over from the reference
/// model; both are tunable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// Radius of an agent. (meters)
    pub agent_radius: f64,
    /// Mass of an agent. (kg)
    pub agent_mass: f64,
    /// Relaxation time of the desired force. (seconds)
    pub relaxation_time: f64,
    /// Integration time step. (seconds)
    pub time_step: f64,
    /// Strength `A` of the social force. (N)
    pub social_strength: f64,
    /// Range `B` of the social force. (meters)
    pub social_range: f64,
    /// Maximum desired speed. (m/s)
    pub max_desired_speed: f64,
    /// Stiffness of agent-agent contact.
    pub agent_contact_stiffness: f64,
    /// Stiffness of agent-wall contact.
    pub wall_contact_stiffness: f64,
    /// Extra clearance subtracted from the gap before contact is considered. (meters)
    pub contact_margin: f64,
    /// Distance to the exit center at which an agent counts as evacuated. (meters)
    pub exit_radius: f64,
    /// Reach of the social force exerted by wall points. Half the room size when absent.
    pub wall_interaction_radius: Option<f64>,
    /// Friction between agents. Carried for completeness, not used by the force model.
    pub friction_agents: f64,
    /// Friction against walls. Carried for completeness, not used by the force model.
    pub friction_walls: f64,
    /// Distance below which two points are treated as coincident.
    pub direction_epsilon: f64,
    /// Scale applied to the direction between coincident points.
    pub direction_fallback_scale: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        PhysicalConstants {
            agent_radius: 0.5,
            agent_mass: 75.0,
            relaxation_time: 0.5,
            time_step: 5f64.powi(-4),
            social_strength: 2000.0,
            social_range: 0.08,
            max_desired_speed: 2f64.sqrt() * 1e3,
            agent_contact_stiffness: 1.2e6,
            wall_contact_stiffness: 2.4e6,
            contact_margin: 1.0,
            exit_radius: 2f64.sqrt() / 2.0,
            wall_interaction_radius: None,
            friction_agents: 0.15,
            friction_walls: 0.35,
            direction_epsilon: 1e-20,
            direction_fallback_scale: 1e20,
        }
    }
}

impl PhysicalConstants {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("agent_radius", self.agent_radius),
            ("agent_mass", self.agent_mass),
            ("relaxation_time", self.relaxation_time),
            ("time_step", self.time_step),
            ("social_range", self.social_range),
            ("exit_radius", self.exit_radius),
            ("direction_epsilon", self.direction_epsilon),
            ("direction_fallback_scale", self.direction_fallback_scale),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Constant { name, value });
            }
        }

        let finite = [
            ("social_strength", self.social_strength),
            ("max_desired_speed", self.max_desired_speed),
            ("agent_contact_stiffness", self.agent_contact_stiffness),
            ("wall_contact_stiffness", self.wall_contact_stiffness),
            ("contact_margin", self.contact_margin),
            (
                "wall_interaction_radius",
                self.wall_interaction_radius.unwrap_or_default(),
            ),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::Constant { name, value });
            }
        }

        Ok(())
    }

    /// Farthest center distance at which two agents still interact.
    pub fn agent_interaction_range(&self) -> f64 {
        let diameter = 2.0 * self.agent_radius;
        diameter.max(diameter + self.contact_margin)
    }
}
