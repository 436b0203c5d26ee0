use thiserror::Error;

/// Result type used by the simulator setup path.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Fatal configuration errors.
///
/// These are raised while a [`Scenario`](crate::scenario::Scenario) is validated or while the
/// simulator is set up, never from inside the step loop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("room size must be positive and finite, got {0}")]
    RoomSize(f64),

    #[error("exit width must be positive and finite, got {0}")]
    ExitWidth(f64),

    #[error("exit center ({x}, {y}) does not lie on the boundary of a room of size {size}")]
    ExitOffBoundary { x: f64, y: f64, size: f64 },

    #[error(
        "exit width {width} consumes the whole wall of a room of size {size}; \
         set `allow_degenerate_exit` to accept this"
    )]
    DegenerateExit { width: f64, size: f64 },

    #[error("wall division count must be at least 1")]
    WallDivisions,

    #[error("agent count must be at least 1")]
    NoAgents,

    #[error("{given} initial positions were given for {count} agents")]
    PositionCount { given: usize, count: usize },

    #[error("spawn margin {margin} leaves no room to place agents in a room of size {size}")]
    SpawnMargin { margin: f64, size: f64 },

    #[error("iteration count must be at least 1")]
    NoIterations,

    #[error("physical constant `{name}` must be positive and finite, got {value}")]
    Constant { name: &'static str, value: f64 },
}
