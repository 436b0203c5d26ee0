use glam::{dvec2, DVec2};
use log::warn;

use crate::{
    error::{ConfigError, Result},
    scenario::RoomConfig,
};

/// Wall of the room the exit is cut into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitSide {
    /// `x = 0`
    Left,
    /// `y = 0`
    Bottom,
    /// `x = size`
    Right,
    /// `y = size`
    Top,
}

impl ExitSide {
    const ALL: [ExitSide; 4] = [
        ExitSide::Left,
        ExitSide::Bottom,
        ExitSide::Right,
        ExitSide::Top,
    ];

    /// Find the wall that contains `exit_center`.
    ///
    /// An exit placed on a corner belongs to the first matching wall in the order left, bottom,
    /// right, top.
    pub fn locate(size: f64, exit_center: DVec2) -> Result<Self> {
        let tolerance = size * 1e-9;
        let along_wall = |t: f64| (-tolerance..=size + tolerance).contains(&t);

        ExitSide::ALL
            .into_iter()
            .find(|side| {
                let offset = match side {
                    ExitSide::Left => exit_center.x,
                    ExitSide::Bottom => exit_center.y,
                    ExitSide::Right => exit_center.x - size,
                    ExitSide::Top => exit_center.y - size,
                };
                offset.abs() <= tolerance && along_wall(side.coordinate(exit_center))
            })
            .ok_or(ConfigError::ExitOffBoundary {
                x: exit_center.x,
                y: exit_center.y,
                size,
            })
    }

    /// Point at distance `t` along this wall, measured from the corner at the origin side.
    fn point(self, size: f64, t: f64) -> DVec2 {
        match self {
            ExitSide::Left => dvec2(0.0, t),
            ExitSide::Bottom => dvec2(t, 0.0),
            ExitSide::Right => dvec2(size, t),
            ExitSide::Top => dvec2(t, size),
        }
    }

    /// Position of `p` along this wall.
    fn coordinate(self, p: DVec2) -> f64 {
        match self {
            ExitSide::Left | ExitSide::Right => p.y,
            ExitSide::Bottom | ExitSide::Top => p.x,
        }
    }
}

/// Static wall boundary of the room.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub size: f64,
    pub exit_center: DVec2,
    pub exit_width: f64,
    pub exit_side: ExitSide,
    pub wall_points: Vec<DVec2>,
}

impl Geometry {
    pub fn from_room(room: &RoomConfig) -> Result<Self> {
        let exit_center = room.exit_center();
        let exit_side = ExitSide::locate(room.size, exit_center)?;
        let wall_points = build_geometry(
            room.size,
            exit_center,
            room.exit_width,
            room.wall_divisions,
        )?;

        if room.exit_width >= room.size {
            warn!(
                "Exit width {} removes the whole {:?} wall",
                room.exit_width, exit_side
            );
        }

        Ok(Geometry {
            size: room.size,
            exit_center,
            exit_width: room.exit_width,
            exit_side,
            wall_points,
        })
    }
}

fn inside_gap(side: ExitSide, p: DVec2, exit_center: DVec2, exit_width: f64) -> bool {
    (side.coordinate(p) - side.coordinate(exit_center)).abs() < 0.5 * exit_width
}

/// Discretize the four walls of a square room of side `size` into wall points.
///
/// The result holds the four corners and `divisions - 1` evenly spaced interior points per
/// wall, minus those strictly inside the exit gap centered on `exit_center`. The order of the
/// points carries no meaning. An exit at least as wide as the room leaves its wall with no
/// interior points.
pub fn build_geometry(
    size: f64,
    exit_center: DVec2,
    exit_width: f64,
    divisions: usize,
) -> Result<Vec<DVec2>> {
    if !(size.is_finite() && size > 0.0) {
        return Err(ConfigError::RoomSize(size));
    }
    if divisions == 0 {
        return Err(ConfigError::WallDivisions);
    }
    let exit_side = ExitSide::locate(size, exit_center)?;

    let mut points = vec![
        dvec2(0.0, 0.0),
        dvec2(0.0, size),
        dvec2(size, 0.0),
        dvec2(size, size),
    ];
    points.reserve(4 * (divisions - 1));

    let step = size / divisions as f64;
    for side in ExitSide::ALL {
        for k in 1..divisions {
            let p = side.point(size, k as f64 * step);
            if side == exit_side && inside_gap(side, p, exit_center, exit_width) {
                continue;
            }
            points.push(p);
        }
    }

    Ok(points)
}
