use glam::DVec2;
use log::debug;
use ndarray::Array2;
use thin_vec::ThinVec;

use crate::agents::Agent;

/// Uniform bucket grid over the room for agent-agent neighbor search.
///
/// Positions outside the room are clamped into the border cells. With `unit` at least the
/// interaction range, every pair within range lands in the same or adjacent cells.
///
/// At most [`MAX_CELLS_PER_SIDE`] cells are allocated along each axis. Larger rooms get
/// coarser cells.
pub struct NeighborGrid {
    pub data: Array2<ThinVec<u32>>,
    pub unit: f64,
    pub shape: (usize, usize),
}

pub const MAX_CELLS_PER_SIDE: usize = 1024;

impl NeighborGrid {
    pub fn new(size: f64, unit: f64) -> Self {
        // Saturates for huge ratios.
        let wanted = (size / unit).ceil() as usize;
        let cells = wanted.clamp(1, MAX_CELLS_PER_SIDE);
        let unit = if wanted > cells {
            let coarse = size / cells as f64;
            debug!("Neighbor grid capped at {cells} cells per side, cell size {coarse}");
            coarse.max(unit)
        } else {
            unit
        };
        let shape = (cells, cells);
        let data = Array2::from_elem(shape, ThinVec::new());

        NeighborGrid { data, unit, shape }
    }

    /// Cell `(row, column)` containing `pos`.
    fn cell(&self, pos: DVec2) -> (usize, usize) {
        let ix = (pos / self.unit).floor();
        let row = ix.y.clamp(0.0, (self.shape.0 - 1) as f64) as usize;
        let col = ix.x.clamp(0.0, (self.shape.1 - 1) as f64) as usize;
        (row, col)
    }

    /// Rebuild the buckets from the agents that have not exited.
    pub fn update_only_active(&mut self, agents: &[Agent]) {
        self.data.fill(ThinVec::new());

        for (i, agent) in agents.iter().enumerate() {
            if agent.exited {
                continue;
            }
            let ix = self.cell(agent.position);
            let neighbors = &mut self.data[ix];
            if !neighbors.has_capacity() {
                neighbors.reserve(16);
            }
            neighbors.push(i as u32);
        }
    }

    /// Indices of agents bucketed in the 3x3 cells around `pos`, in ascending order.
    pub fn neighbors(&self, pos: DVec2) -> Vec<usize> {
        let (row, col) = self.cell(pos);
        let rows = row.saturating_sub(1)..=(row + 1).min(self.shape.0 - 1);

        let mut indices: Vec<usize> = rows
            .flat_map(|y| {
                let cols = col.saturating_sub(1)..=(col + 1).min(self.shape.1 - 1);
                cols.flat_map(move |x| self.data[(y, x)].iter().map(|&i| i as usize))
            })
            .collect();
        indices.sort_unstable();
        indices
    }
}

#[cfg(test)]
mod tests {
    use glam::dvec2;

    use super::*;

    fn agent(x: f64, y: f64) -> Agent {
        Agent::new(dvec2(x, y), DVec2::ZERO)
    }

    #[test]
    fn test_neighbors() {
        let mut grid = NeighborGrid::new(10.0, 2.0);
        let agents = vec![
            agent(1.0, 1.0),
            agent(2.5, 1.5),
            agent(5.0, 5.0),
            agent(9.9, 9.9),
        ];
        grid.update_only_active(&agents);

        assert_eq!(grid.shape, (5, 5));
        assert_eq!(grid.neighbors(dvec2(1.0, 1.0)), vec![0, 1]);
        assert_eq!(grid.neighbors(dvec2(5.0, 5.0)), vec![2]);
        assert_eq!(grid.neighbors(dvec2(8.5, 9.0)), vec![3]);
    }

    #[test]
    fn test_large_room_is_capped() {
        let mut grid = NeighborGrid::new(1e6, 2.0);
        assert_eq!(grid.shape, (MAX_CELLS_PER_SIDE, MAX_CELLS_PER_SIDE));
        assert!(grid.unit >= 2.0);
        assert!(grid.unit * MAX_CELLS_PER_SIDE as f64 >= 1e6);

        let agents = vec![
            agent(5e5, 5e5),
            agent(5e5 + 1.5, 5e5),
            agent(9e5, 1e5),
            agent(1e6 - 1.0, 1e6 - 1.0),
        ];
        grid.update_only_active(&agents);

        assert_eq!(grid.neighbors(dvec2(5e5, 5e5)), vec![0, 1]);
        assert_eq!(grid.neighbors(dvec2(1e6, 1e6)), vec![3]);
    }

    #[test]
    fn test_skips_exited() {
        let mut grid = NeighborGrid::new(10.0, 2.0);
        let mut agents = vec![agent(1.0, 1.0), agent(1.5, 1.0)];
        agents[1].exited = true;
        grid.update_only_active(&agents);

        assert_eq!(grid.neighbors(dvec2(1.0, 1.0)), vec![0]);
    }

    #[test]
    fn test_clamps_outside_positions() {
        let mut grid = NeighborGrid::new(10.0, 2.0);
        let agents = vec![agent(-3.0, 4.0), agent(0.5, 4.5), agent(12.0, -1.0)];
        grid.update_only_active(&agents);

        assert_eq!(grid.neighbors(dvec2(-3.0, 4.0)), vec![0, 1]);
        assert_eq!(grid.neighbors(dvec2(11.0, 0.0)), vec![2]);
    }
}
