use std::path::PathBuf;

use evacsim_simulator::{scenario::Scenario, SimulatorOptions};

#[derive(Debug, clap::Parser)]
pub struct Args {
    /// Path to scenario file. Built-in defaults are used when omitted
    pub scenario: Option<PathBuf>,
    /// Number of iterations, overriding the scenario
    #[arg(short = 'n', long)]
    pub iterations: Option<usize>,
    /// Number of agents, overriding the scenario
    #[arg(short, long)]
    pub agents: Option<usize>,
    /// Seed of the placement sampler, overriding the scenario
    #[arg(short, long)]
    pub seed: Option<u64>,
    /// Export the diagnostic log as JSON under `logs/`
    #[arg(short, long)]
    pub log: bool,

    /// Do not use grid for neighbor search
    #[arg(long)]
    pub no_neighbor_grid: bool,
    /// Evaluate forces on a single thread
    #[arg(long)]
    pub sequential: bool,
}

impl Args {
    pub fn to_simulator_options(&self) -> SimulatorOptions {
        SimulatorOptions {
            use_neighbor_grid: !self.no_neighbor_grid,
            parallel: !self.sequential,
        }
    }

    /// Apply command line overrides to `scenario`.
    pub fn apply(&self, scenario: &mut Scenario) {
        if let Some(iterations) = self.iterations {
            scenario.iterations = iterations;
        }
        if let Some(agents) = self.agents {
            scenario.population.count = agents;
        }
        if let Some(seed) = self.seed {
            scenario.population.seed = Some(seed);
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_overrides() {
        let args = Args::parse_from(["evacsim", "-n", "500", "--agents", "3", "--sequential"]);
        let mut scenario = Scenario::default();
        args.apply(&mut scenario);

        assert!(args.scenario.is_none());
        assert_eq!(scenario.iterations, 500);
        assert_eq!(scenario.population.count, 3);
        assert_eq!(scenario.population.seed, None);

        let options = args.to_simulator_options();
        assert!(options.use_neighbor_grid);
        assert!(!options.parallel);
    }
}
