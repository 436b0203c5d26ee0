mod args;

use std::{
    fs::{self, File},
    path::PathBuf,
    sync::atomic::{AtomicBool, Ordering},
};

use args::Args;
use clap::Parser;
use evacsim_simulator::{scenario::Scenario, Simulator};
use log::{info, warn};

static SIG_INT: AtomicBool = AtomicBool::new(false);

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_module("evacsim", log::LevelFilter::Info)
        .filter_module("evacsim_simulator", log::LevelFilter::Info)
        .init();

    if cfg!(debug_assertions) {
        warn!("Debug build");
    }

    let args = Args::parse();

    let mut scenario: Scenario = match &args.scenario {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => Scenario::default(),
    };
    args.apply(&mut scenario);
    scenario.validate()?;
    info!("successfully loaded a scenario");

    let mut simulator = Simulator::new(scenario, args.to_simulator_options())?;

    ctrlc::set_handler(|| SIG_INT.store(true, Ordering::SeqCst))?;

    loop {
        if SIG_INT.load(Ordering::SeqCst) {
            warn!("Interrupted at step {}", simulator.step());
            break;
        }

        let Some(step_metrics) = simulator.tick() else {
            break;
        };
        if step_metrics.step % 100 == 0 {
            info!(
                "Step: {:6}, Active agents: {:6}",
                step_metrics.step, step_metrics.active_agent_count
            );
        }
    }

    let trajectory = &simulator.trajectory;
    let agent_count = simulator.state.len();
    info!(
        "Finished after {} steps: {} of {} agents exited, {} contacts",
        simulator.step(),
        trajectory.exited_count(),
        agent_count,
        simulator.diagnostic_log.contact_count
    );
    for agent in 0..agent_count {
        match trajectory.exit_step(agent) {
            Some(step) => info!("Agent {agent:4}: exited at step {step}"),
            None => info!("Agent {agent:4}: still inside"),
        }
    }

    if args.log {
        let current_time = chrono::Local::now();
        fs::create_dir("logs").ok();
        let log_path: PathBuf = [
            "logs",
            &current_time.format("%Y-%m-%d_%H%M%S_log.json").to_string(),
        ]
        .iter()
        .collect();
        let mut log_file = File::create(&log_path)?;

        serde_json::to_writer(&mut log_file, &simulator.diagnostic_log)?;
        info!("Exported log file: {}", log_path.display());
    }

    Ok(())
}
