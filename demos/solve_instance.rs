//! Loads an instance, solves it with the bundled `microlp` adapter and prints
//! the channel table, the schedule and per-user buffer traces.
//!
//! Run with:
//!
//! ```text
//! cargo run --example solve_instance -- demos/data/two_users.json
//! cargo run --example solve_instance -- --random 42
//! ```

use std::env;
use std::process::ExitCode;

use airsched::channel::ChannelResolver;
use airsched::formulation::BuildOptions;
use airsched::instance::{generate, GeneratorConfig, Instance, InstanceError};
use airsched::solver::{MicroLpSolver, SolverConfig};
use airsched::{optimize, Result};

fn parse_seed(text: &str) -> Result<u64> {
    text.parse().map_err(|e| {
        InstanceError::MalformedInstance(format!("invalid --random seed `{text}`: {e}")).into()
    })
}

fn load(args: &[String]) -> Result<Instance> {
    match args {
        [flag, seed] if flag == "--random" => {
            Ok(generate(&GeneratorConfig::default(), parse_seed(seed)?)?)
        }
        [path] => Ok(Instance::from_path(path)?),
        _ => Ok(Instance::from_path("demos/data/two_users.json")?),
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let instance = load(&args)?;

    let mut solver = MicroLpSolver::with_config(SolverConfig {
        name: Some("solve_instance".to_string()),
        write_model: None,
    });
    let run = optimize(
        &instance,
        &ChannelResolver::default(),
        BuildOptions::default(),
        &mut solver,
    )?;

    println!("Channel quality (user x timestep):");
    for (user, row) in instance.users().iter().zip(run.channels.rows()) {
        let levels: Vec<String> = row.iter().map(ToString::to_string).collect();
        println!("  {:>4}: {}", user.key(), levels.join(" "));
    }

    let stats = &run.result.stats;
    println!(
        "\nModel: {} variables ({} binary), {} linear, {} general constraints",
        stats.variables, stats.binaries, stats.linear_constraints, stats.general_constraints
    );
    println!(
        "Status: {} after {:.3}s",
        run.result.status,
        run.result.runtime.as_secs_f64()
    );

    let solution = run.solution();
    let Some(schedule) = solution.schedule() else {
        return Ok(());
    };
    println!("Total loss: {}", solution.objective().unwrap_or_default());

    println!("\nServed user per timestep:");
    for (t, served) in schedule.iter().enumerate() {
        let key = served
            .and_then(|n| instance.users().get(n))
            .map_or("-".to_string(), |u| u.key().to_string());
        println!("  t={t}: {key}");
    }

    println!("\nBuffer occupancy / loss:");
    for (n, user) in instance.users().iter().enumerate() {
        let trace: Vec<String> = (0..run.model.duration())
            .map(|t| {
                format!(
                    "{}/{}",
                    solution.occupancy(n, t).unwrap_or_default(),
                    solution.loss(n, t).unwrap_or_default()
                )
            })
            .collect();
        println!("  {:>4}: {}", user.key(), trace.join(" "));
    }

    if let Some(violations) = solution.verify() {
        for v in &violations {
            println!("violation: {v}");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
