use std::path::PathBuf;

use clap::Parser;

use swiss_sim::config::{ResolvedOutputs, SimulationConfig};
use swiss_sim::logging::init_logging;
use swiss_sim::tournament::TournamentRunner;

/// Swiss tournament simulator.
#[derive(Debug, Parser)]
#[command(
    name = "swiss-sim",
    author,
    version,
    about = "Deterministic Swiss-system tournament simulator"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "sim/swiss.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the RNG seed for pairing and match outcomes.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of rounds derived from the field size.
    #[arg(long, value_name = "ROUNDS")]
    rounds: Option<u32>,

    /// Exit after validating the configuration (no tournament is run).
    #[arg(long)]
    validate_only: bool,

    /// Suppress the per-round console report.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = SimulationConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(seed) = cli.seed {
        config.tournament.seed = Some(seed);
    }

    if let Some(rounds) = cli.rounds {
        config.tournament.rounds = Some(rounds);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let player_count = config.players.len();
    let run_id = config.run_id.clone();
    let total_rounds = config.total_rounds();

    println!(
        "Loaded configuration '{run_id}' with {player_count} player{} ({total_rounds} round{}, swiss-core {})",
        if player_count == 1 { "" } else { "s" },
        if total_rounds == 1 { "" } else { "s" },
        swiss_core::AppInfo::version()
    );

    let _logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = TournamentRunner::new(config, outputs)?.with_console(!cli.quiet);

    if cli.validate_only {
        println!("Validation-only mode: tournament execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "\nTournament complete for '{run_id}': {} of {} rounds, {} matches, {} byes → {} rows at {}",
        summary.rounds_played,
        summary.total_rounds,
        summary.matches_played,
        summary.byes,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    if let Some(round) = summary.exhausted_round {
        println!("Stopped early: round {round} had no pairing without a rematch.");
    }
    if let Some(leader) = summary.final_standings.first() {
        println!("Winner: {} ({} points)", leader.name, leader.points);
    }
    println!("Summary table: {}", summary.summary_path.display());
    println!("Round context: {}", summary.context_path.display());
    if let Some(plot_path) = summary.plot_path.as_ref() {
        println!("Points chart: {}", plot_path.display());
    }
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
