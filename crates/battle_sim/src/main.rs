//! Battle simulator command line.
//!
//! # Usage
//!
//! ```bash
//! # Run one battle and print the survivors of every round
//! cargo run -p battle_sim -- run scenarios/og_example.ron --seed 42
//!
//! # Summarize 100 simulations of one engine invocation
//! cargo run -p battle_sim -- simulate scenarios/og_example.ron -n 100
//!
//! # Summarize 20 invocations run in parallel
//! cargo run -p battle_sim -- batch scenarios/og_example.ron --runs 20 -n 10 --output results/batch.json
//!
//! # List the built-in unit table
//! cargo run -p battle_sim -- units
//! ```
//!
//! Reports go to stdout, logs to stderr.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use battle_core::combatant::Side;
use battle_core::error::ValidationError;
use battle_core::og::{self, OgUnit};
use battle_core::BattleEngine;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use battle_sim::{
    batch::{run_batch, BatchConfig},
    report::{write_combatants, write_rounds, write_summary, Summary},
    scenario::{Scenario, UnitNames},
};

#[derive(Parser)]
#[command(name = "battle_sim")]
#[command(about = "Run battle scenarios through the external battle engine")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Settings shared by every command that runs the engine.
#[derive(Args)]
struct EngineArgs {
    /// Scenario file to load
    scenario: PathBuf,

    /// Engine executable (overrides the scenario)
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Kill the engine after this many seconds (overrides the scenario)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Random seed (0 = pick one)
    #[arg(long, default_value = "0")]
    seed: u32,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one battle and print the survivors after every round
    Run {
        #[command(flatten)]
        args: EngineArgs,
    },

    /// Run many simulations in one engine invocation and summarize them
    Simulate {
        #[command(flatten)]
        args: EngineArgs,

        /// Number of simulations
        #[arg(short = 'n', long, default_value = "100")]
        simulations: u32,
    },

    /// Run many engine invocations in parallel and summarize them
    Batch {
        #[command(flatten)]
        args: EngineArgs,

        /// Number of engine invocations
        #[arg(long, default_value = "10")]
        runs: u32,

        /// Simulations per invocation
        #[arg(short = 'n', long, default_value = "1")]
        simulations: u32,

        /// Maximum parallel invocations (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: usize,

        /// Save the batch results as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the built-in OGame unit table
    Units,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for reports)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Run { args } => cmd_run(&args),
        Commands::Simulate { args, simulations } => cmd_simulate(&args, simulations),
        Commands::Batch {
            args,
            runs,
            simulations,
            parallel,
            output,
        } => cmd_batch(&args, runs, simulations, parallel, output.as_deref()),
        Commands::Units => cmd_units(),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Scenario with command-line overrides applied, plus its engine.
struct Loaded {
    scenario: Scenario,
    names: UnitNames,
    engine: BattleEngine,
}

fn load(args: &EngineArgs) -> Result<Loaded, Box<dyn std::error::Error>> {
    let mut scenario = Scenario::load(&args.scenario)?;
    if let Some(path) = &args.engine {
        scenario.engine.path.clone_from(path);
    }
    if args.timeout_secs.is_some() {
        scenario.engine.timeout_secs = args.timeout_secs;
    }

    tracing::info!(
        scenario = %scenario.name,
        engine = %scenario.engine.path.display(),
        timeout_secs = ?scenario.engine.timeout_secs,
        attackers = scenario.attackers.len(),
        defenders = scenario.defenders.len(),
        "Loaded scenario"
    );

    let engine = BattleEngine::new(scenario.registry()?, scenario.engine.process_engine());
    let names = scenario.units.names();
    Ok(Loaded {
        scenario,
        names,
        engine,
    })
}

fn write_fleets(out: &mut impl Write, loaded: &Loaded) -> io::Result<()> {
    write_combatants(out, Side::Attackers, &loaded.scenario.attackers, &loaded.names)?;
    write_combatants(out, Side::Defenders, &loaded.scenario.defenders, &loaded.names)
}

/// Run one battle
fn cmd_run(args: &EngineArgs) -> CliResult {
    let loaded = load(args)?;
    let outcome = loaded.engine.battle(
        &loaded.scenario.attackers,
        &loaded.scenario.defenders,
        args.seed,
    )?;
    tracing::info!(rounds = outcome.num_rounds, winner = ?outcome.winner(), "Battle finished");

    let mut out = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &outcome)?;
        writeln!(out)?;
    } else {
        write_fleets(&mut out, &loaded)?;
        write_rounds(&mut out, &outcome, &loaded.names)?;
    }
    Ok(())
}

/// Run many simulations in one engine invocation
fn cmd_simulate(args: &EngineArgs, simulations: u32) -> CliResult {
    let loaded = load(args)?;
    let attackers = &loaded.scenario.attackers;
    let defenders = &loaded.scenario.defenders;

    let outcomes = loaded
        .engine
        .simulate(attackers, defenders, args.seed, simulations)?;
    let summary = Summary::from_outcomes(attackers, defenders, &outcomes)
        .ok_or(ValidationError::NoSimulations)?;

    print_summary(args.json, &loaded, &summary)
}

/// Run many engine invocations in parallel
fn cmd_batch(
    args: &EngineArgs,
    runs: u32,
    simulations: u32,
    parallel: usize,
    output: Option<&Path>,
) -> CliResult {
    let loaded = load(args)?;
    let config = BatchConfig::new(runs)
        .with_simulations(simulations)
        .with_parallel(parallel)
        .with_seed(args.seed);

    let results = run_batch(
        &loaded.engine,
        &loaded.scenario.attackers,
        &loaded.scenario.defenders,
        config,
    )?;

    if !results.errors.is_empty() {
        tracing::warn!(
            failed_runs = results.errors.len(),
            "Some runs failed; the summary only covers the others"
        );
    }
    if let Some(path) = output {
        results.save(path)?;
        tracing::info!(path = %path.display(), "Saved batch results");
    }

    print_summary(args.json, &loaded, &results.summary)
}

fn print_summary(json: bool, loaded: &Loaded, summary: &Summary) -> CliResult {
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, summary)?;
        writeln!(out)?;
    } else {
        write_fleets(&mut out, loaded)?;
        write_summary(&mut out, summary, &loaded.names)?;
    }
    Ok(())
}

/// List the built-in unit table
fn cmd_units() -> CliResult {
    write_units(&mut io::stdout().lock())?;
    Ok(())
}

fn write_units(out: &mut impl Write) -> io::Result<()> {
    let registry = og::registry();
    writeln!(
        out,
        "{:>3}  {:<18} {:>9} {:>7} {:>8}  Rapid fire",
        "#", "Unit", "Weapons", "Shield", "Armor"
    )?;
    for unit in OgUnit::ALL {
        let Some(attrs) = registry.get(unit.kind()) else {
            continue;
        };
        let rapid_fire: Vec<String> = attrs
            .rapid_fire()
            .iter()
            .map(|(target, count)| {
                match OgUnit::from_kind(*target) {
                    Some(unit) => format!("{unit} x{count}"),
                    None => format!("{target} x{count}"),
                }
            })
            .collect();
        writeln!(
            out,
            "{:>3}  {:<18} {:>9} {:>7} {:>8}  {}",
            unit.kind().index(),
            unit.name(),
            attrs.weapons(),
            attrs.shield(),
            attrs.armor(),
            rapid_fire.join(", ")
        )?;
    }
    Ok(())
}
