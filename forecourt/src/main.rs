//! Fuel station forecourt simulation application.
#![warn(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::default_trait_access,
    clippy::inline_always
)]

use std::path::PathBuf;
use std::time::SystemTime;

use clap::Parser;
use eyre::WrapErr;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaChaRng;

use forecourt::{AllocatorOption, DurationArg, Report, Simulation, SimulationConfig};

/// Runs fuel station forecourt simulation.
#[derive(Parser)]
#[clap(version, author)]
struct Opt {
    /// Simulation duration: milliseconds, or a duration such as `90s`.
    /// Overrides the duration in the config file.
    #[clap(short, long, env = "SIMULATION_DURATION")]
    duration: Option<DurationArg>,

    /// Path to a JSON file with simulation parameters.
    /// Missing parameters take their default values.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Pump allocation policy: `deepest_run` or `first_free`.
    #[clap(short, long, default_value = "deepest_run")]
    allocator: AllocatorOption,

    /// Seed of the random number generator. Random if not given.
    #[clap(long)]
    seed: Option<u64>,

    /// Pace the simulation against the wall clock.
    #[clap(long)]
    real_time: bool,

    /// Verbosity.
    #[clap(short, long, parse(from_occurrences))]
    verbose: i32,

    /// Store the logs this file.
    #[clap(long)]
    log_output: Option<PathBuf>,

    /// Do not log to the stderr.
    #[clap(long)]
    no_stderr: bool,
}

impl Opt {
    fn simulation_config(&self) -> eyre::Result<SimulationConfig> {
        let config = match &self.config {
            Some(path) => SimulationConfig::from_json_file(path)
                .wrap_err_with(|| format!("unable to load config: {}", path.display()))?,
            None => SimulationConfig::default(),
        };
        let config = match self.duration {
            Some(DurationArg(duration)) => config.with_duration(duration)?,
            None => config,
        };
        config.validate().wrap_err("invalid simulation config")?;
        Ok(config)
    }
}

/// Set up a logger based on the given user options.
fn set_up_logger(opt: &Opt) -> Result<(), fern::InitError> {
    let log_level = match opt.verbose {
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        3 => log::LevelFilter::Trace,
        _ => log::LevelFilter::Warn,
    };
    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("[{}] {}", record.level(), message)))
        .level(log_level);
    let dispatch = if let Some(path) = &opt.log_output {
        dispatch.chain(std::fs::File::create(path)?)
    } else {
        dispatch
    };
    let dispatch = if opt.no_stderr {
        dispatch
    } else {
        dispatch.chain(std::io::stderr())
    };
    dispatch.apply()?;
    Ok(())
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let _ = dotenv::dotenv();
    let opt = Opt::parse();
    set_up_logger(&opt)?;
    let config = opt.simulation_config()?;
    let seed = opt.seed.unwrap_or_else(|| rand::thread_rng().next_u64());
    log::info!("Random seed: {}", seed);
    log::debug!("{:?}", config);

    let started_at = SystemTime::now();
    let mut sim = Simulation::from_config(
        &config,
        opt.allocator.allocator(),
        ChaChaRng::seed_from_u64(seed),
    )?;
    sim.run_until(config.duration(), opt.real_time);

    print!("{}", Report::new(sim.forecourt.ledger(), started_at));
    Ok(())
}
