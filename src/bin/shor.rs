//! Factor an integer with Shor's algorithm on the state-vector simulator.
//!
//! ```text
//! cargo run --bin shor -- -N 21
//! cargo run --bin shor -- -N 15 -a 7 --seed 1 --json
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shor_rs::number::DEFAULT_EPSILON;
use shor_rs::shor::{QuantumRun, Shot, Stage};
use shor_rs::{ShorConfig, ShorOutcome, factorize};

#[derive(Parser)]
#[command(name = "shor")]
#[command(about = "Factor an integer with Shor's algorithm", long_about = None)]
struct Args {
    /// Positive integer to factor
    #[arg(short = 'N', long = "modulus", default_value_t = 21)]
    modulus: u64,

    /// Precision qubits
    #[arg(short = 't', long, default_value_t = 4)]
    precision: usize,

    /// Number of measurements
    #[arg(long, default_value_t = 10)]
    shots: usize,

    /// Base coprime to N (random when omitted)
    #[arg(short = 'a', long)]
    base: Option<u64>,

    /// PRNG seed for base selection and measurements
    #[arg(long)]
    seed: Option<u64>,

    /// Continued-fraction termination threshold
    #[arg(long, default_value_t = DEFAULT_EPSILON)]
    epsilon: f64,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,
}

impl From<&Args> for ShorConfig {
    fn from(args: &Args) -> Self {
        ShorConfig {
            modulus: args.modulus,
            base: args.base,
            precision: args.precision,
            shots: args.shots,
            seed: args.seed,
            epsilon: args.epsilon,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shor_rs=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = ShorConfig::from(&args);

    let outcome = match factorize(&config) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("failed to encode outcome: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    match &outcome {
        ShorOutcome::Prime { modulus } => println!("N={} is prime.", modulus),
        ShorOutcome::Even { modulus } => {
            println!("N={} is even. p=2, q={}.", modulus, modulus / 2)
        }
        ShorOutcome::PerfectPower {
            modulus,
            base,
            exponent,
        } => println!("N={}. N is exponentiation. {}^{}.", modulus, base, exponent),
        ShorOutcome::SharedFactor {
            modulus,
            base,
            factor,
        } => println!(
            "N={}, a={}. a is not coprime. gcd(N, a)={} is a non-trivial factor.",
            modulus, base, factor
        ),
        ShorOutcome::Quantum(run) => print_run(&config, run),
    }
    ExitCode::SUCCESS
}

fn print_run(config: &ShorConfig, run: &QuantumRun) {
    let seed = config.seed.map_or("none".to_string(), |s| s.to_string());
    println!(
        "N={}, a={}, t={}, shot={}, seed={}.\n",
        run.modulus, run.base, run.precision, config.shots, seed
    );
    for stage in &run.stages {
        print_stage(stage);
    }
    for shot in &run.shots {
        print_shot(run, shot);
    }
}

fn print_stage(stage: &Stage) {
    println!("{}", stage.name);
    let max = stage
        .states
        .iter()
        .map(|s| s.probability)
        .fold(0.0, f64::max);
    for s in &stage.states {
        let bar = "*".repeat((s.probability / max * 32.0) as usize);
        println!("{}: {}", s, bar);
    }
    println!();
}

fn print_shot(run: &QuantumRun, shot: &Shot) {
    let prefix = format!(
        "i={:2}: N={}, a={}. s/r={:2}/{:2} ({:?}={:.3}).",
        shot.index, run.modulus, run.base, shot.numerator, shot.period, shot.bits, shot.phase
    );
    match shot.candidates {
        None => println!("  {}", prefix),
        Some((p0, p1)) => {
            let found = if shot.factor.is_some() { "*" } else { " " };
            println!("{} {} p={}, q={}.", found, prefix, p0, p1);
        }
    }
}
