use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eisy::io::{read_record, DatasetWriter, ParsedFileName, WriterConfig};
use eisy::prelude::{
    Alteration, AlterationParams, AlterationRequest, BranchSelector, CircuitElements, CircuitSpec,
    EisError, PhaseConvention, SimulationOptions, SweepConfig, Topology,
};
use eisy::record::simulate;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Equivalent-circuit impedance simulation and dataset writer
#[derive(Parser)]
#[command(name = "eisy", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate one circuit and write a labeled record
    Simulate(SimulateArgs),
    /// Print the labels of an existing record
    Inspect {
        /// Record file to read
        file: PathBuf,

        /// Body delimiter
        #[arg(long, default_value_t = ',')]
        delimiter: char,
    },
}

#[derive(clap::Args)]
struct SimulateArgs {
    /// Circuit topology (RC_series, RC_parallel, RQ_series, RQ_parallel, RsRC, RsRCRC,
    /// RsRQRQ, Randles)
    circuit: Topology,

    /// Circuit element as NAME=VALUE, repeated once per element
    #[arg(short = 'p', long = "param", value_parser = parse_element)]
    params: Vec<(String, f64)>,

    /// Highest sweep frequency in Hz
    #[arg(long, default_value_t = 1.0e6)]
    high: f64,

    /// Lowest sweep frequency in Hz
    #[arg(long, default_value_t = 1.0e-2)]
    low: f64,

    /// Sweep points per decade
    #[arg(long, default_value_t = eisy::constants::DEFAULT_POINTS_PER_DECADE)]
    decades: usize,

    /// Alteration applied to the response
    #[arg(long)]
    alteration: Option<Alteration>,

    /// Noise scale in [0, 1]
    #[arg(long, default_value_t = 0.4)]
    noise_scale: f64,

    /// Probability per point of an outlier
    #[arg(long, default_value_t = 0.05)]
    outlier_fraction: f64,

    /// Outlier deviation relative to the point magnitude
    #[arg(long, default_value_t = 0.5)]
    outlier_amplitude: f64,

    /// Excitation amplitude in volts for current/voltage noise
    #[arg(long, default_value_t = eisy::constants::DEFAULT_EXCITATION_VOLTAGE)]
    excitation: f64,

    /// Draw the jitter branch from the Fibonacci parity table instead of a fair coin
    #[arg(long)]
    fibonacci: bool,

    /// Use atan(im/re) for the phase column
    #[arg(long)]
    legacy_phase: bool,

    /// Seed for reproducible noise
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory
    #[arg(long, default_value = "simulation_data")]
    out: PathBuf,

    /// Body delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,
}

fn parse_element(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{s}`"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("bad value for {name}: {e}"))?;
    Ok((name.trim().to_owned(), value))
}

fn alteration_request(args: &SimulateArgs) -> Option<AlterationRequest> {
    args.alteration.map(|alteration| AlterationRequest {
        alteration,
        params: AlterationParams {
            noise_scale: args.noise_scale,
            excitation_voltage: args.excitation,
            outlier_fraction: args.outlier_fraction,
            outlier_amplitude: args.outlier_amplitude,
            branch: if args.fibonacci {
                BranchSelector::Fibonacci
            } else {
                BranchSelector::CoinFlip
            },
        },
    })
}

fn run_simulate(args: SimulateArgs) -> Result<(), EisError> {
    let sweep = SweepConfig::new(args.high, args.low)
        .with_decades(args.decades)
        .generate()?;
    let request = alteration_request(&args);
    let spec = CircuitSpec::new(args.circuit, CircuitElements::from_pairs(args.params))?;
    let options = SimulationOptions {
        phase: if args.legacy_phase {
            PhaseConvention::LegacyAtan
        } else {
            PhaseConvention::Atan2
        },
        ..SimulationOptions::default()
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let record = simulate(&sweep, &spec, request.as_ref(), &options, &mut rng)?;

    let mut config = WriterConfig::new(args.out);
    config.delimiter = args.delimiter;
    let written = DatasetWriter::new(config).write_today(&record)?;
    println!("{}", written.path.display());
    Ok(())
}

fn run_inspect(file: PathBuf, delimiter: char) -> Result<(), EisError> {
    let name = ParsedFileName::parse(&file)?;
    let stored = read_record(BufReader::new(File::open(&file)?), delimiter)?;
    let meta = &stored.metadata;
    println!("serial id:   {}", meta.serial_id);
    println!("source:      {}", meta.source);
    println!("circuit:     {} {}", meta.topology, meta.topology.circuit_string());
    println!("elements:    {}", meta.elements);
    println!(
        "alteration:  {}",
        meta.alteration.map_or("None", Alteration::name)
    );
    println!("class tags:  {}", name.class_tags.join(", "));
    println!("rows:        {}", stored.body.rows());
    println!("columns:     {}", stored.body.headers().join(" | "));
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Simulate(args) => run_simulate(args),
        Command::Inspect { file, delimiter } => run_inspect(file, delimiter),
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
