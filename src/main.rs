use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

mod benchmark;
mod config;
mod error;
mod logging;
mod oracle;
mod permutation;
mod report;
mod search;
mod strategy;

use benchmark::{InstanceSet, TaskGenerator};
use config::BenchmarkConfig;
use error::{BenchError, ConfigError};
use oracle::{MiniZincFactory, OracleBackend, OracleFactory};
use permutation::{LowerBound, Permutation};
use report::{Console, FileRecorder};
use search::{BenchmarkJob, ExecutionMode, run_benchmark};
use strategy::Strategy;

/// File name of the instance set written next to the results
const INSTANCES_FILE: &str = "instances.toml";

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "swapsort")]
#[command(about = "swapsort - minimum swap plans and solver strategy benchmarks")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// CLI oracle selection
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliOracle {
    /// External MiniZinc executable with a model template
    Minizinc,
    /// In-process Z3 encoding (needs the `smt` feature)
    Smt,
}

impl From<CliOracle> for OracleBackend {
    fn from(cli: CliOracle) -> Self {
        match cli {
            CliOracle::Minizinc => OracleBackend::Minizinc,
            CliOracle::Smt => OracleBackend::Smt,
        }
    }
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Configuration file (TOML); flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    // --- Workload ---
    /// Strategies to compare (names, aliases or `all`; repeatable, comma-separated)
    #[arg(long = "strategy", short = 's')]
    strategies: Vec<String>,
    /// Permutation sizes to generate
    #[arg(long, value_delimiter = ',')]
    sizes: Option<Vec<usize>>,
    /// Instances generated per size
    #[arg(long)]
    instances_per_size: Option<usize>,
    /// Random seed for reproducible instances
    #[arg(long)]
    seed: Option<u64>,
    /// Load instances from a file instead of generating them
    #[arg(long)]
    instances: Option<PathBuf>,

    // --- Search limits ---
    /// Search budget per (instance, strategy) in seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// Limit for a single solver call in seconds (defaults to --timeout)
    #[arg(long)]
    call_timeout: Option<u64>,
    /// Give up once the bound exceeds this many swaps
    #[arg(long)]
    max_bound: Option<usize>,

    // --- Execution ---
    /// Worker threads (0 = one per CPU; default one per strategy)
    #[arg(long, short = 'j')]
    workers: Option<usize>,
    /// Run every strategy for one instance before moving on
    #[arg(long)]
    sequential: bool,

    // --- Oracle ---
    /// Oracle backend
    #[arg(long, value_enum)]
    oracle: Option<CliOracle>,
    /// MiniZinc model template containing {{SOLVE_STRATEGY}}
    #[arg(long)]
    template: Option<PathBuf>,
    /// MiniZinc solver id
    #[arg(long)]
    solver: Option<String>,
    /// Path to the minizinc executable
    #[arg(long)]
    minizinc: Option<PathBuf>,

    // --- Output ---
    /// Output directory
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Benchmark search strategies over a set of permutations
    Run(RunArgs),
    /// List the available search strategies
    ListStrategies {
        /// Also print each strategy's MiniZinc solve item
        #[arg(long)]
        show_model: bool,
    },
    /// Print the lower bound on swaps for a permutation (e.g. "2,3,1,5,4")
    Bound {
        /// Permutation values, comma or space separated
        permutation: String,
    },
    /// Generate a benchmark instance file
    Generate {
        /// Permutation sizes
        #[arg(long, value_delimiter = ',')]
        sizes: Option<Vec<usize>>,
        /// Instances per size
        #[arg(long)]
        instances_per_size: Option<usize>,
        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
        /// Output file (`-` for stdout)
        #[arg(long, short, default_value = INSTANCES_FILE)]
        output: PathBuf,
    },
}

// --- Configuration ---

fn load_config(args: &RunArgs) -> Result<BenchmarkConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => BenchmarkConfig::load(path)?,
        None => BenchmarkConfig::default(),
    };

    if !args.strategies.is_empty() {
        config.strategies = args.strategies.clone();
    }
    if let Some(sizes) = &args.sizes {
        config.sizes = sizes.clone();
    }
    if let Some(n) = args.instances_per_size {
        config.instances_per_size = n;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.instances.is_some() {
        config.instances = args.instances.clone();
    }
    if let Some(secs) = args.timeout {
        config.timeout_seconds = secs;
    }
    if args.call_timeout.is_some() {
        config.call_timeout_seconds = args.call_timeout;
    }
    if args.max_bound.is_some() {
        config.max_bound = args.max_bound;
    }
    if args.workers.is_some() {
        config.workers = args.workers;
    }
    if args.sequential {
        config.mode = ExecutionMode::Sequential;
    }
    if let Some(oracle) = args.oracle {
        config.oracle = oracle.into();
    }
    if let Some(template) = &args.template {
        config.minizinc.template = template.clone();
    }
    if let Some(solver) = &args.solver {
        config.minizinc.solver = solver.clone();
    }
    if let Some(executable) = &args.minizinc {
        config.minizinc.executable = executable.clone();
    }
    if let Some(output) = &args.output {
        config.output = output.clone();
    }

    config.validate()?;
    Ok(config)
}

// --- Benchmark ---

fn run_command(args: &RunArgs) -> Result<(), BenchError> {
    let config = load_config(args)?;

    let instances = match &config.instances {
        Some(path) => InstanceSet::load(path)?,
        None => config.task_generator().generate()?,
    };

    match config.oracle {
        OracleBackend::Minizinc => {
            let factory = MiniZincFactory::new(config.minizinc_config())?;
            match factory.version() {
                Some(version) => tracing::info!(%version, "using minizinc"),
                None => tracing::warn!(
                    executable = %config.minizinc.executable.display(),
                    "minizinc executable did not answer --version; every search will fail"
                ),
            }
            execute(&config, &instances, &factory)
        }
        #[cfg(feature = "smt")]
        OracleBackend::Smt => execute(&config, &instances, &oracle::SmtFactory::new()),
        #[cfg(not(feature = "smt"))]
        OracleBackend::Smt => Err(ConfigError::BackendUnavailable("smt".to_string()).into()),
    }
}

fn execute<F: OracleFactory>(
    config: &BenchmarkConfig,
    instances: &InstanceSet,
    factory: &F,
) -> Result<(), BenchError> {
    let strategies = config.strategy_selection()?;
    let search = config.search_config();
    let parallel = config.parallel_config();

    let recorder = FileRecorder::create(&config.output, strategies.strategies())?;
    instances.save(config.output.join(INSTANCES_FILE))?;

    let console = Console::stdout();
    console.header(instances.len(), strategies.len());

    let report = run_benchmark(&BenchmarkJob {
        instances: instances.as_slice(),
        strategies: &strategies,
        search: &search,
        parallel: &parallel,
        factory,
        recorder: &recorder,
        console: &console,
    });

    console.rule();
    for line in report.format_summary().lines() {
        console.line(line);
    }

    let report_path = recorder.write_report(&report)?;
    tracing::info!(path = %report_path.display(), "wrote report");
    console.line(&format!(
        "\n=== DONE: results in '{}' ===",
        recorder.root().display()
    ));
    Ok(())
}

// --- Other commands ---

fn list_strategies(show_model: bool) {
    for strategy in Strategy::ALL {
        println!(
            "{:<20} {:<18} {}",
            strategy.name(),
            strategy.alias(),
            strategy.description()
        );
        if show_model {
            println!("    {}", strategy.solve_item());
        }
    }
}

fn print_bound(perm: &Permutation) {
    let bound = LowerBound::compute(perm);
    let cycles = permutation::bound::cycles(perm)
        .iter()
        .map(|cycle| {
            let positions: Vec<String> = cycle.iter().map(|p| p.to_string()).collect();
            format!("({})", positions.join(" "))
        })
        .collect::<Vec<_>>()
        .join(" ");

    println!("Permutation: {}", perm);
    println!("Size: {}", bound.size);
    println!("Cycles: {} {}", bound.cycles, cycles);
    println!("Inversions: {}", bound.inversions);
    println!("Raw bound: {}", bound.raw);
    if bound.parity_adjusted() {
        println!("Parity adjusted: yes");
    }
    println!("Lower bound: {}", bound.k_min);
}

fn generate_instances(
    sizes: Option<Vec<usize>>,
    per_size: Option<usize>,
    seed: Option<u64>,
    output: &Path,
) -> Result<(), BenchError> {
    let mut generator = TaskGenerator::default().with_seed_option(seed);
    if let Some(sizes) = sizes {
        generator = generator.with_sizes(sizes);
    }
    if let Some(per_size) = per_size {
        generator = generator.with_per_size(per_size);
    }
    let set = generator.generate()?;

    if output == Path::new("-") {
        print!("{}", set.to_toml_string()?);
    } else {
        set.save(output)?;
        println!("Wrote {} instances to {}", set.len(), output.display());
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    match args.command {
        Commands::Run(run_args) => {
            if let Err(e) = run_command(&run_args) {
                tracing::error!(error = %e, "benchmark aborted");
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::ListStrategies { show_model } => list_strategies(show_model),
        Commands::Bound { permutation } => match permutation.parse::<Permutation>() {
            Ok(p) => print_bound(&p),
            Err(e) => {
                eprintln!("Error parsing permutation: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Generate {
            sizes,
            instances_per_size,
            seed,
            output,
        } => {
            if let Err(e) = generate_instances(sizes, instances_per_size, seed, &output) {
                eprintln!("Error generating instances: {}", e);
                std::process::exit(1);
            }
        }
    }
}
