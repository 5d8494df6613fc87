use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{info, warn};

use kitaev_honeycomb_sim::prelude::*;

#[derive(Parser)]
#[command(name = "kitaev-honeycomb")]
#[command(about = "Exact ground-state energies of the Kitaev honeycomb model")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (logs every evaluated sector)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Number of threads to use (default: all available cores)
    #[arg(short, long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Vortex-free energy of each Wilson loop sector
    Loops {
        l1: usize,
        l2: usize,
        m: usize,
        /// z-bond coupling (Jx = Jy = 1)
        #[arg(long, default_value_t = 1.0)]
        jz: f64,
        #[arg(long, value_enum, default_value_t = Method::Svd)]
        method: Method,
    },
    /// Search all Wilson loop and vortex sectors for the ground state
    Search {
        l1: usize,
        l2: usize,
        m: usize,
        /// z-bond coupling (Jx = Jy = 1)
        #[arg(long, default_value_t = 1.0)]
        jz: f64,
        /// Only search the vortex-free sector
        #[arg(long)]
        no_vortices: bool,
        #[arg(long, value_enum, default_value_t = Method::Svd)]
        method: Method,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    Svd,
    GramEigen,
}

impl From<Method> for SolverConfig {
    fn from(method: Method) -> Self {
        match method {
            Method::Svd => SolverConfig::default(),
            Method::GramEigen => SolverConfig::gram_eigen(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    if let Some(threads) = cli.threads {
        #[cfg(feature = "parallel")]
        {
            match rayon::ThreadPoolBuilder::new().num_threads(threads).build_global() {
                Ok(()) => info!("Using {} threads", threads),
                Err(e) => warn!("Failed to set thread pool size: {}", e),
            }
        }
        #[cfg(not(feature = "parallel"))]
        {
            warn!("Thread count {} specified but parallel feature not enabled. Ignoring.", threads);
        }
    }

    info!("Starting kitaev-honeycomb v{}", kitaev_honeycomb_sim::VERSION);

    let result = match cli.command {
        Commands::Loops { l1, l2, m, jz, method } => run_loops(l1, l2, m, jz, method.into()),
        Commands::Search {
            l1,
            l2,
            m,
            jz,
            no_vortices,
            method,
        } => run_search(l1, l2, m, jz, !no_vortices, method.into()),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run_loops(l1: usize, l2: usize, m: usize, jz: f64, solver: SolverConfig) -> Result<()> {
    let lattice = Lattice::new(l1, l2, m)?;
    let couplings = Couplings::with_jz(jz);
    let energies = loop_energies(&lattice, &couplings, &solver)?;
    println!("{}", loop_table(&lattice, &couplings, &energies));
    Ok(())
}

fn run_search(
    l1: usize,
    l2: usize,
    m: usize,
    jz: f64,
    include_vortices: bool,
    solver: SolverConfig,
) -> Result<()> {
    let lattice = Lattice::new(l1, l2, m)?;
    let couplings = Couplings::with_jz(jz);
    let config = SearchConfig {
        include_vortices,
        solver,
        ..SearchConfig::default()
    };
    let outcome = search_ground_state(&lattice, &couplings, &config)?;
    if outcome.failed > 0 {
        warn!("{} sector evaluations failed", outcome.failed);
    }
    println!("{}", ground_state_report(&outcome));
    Ok(())
}
