//! Command-line front-end: builds an `Instance` and a descriptor-resolved
//! algorithm, solves it, and reports or writes the result. See §10.2.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};

use vbpp::descriptor::Descriptor;
use vbpp::error::VbppError;
use vbpp::io::{self, IdBase, SolutionOrder};
use vbpp::{lower_bounds, Algorithm, Instance};

#[derive(Parser)]
#[command(name = "vbpp", about = "Vector bin packing heuristic engine")]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all logging below errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve an instance with a named algorithm.
    ///
    /// Note: the `Pairing-BS`, `WFDm-BS`, and `BFDm-BS` outer searches
    /// assume feasibility is monotonic in bin count, which is not always
    /// true for these heuristics; prefer the `-Incr` variants when that
    /// assumption is suspect.
    Solve {
        /// Path to a `.vbp` instance file.
        instance: PathBuf,
        /// Algorithm descriptor, e.g. `BFD-T1-L1-Average-Dyn`.
        descriptor: String,
        /// Write the solution here instead of printing a summary.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Disable the deterministic item shuffle applied at load time.
        #[arg(long)]
        no_shuffle: bool,
        /// Upper bound on bin count (multi-bin searches only). Defaults to
        /// an `FF` solve of the same instance.
        #[arg(long)]
        ub: Option<usize>,
        /// Lower bound on bin count (multi-bin searches only). Defaults to
        /// `max(LB_sum, LB_clique)`.
        #[arg(long)]
        lb: Option<usize>,
        /// Report item identifiers starting at 1 instead of 0.
        #[arg(long)]
        ids_from_1: bool,
        /// Order bins by identifier instead of creation order.
        #[arg(long)]
        order_by_id: bool,
    },
    /// Print a lower bound and exit without constructing any algorithm.
    Bound {
        instance: PathBuf,
        bound: BoundKind,
    },
    /// Parse a descriptor and print the resolved configuration.
    Describe { descriptor: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum BoundKind {
    #[value(name = "LB_sum")]
    LbSum,
    #[value(name = "LB_clique")]
    LbClique,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Error
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new().filter_level(level).init();
}

fn format_elapsed(elapsed: std::time::Duration) -> String {
    if elapsed.as_secs() < 1 {
        format!("{:.3}ms", elapsed.as_secs_f64() * 1000.0)
    } else {
        format!("{:.3}s", elapsed.as_secs_f64())
    }
}

fn load(path: &PathBuf, shuffle: bool) -> Result<Instance, VbppError> {
    let path_str = path.display().to_string();
    let file = File::open(path).map_err(|e| VbppError::InstanceMalformed {
        path: path_str.clone(),
        line: 0,
        reason: format!("could not open file: {e}"),
    })?;
    let instance = io::load_instance(&path_str, BufReader::new(file), shuffle)?;
    info!(
        "loaded instance '{}': {} dims, {} items",
        instance.name(),
        instance.dims(),
        instance.n_items()
    );
    Ok(instance)
}

fn run_solve(
    instance: PathBuf,
    descriptor: String,
    output: Option<PathBuf>,
    no_shuffle: bool,
    ub: Option<usize>,
    lb: Option<usize>,
    ids_from_1: bool,
    order_by_id: bool,
) -> Result<i32, VbppError> {
    let inst = load(&instance, !no_shuffle)?;
    let parsed = vbpp::descriptor::parse(&descriptor)?;

    let lb = lb.unwrap_or_else(|| lower_bounds::lb_sum(&inst).max(lower_bounds::lb_clique(&inst)));
    let ub = match ub {
        Some(v) => v,
        None => {
            let ff = vbpp::descriptor::parse("FF").unwrap();
            let mut ff_algo = vbpp::descriptor::build(&ff, "FF", &inst);
            ff_algo.solve_single(0)?
        }
    };
    debug!("resolved bounds lb={lb} ub={ub}");

    let mut algo = vbpp::descriptor::build(&parsed, descriptor.clone(), &inst);
    let start = Instant::now();
    let objective: i64 = match &parsed {
        Descriptor::ItemCentric(_) | Descriptor::BinCentric(_) => algo.solve_single(ub)? as i64,
        Descriptor::MultiBin(..) => algo.solve_multi(lb, ub)?,
    };
    let elapsed = start.elapsed();

    match output {
        Some(path) => {
            let order = if order_by_id { SolutionOrder::ById } else { SolutionOrder::Creation };
            let id_base = if ids_from_1 { IdBase::OneBased } else { IdBase::ZeroBased };
            let file = File::create(&path).map_err(|e| VbppError::InstanceMalformed {
                path: path.display().to_string(),
                line: 0,
                reason: format!("could not create output file: {e}"),
            })?;
            let mut writer = BufWriter::new(file);
            io::write_solution(&mut writer, algo.bins(), order, id_base)
                .map_err(|e| VbppError::InstanceMalformed {
                    path: path.display().to_string(),
                    line: 0,
                    reason: format!("failed to write solution: {e}"),
                })?;
            println!("wrote solution to {} ({} bins, {})", path.display(), objective, format_elapsed(elapsed));
        }
        None => {
            println!("{descriptor}: {objective} bins ({})", format_elapsed(elapsed));
        }
    }
    Ok(0)
}

fn run_bound(instance: PathBuf, bound: BoundKind) -> Result<i32, VbppError> {
    let inst = load(&instance, true)?;
    let value = match bound {
        BoundKind::LbSum => lower_bounds::lb_sum(&inst),
        BoundKind::LbClique => lower_bounds::lb_clique(&inst),
    };
    println!("{value}");
    Ok(0)
}

fn run_describe(descriptor: String) -> Result<i32, VbppError> {
    let parsed = vbpp::descriptor::parse(&descriptor)?;
    println!("{descriptor}: {parsed}");
    Ok(0)
}

fn exit_code(err: &VbppError) -> i32 {
    match err {
        VbppError::InstanceMalformed { .. } => 65,
        VbppError::DescriptorUnknown { .. } => 64,
        VbppError::ContractViolation { .. } => 70,
        VbppError::Runaway { .. } => 71,
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Command::Solve {
            instance,
            descriptor,
            output,
            no_shuffle,
            ub,
            lb,
            ids_from_1,
            order_by_id,
        } => run_solve(instance, descriptor, output, no_shuffle, ub, lb, ids_from_1, order_by_id),
        Command::Bound { instance, bound } => run_bound(instance, bound),
        Command::Describe { descriptor } => run_describe(descriptor),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(exit_code(&e));
        }
    }
}
