#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use ltlnorm_bench::check_cmd::{self, CheckOptions};
use ltlnorm_bench::generate::{CorpusFilter, GeneratorOptions, Method, NormalClass, TlsfSource, parse_bool_flag};
use ltlnorm_bench::generate::random::DEFAULT_SEED;
use ltlnorm_bench::generate::tlsf::{DEFAULT_SYFCO, DEFAULT_TLSF_DIR};
use ltlnorm_bench::summarize_cmd::{self, SummarizeOptions};
use ltlnorm_bench::{filter_cmd, generate_cmd};

#[derive(Parser, Debug)]
#[command(name = "ltlnorm-bench")]
#[command(about = "Test and benchmark LTL normalization algorithms", long_about = None)]
struct Cli {
    /// Enable verbose logging (or set LTLNORM_BENCH_LOG)
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run normalizers over a test file and record the results as CSV
    Check {
        /// Test file with one formula per line
        test: PathBuf,
        /// Implementations to run, comma-separated, in order
        #[arg(long, short = 'i', default_value = check_cmd::DEFAULT_IMPLEMENTATIONS)]
        imp: String,
        /// Check whether every normal form is equivalent to its input
        #[arg(long)]
        equiv_check: bool,
        /// Path to Spot's ltlfilt, used by --equiv-check
        #[arg(long, default_value = "ltlfilt")]
        ltlfilt: PathBuf,
        /// Output CSV file with the experimental data
        #[arg(short = 'o', default_value = check_cmd::DEFAULT_OUTPUT)]
        output: PathBuf,
        /// TOML file with the implementation table
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Summarize CSV results (prefix a file with # to ignore formulas already normalized)
    Summarize {
        /// Result files
        #[arg(required = true)]
        csvfile: Vec<String>,
        /// Write the summaries in JSON format to this file
        #[arg(short = 'o')]
        output: Option<PathBuf>,
        /// TOML file with the implementation table, recorded in the JSON output
        #[arg(long)]
        config: Option<PathBuf>,
        /// Path to Spot's ltlfilt, whose version is recorded in the JSON output
        #[arg(long)]
        ltlfilt: Option<PathBuf>,
    },

    /// Generate a test file on stdout
    Generate {
        /// random, random_norm, random_notnorm, hard, uw or tlsf
        method: Method,
        /// Number of formulas
        #[arg(short = 'n', default_value_t = 50)]
        count: usize,
        /// Size of random formulas
        #[arg(short = 's', default_value_t = 15)]
        size: usize,
        /// Seed of random formulas
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
        /// Directory with the TLSF benchmarks
        #[arg(long, default_value = DEFAULT_TLSF_DIR)]
        tlsf_root: PathBuf,
        /// Path to syfco
        #[arg(long, default_value = DEFAULT_SYFCO)]
        syfco: PathBuf,
    },

    /// Filter a test file
    Filter {
        /// Source test file
        source: PathBuf,
        /// Minimum number of nodes
        #[arg(long)]
        min: Option<u64>,
        /// Maximum number of nodes
        #[arg(long)]
        max: Option<u64>,
        /// Keep formulas whose normalization status is this
        #[arg(long, value_parser = parse_bool_flag)]
        normalized: Option<bool>,
        /// Normal form tested by --normalized: normal, gf or delta2
        #[arg(long, default_value = "normal")]
        class: NormalClass,
        /// Remove duplicated lines
        #[arg(long)]
        no_dups: bool,
    },

    /// List the configured implementations
    List {
        /// TOML file with the implementation table
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("LTLNORM_BENCH_LOG").unwrap_or_else(|_| {
        if verbose { "ltlnorm_bench=debug".to_string() } else { "ltlnorm_bench=info".to_string() }
    });
    let _ = tracing_subscriber::fmt()
        .with_span_events(FmtSpan::ACTIVE)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn main() {
    color_eyre::install().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check { test, imp, equiv_check, ltlfilt, output, config } => {
            check_cmd::run(CheckOptions { test, imp, equiv_check, ltlfilt, output, config })
        }
        Commands::Summarize { csvfile, output, config, ltlfilt } => {
            summarize_cmd::run(SummarizeOptions { inputs: csvfile, output, config, ltlfilt })
        }
        Commands::Generate { method, count, size, seed, tlsf_root, syfco } => generate_cmd::run(
            method,
            GeneratorOptions { count, size, seed, tlsf: TlsfSource::new(tlsf_root, syfco) },
        ),
        Commands::Filter { source, min, max, normalized, class, no_dups } => {
            filter_cmd::run(source, CorpusFilter { min, max, normalized, class, no_dups })
        }
        Commands::List { config } => check_cmd::list(config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
