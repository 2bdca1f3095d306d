mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dense_linalg::{ComputeConfig, LinalgError};

#[derive(Parser)]
#[command(name = "dense-linalg")]
#[command(about = "Dense matrix arithmetic, determinants and Gauss elimination")]
#[command(version)]
struct Cli {
    /// JSON file with compute settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a matrix with its shape and nonzero count
    Show {
        /// Matrix file (`.mtx` coordinate or whitespace-separated dense)
        file: PathBuf,
    },

    /// Print the minor obtained by deleting a row and a column
    Minor {
        file: PathBuf,
        /// 1-based row to delete
        row: usize,
        /// 1-based column to delete
        col: usize,
    },

    /// Print the cofactor determinant of a square matrix
    Det { file: PathBuf },

    /// Print a + b
    Add { a: PathBuf, b: PathBuf },

    /// Print a - b
    Sub { a: PathBuf, b: PathBuf },

    /// Print a · b
    Multiply {
        a: PathBuf,
        b: PathBuf,

        /// Use Strassen's algorithm
        #[arg(long)]
        strassen: bool,

        /// Strassen leaf size (overrides the config file)
        #[arg(long, requires = "strassen")]
        leaf_size: Option<usize>,
    },

    /// Solve a·x = b by Gauss elimination
    Solve {
        /// Coefficient matrix file
        a: PathBuf,
        /// Right-hand side file, one value per token
        b: PathBuf,

        /// Print the system after elimination
        #[arg(long)]
        show_elimination: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<ComputeConfig, LinalgError> {
    match path {
        Some(path) => ComputeConfig::from_json_file(path),
        None => Ok(ComputeConfig::default()),
    }
}

fn run(cli: Cli) -> Result<(), LinalgError> {
    let config = load_config(cli.config.as_ref())?;
    let out = commands::Output { json: cli.json };

    match cli.command {
        Commands::Show { file } => commands::show(&file, out),
        Commands::Minor { file, row, col } => commands::minor(&file, row, col, out),
        Commands::Det { file } => commands::det(&file, out),
        Commands::Add { a, b } => commands::add(&a, &b, out),
        Commands::Sub { a, b } => commands::sub(&a, &b, out),
        Commands::Multiply {
            a,
            b,
            strassen,
            leaf_size,
        } => {
            let config = match leaf_size {
                Some(leaf) => {
                    ComputeConfig::try_with(leaf, config.parallel_threshold, config.pivot_tolerance)?
                }
                None => config,
            };
            commands::multiply(&a, &b, config.mul_strategy(strassen), out)
        }
        Commands::Solve {
            a,
            b,
            show_elimination,
        } => commands::solve(&a, &b, &config, show_elimination, out),
    }
}

fn main() {
    // Log to stderr (if you run with `RUST_LOG=debug`).
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
