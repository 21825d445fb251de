use clap::{ArgAction, Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "rigtree")]
#[command(about = "RigTree - robot description inspector")]
#[command(version = "0.1.0")]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v warnings, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a description and print the assembled tree
    Inspect {
        /// Description file (URDF)
        file: PathBuf,

        /// Loader configuration (TOML)
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,

        /// Root link name (overrides the configuration)
        #[arg(short = 'r', long = "root")]
        root: Option<String>,

        /// Print a JSON summary instead of the tree outline
        #[arg(short = 'j', long = "json")]
        json: bool,

        /// Resolve meshes against the configured mesh directory
        #[arg(short = 'm', long = "check-meshes")]
        check_meshes: bool,

        /// Exit with an error when any diagnostic was recorded
        #[arg(short = 's', long = "strict")]
        strict: bool,
    },

    /// List revolute joints by actuation index
    Joints {
        /// Description file (URDF)
        file: PathBuf,

        /// Loader configuration (TOML)
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
    },

    /// Show the canonical form and actuation index of a joint name
    Canonical {
        /// Raw joint name, e.g. left_hip_pitch_joint
        name: String,

        /// Loader configuration (TOML)
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run_command(cli.command) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "error",
        1 => "warn",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Inspect {
            file,
            config,
            root,
            json,
            check_meshes,
            strict,
        } => commands::inspect(&commands::InspectOptions {
            file,
            config,
            root,
            json,
            check_meshes,
            strict,
        }),
        Commands::Joints { file, config } => commands::joints(&file, config.as_deref()),
        Commands::Canonical { name, config } => commands::canonical(&name, config.as_deref()),
    }
}
