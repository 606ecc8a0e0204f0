//! t3dump: inspect T3 image files
//!
//! Loads an image with the `t3-image` loader and reports what it contains.
//! Loader warnings go to stderr through `tracing`; set `T3_LOG` (for example
//! `T3_LOG=t3_image=trace`) or pass `-v` to see more.

mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use t3_image::LoadOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "t3dump")]
#[command(about = "Inspect T3 virtual machine image files", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    load: LoadArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options forwarded to the loader
#[derive(Args)]
struct LoadArgs {
    /// Read loader options from a TOML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reject blocks whose declared size disagrees with their contents
    #[arg(long, global = true)]
    strict: bool,

    /// Accept non-zero bytes in the header padding
    #[arg(long, global = true)]
    allow_header_noise: bool,

    /// Read CPPG pool ids as 1-based
    #[arg(long, global = true)]
    one_based_page_ids: bool,
}

impl LoadArgs {
    fn resolve(&self) -> anyhow::Result<LoadOptions> {
        let mut options = match &self.config {
            Some(path) => LoadOptions::from_file(path)?,
            None => LoadOptions::default(),
        };
        options.strict_block_sizes |= self.strict;
        options.allow_header_noise |= self.allow_header_noise;
        options.one_based_page_pool_ids |= self.one_based_page_ids;
        Ok(options)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize an image
    Info {
        /// Image file
        file: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every block in file order
    Blocks {
        /// Image file
        file: PathBuf,
    },

    /// List static objects
    Objects {
        /// Image file
        file: PathBuf,
        /// Only objects of this metaclass index
        #[arg(short, long)]
        metaclass: Option<u16>,
    },

    /// List metaclass dependencies
    Metaclasses {
        /// Image file
        file: PathBuf,
    },

    /// List constant pools and their pages
    Pools {
        /// Image file
        file: PathBuf,
    },

    /// Load an image and report only success or failure
    Check {
        /// Image files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("T3_LOG").unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let options = cli.load.resolve()?;

    match cli.command {
        Commands::Info { file, json } => commands::info::execute(&file, options, json),
        Commands::Blocks { file } => commands::blocks::execute(&file, options),
        Commands::Objects { file, metaclass } => {
            commands::objects::execute(&file, options, metaclass)
        }
        Commands::Metaclasses { file } => commands::metaclasses::execute(&file, options),
        Commands::Pools { file } => commands::pools::execute(&file, options),
        Commands::Check { files } => commands::check::execute(&files, options),
    }
}
