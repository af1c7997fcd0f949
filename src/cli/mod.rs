use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod filter;
mod split;
mod stats;

/// orthoxml - streaming tools for OrthoXML documents
#[derive(Parser)]
#[command(name = "orthoxml")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter HOGs by score
    Filter {
        /// Input OrthoXML file (.gz is decompressed)
        #[arg(long, value_name = "FILE")]
        infile: PathBuf,

        /// Output OrthoXML file (.gz is compressed)
        #[arg(long, value_name = "FILE")]
        outfile: PathBuf,

        /// Score id to test (default: CompletenessScore)
        #[arg(long)]
        score_name: Option<String>,

        /// Minimum accepted score value
        #[arg(long)]
        threshold: Option<f64>,

        /// Filter strategy: cascade-remove (topdown) or extract (bottomup)
        #[arg(long)]
        strategy: Option<String>,

        /// Minimum HOG size (carried, not enforced)
        #[arg(long)]
        min_hog_size: Option<usize>,

        /// TOML config file with [filter] and [output] tables
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Print species, gene, rootHOG and taxon counts
    Stats {
        /// Input OrthoXML file
        #[arg(long, value_name = "FILE")]
        infile: PathBuf,
    },

    /// Count genes and genes in HOGs per taxon
    GeneStats {
        /// Input OrthoXML file
        #[arg(long, value_name = "FILE")]
        infile: PathBuf,

        /// Write the counts as JSON here instead of stdout
        #[arg(long, value_name = "FILE")]
        outfile: Option<PathBuf>,
    },

    /// Write one file per rootHOG
    Split {
        /// Input OrthoXML file
        #[arg(long, value_name = "FILE")]
        infile: PathBuf,

        /// Output directory (created if missing)
        #[arg(long, value_name = "DIR")]
        outdir: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Filter {
            infile,
            outfile,
            score_name,
            threshold,
            strategy,
            min_hog_size,
            config,
        } => filter::run(filter::FilterArgs {
            infile,
            outfile,
            score_name,
            threshold,
            strategy,
            min_hog_size,
            config,
        }),
        Commands::Stats { infile } => stats::run_basic(infile),
        Commands::GeneStats { infile, outfile } => stats::run_gene_stats(infile, outfile),
        Commands::Split { infile, outdir } => split::run(infile, outdir),
    }
}
