//! # orthoxml
//!
//! Command-line front end of the `orthoxml_stream` library.
//!
//! ## Usage
//!
//! ```bash
//! # Keep HOGs with CompletenessScore >= 0.75, promoting passing subtrees
//! orthoxml filter --infile hogs.orthoxml.gz --outfile filtered.orthoxml \
//!     --threshold 0.75 --strategy bottomup
//!
//! # Document counts
//! orthoxml stats --infile hogs.orthoxml
//!
//! # One file per rootHOG
//! orthoxml split --infile hogs.orthoxml --outdir split/
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
