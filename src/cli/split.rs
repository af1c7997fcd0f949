use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use orthoxml_stream::stats::{RootHogCounter, RootHogSplitter};
use orthoxml_stream::transducer::Transducer;

/// Write every rootHOG of `infile` to `{outdir}/{n}_{file name}`.
///
/// The input is read once to count rootHOGs and once more per rootHOG.
pub fn run(infile: PathBuf, outdir: PathBuf) -> Result<()> {
    let file_name = infile
        .file_name()
        .context("Input path has no file name")?
        .to_string_lossy()
        .into_owned();
    std::fs::create_dir_all(&outdir)
        .with_context(|| format!("Failed to create {}", outdir.display()))?;

    let transducer = Transducer::new();
    let mut counter = RootHogCounter::default();
    transducer
        .inspect_path(&infile, &mut counter)
        .with_context(|| format!("Failed to read {}", infile.display()))?;
    info!("Splitting {} rootHOGs", counter.count);

    for rhog in 1..=counter.count {
        let output = outdir.join(format!("{}_{}", rhog, file_name));
        let mut splitter = RootHogSplitter::new(rhog);
        transducer
            .process_path(&infile, &output, &mut splitter)
            .with_context(|| format!("Failed to write {}", output.display()))?;
    }
    Ok(())
}
