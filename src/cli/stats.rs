use anyhow::{Context, Result};
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

use orthoxml_stream::stats::{BasicStats, GenePerTaxonStats};
use orthoxml_stream::transducer::Transducer;

/// Print document-level counts
pub fn run_basic(infile: PathBuf) -> Result<()> {
    let mut stats = BasicStats::new();
    Transducer::new()
        .inspect_path(&infile, &mut stats)
        .with_context(|| format!("Failed to read {}", infile.display()))?;

    println!("OrthoXML Statistics");
    println!("===================");
    println!("File: {}", infile.display());
    println!("  Species:     {}", stats.species_count);
    println!("  Genes:       {}", stats.gene_count);
    println!("  rootHOGs:    {}", stats.rhog_count);
    println!("  Leaf taxa:   {}", stats.leaf_taxon_count);
    println!("  Total taxa:  {}", stats.taxon_count);
    Ok(())
}

/// Count genes per taxon and write them as JSON to `outfile` or stdout
pub fn run_gene_stats(infile: PathBuf, outfile: Option<PathBuf>) -> Result<()> {
    let mut stats = GenePerTaxonStats::new();
    Transducer::new()
        .inspect_path(&infile, &mut stats)
        .with_context(|| format!("Failed to read {}", infile.display()))?;

    let json = stats.to_json().context("Failed to serialize gene counts")?;
    emit_json(&json, outfile.as_deref(), &mut std::io::stdout().lock())
}

fn emit_json<W: Write>(json: &str, outfile: Option<&Path>, stdout: &mut W) -> Result<()> {
    match outfile {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Gene counts written to {}", path.display());
        }
        None => writeln!(stdout, "{}", json).context("Failed to write gene counts")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{"HUMAN": {"genes": 2, "genes_in_hogs": 1}}"#;

    #[test]
    fn test_gene_counts_go_to_stdout_without_outfile() {
        let mut stdout = Vec::new();
        emit_json(JSON, None, &mut stdout).unwrap();
        assert_eq!(String::from_utf8(stdout).unwrap(), format!("{}\n", JSON));
    }

    #[test]
    fn test_gene_counts_go_to_outfile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.json");
        let mut stdout = Vec::new();
        emit_json(JSON, Some(&path), &mut stdout).unwrap();
        assert!(stdout.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), JSON);
    }
}
