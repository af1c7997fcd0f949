use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use orthoxml_stream::filter::{filter_hogs_with_config, FilterConfig, FilterStrategy};
use orthoxml_stream::transducer::TransducerConfig;

use super::config::{Config, OutputSection};

/// Command-line values of the filter command; `None` falls back to the config file
pub struct FilterArgs {
    pub infile: PathBuf,
    pub outfile: PathBuf,
    pub score_name: Option<String>,
    pub threshold: Option<f64>,
    pub strategy: Option<String>,
    pub min_hog_size: Option<usize>,
    pub config: Option<PathBuf>,
}

/// Filter the HOGs of an OrthoXML file by score
pub fn run(args: FilterArgs) -> Result<()> {
    if !args.infile.exists() {
        anyhow::bail!("Input file does not exist: {}", args.infile.display());
    }

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let (filter_config, transducer_config) = resolve(&args, config)?;

    let stats = filter_hogs_with_config(&args.infile, &args.outfile, &filter_config, &transducer_config)
        .with_context(|| format!("Failed to filter {}", args.infile.display()))?;

    info!(
        "Kept {} of {} rootHOGs in {}",
        stats.groups_emitted,
        stats.groups_read,
        args.outfile.display()
    );
    Ok(())
}

/// Merge flags over the config file; flags win
fn resolve(args: &FilterArgs, config: Config) -> Result<(FilterConfig, TransducerConfig)> {
    let Config { filter, output } = config;

    let threshold = args
        .threshold
        .or(filter.threshold)
        .context("A score threshold is required (--threshold or [filter] threshold)")?;
    let strategy = args
        .strategy
        .clone()
        .or(filter.strategy)
        .map(|name| name.parse::<FilterStrategy>())
        .transpose()?
        .unwrap_or_default();

    let mut filter_config = FilterConfig::new(threshold, strategy);
    if let Some(score_name) = args.score_name.clone().or(filter.score_name) {
        filter_config = filter_config.with_score_id(score_name);
    }
    if let Some(min_hog_size) = args.min_hog_size.or(filter.min_hog_size) {
        filter_config = filter_config.with_min_hog_size(min_hog_size);
    }

    Ok((filter_config, transducer_config(&output)))
}

/// Output settings from the `[output]` table
pub fn transducer_config(output: &OutputSection) -> TransducerConfig {
    let mut transducer_config = TransducerConfig::default();
    if let Some(indent) = output.indent {
        transducer_config = transducer_config.with_indent((indent > 0).then_some(indent));
    }
    if let Some(capacity) = output.pipeline {
        transducer_config = transducer_config.with_pipeline(capacity);
    }
    if let Some(size) = output.input_buffer_size {
        transducer_config = transducer_config.with_input_buffer_size(size);
    }
    transducer_config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> FilterArgs {
        FilterArgs {
            infile: PathBuf::from("in.orthoxml"),
            outfile: PathBuf::from("out.orthoxml"),
            score_name: None,
            threshold: None,
            strategy: None,
            min_hog_size: None,
            config: None,
        }
    }

    const FILE: &str = r#"
        [filter]
        score_name = "Coverage"
        threshold = 0.75
        strategy = "bottomup"
        min_hog_size = 3

        [output]
        indent = 0
        pipeline = 8
        input_buffer_size = 1024
    "#;

    #[test]
    fn test_config_file_values_apply() {
        let (filter, transducer) = resolve(&args(), Config::from_str(FILE).unwrap()).unwrap();
        assert_eq!(filter.score_id, "Coverage");
        assert_eq!(filter.score_threshold, 0.75);
        assert_eq!(filter.strategy, FilterStrategy::Extract);
        assert_eq!(filter.min_hog_size, 3);
        assert_eq!(transducer.indent, None);
        assert_eq!(transducer.pipeline, Some(8));
        assert_eq!(transducer.input_buffer_size, 1024);
    }

    #[test]
    fn test_flags_override_config_file() {
        let flags = FilterArgs {
            score_name: Some("CompletenessScore".into()),
            threshold: Some(0.2),
            strategy: Some("topdown".into()),
            min_hog_size: Some(5),
            ..args()
        };
        let (filter, transducer) = resolve(&flags, Config::from_str(FILE).unwrap()).unwrap();
        assert_eq!(filter.score_id, "CompletenessScore");
        assert_eq!(filter.score_threshold, 0.2);
        assert_eq!(filter.strategy, FilterStrategy::CascadeRemove);
        assert_eq!(filter.min_hog_size, 5);
        // output settings only come from the file
        assert_eq!(transducer.pipeline, Some(8));
    }

    #[test]
    fn test_missing_threshold_and_bad_strategy() {
        assert!(resolve(&args(), Config::default()).is_err());

        let flags = FilterArgs {
            threshold: Some(0.5),
            strategy: Some("sideways".into()),
            ..args()
        };
        assert!(resolve(&flags, Config::default()).is_err());
    }

    #[test]
    fn test_defaults_without_config_file() {
        let flags = FilterArgs {
            threshold: Some(0.5),
            ..args()
        };
        let (filter, transducer) = resolve(&flags, Config::default()).unwrap();
        assert_eq!(filter, FilterConfig::new(0.5, FilterStrategy::default()));
        assert_eq!(transducer, TransducerConfig::default());
    }
}
