//! Score-based HOG filtering
//!
//! Two tree-surgery strategies are implemented as visitors of the
//! streaming transducer:
//!
//! - [`CascadeRemoveFilter`] (top-down): failing `orthologGroup`s are cut
//!   out with their subtree; emptied parents follow.
//! - [`ExtractFilter`] (bottom-up): failing `orthologGroup`s are cut out and
//!   the passing subtrees below them become rootHOGs of their own.
//!
//! [`filter_hogs`] wires a [`ScoreCheck`] on the completeness score to the
//! chosen strategy and runs it over a whole document.

use std::fmt;
use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;

use log::info;

use crate::predicate::ScoreCheck;
use crate::transducer::{OrthoXmlVisitor, Transducer, TransducerConfig, TransducerError, TransducerStats};

pub use cascade::CascadeRemoveFilter;
pub use extract::ExtractFilter;

mod cascade;
mod extract;

/// Score id used by [`filter_hogs`]
pub const COMPLETENESS_SCORE_ID: &str = "CompletenessScore";

/// Default value of the (unenforced) minimum HOG size
pub const DEFAULT_MIN_HOG_SIZE: usize = 2;

/// Errors that can occur while setting up or running a filter
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// Strategy name not recognized
    #[error("Unsupported strategy {name}. Choices are: {choices}")]
    UnsupportedStrategy {
        /// Name as given
        name: String,
        /// Comma-separated canonical names
        choices: String,
    },

    /// Strategy is declared but has no implementation
    #[error("Filter strategy '{strategy}' is not implemented")]
    NotImplemented {
        /// The selected strategy
        strategy: FilterStrategy,
    },

    /// Error during the transducer run
    #[error(transparent)]
    Transducer(#[from] TransducerError),

    /// I/O error outside the transducer run
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tree-surgery strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FilterStrategy {
    /// Top-down removal, see [`CascadeRemoveFilter`]
    #[default]
    CascadeRemove,
    /// Bottom-up extraction, see [`ExtractFilter`]
    Extract,
    /// Re-attach passing subtrees to the nearest passing ancestor (not implemented)
    Reparent,
}

impl FilterStrategy {
    /// All strategies in declaration order
    pub const ALL: [FilterStrategy; 3] = [
        FilterStrategy::CascadeRemove,
        FilterStrategy::Extract,
        FilterStrategy::Reparent,
    ];

    /// Canonical command-line name
    pub fn name(self) -> &'static str {
        match self {
            FilterStrategy::CascadeRemove => "cascade-remove",
            FilterStrategy::Extract => "extract",
            FilterStrategy::Reparent => "reparent",
        }
    }

    /// Comma-separated list of the canonical names
    pub fn choices() -> String {
        Self::ALL.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for FilterStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterStrategy {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "cascade-remove" | "topdown" => Ok(FilterStrategy::CascadeRemove),
            "extract" | "bottomup" => Ok(FilterStrategy::Extract),
            "reparent" => Ok(FilterStrategy::Reparent),
            _ => Err(FilterError::UnsupportedStrategy {
                name: s.to_string(),
                choices: Self::choices(),
            }),
        }
    }
}

/// Parameters of a filter run
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// Score id tested by the predicate
    pub score_id: String,
    /// Minimum accepted score value
    pub score_threshold: f64,
    /// Minimum HOG size, carried but not enforced
    pub min_hog_size: usize,
    /// Tree-surgery strategy
    pub strategy: FilterStrategy,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            score_id: COMPLETENESS_SCORE_ID.to_string(),
            score_threshold: 0.0,
            min_hog_size: DEFAULT_MIN_HOG_SIZE,
            strategy: FilterStrategy::default(),
        }
    }
}

impl FilterConfig {
    /// Completeness-score filter with the given threshold and strategy
    pub fn new(score_threshold: f64, strategy: FilterStrategy) -> Self {
        Self {
            score_threshold,
            strategy,
            ..Default::default()
        }
    }

    /// Set the tested score id
    pub fn with_score_id(mut self, score_id: impl Into<String>) -> Self {
        self.score_id = score_id.into();
        self
    }

    /// Set the minimum HOG size
    pub fn with_min_hog_size(mut self, min_hog_size: usize) -> Self {
        self.min_hog_size = min_hog_size;
        self
    }
}

/// Build the visitor for a filter configuration.
///
/// Fails with [`FilterError::NotImplemented`] for [`FilterStrategy::Reparent`].
pub fn build_filter(config: &FilterConfig) -> Result<Box<dyn OrthoXmlVisitor>, FilterError> {
    let predicate = ScoreCheck::new(config.score_id.clone(), config.score_threshold);
    match config.strategy {
        FilterStrategy::CascadeRemove => Ok(Box::new(CascadeRemoveFilter::new(predicate))),
        FilterStrategy::Extract => Ok(Box::new(ExtractFilter::new(predicate, config.min_hog_size))),
        FilterStrategy::Reparent => Err(FilterError::NotImplemented {
            strategy: config.strategy,
        }),
    }
}

/// Filter the HOGs of the document at `source` by completeness score and
/// write the result to `destination`.
///
/// `strategy` is a strategy name (`cascade-remove`, `extract`, `reparent`, or
/// the aliases `topdown`/`bottomup`). Unknown and unimplemented strategies
/// are rejected before either file is opened. On any later error the
/// destination is left incomplete and must be discarded.
pub fn filter_hogs<P, Q>(
    source: P,
    destination: Q,
    score_threshold: f64,
    min_hog_size: usize,
    strategy: &str,
) -> Result<TransducerStats, FilterError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let config = FilterConfig::new(score_threshold, strategy.parse()?).with_min_hog_size(min_hog_size);
    filter_hogs_with_config(source, destination, &config, &TransducerConfig::default())
}

/// [`filter_hogs`] with full control over filter and output settings
pub fn filter_hogs_with_config<P, Q>(
    source: P,
    destination: Q,
    config: &FilterConfig,
    transducer_config: &TransducerConfig,
) -> Result<TransducerStats, FilterError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let mut visitor = build_filter(config)?;
    info!(
        "Filtering with strategy {} on {} >= {}",
        config.strategy, config.score_id, config.score_threshold
    );
    let transducer = Transducer::with_config(transducer_config.clone());
    Ok(transducer.process_path(source, destination, &mut visitor)?)
}

/// Filter an in-memory document stream and hand the destination back
pub fn filter_stream<R, W>(
    source: R,
    destination: W,
    config: &FilterConfig,
    transducer_config: &TransducerConfig,
) -> Result<(W, TransducerStats), FilterError>
where
    R: BufRead,
    W: Write + Send + 'static,
{
    let mut visitor = build_filter(config)?;
    let transducer = Transducer::with_config(transducer_config.clone());
    Ok(transducer.process(source, destination, &mut visitor)?)
}
