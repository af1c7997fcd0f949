//! Streaming OrthoXML transducer
//!
//! The transducer reads a document section by section, hands every
//! recognized construct to an [`OrthoXmlVisitor`] and writes back whatever
//! the visitor returns:
//!
//! ```text
//! source ──▶ OrthoXmlStreamer ──DocumentItem──▶ visitor hooks ──▶ DocumentSink ──▶ destination
//! ```
//!
//! Exactly one rootHOG is in memory at a time: it is read completely,
//! passed to [`OrthoXmlVisitor::visit_group`], serialized (or dropped) and
//! released before the next one is read. With
//! [`TransducerConfig::pipeline`] set, serialization moves to a background
//! thread and up to that many items are additionally buffered in between.
//!
//! # Errors
//!
//! Any parse or write error aborts the run. Output is written incrementally,
//! so a failed run leaves a truncated, invalid destination behind; callers
//! must discard it.

use std::io::{BufRead, Write};
use std::path::Path;

use log::{debug, info};

use crate::io::{open_input, OutputFile};
use crate::model::DocumentItem;
use crate::streamer::{OrthoXmlStreamer, ParseError, DEFAULT_INPUT_BUFFER_SIZE};
use crate::writer::{DocumentSink, OrthoXmlWriter, PipelinedWriter, WriterError, DEFAULT_INDENT};

pub use visitor::{GroupOutcome, IdentityVisitor, OrthoXmlVisitor, SectionOutcome};

mod visitor;


/// Errors that can occur during a transducer run
#[derive(Debug, thiserror::Error)]
pub enum TransducerError {
    /// Error reading the source document
    #[error("OrthoXML parsing error: {0}")]
    ParseError(#[from] ParseError),

    /// Error writing the destination document
    #[error("Writer error: {0}")]
    WriterError(#[from] WriterError),

    /// I/O error opening or finalizing files
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Configuration of a transducer run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransducerConfig {
    /// Read buffer size for path-based input
    pub input_buffer_size: usize,

    /// Indentation width of the output, `None` for compact output
    pub indent: Option<usize>,

    /// Capacity of the channel to a background writer thread.
    /// `None` serializes on the calling thread.
    pub pipeline: Option<usize>,
}

impl Default for TransducerConfig {
    fn default() -> Self {
        Self {
            input_buffer_size: DEFAULT_INPUT_BUFFER_SIZE,
            indent: Some(DEFAULT_INDENT),
            pipeline: None,
        }
    }
}

impl TransducerConfig {
    /// Set the output indentation
    pub fn with_indent(mut self, indent: Option<usize>) -> Self {
        self.indent = indent;
        self
    }

    /// Serialize on a background thread fed by a channel of `capacity` items
    pub fn with_pipeline(mut self, capacity: usize) -> Self {
        self.pipeline = Some(capacity);
        self
    }

    /// Set the read buffer size
    pub fn with_input_buffer_size(mut self, size: usize) -> Self {
        self.input_buffer_size = size;
        self
    }
}

/// Counters collected during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransducerStats {
    /// Species entries written
    pub species_kept: usize,
    /// Species entries dropped by the visitor
    pub species_dropped: usize,
    /// Taxonomy and score sections dropped by the visitor
    pub sections_dropped: usize,
    /// rootHOGs read from the source
    pub groups_read: usize,
    /// Top-level groups written
    pub groups_emitted: usize,
    /// rootHOGs for which nothing was written
    pub groups_dropped: usize,
    /// rootHOGs the visitor expanded into a list of groups
    pub groups_expanded: usize,
    /// Unrecognized elements and comments copied verbatim
    pub passed_through: usize,
}

/// Sink that discards every item, for visitors that only collect data
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl DocumentSink for DiscardSink {
    fn write_item(&mut self, _item: DocumentItem) -> Result<(), WriterError> {
        Ok(())
    }
}

impl DocumentSink for Vec<DocumentItem> {
    fn write_item(&mut self, item: DocumentItem) -> Result<(), WriterError> {
        self.push(item);
        Ok(())
    }
}

/// Drives an [`OrthoXmlVisitor`] over a document
#[derive(Debug, Clone, Default)]
pub struct Transducer {
    config: TransducerConfig,
}

impl Transducer {
    /// Create a transducer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transducer with custom configuration
    pub fn with_config(config: TransducerConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    pub fn config(&self) -> &TransducerConfig {
        &self.config
    }

    /// Core loop: pull items from `streamer`, apply `visitor`, push to `sink`
    pub fn run<R, S, V>(
        &self,
        streamer: &mut OrthoXmlStreamer<R>,
        sink: &mut S,
        visitor: &mut V,
    ) -> Result<TransducerStats, TransducerError>
    where
        R: BufRead,
        S: DocumentSink + ?Sized,
        V: OrthoXmlVisitor + ?Sized,
    {
        let mut stats = TransducerStats::default();

        while let Some(item) = streamer.next_item()? {
            match item {
                DocumentItem::Species(species) => match visitor.visit_species(species) {
                    SectionOutcome::Keep(species) => {
                        stats.species_kept += 1;
                        sink.write_item(DocumentItem::Species(species))?;
                    }
                    SectionOutcome::Drop => stats.species_dropped += 1,
                },
                DocumentItem::Taxonomy(taxonomy) => match visitor.visit_taxonomy(taxonomy) {
                    SectionOutcome::Keep(taxonomy) => sink.write_item(DocumentItem::Taxonomy(taxonomy))?,
                    SectionOutcome::Drop => stats.sections_dropped += 1,
                },
                DocumentItem::Scores(scores) => match visitor.visit_scores(scores) {
                    SectionOutcome::Keep(scores) => sink.write_item(DocumentItem::Scores(scores))?,
                    SectionOutcome::Drop => stats.sections_dropped += 1,
                },
                DocumentItem::Group(tree) => {
                    stats.groups_read += 1;
                    let outcome = visitor.visit_group(tree);
                    let emitted = outcome.len();
                    match outcome {
                        GroupOutcome::Drop => {}
                        GroupOutcome::Keep(tree) => sink.write_item(DocumentItem::Group(tree))?,
                        GroupOutcome::Expand(trees) => {
                            stats.groups_expanded += 1;
                            for tree in trees {
                                sink.write_item(DocumentItem::Group(tree))?;
                            }
                        }
                    }
                    if emitted == 0 {
                        stats.groups_dropped += 1;
                    }
                    stats.groups_emitted += emitted;
                }
                DocumentItem::PassThrough(raw) => {
                    stats.passed_through += 1;
                    sink.write_item(DocumentItem::PassThrough(raw))?;
                }
                other => sink.write_item(other)?,
            }
        }

        debug!("Transducer finished: {:?}", stats);
        Ok(stats)
    }

    /// Transduce `source` into `destination` and hand the destination back
    pub fn process<R, W, V>(
        &self,
        source: R,
        destination: W,
        visitor: &mut V,
    ) -> Result<(W, TransducerStats), TransducerError>
    where
        R: BufRead,
        W: Write + Send + 'static,
        V: OrthoXmlVisitor + ?Sized,
    {
        let mut streamer = OrthoXmlStreamer::new(source);
        let writer = OrthoXmlWriter::with_indent(destination, self.config.indent);

        match self.config.pipeline {
            Some(capacity) => {
                let mut sink = PipelinedWriter::new(writer, capacity)?;
                let stats = match self.run(&mut streamer, &mut sink, visitor) {
                    Ok(stats) => stats,
                    Err(e) => {
                        // surface the writer thread's error if it failed first
                        sink.check_error()?;
                        return Err(e);
                    }
                };
                Ok((sink.finish()?, stats))
            }
            None => {
                let mut sink = writer;
                let stats = self.run(&mut streamer, &mut sink, visitor)?;
                Ok((sink.finish()?, stats))
            }
        }
    }

    /// Transduce the file at `input_path` into `output_path`.
    ///
    /// Either path may end in `.gz` for gzip-compressed I/O.
    pub fn process_path<P, Q, V>(
        &self,
        input_path: P,
        output_path: Q,
        visitor: &mut V,
    ) -> Result<TransducerStats, TransducerError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        V: OrthoXmlVisitor + ?Sized,
    {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();
        info!("Processing {} into {}", input_path.display(), output_path.display());

        let source = open_input(input_path, self.config.input_buffer_size)?;
        let destination = OutputFile::create(output_path)?;
        let (destination, stats) = self.process(source, destination, visitor)?;
        destination.finalize()?;

        log_summary(&stats);
        Ok(stats)
    }

    /// Run `visitor` over the file at `input_path` without writing anything
    pub fn inspect_path<P, V>(&self, input_path: P, visitor: &mut V) -> Result<TransducerStats, TransducerError>
    where
        P: AsRef<Path>,
        V: OrthoXmlVisitor + ?Sized,
    {
        let input_path = input_path.as_ref();
        info!("Reading {}", input_path.display());

        let source = open_input(input_path, self.config.input_buffer_size)?;
        let mut streamer = OrthoXmlStreamer::new(source);
        let stats = self.run(&mut streamer, &mut DiscardSink, visitor)?;
        log_summary(&stats);
        Ok(stats)
    }
}

fn log_summary(stats: &TransducerStats) {
    info!(
        "rootHOGs: {} read, {} written, {} dropped, {} expanded",
        stats.groups_read, stats.groups_emitted, stats.groups_dropped, stats.groups_expanded
    );
    if stats.species_dropped > 0 || stats.sections_dropped > 0 {
        info!(
            "Dropped {} species entries and {} sections",
            stats.species_dropped, stats.sections_dropped
        );
    }
    if stats.passed_through > 0 {
        info!("Copied {} unrecognized nodes verbatim", stats.passed_through);
    }
}

/// Run `visitor` over the document at `source` and write the result to
/// `destination` with default settings.
///
/// This is the single entry point shared by filtering, statistics and
/// splitting; they differ only in the visitor they pass.
pub fn process_stream_orthoxml<P, Q, V>(
    source: P,
    destination: Q,
    visitor: &mut V,
) -> Result<TransducerStats, TransducerError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    V: OrthoXmlVisitor + ?Sized,
{
    Transducer::new().process_path(source, destination, visitor)
}
