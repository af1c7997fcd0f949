//! # orthoxml-stream - Streaming OrthoXML rewriting
//!
//! `orthoxml_stream` reads OrthoXML documents of arbitrary size one rootHOG at
//! a time, lets a visitor inspect, drop, rewrite or split each section and
//! group, and writes the result as it goes. Memory is bounded by the largest
//! single rootHOG, not by the document.
//!
//! ## Key Features
//!
//! - **Streaming transducer**: header, species entries, taxonomy and score
//!   definitions are handed to the visitor once each; every top-level group
//!   is materialized as a [`model::HogTree`], visited, written and released.
//!
//! - **Score-based HOG filters**: a top-down cascade that removes failing
//!   `orthologGroup`s and the groups they empty, and a bottom-up extractor that
//!   promotes the passing subtrees of failing groups to rootHOGs of their own.
//!
//! - **Lossless pass-through**: unknown attributes, `property` elements, notes
//!   and foreign elements are carried to the output unchanged, under whatever
//!   namespace prefix the input uses.
//!
//! - **Transparent gzip**: paths ending in `.gz` are (de)compressed on the fly.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use orthoxml_stream::filter::filter_hogs;
//!
//! // Keep rootHOGs whose orthologGroups all score >= 0.75
//! let stats = filter_hogs("hogs.orthoxml.gz", "filtered.orthoxml", 0.75, 2, "cascade-remove")?;
//! println!("kept {} of {} rootHOGs", stats.groups_emitted, stats.groups_read);
//! # Ok::<(), orthoxml_stream::filter::FilterError>(())
//! ```
//!
//! ## Custom visitors
//!
//! ```rust,no_run
//! use orthoxml_stream::prelude::*;
//!
//! /// Keeps rootHOGs with at least ten genes
//! struct Large;
//!
//! impl OrthoXmlVisitor for Large {
//!     fn visit_group(&mut self, tree: HogTree) -> GroupOutcome {
//!         if tree.gene_ids(tree.root()).len() >= 10 {
//!             GroupOutcome::Keep(tree)
//!         } else {
//!             GroupOutcome::Drop
//!         }
//!     }
//! }
//!
//! process_stream_orthoxml("hogs.orthoxml", "large.orthoxml", &mut Large)?;
//! # Ok::<(), TransducerError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`namespace`]: element classification under the document's OrthoXML namespace
//! - [`model`]: attributes, sections and the arena-based HOG tree
//! - [`predicate`]: node predicates used by the filters
//! - [`streamer`]: pull-based reader producing [`model::DocumentItem`]s
//! - [`writer`]: incremental serializer and pipelined background writer
//! - [`transducer`]: run loop and the visitor plugin trait
//! - [`filter`]: cascade and extract strategies plus the filter driver
//! - [`stats`]: statistics and splitting visitors
//! - [`io`]: file opening with gzip detection

pub mod filter;
pub mod io;
pub mod model;
pub mod namespace;
pub mod predicate;
pub mod stats;
pub mod streamer;
pub mod transducer;
pub mod writer;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::filter::{
        build_filter, filter_hogs, filter_stream, CascadeRemoveFilter, ExtractFilter, FilterConfig,
        FilterError, FilterStrategy,
    };
    pub use crate::model::{
        DocumentHeader, DocumentItem, GeneLookup, GroupData, HogTree, NodeId, NodeKind, NodeRef,
        ScoreDefinitions, Species, TaxonNode, Taxonomy,
    };
    pub use crate::predicate::{CompositePredicate, GeneNumberCheck, NodePredicate, ScoreCheck};
    pub use crate::stats::{BasicStats, GenePerTaxonStats, RootHogCounter, RootHogSplitter};
    pub use crate::streamer::{OrthoXmlStreamer, ParseError};
    pub use crate::transducer::{
        process_stream_orthoxml, GroupOutcome, IdentityVisitor, OrthoXmlVisitor, SectionOutcome,
        Transducer, TransducerConfig, TransducerError, TransducerStats,
    };
    pub use crate::writer::{DocumentSink, OrthoXmlWriter, PipelinedWriter, WriterError};
}
