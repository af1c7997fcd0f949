//! # OrthoXML data model
//!
//! Owned, fully-parsed representations of the constructs the streaming
//! transducer hands to visitors:
//!
//! ```text
//! orthoXML (DocumentHeader)
//! ├── species* (Species)
//! │   └── database+ (Database)
//! │       └── genes
//! │           └── gene* (Gene)
//! ├── taxonomy? (Taxonomy)
//! │   └── taxon (TaxonNode, nested)
//! ├── scores? (ScoreDefinitions)
//! │   └── scoreDef*
//! └── groups
//!     └── orthologGroup | paralogGroup (HogTree, one rootHOG at a time)
//! ```
//!
//! Attributes the model does not name explicitly and elements outside the
//! grammar are carried along as [`Attributes`] and [`RawElement`]s so that
//! re-serialization does not lose them.

mod document;
mod hog;
mod species;
mod taxonomy;

pub use document::{DocumentHeader, DocumentItem, ScoreDef, ScoreDefinitions};
pub use hog::{Descendants, GeneRef, GroupData, HogTree, NodeId, NodeKind, NodeRef, Property, Score};
pub use species::{Database, Gene, GeneLookup, Species};
pub use taxonomy::{TaxonNode, Taxonomy};

use quick_xml::events::Event;

/// Ordered list of XML attributes, kept verbatim
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Create an empty attribute list
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the first attribute with the given name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Append an attribute without checking for duplicates
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        match self.0.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value.into(),
            None => self.0.push((name.to_string(), value.into())),
        }
    }

    /// Remove an attribute and return its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(pos).1)
    }

    /// Iterate over `(name, value)` pairs in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no attributes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// An element outside the recognized grammar, captured event by event.
///
/// Used for `notes`, vendor extensions and unrecognized elements inside the
/// groups section, and also for a lone comment or stray text; written back
/// exactly as read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement {
    events: Vec<Event<'static>>,
}

impl RawElement {
    /// Wrap an already balanced sequence of events
    pub fn new(events: Vec<Event<'static>>) -> Self {
        Self { events }
    }

    /// The captured events, starting with the element's start (or empty) tag
    /// unless this is a lone comment or text
    pub fn events(&self) -> &[Event<'static>] {
        &self.events
    }

    /// Qualified name of the captured element, `None` for comments and text
    pub fn name(&self) -> Option<String> {
        match self.events.first()? {
            Event::Start(e) | Event::Empty(e) => {
                Some(String::from_utf8_lossy(e.name().as_ref()).into_owned())
            }
            _ => None,
        }
    }
}
