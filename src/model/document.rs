//! Document-level items: root header, score definitions and the item stream

use super::{Attributes, HogTree, RawElement, Species, Taxonomy};
use crate::namespace::NamespaceResolver;

/// The `<orthoXML>` root element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHeader {
    /// Qualified root name as written in the source (`orthoXML`, `ox:orthoXML`)
    pub name: String,
    /// Root attributes verbatim, namespace declarations included
    pub attributes: Attributes,
    /// Namespace binding used for every element of the document
    pub namespace: NamespaceResolver,
}

impl DocumentHeader {
    /// Header for a fresh document in the canonical namespace
    pub fn new(version: &str, origin: &str) -> Self {
        let mut attributes = Attributes::new();
        attributes.push("xmlns", crate::namespace::ORTHOXML_NAMESPACE);
        attributes.push("origin", origin);
        attributes.push("version", version);
        Self {
            name: "orthoXML".to_string(),
            attributes,
            namespace: NamespaceResolver::orthoxml(),
        }
    }

    /// The declared OrthoXML `version`
    pub fn version(&self) -> Option<&str> {
        self.attributes.get("version")
    }

    /// The producing resource (`origin`)
    pub fn origin(&self) -> Option<&str> {
        self.attributes.get("origin")
    }
}

/// A `<scoreDef id=".." desc=".."/>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreDef {
    /// Score id referenced by group scores
    pub id: String,
    /// Human-readable description
    pub desc: Option<String>,
    /// Other attributes
    pub attributes: Attributes,
}

/// The `<scores>` section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreDefinitions {
    /// Attributes of the `<scores>` element
    pub attributes: Attributes,
    /// Score definitions in document order
    pub definitions: Vec<ScoreDef>,
    /// Foreign elements, written after the definitions
    pub extensions: Vec<RawElement>,
}

impl ScoreDefinitions {
    /// Look up a definition by id
    pub fn get(&self, id: &str) -> Option<&ScoreDef> {
        self.definitions.iter().find(|d| d.id == id)
    }
}

/// One recognized construct of a document, in document order.
///
/// The streamer produces these; sinks consume them. Sections arrive fully
/// parsed, and each rootHOG arrives as one complete [`HogTree`].
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentItem {
    /// Root start tag
    Header(DocumentHeader),
    /// One entry of the species list
    Species(Species),
    /// The taxonomy section
    Taxonomy(Taxonomy),
    /// The score-definitions section
    Scores(ScoreDefinitions),
    /// Start of the groups section, with its attributes
    GroupsStart(Attributes),
    /// One rootHOG
    Group(HogTree),
    /// An element outside the recognized grammar, passed through verbatim
    PassThrough(RawElement),
    /// End of the groups section
    GroupsEnd,
    /// Root end tag
    DocumentEnd,
}
