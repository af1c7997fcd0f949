//! Namespace resolution for OrthoXML element names
//!
//! OrthoXML documents bind every element to a single namespace, but the
//! prefix used for that binding is up to the producer: most files use a
//! default namespace (`<orthoXML xmlns="...">`), some bind an explicit
//! prefix (`<ox:orthoXML xmlns:ox="...">`). The resolver maps a resolved
//! element name to an [`ElementKind`] irrespective of the prefix, and
//! remembers the prefix so that re-serialized output uses the same binding
//! the input declared.

use std::borrow::Cow;

use quick_xml::name::{LocalName, QName, ResolveResult};

/// The namespace of OrthoXML 0.3 - 0.5 documents
pub const ORTHOXML_NAMESPACE: &str = "http://orthoXML.org/2011/";

/// Logical kind of an element of the OrthoXML section grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `<orthoXML>` document root
    OrthoXml,
    /// `<notes>` free-form annotation
    Notes,
    /// `<species>` entry of the species list
    Species,
    /// `<database>` block inside a species entry
    Database,
    /// `<genes>` wrapper inside a database block
    Genes,
    /// `<gene>` record
    Gene,
    /// `<taxonomy>` section
    Taxonomy,
    /// `<taxon>` node of the taxonomy tree
    Taxon,
    /// `<scores>` score-definitions section
    Scores,
    /// `<scoreDef>` entry of the score definitions
    ScoreDef,
    /// `<score>` attached to a group
    Score,
    /// `<property>` attached to a group
    Property,
    /// `<groups>` section
    Groups,
    /// `<orthologGroup>` (speciation node)
    OrthologGroup,
    /// `<paralogGroup>` (duplication node)
    ParalogGroup,
    /// `<geneRef>` leaf
    GeneRef,
}

impl ElementKind {
    /// Local (unprefixed) element name
    pub fn local_name(self) -> &'static str {
        match self {
            ElementKind::OrthoXml => "orthoXML",
            ElementKind::Notes => "notes",
            ElementKind::Species => "species",
            ElementKind::Database => "database",
            ElementKind::Genes => "genes",
            ElementKind::Gene => "gene",
            ElementKind::Taxonomy => "taxonomy",
            ElementKind::Taxon => "taxon",
            ElementKind::Scores => "scores",
            ElementKind::ScoreDef => "scoreDef",
            ElementKind::Score => "score",
            ElementKind::Property => "property",
            ElementKind::Groups => "groups",
            ElementKind::OrthologGroup => "orthologGroup",
            ElementKind::ParalogGroup => "paralogGroup",
            ElementKind::GeneRef => "geneRef",
        }
    }

    /// Look up the kind for a local element name
    pub fn from_local_name(name: &[u8]) -> Option<Self> {
        let kind = match name {
            b"orthoXML" => ElementKind::OrthoXml,
            b"notes" => ElementKind::Notes,
            b"species" => ElementKind::Species,
            b"database" => ElementKind::Database,
            b"genes" => ElementKind::Genes,
            b"gene" => ElementKind::Gene,
            b"taxonomy" => ElementKind::Taxonomy,
            b"taxon" => ElementKind::Taxon,
            b"scores" => ElementKind::Scores,
            b"scoreDef" => ElementKind::ScoreDef,
            b"score" => ElementKind::Score,
            b"property" => ElementKind::Property,
            b"groups" => ElementKind::Groups,
            b"orthologGroup" => ElementKind::OrthologGroup,
            b"paralogGroup" => ElementKind::ParalogGroup,
            b"geneRef" => ElementKind::GeneRef,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether this is one of the two HOG group kinds
    pub fn is_group(self) -> bool {
        matches!(self, ElementKind::OrthologGroup | ElementKind::ParalogGroup)
    }
}

/// Maps resolved element names onto [`ElementKind`]s for one document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NamespaceResolver {
    namespace: Option<String>,
    prefix: Option<String>,
}

impl NamespaceResolver {
    /// Create a resolver for the given namespace URI and prefix binding
    pub fn new(namespace: Option<String>, prefix: Option<String>) -> Self {
        Self { namespace, prefix }
    }

    /// Resolver for the canonical OrthoXML namespace bound as default namespace
    pub fn orthoxml() -> Self {
        Self::new(Some(ORTHOXML_NAMESPACE.to_string()), None)
    }

    /// Build the resolver from the resolved name of the document root.
    ///
    /// The root's namespace becomes the document namespace; its prefix (if
    /// any) is reused for every element written back.
    pub fn from_root(namespace: &ResolveResult, name: QName) -> Self {
        let namespace = match namespace {
            ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
            _ => None,
        };
        let prefix = name
            .prefix()
            .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());
        Self { namespace, prefix }
    }

    /// Document namespace URI, if the root was bound to one
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Prefix bound to the document namespace, `None` for a default binding
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Whether the document uses the canonical OrthoXML namespace
    pub fn is_canonical(&self) -> bool {
        self.namespace.as_deref() == Some(ORTHOXML_NAMESPACE)
    }

    /// Classify a resolved element name.
    ///
    /// Returns `None` for elements outside the document namespace and for
    /// names that are not part of the OrthoXML grammar.
    pub fn classify(&self, namespace: &ResolveResult, local: LocalName) -> Option<ElementKind> {
        let in_document_namespace = match namespace {
            ResolveResult::Bound(ns) => self.namespace.as_deref().map(str::as_bytes) == Some(ns.as_ref()),
            ResolveResult::Unbound => self.namespace.is_none(),
            ResolveResult::Unknown(_) => false,
        };
        if !in_document_namespace {
            return None;
        }
        ElementKind::from_local_name(local.as_ref())
    }

    /// Qualified name to write for an element of the given kind
    pub fn qualify(&self, kind: ElementKind) -> Cow<'static, str> {
        match &self.prefix {
            Some(prefix) => Cow::Owned(format!("{}:{}", prefix, kind.local_name())),
            None => Cow::Borrowed(kind.local_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::name::Namespace;

    #[test]
    fn test_local_name_roundtrip() {
        for kind in [
            ElementKind::Species,
            ElementKind::Gene,
            ElementKind::Taxon,
            ElementKind::Score,
            ElementKind::OrthologGroup,
            ElementKind::ParalogGroup,
            ElementKind::GeneRef,
            ElementKind::Groups,
        ] {
            assert_eq!(ElementKind::from_local_name(kind.local_name().as_bytes()), Some(kind));
        }
        assert_eq!(ElementKind::from_local_name(b"sequence"), None);
    }

    #[test]
    fn test_classify_ignores_prefix() {
        let resolver = NamespaceResolver::new(Some(ORTHOXML_NAMESPACE.to_string()), Some("ox".into()));
        let ns = ResolveResult::Bound(Namespace(ORTHOXML_NAMESPACE.as_bytes()));
        let local = QName(b"orthologGroup").local_name();
        assert_eq!(resolver.classify(&ns, local), Some(ElementKind::OrthologGroup));

        let other = ResolveResult::Bound(Namespace(b"http://example.org/other"));
        assert_eq!(resolver.classify(&other, local), None);
        assert_eq!(resolver.classify(&ResolveResult::Unbound, local), None);
    }

    #[test]
    fn test_qualify_reuses_prefix() {
        let prefixed = NamespaceResolver::new(Some(ORTHOXML_NAMESPACE.to_string()), Some("ox".into()));
        assert_eq!(prefixed.qualify(ElementKind::GeneRef), "ox:geneRef");
        assert_eq!(NamespaceResolver::orthoxml().qualify(ElementKind::GeneRef), "geneRef");
    }

    #[test]
    fn test_from_root() {
        let ns = ResolveResult::Bound(Namespace(ORTHOXML_NAMESPACE.as_bytes()));
        let resolver = NamespaceResolver::from_root(&ns, QName(b"ox:orthoXML"));
        assert_eq!(resolver.prefix(), Some("ox"));
        assert!(resolver.is_canonical());

        let unbound = NamespaceResolver::from_root(&ResolveResult::Unbound, QName(b"orthoXML"));
        assert_eq!(unbound.namespace(), None);
        assert!(!unbound.is_canonical());
    }
}
