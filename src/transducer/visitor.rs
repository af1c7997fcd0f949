use crate::model::{HogTree, ScoreDefinitions, Species, Taxonomy};

/// Result of a section hook: the section is either written or omitted whole
#[derive(Debug, Clone, PartialEq)]
pub enum SectionOutcome<T> {
    /// Write the (possibly modified) section
    Keep(T),
    /// Omit the section from the output
    Drop,
}

impl<T> SectionOutcome<T> {
    /// Whether the section is kept
    pub fn is_keep(&self) -> bool {
        matches!(self, SectionOutcome::Keep(_))
    }
}

/// Result of the group hook for one rootHOG
#[derive(Debug, Clone, PartialEq)]
pub enum GroupOutcome {
    /// Emit nothing for this rootHOG
    Drop,
    /// Emit one top-level group
    Keep(HogTree),
    /// Emit each tree as an independent top-level group, in order
    Expand(Vec<HogTree>),
}

impl GroupOutcome {
    /// Number of top-level groups this outcome emits
    pub fn len(&self) -> usize {
        match self {
            GroupOutcome::Drop => 0,
            GroupOutcome::Keep(_) => 1,
            GroupOutcome::Expand(trees) => trees.len(),
        }
    }

    /// Whether nothing is emitted
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Plugin contract of the streaming transducer.
///
/// Hooks are called in document order. Section hooks receive one fully
/// parsed section (the species list one `<species>` entry at a time) and
/// default to keeping it; the group hook receives each rootHOG with its
/// complete subtree and owns it until it returns.
pub trait OrthoXmlVisitor {
    /// Called once per `<species>` entry
    fn visit_species(&mut self, species: Species) -> SectionOutcome<Species> {
        SectionOutcome::Keep(species)
    }

    /// Called for the `<taxonomy>` section
    fn visit_taxonomy(&mut self, taxonomy: Taxonomy) -> SectionOutcome<Taxonomy> {
        SectionOutcome::Keep(taxonomy)
    }

    /// Called for the `<scores>` section
    fn visit_scores(&mut self, scores: ScoreDefinitions) -> SectionOutcome<ScoreDefinitions> {
        SectionOutcome::Keep(scores)
    }

    /// Called once per rootHOG
    fn visit_group(&mut self, tree: HogTree) -> GroupOutcome;
}

impl<V: OrthoXmlVisitor + ?Sized> OrthoXmlVisitor for Box<V> {
    fn visit_species(&mut self, species: Species) -> SectionOutcome<Species> {
        (**self).visit_species(species)
    }

    fn visit_taxonomy(&mut self, taxonomy: Taxonomy) -> SectionOutcome<Taxonomy> {
        (**self).visit_taxonomy(taxonomy)
    }

    fn visit_scores(&mut self, scores: ScoreDefinitions) -> SectionOutcome<ScoreDefinitions> {
        (**self).visit_scores(scores)
    }

    fn visit_group(&mut self, tree: HogTree) -> GroupOutcome {
        (**self).visit_group(tree)
    }
}

/// Visitor that keeps everything unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityVisitor;

impl OrthoXmlVisitor for IdentityVisitor {
    fn visit_group(&mut self, tree: HogTree) -> GroupOutcome {
        GroupOutcome::Keep(tree)
    }
}
