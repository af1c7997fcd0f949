//! Taxonomy tree built once from the `<taxonomy>` section

use super::{Attributes, RawElement};

/// A `<taxon>` node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonNode {
    /// Taxon id
    pub id: String,
    /// Taxon name
    pub name: String,
    /// Other attributes
    pub attributes: Attributes,
    /// Child taxa in document order
    pub children: Vec<TaxonNode>,
    /// Notes and foreign elements, written after the children
    pub extensions: Vec<RawElement>,
}

impl TaxonNode {
    /// Taxon without children
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style helper to append a child
    pub fn with_child(mut self, child: TaxonNode) -> Self {
        self.children.push(child);
        self
    }

    /// Whether the taxon has no child taxa
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order iterator over this taxon and all descendants
    pub fn iter(&self) -> impl Iterator<Item = &TaxonNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

/// The `<taxonomy>` section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxonomy {
    /// Attributes of the `<taxonomy>` element
    pub attributes: Attributes,
    /// Top-level taxa, usually a single root
    pub roots: Vec<TaxonNode>,
    /// Foreign elements, written after the taxa
    pub extensions: Vec<RawElement>,
}

impl Taxonomy {
    /// Pre-order iterator over every taxon
    pub fn iter(&self) -> impl Iterator<Item = &TaxonNode> {
        self.roots.iter().flat_map(TaxonNode::iter)
    }

    /// Total number of taxa
    pub fn taxon_count(&self) -> usize {
        self.iter().count()
    }

    /// Number of taxa without child taxa
    pub fn leaf_count(&self) -> usize {
        self.iter().filter(|t| t.is_leaf()).count()
    }

    /// Find a taxon by name
    pub fn find_by_name(&self, name: &str) -> Option<&TaxonNode> {
        self.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let taxonomy = Taxonomy {
            roots: vec![TaxonNode::new("1", "Mammalia")
                .with_child(TaxonNode::new("2", "HUMAN"))
                .with_child(TaxonNode::new("3", "Murinae").with_child(TaxonNode::new("4", "MOUSE")))],
            ..Default::default()
        };
        assert_eq!(taxonomy.taxon_count(), 4);
        assert_eq!(taxonomy.leaf_count(), 2);
        let names: Vec<_> = taxonomy.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Mammalia", "HUMAN", "Murinae", "MOUSE"]);
        assert_eq!(taxonomy.find_by_name("Murinae").map(|t| t.id.as_str()), Some("3"));
    }
}
