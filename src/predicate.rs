//! Composable node predicates used by the filter strategies
//!
//! A predicate tests a single group node of a [`HogTree`](crate::model::HogTree)
//! through a [`NodeRef`] view. Predicates look at the node's own attached
//! content and direct children only; nothing is inherited from ancestors.

use crate::model::NodeRef;

/// Boolean test over a single HOG node
pub trait NodePredicate: Send + Sync {
    /// Evaluate the predicate on a node
    fn evaluate(&self, node: NodeRef<'_>) -> bool;
}

impl<P: NodePredicate + ?Sized> NodePredicate for Box<P> {
    fn evaluate(&self, node: NodeRef<'_>) -> bool {
        (**self).evaluate(node)
    }
}

/// Passes when the node carries a score with the given id and every score
/// with that id is at least `threshold`.
///
/// A node without any matching score fails, whatever the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCheck {
    score_id: String,
    threshold: f64,
}

impl ScoreCheck {
    /// Check scores named `score_id` against `threshold`
    pub fn new(score_id: impl Into<String>, threshold: f64) -> Self {
        Self {
            score_id: score_id.into(),
            threshold,
        }
    }

    /// Score id this check looks for
    pub fn score_id(&self) -> &str {
        &self.score_id
    }

    /// Minimum accepted value
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl NodePredicate for ScoreCheck {
    fn evaluate(&self, node: NodeRef<'_>) -> bool {
        let mut found = false;
        for score in node.scores().iter().filter(|s| s.id == self.score_id) {
            if score.value < self.threshold {
                return false;
            }
            found = true;
        }
        found
    }
}

/// Passes when the node has at least `min_count` direct `geneRef` children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneNumberCheck {
    min_count: usize,
}

impl GeneNumberCheck {
    /// Require at least `min_count` direct gene references
    pub fn new(min_count: usize) -> Self {
        Self { min_count }
    }
}

impl NodePredicate for GeneNumberCheck {
    fn evaluate(&self, node: NodeRef<'_>) -> bool {
        node.direct_gene_ref_count() >= self.min_count
    }
}

/// Logical AND over a list of predicates; an empty list always passes
#[derive(Default)]
pub struct CompositePredicate {
    predicates: Vec<Box<dyn NodePredicate>>,
}

impl CompositePredicate {
    /// Combine the given predicates
    pub fn new(predicates: Vec<Box<dyn NodePredicate>>) -> Self {
        Self { predicates }
    }

    /// Builder-style helper to add another predicate
    pub fn and<P: NodePredicate + 'static>(mut self, predicate: P) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    /// Number of combined predicates
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Whether no predicate has been added
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl NodePredicate for CompositePredicate {
    fn evaluate(&self, node: NodeRef<'_>) -> bool {
        self.predicates.iter().all(|p| p.evaluate(node))
    }
}
