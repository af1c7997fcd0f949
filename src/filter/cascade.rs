use log::debug;

use crate::model::{HogTree, NodeId};
use crate::predicate::NodePredicate;
use crate::transducer::{GroupOutcome, OrthoXmlVisitor};

/// Top-down filter: a failing `orthologGroup` is removed with its whole
/// subtree, and groups left without children are removed in turn.
///
/// A rootHOG whose root fails the predicate, or whose root ends up with no
/// children, is dropped entirely.
pub struct CascadeRemoveFilter<P> {
    predicate: P,
}

impl<P: NodePredicate> CascadeRemoveFilter<P> {
    /// Create the filter around a predicate
    pub fn new(predicate: P) -> Self {
        Self { predicate }
    }

    /// Prune one rootHOG; `None` means nothing is left to emit
    pub fn prune(&self, mut tree: HogTree) -> Option<HogTree> {
        let root = tree.root();
        if !self.predicate.evaluate(tree.node(root)) {
            debug!("Dropping rootHOG {:?}: root fails predicate", root_label(&tree));
            return None;
        }

        let mut worklist: Vec<NodeId> = tree
            .descendants(root)
            .filter(|&id| tree.kind(id).is_ortholog_group() && !self.predicate.evaluate(tree.node(id)))
            .collect();
        debug!("will remove {} hogs from {:?}", worklist.len(), root_label(&tree));

        let mut queued = vec![false; tree.arena_len()];
        for id in &worklist {
            queued[id.index()] = true;
        }

        // the worklist grows while it is drained
        let mut next = 0;
        while next < worklist.len() {
            let id = worklist[next];
            next += 1;

            let Some(parent) = tree.parent(id) else {
                continue;
            };
            tree.detach(id);
            if !tree.children(parent).is_empty() {
                continue;
            }
            if parent == root {
                debug!("Dropping rootHOG {:?}: no children left", root_label(&tree));
                return None;
            }
            if !queued[parent.index()] {
                queued[parent.index()] = true;
                worklist.push(parent);
            }
        }

        Some(tree)
    }
}

impl<P: NodePredicate> OrthoXmlVisitor for CascadeRemoveFilter<P> {
    fn visit_group(&mut self, tree: HogTree) -> GroupOutcome {
        match self.prune(tree) {
            Some(tree) => GroupOutcome::Keep(tree),
            None => GroupOutcome::Drop,
        }
    }
}

pub(super) fn root_label(tree: &HogTree) -> Option<&str> {
    tree.kind(tree.root()).group_data()?.id.as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroupData, NodeKind};
    use crate::predicate::ScoreCheck;

    fn og(id: &str, score: f64) -> NodeKind {
        NodeKind::OrthologGroup(GroupData::new(id).with_score("CompletenessScore", score))
    }

    fn filter() -> CascadeRemoveFilter<ScoreCheck> {
        CascadeRemoveFilter::new(ScoreCheck::new("CompletenessScore", 0.5))
    }

    #[test]
    fn test_failing_root_drops_everything() {
        let mut tree = HogTree::new(og("1", 0.3));
        let root = tree.root();
        let child = tree.add_child(root, og("1.1", 0.9));
        tree.add_child(child, NodeKind::gene_ref("a"));
        tree.add_child(child, NodeKind::gene_ref("b"));
        assert!(filter().prune(tree).is_none());
    }

    #[test]
    fn test_failing_child_is_removed() {
        let mut tree = HogTree::new(og("1", 0.8));
        let root = tree.root();
        let keep = tree.add_child(root, og("1.1", 0.9));
        tree.add_child(keep, NodeKind::gene_ref("a"));
        let drop = tree.add_child(root, og("1.2", 0.2));
        tree.add_child(drop, NodeKind::gene_ref("b"));

        let pruned = filter().prune(tree).unwrap();
        assert_eq!(pruned.children(pruned.root()), &[keep]);
        assert_eq!(pruned.gene_ids(pruned.root()), vec!["a"]);
    }

    #[test]
    fn test_emptied_parents_cascade_upwards() {
        // 1 > 1.1 > P > 1.1.1(fail), next to a passing sibling of 1.1
        let mut tree = HogTree::new(og("1", 0.9));
        let root = tree.root();
        let mid = tree.add_child(root, og("1.1", 0.9));
        let paralog = tree.add_child(mid, NodeKind::paralog("p"));
        let failing = tree.add_child(paralog, og("1.1.1", 0.1));
        tree.add_child(failing, NodeKind::gene_ref("a"));
        let sibling = tree.add_child(root, og("1.2", 0.9));
        tree.add_child(sibling, NodeKind::gene_ref("b"));

        let pruned = filter().prune(tree).unwrap();
        assert_eq!(pruned.children(pruned.root()), &[sibling]);
        assert_eq!(pruned.gene_ids(pruned.root()), vec!["b"]);
    }

    #[test]
    fn test_cascade_reaching_root_drops_group() {
        let mut tree = HogTree::new(og("1", 0.9));
        let root = tree.root();
        let a = tree.add_child(root, og("1.1", 0.1));
        tree.add_child(a, NodeKind::gene_ref("a"));
        let b = tree.add_child(root, og("1.2", 0.1));
        tree.add_child(b, NodeKind::gene_ref("b"));
        assert!(filter().prune(tree).is_none());
    }

    #[test]
    fn test_paralog_groups_are_not_tested() {
        let mut tree = HogTree::new(og("1", 0.9));
        let root = tree.root();
        let paralog = tree.add_child(root, NodeKind::paralog("p"));
        tree.add_child(paralog, NodeKind::gene_ref("a"));
        tree.add_child(paralog, NodeKind::gene_ref("b"));
        let expected = tree.clone();
        assert_eq!(filter().prune(tree), Some(expected));
    }

    #[test]
    fn test_nested_failures_are_harmless() {
        // failing node inside an already removed subtree
        let mut tree = HogTree::new(og("1", 0.9));
        let root = tree.root();
        let outer = tree.add_child(root, og("1.1", 0.1));
        let inner = tree.add_child(outer, og("1.1.1", 0.1));
        tree.add_child(inner, NodeKind::gene_ref("a"));
        tree.add_child(root, NodeKind::gene_ref("b"));

        let pruned = filter().prune(tree).unwrap();
        assert_eq!(pruned.gene_ids(pruned.root()), vec!["b"]);
    }
}
