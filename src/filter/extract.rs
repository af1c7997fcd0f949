use std::collections::BTreeSet;

use log::debug;

use super::cascade::root_label;
use crate::model::{HogTree, NodeId};
use crate::predicate::NodePredicate;
use crate::transducer::{GroupOutcome, OrthoXmlVisitor};

/// Bottom-up filter: a failing `orthologGroup` is removed, and the largest
/// passing subtrees below it are promoted to independent rootHOGs.
///
/// `paralogGroup` nodes are never tested themselves; they are kept as long
/// as something below them is kept. A group left without any child is
/// discarded rather than emitted empty. Promoted groups are emitted in
/// document order.
pub struct ExtractFilter<P> {
    predicate: P,
    min_hog_size: usize,
}

/// One pending call of the post-order traversal
struct Frame {
    node: NodeId,
    group_children: Vec<NodeId>,
    next_child: usize,
    extracted: BTreeSet<NodeId>,
}

impl Frame {
    fn new(tree: &HogTree, node: NodeId) -> Self {
        let group_children = tree
            .children(node)
            .iter()
            .copied()
            .filter(|&child| tree.kind(child).is_group())
            .collect();
        Self {
            node,
            group_children,
            next_child: 0,
            extracted: BTreeSet::new(),
        }
    }
}

impl<P: NodePredicate> ExtractFilter<P> {
    /// Create the filter around a predicate.
    ///
    /// `min_hog_size` is carried for configuration purposes only; it does
    /// not influence which subtrees are promoted.
    pub fn new(predicate: P, min_hog_size: usize) -> Self {
        Self {
            predicate,
            min_hog_size,
        }
    }

    /// The configured minimum HOG size
    pub fn min_hog_size(&self) -> usize {
        self.min_hog_size
    }

    /// Split one rootHOG into the subtrees that survive filtering
    pub fn extract(&self, mut tree: HogTree) -> Vec<HogTree> {
        let promoted = self.promote(&mut tree);
        debug!(
            "rootHOG {:?} yields {} extracted hogs",
            root_label(&tree),
            promoted.len()
        );
        let roots: Vec<NodeId> = promoted.into_iter().collect();
        tree.into_subtrees(&roots)
    }

    /// Post-order traversal returning the ids of the nodes to promote.
    ///
    /// Uses an explicit frame stack instead of recursion; the group children
    /// of each node are captured before any of them is detached.
    fn promote(&self, tree: &mut HogTree) -> BTreeSet<NodeId> {
        let mut stack = vec![Frame::new(tree, tree.root())];
        loop {
            let Some(frame) = stack.last_mut() else {
                return BTreeSet::new();
            };
            if let Some(&child) = frame.group_children.get(frame.next_child) {
                frame.next_child += 1;
                let child_frame = Frame::new(tree, child);
                stack.push(child_frame);
                continue;
            }

            let Some(frame) = stack.pop() else {
                return BTreeSet::new();
            };
            let result = self.finish_node(tree, frame);
            match stack.last_mut() {
                Some(parent) => parent.extracted.extend(result),
                None => return result,
            }
        }
    }

    fn finish_node(&self, tree: &mut HogTree, frame: Frame) -> BTreeSet<NodeId> {
        let Frame {
            node,
            group_children,
            mut extracted,
            ..
        } = frame;

        let fails = tree.kind(node).is_ortholog_group() && !self.predicate.evaluate(tree.node(node));
        if fails || tree.children(node).is_empty() {
            tree.detach(node);
            return extracted;
        }

        for child in &group_children {
            extracted.remove(child);
        }
        extracted.insert(node);
        extracted
    }
}

impl<P: NodePredicate> OrthoXmlVisitor for ExtractFilter<P> {
    fn visit_group(&mut self, tree: HogTree) -> GroupOutcome {
        GroupOutcome::Expand(self.extract(tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroupData, NodeKind};
    use crate::predicate::ScoreCheck;

    fn og(id: &str, score: f64) -> NodeKind {
        NodeKind::OrthologGroup(GroupData::new(id).with_score("CompletenessScore", score))
    }

    fn filter() -> ExtractFilter<ScoreCheck> {
        ExtractFilter::new(ScoreCheck::new("CompletenessScore", 0.5), 2)
    }

    fn root_id(tree: &HogTree) -> &str {
        root_label(tree).unwrap()
    }

    #[test]
    fn test_passing_child_of_failing_root_is_promoted() {
        let mut tree = HogTree::new(og("1", 0.3));
        let root = tree.root();
        let child = tree.add_child(root, og("1.1", 0.9));
        tree.add_child(child, NodeKind::gene_ref("a"));
        tree.add_child(child, NodeKind::gene_ref("b"));

        let out = filter().extract(tree);
        assert_eq!(out.len(), 1);
        assert_eq!(root_id(&out[0]), "1.1");
        assert_eq!(out[0].gene_ids(out[0].root()), vec!["a", "b"]);
        assert_eq!(out[0].parent(out[0].root()), None);
    }

    #[test]
    fn test_passing_root_keeps_passing_children_attached() {
        let mut tree = HogTree::new(og("1", 0.8));
        let root = tree.root();
        let keep = tree.add_child(root, og("1.1", 0.9));
        tree.add_child(keep, NodeKind::gene_ref("a"));
        let drop = tree.add_child(root, og("1.2", 0.2));
        tree.add_child(drop, NodeKind::gene_ref("b"));

        let out = filter().extract(tree);
        assert_eq!(out.len(), 1);
        assert_eq!(root_id(&out[0]), "1");
        assert_eq!(out[0].gene_ids(out[0].root()), vec!["a"]);
    }

    #[test]
    fn test_all_failing_yields_nothing() {
        let mut tree = HogTree::new(og("1", 0.1));
        let root = tree.root();
        let child = tree.add_child(root, og("1.1", 0.2));
        tree.add_child(child, NodeKind::gene_ref("a"));
        assert!(filter().extract(tree).is_empty());
    }

    #[test]
    fn test_promotions_from_several_levels_in_document_order() {
        // 1(fail) > [1.1(fail) > [1.1.1(pass)], P > [1.2(pass), 1.3(fail) > 1.3.1(pass)]]
        let mut tree = HogTree::new(og("1", 0.1));
        let root = tree.root();
        let a = tree.add_child(root, og("1.1", 0.1));
        let a1 = tree.add_child(a, og("1.1.1", 0.9));
        tree.add_child(a1, NodeKind::gene_ref("g1"));
        let p = tree.add_child(root, NodeKind::paralog("p"));
        let b = tree.add_child(p, og("1.2", 0.9));
        tree.add_child(b, NodeKind::gene_ref("g2"));
        let c = tree.add_child(p, og("1.3", 0.1));
        let c1 = tree.add_child(c, og("1.3.1", 0.9));
        tree.add_child(c1, NodeKind::gene_ref("g3"));

        let out = filter().extract(tree);
        let roots: Vec<_> = out.iter().map(root_id).collect();
        // the paralog group keeps 1.2 attached; 1.3.1 is promoted on its own
        assert_eq!(roots, vec!["1.1.1", "p", "1.3.1"]);
        assert_eq!(out[1].gene_ids(out[1].root()), vec!["g2"]);
    }

    #[test]
    fn test_paralog_emptied_by_removals_is_discarded() {
        let mut tree = HogTree::new(og("1", 0.9));
        let root = tree.root();
        let p = tree.add_child(root, NodeKind::paralog("p"));
        let failing = tree.add_child(p, og("1.1", 0.1));
        tree.add_child(failing, NodeKind::gene_ref("a"));
        tree.add_child(root, NodeKind::gene_ref("b"));

        let out = filter().extract(tree);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].len(), 2);
        assert_eq!(out[0].gene_ids(out[0].root()), vec!["b"]);
    }

    #[test]
    fn test_output_is_a_fixed_point() {
        let mut tree = HogTree::new(og("1", 0.1));
        let root = tree.root();
        for i in 0..3 {
            let child = tree.add_child(root, og(&format!("1.{}", i), 0.9));
            tree.add_child(child, NodeKind::gene_ref(format!("g{}", i)));
        }
        let first = filter().extract(tree);
        assert_eq!(first.len(), 3);
        let second: Vec<HogTree> = first.iter().cloned().flat_map(|t| filter().extract(t)).collect();
        assert_eq!(second, first);
    }

    #[test]
    fn test_min_hog_size_is_carried() {
        assert_eq!(ExtractFilter::new(ScoreCheck::new("x", 0.0), 5).min_hog_size(), 5);
    }
}
