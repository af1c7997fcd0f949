//! Property-based tests for the filter strategies and predicates
//!
//! Random HOG trees are generated with unique gene ids and with every group
//! holding at least one child, as the schema requires.

use std::collections::HashSet;

use proptest::prelude::*;

use orthoxml_stream::filter::{CascadeRemoveFilter, ExtractFilter};
use orthoxml_stream::model::{GroupData, HogTree, NodeId, NodeKind};
use orthoxml_stream::predicate::{GeneNumberCheck, NodePredicate, ScoreCheck};

const SCORE: &str = "CompletenessScore";
const THRESHOLD: f64 = 0.5;

// ============================================================================
// Generators
// ============================================================================

#[derive(Debug, Clone)]
enum Shape {
    Gene,
    Ortholog(Option<f64>, Vec<Shape>),
    Paralog(Vec<Shape>),
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = Just(Shape::Gene);
    leaf.prop_recursive(5, 64, 4, |inner| {
        prop_oneof![
            (prop::option::of(0.0f64..1.0), prop::collection::vec(inner.clone(), 1..4))
                .prop_map(|(score, children)| Shape::Ortholog(score, children)),
            prop::collection::vec(inner, 1..4).prop_map(Shape::Paralog),
        ]
    })
}

fn root_hog() -> impl Strategy<Value = HogTree> {
    (prop::option::of(0.0f64..1.0), prop::collection::vec(shape(), 1..4)).prop_map(|(score, children)| {
        let mut counter = 0;
        let mut tree = HogTree::new(ortholog(&mut counter, score));
        let root = tree.root();
        for child in &children {
            build(&mut tree, root, child, &mut counter);
        }
        tree
    })
}

fn ortholog(counter: &mut usize, score: Option<f64>) -> NodeKind {
    *counter += 1;
    let data = GroupData::new(format!("og{}", counter));
    NodeKind::OrthologGroup(match score {
        Some(value) => data.with_score(SCORE, value),
        None => data,
    })
}

fn build(tree: &mut HogTree, parent: NodeId, shape: &Shape, counter: &mut usize) {
    match shape {
        Shape::Gene => {
            *counter += 1;
            tree.add_child(parent, NodeKind::gene_ref(format!("g{}", counter)));
        }
        Shape::Ortholog(score, children) => {
            let kind = ortholog(counter, *score);
            let id = tree.add_child(parent, kind);
            for child in children {
                build(tree, id, child, counter);
            }
        }
        Shape::Paralog(children) => {
            *counter += 1;
            let id = tree.add_child(parent, NodeKind::paralog(format!("pg{}", counter)));
            for child in children {
                build(tree, id, child, counter);
            }
        }
    }
}

// ============================================================================
// Checks
// ============================================================================

fn check() -> ScoreCheck {
    ScoreCheck::new(SCORE, THRESHOLD)
}

/// Every attached group has a child and every attached orthologGroup passes
fn assert_clean(tree: &HogTree) -> Result<(), TestCaseError> {
    let predicate = check();
    for id in tree.descendants(tree.root()) {
        let kind = tree.kind(id);
        if kind.is_group() {
            prop_assert!(!tree.children(id).is_empty(), "empty group {:?}", kind);
        }
        if kind.is_ortholog_group() {
            prop_assert!(predicate.evaluate(tree.node(id)), "failing group {:?}", kind);
        }
    }
    Ok(())
}

fn all_genes(tree: &HogTree) -> HashSet<String> {
    tree.gene_ids(tree.root()).into_iter().map(String::from).collect()
}

proptest! {
    #[test]
    fn test_cascade_output_is_clean(tree in root_hog()) {
        let input_genes = all_genes(&tree);
        let filter = CascadeRemoveFilter::new(check());
        if let Some(pruned) = filter.prune(tree) {
            assert_clean(&pruned)?;
            prop_assert!(all_genes(&pruned).is_subset(&input_genes));
            prop_assert_eq!(filter.prune(pruned.clone()), Some(pruned));
        }
    }

    #[test]
    fn test_extract_output_is_clean_disjoint_and_stable(tree in root_hog()) {
        let input_genes = all_genes(&tree);
        let filter = ExtractFilter::new(check(), 2);
        let extracted = filter.extract(tree);

        let mut seen = HashSet::new();
        for hog in &extracted {
            assert_clean(hog)?;
            prop_assert_eq!(hog.parent(hog.root()), None);
            for gene in all_genes(hog) {
                prop_assert!(input_genes.contains(&gene));
                prop_assert!(seen.insert(gene), "gene emitted twice");
            }
            prop_assert_eq!(filter.extract(hog.clone()), vec![hog.clone()]);
        }
    }

    #[test]
    fn test_extract_keeps_every_gene_of_a_passing_tree(tree in root_hog()) {
        // without a threshold only unscored orthologGroups can fail
        let everything = ExtractFilter::new(ScoreCheck::new(SCORE, f64::NEG_INFINITY), 2);
        let scored = tree.descendants(tree.root()).all(|id| {
            !tree.kind(id).is_ortholog_group() || tree.node(id).scores().iter().any(|s| s.id == SCORE)
        });
        let input_genes = all_genes(&tree);
        let extracted = everything.extract(tree);
        if scored {
            prop_assert_eq!(extracted.len(), 1);
            prop_assert_eq!(all_genes(&extracted[0]), input_genes);
        }
    }

    #[test]
    fn test_gene_number_check_boundary(genes in 1usize..12, groups in 0usize..4) {
        let mut tree = HogTree::new(NodeKind::ortholog("og"));
        let root = tree.root();
        for i in 0..genes {
            tree.add_child(root, NodeKind::gene_ref(format!("g{}", i)));
        }
        for i in 0..groups {
            let child = tree.add_child(root, NodeKind::paralog(format!("p{}", i)));
            tree.add_child(child, NodeKind::gene_ref(format!("nested{}", i)));
        }
        prop_assert!(GeneNumberCheck::new(genes).evaluate(tree.node(root)));
        prop_assert!(GeneNumberCheck::new(genes - 1).evaluate(tree.node(root)));
        prop_assert!(!GeneNumberCheck::new(genes + 1).evaluate(tree.node(root)));
    }

    #[test]
    fn test_score_check_without_score_fails(threshold in -1.0e6f64..1.0e6) {
        let tree = HogTree::new(NodeKind::ortholog("og"));
        prop_assert!(!ScoreCheck::new(SCORE, threshold).evaluate(tree.node(tree.root())));
    }
}
