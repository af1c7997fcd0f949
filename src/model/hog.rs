//! Arena-backed HOG trees
//!
//! A [`HogTree`] holds exactly one rootHOG: the root `orthologGroup` or
//! `paralogGroup` and everything nested in it. Nodes live in a flat arena
//! indexed by [`NodeId`]; ids are assigned in document (pre-)order while the
//! tree is read, so comparing ids compares document positions. Filters
//! mutate the tree by detaching nodes only; detached nodes stay in the arena
//! until the tree is dropped or split with [`HogTree::into_subtrees`].

use super::{Attributes, RawElement};

/// Identity of a node within one [`HogTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena (document order)
    pub fn index(self) -> usize {
        self.0
    }
}

/// A `<score id=".." value=".."/>` attached directly to a group
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    /// Score definition id (e.g. `CompletenessScore`)
    pub id: String,
    /// Parsed numeric value
    pub value: f64,
    /// Value text as it appeared in the source, written back unchanged
    pub raw_value: String,
}

impl Score {
    /// Create a score from a numeric value
    pub fn new(id: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            value,
            raw_value: value.to_string(),
        }
    }
}

/// A `<property name=".." value=".."/>` attached to a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name
    pub name: String,
    /// Property value, if present
    pub value: Option<String>,
}

/// Content of an `orthologGroup` or `paralogGroup` node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupData {
    /// The `id` attribute, if present
    pub id: Option<String>,
    /// All other attributes (e.g. `taxonId`)
    pub attributes: Attributes,
    /// Scores attached to this node only
    pub scores: Vec<Score>,
    /// Properties attached to this node
    pub properties: Vec<Property>,
    /// Notes and foreign elements, written after the child nodes
    pub extensions: Vec<RawElement>,
}

impl GroupData {
    /// Group data with the given id and nothing else
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Builder-style helper to attach a score
    pub fn with_score(mut self, id: impl Into<String>, value: f64) -> Self {
        self.scores.push(Score::new(id, value));
        self
    }

    /// Scores carrying the given id
    pub fn scores_for<'a>(&'a self, score_id: &'a str) -> impl Iterator<Item = &'a Score> + 'a {
        self.scores.iter().filter(move |s| s.id == score_id)
    }
}

/// A `<geneRef id=".."/>` leaf
#[derive(Debug, Clone, PartialEq)]
pub struct GeneRef {
    /// Internal gene id referenced by this leaf
    pub gene_id: String,
    /// Other attributes of the element
    pub attributes: Attributes,
    /// Nested content (gene-level scores, notes), kept verbatim
    pub content: Vec<RawElement>,
}

impl GeneRef {
    /// Leaf referencing the given gene id
    pub fn new(gene_id: impl Into<String>) -> Self {
        Self {
            gene_id: gene_id.into(),
            attributes: Attributes::new(),
            content: Vec::new(),
        }
    }
}

/// Node kind of a HOG tree
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Speciation node
    OrthologGroup(GroupData),
    /// Duplication node
    ParalogGroup(GroupData),
    /// Gene reference leaf
    GeneRef(GeneRef),
}

impl NodeKind {
    /// `orthologGroup` with the given id
    pub fn ortholog(id: impl Into<String>) -> Self {
        NodeKind::OrthologGroup(GroupData::new(id))
    }

    /// `paralogGroup` with the given id
    pub fn paralog(id: impl Into<String>) -> Self {
        NodeKind::ParalogGroup(GroupData::new(id))
    }

    /// `geneRef` leaf for the given gene id
    pub fn gene_ref(gene_id: impl Into<String>) -> Self {
        NodeKind::GeneRef(GeneRef::new(gene_id))
    }

    /// Whether the node is an `orthologGroup`
    pub fn is_ortholog_group(&self) -> bool {
        matches!(self, NodeKind::OrthologGroup(_))
    }

    /// Whether the node is a `paralogGroup`
    pub fn is_paralog_group(&self) -> bool {
        matches!(self, NodeKind::ParalogGroup(_))
    }

    /// Whether the node is one of the two group kinds
    pub fn is_group(&self) -> bool {
        !self.is_gene_ref()
    }

    /// Whether the node is a `geneRef` leaf
    pub fn is_gene_ref(&self) -> bool {
        matches!(self, NodeKind::GeneRef(_))
    }

    /// Group content, `None` for leaves
    pub fn group_data(&self) -> Option<&GroupData> {
        match self {
            NodeKind::OrthologGroup(data) | NodeKind::ParalogGroup(data) => Some(data),
            NodeKind::GeneRef(_) => None,
        }
    }

    /// Mutable group content, `None` for leaves
    pub fn group_data_mut(&mut self) -> Option<&mut GroupData> {
        match self {
            NodeKind::OrthologGroup(data) | NodeKind::ParalogGroup(data) => Some(data),
            NodeKind::GeneRef(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct HogNode {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// One rootHOG and its full subtree
#[derive(Debug, Clone, PartialEq)]
pub struct HogTree {
    nodes: Vec<HogNode>,
}

impl HogTree {
    /// Create a tree consisting of a single root node
    pub fn new(root: NodeKind) -> Self {
        Self {
            nodes: vec![HogNode {
                kind: root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The root node (always the first node in the arena)
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a child to `parent` and return its id
    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(HogNode {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Kind and content of a node
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Mutable kind and content of a node
    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    /// Current parent of a node; `None` for the root and detached nodes
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Current children of a node in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Borrowed view of a node, as handed to predicates
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    /// Detach a node (and with it its subtree) from its parent.
    ///
    /// Returns `false` if the node had no parent.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.nodes[id.0].parent.take() else {
            return false;
        };
        self.nodes[parent.0].children.retain(|&child| child != id);
        true
    }

    /// Pre-order iterator over the attached descendants of `id` (excluding `id`)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// Gene ids of all `geneRef` leaves attached below `id`, in document order
    pub fn gene_ids(&self, id: NodeId) -> Vec<&str> {
        self.descendants(id)
            .filter_map(|n| match self.kind(n) {
                NodeKind::GeneRef(gene_ref) => Some(gene_ref.gene_id.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of nodes attached to the root, the root included
    pub fn len(&self) -> usize {
        1 + self.descendants(self.root()).count()
    }

    /// Always `false`: a tree has at least its root
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of slots in the arena, detached nodes included
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Split the arena into independent trees rooted at `roots`.
    ///
    /// Each node is moved into at most one output tree: a root lying inside
    /// the attached subtree of an earlier root yields no tree of its own.
    /// Child order is preserved.
    pub fn into_subtrees(self, roots: &[NodeId]) -> Vec<HogTree> {
        let mut slots: Vec<Option<HogNode>> = self.nodes.into_iter().map(Some).collect();
        roots
            .iter()
            .filter_map(|&root| Self::move_subtree(&mut slots, root))
            .collect()
    }

    fn move_subtree(slots: &mut [Option<HogNode>], root: NodeId) -> Option<HogTree> {
        slots.get(root.0)?.as_ref()?;

        let mut tree = HogTree { nodes: Vec::new() };
        let mut stack: Vec<(NodeId, Option<NodeId>)> = vec![(root, None)];
        while let Some((old_id, new_parent)) = stack.pop() {
            let Some(node) = slots.get_mut(old_id.0).and_then(Option::take) else {
                continue;
            };
            let new_id = NodeId(tree.nodes.len());
            tree.nodes.push(HogNode {
                kind: node.kind,
                parent: new_parent,
                children: Vec::new(),
            });
            if let Some(parent) = new_parent {
                tree.nodes[parent.0].children.push(new_id);
            }
            for &child in node.children.iter().rev() {
                stack.push((child, Some(new_id)));
            }
        }
        Some(tree)
    }
}

/// Pre-order traversal over attached descendants
pub struct Descendants<'a> {
    tree: &'a HogTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev());
        Some(id)
    }
}

/// Borrowed view of one node and its position in the tree
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a HogTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    /// Node id
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node kind and content
    pub fn kind(&self) -> &'a NodeKind {
        self.tree.kind(self.id)
    }

    /// Scores attached directly to this node (empty for leaves)
    pub fn scores(&self) -> &'a [Score] {
        self.kind()
            .group_data()
            .map(|data| data.scores.as_slice())
            .unwrap_or(&[])
    }

    /// Direct children
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        tree.children(self.id).iter().map(move |&id| NodeRef { tree, id })
    }

    /// Number of direct `geneRef` children (not recursive)
    pub fn direct_gene_ref_count(&self) -> usize {
        self.children().filter(|c| c.kind().is_gene_ref()).count()
    }
}
