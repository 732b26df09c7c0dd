//! Owned binary-tree representation of a cascade decay topology.
//!
//! A topology is parsed once from the nested-list boundary encoding (for
//! example `[[[3,1],4],2]`) into an owned tree. Document order of the two
//! children at each split is preserved because helicity sign conventions
//! depend on it; equality queries canonicalize instead.

use std::fmt;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use amp_core::errors::{AmpError, ErrorInfo};

fn topology_error(info: ErrorInfo) -> AmpError {
    AmpError::Topology(info)
}

/// Identifier of a topology node: the sorted set of final-state indices the
/// node spans.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(Vec<u32>);

impl NodeKey {
    /// Builds a key from an arbitrary list of indices, sorting and checking
    /// for duplicates.
    pub fn new(mut indices: Vec<u32>) -> Result<Self, AmpError> {
        indices.sort_unstable();
        if indices.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(topology_error(
                ErrorInfo::new("node-duplicate-index", "node spans an index twice")
                    .with_context("indices", format!("{indices:?}")),
            ));
        }
        if indices.is_empty() {
            return Err(topology_error(ErrorInfo::new(
                "node-empty",
                "node must span at least one final-state index",
            )));
        }
        Ok(NodeKey(indices))
    }

    /// The sorted spanned indices.
    pub fn indices(&self) -> &[u32] {
        &self.0
    }

    /// Number of spanned final-state indices.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a single-leaf key.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `self` spans a subset of `other`.
    pub fn is_subset_of(&self, other: &NodeKey) -> bool {
        self.0.iter().all(|index| other.0.contains(index))
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (position, index) in self.0.iter().enumerate() {
            if position > 0 {
                write!(f, ",")?;
            }
            write!(f, "{index}")?;
        }
        write!(f, "]")
    }
}

/// One node of the decay tree, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum DecayNode {
    /// A final-state particle index.
    Leaf(u32),
    /// A two-body split into the written-order children.
    Branch(Box<DecayNode>, Box<DecayNode>),
}

impl DecayNode {
    fn collect_leaves(&self, leaves: &mut Vec<u32>) {
        match self {
            DecayNode::Leaf(index) => leaves.push(*index),
            DecayNode::Branch(left, right) => {
                left.collect_leaves(leaves);
                right.collect_leaves(leaves);
            }
        }
    }

    /// Key of the indices spanned by this node.
    pub fn key(&self) -> NodeKey {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves.sort_unstable();
        NodeKey(leaves)
    }

    fn canonical(&self) -> CanonicalNode {
        match self {
            DecayNode::Leaf(index) => CanonicalNode::Leaf(*index),
            DecayNode::Branch(left, right) => {
                let mut children = [left.canonical(), right.canonical()];
                children.sort();
                let [first, second] = children;
                CanonicalNode::Branch(Box::new(first), Box::new(second))
            }
        }
    }

    fn to_value(&self) -> Value {
        match self {
            DecayNode::Leaf(index) => Value::from(*index),
            DecayNode::Branch(left, right) => Value::Array(vec![left.to_value(), right.to_value()]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum CanonicalNode {
    Leaf(u32),
    Branch(Box<CanonicalNode>, Box<CanonicalNode>),
}

/// One internal two-body split with its children in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    /// Indices spanned by the splitting state.
    pub key: NodeKey,
    /// Key of the first written child.
    pub first: NodeKey,
    /// Key of the second written child.
    pub second: NodeKey,
}

/// A parsed decay topology with cached traversal order.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    root: DecayNode,
    splits: Vec<Split>,
    leaves: Vec<u32>,
}

impl Topology {
    /// Parses the nested-list boundary encoding.
    ///
    /// Fails when the nesting is not a strict binary pairing, when an index
    /// is spanned twice, or when the leaf set is not contiguous `1..=N`.
    pub fn parse(value: &Value) -> Result<Self, AmpError> {
        let root = parse_node(value)?;
        let mut leaves = Vec::new();
        root.collect_leaves(&mut leaves);
        let mut sorted = leaves.clone();
        sorted.sort_unstable();
        if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(topology_error(
                ErrorInfo::new(
                    "topology-duplicate-index",
                    "a final-state index appears in more than one leaf",
                )
                .with_context("leaves", format!("{sorted:?}")),
            ));
        }
        for (position, index) in sorted.iter().enumerate() {
            if *index != position as u32 + 1 {
                return Err(topology_error(
                    ErrorInfo::new(
                        "topology-missing-index",
                        "topology leaves must cover 1..=N without gaps",
                    )
                    .with_context("leaves", format!("{sorted:?}")),
                ));
            }
        }
        if sorted.len() < 2 {
            return Err(topology_error(ErrorInfo::new(
                "topology-too-small",
                "a decay topology needs at least two final-state particles",
            )));
        }
        let mut splits = Vec::new();
        collect_splits(&root, &mut splits);
        Ok(Topology {
            root,
            splits,
            leaves: sorted,
        })
    }

    /// The root node of the tree.
    pub fn root(&self) -> &DecayNode {
        &self.root
    }

    /// Sorted final-state indices spanned by the topology.
    pub fn leaves(&self) -> &[u32] {
        &self.leaves
    }

    /// Key spanned by the whole topology.
    pub fn span(&self) -> NodeKey {
        NodeKey(self.leaves.clone())
    }

    /// All internal two-body splits, outermost first (depth-first from the
    /// root), in the order Wigner-D factors are applied.
    pub fn internal_nodes(&self) -> &[Split] {
        &self.splits
    }

    /// The propagated internal nodes: every split except the root, exactly
    /// `N - 2` of them for an N-body topology.
    pub fn decay_nodes(&self) -> &[Split] {
        &self.splits[1..]
    }

    /// Finds the split whose key equals `key`.
    pub fn split(&self, key: &NodeKey) -> Option<&Split> {
        self.splits.iter().find(|split| &split.key == key)
    }

    /// Structural equality: order of children at a split is irrelevant.
    pub fn structural_eq(&self, other: &Topology) -> bool {
        self.root.canonical() == other.root.canonical()
    }

    /// Nested-list encoding of the topology, preserving document order.
    pub fn to_value(&self) -> Value {
        self.root.to_value()
    }
}

fn parse_node(value: &Value) -> Result<DecayNode, AmpError> {
    match value {
        Value::Number(number) => {
            let index = number.as_u64().ok_or_else(|| {
                topology_error(
                    ErrorInfo::new("topology-leaf-index", "leaf index must be a non-negative integer")
                        .with_context("value", number.to_string()),
                )
            })?;
            if index == 0 || index > u64::from(u32::MAX) {
                return Err(topology_error(
                    ErrorInfo::new(
                        "topology-leaf-range",
                        "leaf indices label final-state particles, 1..=N",
                    )
                    .with_context("value", index.to_string()),
                ));
            }
            Ok(DecayNode::Leaf(index as u32))
        }
        Value::Array(children) => {
            if children.len() != 2 {
                return Err(topology_error(
                    ErrorInfo::new(
                        "topology-nesting",
                        "every split must pair exactly two subsystems",
                    )
                    .with_context("arity", children.len().to_string()),
                ));
            }
            let left = parse_node(&children[0])?;
            let right = parse_node(&children[1])?;
            Ok(DecayNode::Branch(Box::new(left), Box::new(right)))
        }
        other => Err(topology_error(
            ErrorInfo::new(
                "topology-node-kind",
                "topology nodes are integers or two-element lists",
            )
            .with_context("value", other.to_string()),
        )),
    }
}

fn collect_splits(node: &DecayNode, splits: &mut Vec<Split>) {
    if let DecayNode::Branch(left, right) = node {
        splits.push(Split {
            key: node.key(),
            first: left.key(),
            second: right.key(),
        });
        collect_splits(left, splits);
        collect_splits(right, splits);
    }
}

impl Serialize for Topology {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Topology {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Topology::parse(&value).map_err(|err| D::Error::custom(err.to_string()))
    }
}

/// Parses a bare node reference (a nested list or integer) into the key of
/// the indices it spans. Used for the `node` fields of vertices and
/// propagators, which identify splits by content rather than structure.
pub fn node_key_from_value(value: &Value) -> Result<NodeKey, AmpError> {
    let node = parse_node(value)?;
    Ok(node.key())
}
