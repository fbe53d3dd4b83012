use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

use itertools::Itertools;
use log::debug;

use crate::frequency::{FrequencyTable, ALPHABET_SIZE};

/// Huffman tree over all 256 byte values.
///
/// Every byte value gets a leaf, including those that never occur, so the
/// root is always an internal node and every code is at least one bit long.
#[derive(Debug)]
pub struct HuffmanTree {
    root: Node,
}

#[derive(Debug)]
pub enum Node {
    Leaf {
        byte: u8,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl From<(u8, u32)> for Node {
    fn from((byte, count): (u8, u32)) -> Self {
        Node::Leaf {
            byte,
            weight: u64::from(count),
        }
    }
}

impl Node {
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    /// `false` is the left edge, `true` the right one. Leaves have no children.
    pub fn child(&self, bit: bool) -> Option<&Node> {
        match self {
            Node::Leaf { .. } => None,
            Node::Internal { left, right, .. } => Some(if bit { right } else { left }),
        }
    }

    pub fn byte(&self) -> Option<u8> {
        match self {
            Node::Leaf { byte, .. } => Some(*byte),
            Node::Internal { .. } => None,
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

impl HuffmanTree {
    /// The one tree builder shared by encoding and decoding.
    ///
    /// Nodes are merged lowest weight first. Equal weights are broken by
    /// creation order: leaves are created in byte order (0..=255) and each
    /// merged node is created after every node that exists before it, so the
    /// result depends only on the frequency table.
    pub fn build(frequencies: &FrequencyTable) -> Self {
        let trees = Trees::from_iter(frequencies.iter().map_into::<Node>());
        let root = trees
            .merge()
            .expect("a non-empty alphabet always merges into a root");
        debug!(
            "built huffman tree: weight = {}, depth = {}",
            root.weight(),
            root.depth()
        );
        HuffmanTree { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn weight(&self) -> u64 {
        self.root.weight()
    }

    /// Length of the longest code.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

/// A node waiting in the merge queue, ordered by `(weight, order)`.
#[derive(Debug)]
struct Ranked {
    weight: u64,
    order: usize,
    node: Node,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .cmp(&other.weight)
            .then_with(|| self.order.cmp(&other.order))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Ranked {}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

struct Trees {
    queue: BinaryHeap<Reverse<Ranked>>,
    next_order: usize,
}

impl FromIterator<Node> for Trees {
    fn from_iter<T: IntoIterator<Item = Node>>(iter: T) -> Self {
        let mut trees = Trees {
            queue: BinaryHeap::with_capacity(ALPHABET_SIZE),
            next_order: 0,
        };
        iter.into_iter().for_each(|node| trees.insert(node));
        trees
    }
}

impl Trees {
    fn merge(mut self) -> Option<Node> {
        loop {
            let result = self.pop_lowest()?;
            match result {
                PopResult::TreesToMerge { left, right } => {
                    let node = Node::Internal {
                        weight: left.weight() + right.weight(),
                        left: Box::new(left),
                        right: Box::new(right),
                    };
                    self.insert(node);
                }
                PopResult::Single(node) => {
                    return Some(node);
                }
            }
        }
    }

    fn pop_lowest(&mut self) -> Option<PopResult> {
        let Reverse(left) = self.queue.pop()?;

        let item_result = match self.queue.pop() {
            Some(Reverse(right)) => PopResult::TreesToMerge {
                left: left.node,
                right: right.node,
            },
            None => PopResult::Single(left.node),
        };

        Some(item_result)
    }

    fn insert(&mut self, node: Node) {
        let ranked = Ranked {
            weight: node.weight(),
            order: self.next_order,
            node,
        };
        self.next_order += 1;
        self.queue.push(Reverse(ranked));
    }
}

enum PopResult {
    TreesToMerge { left: Node, right: Node },
    Single(Node),
}
