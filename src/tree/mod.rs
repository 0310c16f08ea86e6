mod kind;
pub mod view;

use std::sync::atomic::{AtomicU64, Ordering};

pub use kind::NodeKind;

use crate::lex::Token;
use crate::message::Span;

/// Index into a tree's node arena. Only meaningful together with the tree
/// that produced it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NodeId(pub(crate) u32);

#[derive(Clone, Debug)]
pub enum Child {
    Node(NodeId),
    Token(Token, Span),
}

#[derive(Debug)]
pub struct NodeData {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<Child>,
}

/// A concrete syntax tree. Every token of the input ends up in here, in
/// order, garbage included. Nodes are stored in an arena with upward parent
/// links so consumers can walk in both directions.
#[derive(Debug)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
    root: NodeId,
    generation: u64,
}

static GENERATION: AtomicU64 = AtomicU64::new(1);

impl SyntaxTree {
    pub(crate) fn new(nodes: Vec<NodeData>, root: NodeId) -> Self {
        Self {
            nodes,
            root,
            generation: GENERATION.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// A process-wide stamp, unique to this tree. Caches keyed by `NodeId`
    /// validate against it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn kind(&self, node: NodeId) -> NodeKind {
        self.nodes[node.0 as usize].kind
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0 as usize].parent
    }

    pub fn children(&self, node: NodeId) -> &[Child] {
        &self.nodes[node.0 as usize].children
    }

    pub fn child_nodes(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node).iter().filter_map(|child| match child {
            Child::Node(id) => Some(*id),
            Child::Token(..) => None,
        })
    }

    pub fn tokens(&self, node: NodeId) -> impl Iterator<Item = (&Token, Span)> + '_ {
        self.children(node).iter().filter_map(|child| match child {
            Child::Token(tok, span) => Some((tok, *span)),
            Child::Node(..) => None,
        })
    }

    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut curr = self.parent(node);
        std::iter::from_fn(move || {
            let next = curr?;
            curr = self.parent(next);
            Some(next)
        })
    }

    /// Node siblings strictly before `node` in its parent, nearest first.
    pub fn preceding_siblings(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let before = match self.parent(node) {
            Some(parent) => {
                let children = self.children(parent);
                let at = children.iter().position(
                    |child| matches!(child, Child::Node(id) if *id == node),
                );
                match at {
                    Some(at) => &children[..at],
                    None => &[],
                }
            }
            None => &[],
        };

        before.iter().rev().filter_map(|child| match child {
            Child::Node(id) => Some(*id),
            Child::Token(..) => None,
        })
    }

    /// The source range this node covers, if it holds any tokens.
    pub fn span(&self, node: NodeId) -> Option<Span> {
        let mut res: Option<Span> = None;

        for child in self.children(node) {
            let span = match child {
                Child::Token(_, span) => Some(*span),
                Child::Node(id) => self.span(*id),
            };

            if let Some(span) = span {
                res = Some(match res {
                    Some(acc) => acc + span,
                    None => span,
                });
            }
        }

        res
    }

    /// Every node in the tree, preorder.
    pub fn preorder(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(self.root)
    }

    /// `node` and every node below it, preorder.
    pub fn descendants(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![node];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(self.child_nodes(next).collect::<Vec<_>>().into_iter().rev());
            Some(next)
        })
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
        self.preorder().filter(move |node| self.kind(*node) == kind)
    }
}
