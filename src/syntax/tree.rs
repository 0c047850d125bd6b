//! The concrete syntax tree.
//!
//! Nodes live in one arena and refer to their children by [`NodeId`]. While a
//! parse is running the parser owns the arena and appends to it; once the
//! start symbol completes the arena is frozen into a [`SyntaxTree`] and only
//! read through [`NodeRef`] views.

use std::fmt::Write as _;

use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::grammar::Grammar;
use crate::syntax::token::{Context, Position, Symbol};

/// Stable handle of a node inside its arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: Symbol,
    /// Present exactly on leaves.
    value: Option<String>,
    context: Context,
    children: Vec<NodeId>,
}

/// Append-only node storage used while a parse is in progress.
#[derive(Debug, Clone, Default)]
pub(crate) struct Arena {
    nodes: Vec<NodeData>,
}

impl Arena {
    pub(crate) fn interior(&mut self, kind: Symbol, context: Context) -> NodeId {
        self.alloc(NodeData {
            kind,
            value: None,
            context,
            children: Vec::new(),
        })
    }

    pub(crate) fn leaf(&mut self, kind: Symbol, value: String, context: Context) -> NodeId {
        self.alloc(NodeData {
            kind,
            value: Some(value),
            context,
            children: Vec::new(),
        })
    }

    pub(crate) fn append(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(child);
        }
    }

    pub(crate) fn set_context(&mut self, id: NodeId, context: Context) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.context = context;
        }
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(data);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn freeze(self, root: NodeId) -> SyntaxTree {
        SyntaxTree {
            nodes: self.nodes,
            root,
        }
    }
}

/// A completed parse.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            id: self.root,
        }
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.0 < self.nodes.len()).then_some(NodeRef { tree: self, id })
    }

    /// Number of nodes, interior and leaf.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Reassembles the text the tree was parsed from.
    pub fn to_source(&self) -> String {
        self.root().to_source()
    }

    pub fn sexpr(&self, grammar: &Grammar) -> String {
        self.root().sexpr(grammar)
    }

    pub fn dump(&self, grammar: &Grammar) -> String {
        self.root().dump(grammar)
    }

    /// A serializable view that spells symbols by name.
    pub fn named<'t>(&'t self, grammar: &'t Grammar) -> NamedNode<'t> {
        self.root().named(grammar)
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }
}

/// Read-only view of one node.
#[derive(Debug, Copy, Clone)]
pub struct NodeRef<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Token type for leaves, nonterminal id for interior nodes.
    pub fn kind(&self) -> Symbol {
        self.data().kind
    }

    pub fn value(&self) -> Option<&'t str> {
        self.data().value.as_deref()
    }

    pub fn context(&self) -> &'t Context {
        &self.data().context
    }

    pub fn prefix(&self) -> &'t str {
        &self.data().context.prefix
    }

    pub fn start(&self) -> Position {
        self.data().context.start
    }

    pub fn is_leaf(&self) -> bool {
        self.data().value.is_some()
    }

    pub fn children(&self) -> impl ExactSizeIterator<Item = NodeRef<'t>> + 't {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |&id| NodeRef { tree, id })
    }

    pub fn child(&self, index: usize) -> Option<NodeRef<'t>> {
        let id = *self.data().children.get(index)?;
        Some(NodeRef {
            tree: self.tree,
            id,
        })
    }

    /// Depth-first, parents before children.
    pub fn preorder(&self) -> Preorder<'t> {
        Preorder {
            tree: self.tree,
            stack: vec![self.id],
        }
    }

    /// The leaves below this node, left to right.
    pub fn leaves(&self) -> impl Iterator<Item = NodeRef<'t>> + 't {
        self.preorder().filter(|n| n.is_leaf())
    }

    pub fn to_source(&self) -> String {
        let mut out = String::new();
        for leaf in self.leaves() {
            out.push_str(leaf.prefix());
            out.push_str(leaf.value().unwrap_or_default());
        }
        out
    }

    /// Single-line rendering such as `(expr (NUMBER "3") (OP "+"))`.
    pub fn sexpr(&self, grammar: &Grammar) -> String {
        let mut out = String::new();
        self.write_sexpr(grammar, &mut out);
        out
    }

    fn write_sexpr(&self, grammar: &Grammar, out: &mut String) {
        out.push('(');
        out.push_str(&grammar.symbol_name(self.kind()));
        if let Some(value) = self.value() {
            let _ = write!(out, " {:?}", value);
        }
        for child in self.children() {
            out.push(' ');
            child.write_sexpr(grammar, out);
        }
        out.push(')');
    }

    /// One node per line, indented by depth, leaves with their positions.
    pub fn dump(&self, grammar: &Grammar) -> String {
        let mut out = String::new();
        self.write_dump(grammar, 0, &mut out);
        out
    }

    fn write_dump(&self, grammar: &Grammar, depth: usize, out: &mut String) {
        let name = grammar.symbol_name(self.kind());
        match self.value() {
            Some(value) => {
                let _ = writeln!(
                    out,
                    "{:indent$}{} {:?} @{}",
                    "",
                    name,
                    value,
                    self.start(),
                    indent = depth * 2
                );
            }
            None => {
                let _ = writeln!(out, "{:indent$}{}", "", name, indent = depth * 2);
            }
        }
        for child in self.children() {
            child.write_dump(grammar, depth + 1, out);
        }
    }

    pub fn named(&self, grammar: &'t Grammar) -> NamedNode<'t> {
        NamedNode {
            node: *self,
            grammar,
        }
    }

    fn data(&self) -> &'t NodeData {
        self.tree.data(self.id)
    }
}

pub struct Preorder<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl<'t> Iterator for Preorder<'t> {
    type Item = NodeRef<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let data = self.tree.data(id);
        self.stack.extend(data.children.iter().rev());
        Some(NodeRef {
            tree: self.tree,
            id,
        })
    }
}

impl Serialize for NodeRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Node", 4)?;
        s.serialize_field("type", &self.kind())?;
        s.serialize_field("value", &self.value())?;
        s.serialize_field("context", self.context())?;
        s.serialize_field("children", &Children(*self))?;
        s.end()
    }
}

impl Serialize for SyntaxTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root().serialize(serializer)
    }
}

struct Children<'t>(NodeRef<'t>);

impl Serialize for Children<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.data().children.len()))?;
        for child in self.0.children() {
            seq.serialize_element(&child)?;
        }
        seq.end()
    }
}

/// A node serialized with symbol names instead of numbers.
#[derive(Clone, Copy)]
pub struct NamedNode<'t> {
    node: NodeRef<'t>,
    grammar: &'t Grammar,
}

impl Serialize for NamedNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self.node;
        let mut s = serializer.serialize_struct("Node", 5)?;
        s.serialize_field("type", &self.grammar.symbol_name(node.kind()))?;
        if let Some(value) = node.value() {
            s.serialize_field("value", value)?;
            s.serialize_field("prefix", node.prefix())?;
            s.serialize_field("start", &node.start())?;
        } else {
            let children: Vec<NamedNode<'_>> =
                node.children().map(|c| c.named(self.grammar)).collect();
            s.serialize_field("children", &children)?;
        }
        s.end()
    }
}
