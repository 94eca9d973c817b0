//! Parse tree stored as a flat, append-only arena.
//!
//! Every node knows its parent, its first child and its right sibling, so
//! the tree can be walked without per-node child lists.

use std::fmt::{self, Display, Formatter};

use crate::bnf::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
  label: String,
  symbol: Symbol,
  parent: Option<NodeId>,
  first_child: Option<NodeId>,
  right_sibling: Option<NodeId>,
}

impl Node {
  pub fn label(&self) -> &str {
    &self.label
  }

  pub fn symbol(&self) -> Symbol {
    self.symbol
  }

  /// `None` for the root.
  pub fn parent(&self) -> Option<NodeId> {
    self.parent
  }

  pub fn first_child(&self) -> Option<NodeId> {
    self.first_child
  }

  pub fn right_sibling(&self) -> Option<NodeId> {
    self.right_sibling
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
  nodes: Vec<Node>,
}

impl ParseTree {
  /// A tree holding only its root.
  pub fn new(root: Symbol, label: impl Into<String>) -> Self {
    Self {
      nodes: vec![Node {
        label: label.into(),
        symbol: root,
        parent: None,
        first_child: None,
        right_sibling: None,
      }],
    }
  }

  pub fn root(&self) -> NodeId {
    NodeId(0)
  }

  pub fn node(&self, id: NodeId) -> &Node {
    &self.nodes[id.index()]
  }

  pub fn nodes(&self) -> &[Node] {
    &self.nodes
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Appends `children` under `parent`, after any children it already has.
  /// Returns the new nodes in order.
  pub fn record_expansion<S>(
    &mut self,
    parent: NodeId,
    children: impl IntoIterator<Item = (Symbol, S)>,
  ) -> Vec<NodeId>
  where
    S: Into<String>,
  {
    let mut prev = self.children(parent).last();
    let mut ids = vec![];

    for (symbol, label) in children {
      let id = NodeId(self.nodes.len() as u32);
      self.nodes.push(Node {
        label: label.into(),
        symbol,
        parent: Some(parent),
        first_child: None,
        right_sibling: None,
      });

      match prev {
        Some(prev) => self.nodes[prev.index()].right_sibling = Some(id),
        None => self.nodes[parent.index()].first_child = Some(id),
      }
      prev = Some(id);
      ids.push(id);
    }

    ids
  }

  /// First node labelled `label`, scanning from the root.
  pub fn find(&self, label: &str) -> Option<NodeId> {
    self.nodes.iter()
      .position(|node| node.label == label)
      .map(|ix| NodeId(ix as u32))
  }

  /// Like [`record_expansion`](Self::record_expansion), with the parent
  /// looked up by label. `None` if no node has that label.
  pub fn record_expansion_by_label<S>(
    &mut self,
    parent: &str,
    children: impl IntoIterator<Item = (Symbol, S)>,
  ) -> Option<Vec<NodeId>>
  where
    S: Into<String>,
  {
    let parent = self.find(parent)?;
    Some(self.record_expansion(parent, children))
  }

  pub fn children(&self, id: NodeId) -> Children<'_> {
    Children {
      tree: self,
      next: self.node(id).first_child,
    }
  }

  /// The flat node sequence, one `index label parent right_sibling` row per
  /// node, `-` for a missing link.
  pub fn display_nodes(&self) -> DisplayNodes<'_> {
    DisplayNodes(self)
  }
}

pub struct Children<'a> {
  tree: &'a ParseTree,
  next: Option<NodeId>,
}

impl Iterator for Children<'_> {
  type Item = NodeId;

  fn next(&mut self) -> Option<NodeId> {
    let id = self.next?;
    self.next = self.tree.node(id).right_sibling;
    Some(id)
  }
}

/// Indented rendering, two spaces per level.
impl Display for ParseTree {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    let mut stack = vec![(self.root(), 0)];
    while let Some((id, depth)) = stack.pop() {
      writeln!(f, "{:indent$}{}", "", self.node(id).label, indent = depth * 2)?;
      let children = self.children(id).collect::<Vec<_>>();
      stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
    }
    Ok(())
  }
}

pub struct DisplayNodes<'a>(&'a ParseTree);

impl Display for DisplayNodes<'_> {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    let link = |id: Option<NodeId>| id.map_or("-".to_owned(), |id| id.index().to_string());
    for (ix, node) in self.0.nodes.iter().enumerate() {
      writeln!(
        f,
        "{} {} {} {}",
        ix,
        node.label,
        link(node.parent),
        link(node.right_sibling),
      )?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bnf::{NontermId, TermId};
  use pretty_assertions::assert_eq;

  fn labels(tree: &ParseTree, id: NodeId) -> Vec<&str> {
    tree.children(id).map(|child| tree.node(child).label()).collect()
  }

  fn sample() -> ParseTree {
    // S -> A b, A -> a
    let mut tree = ParseTree::new(Symbol::Nonterm(NontermId(0)), "S");
    let kids = tree.record_expansion(tree.root(), vec![
      (Symbol::Nonterm(NontermId(1)), "A"),
      (Symbol::Term(TermId(1)), "b"),
    ]);
    tree.record_expansion(kids[0], vec![(Symbol::Term(TermId(0)), "a")]);
    tree
  }

  #[test]
  fn links() {
    let tree = sample();
    assert_eq!(tree.len(), 4);

    let a = tree.find("A").unwrap();
    let b = tree.find("b").unwrap();
    assert_eq!(tree.node(a).parent(), Some(tree.root()));
    assert_eq!(tree.node(a).right_sibling(), Some(b));
    assert_eq!(tree.node(b).right_sibling(), None);
    assert_eq!(tree.node(tree.root()).parent(), None);
    assert_eq!(tree.node(tree.root()).first_child(), Some(a));

    assert_eq!(labels(&tree, tree.root()), vec!["A", "b"]);
    assert_eq!(labels(&tree, a), vec!["a"]);
    assert!(labels(&tree, b).is_empty());
  }

  #[test]
  fn expansion_by_label_appends_after_existing_children() {
    let mut tree = sample();
    let added = tree.record_expansion_by_label("S", vec![
      (Symbol::Term(TermId(2)), "c"),
    ]).unwrap();

    assert_eq!(added.len(), 1);
    assert_eq!(labels(&tree, tree.root()), vec!["A", "b", "c"]);
    assert!(tree.record_expansion_by_label("Q", Vec::<(Symbol, &str)>::new()).is_none());
  }

  #[test]
  fn rendering() {
    let tree = sample();
    insta::assert_snapshot!(tree.to_string(), @r###"
    S
      A
        a
      b
    "###);
    insta::assert_snapshot!(tree.display_nodes().to_string(), @r###"
    0 S - -
    1 A 0 2
    2 b 0 -
    3 a 1 -
    "###);
  }
}
