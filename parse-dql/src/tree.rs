use crate::loc::Loc;
use dql_language::FieldId;
use dql_language::Language;
use dql_language::Symbol;
use serde::ser::SerializeStruct;
use serde::Serialize;
use serde::Serializer;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;

#[derive(Clone, Debug)]
pub struct Node {
  pub symbol: Symbol,
  pub loc: Loc,
  pub field: Option<FieldId>,
  pub children: Vec<Node>,
}

impl Node {
  pub fn new(symbol: Symbol, loc: Loc, children: Vec<Node>) -> Node {
    Node {
      symbol,
      loc,
      field: None,
      children,
    }
  }

  pub fn leaf(symbol: Symbol, loc: Loc) -> Node {
    Node::new(symbol, loc, Vec::new())
  }

  /// Creates a node spanning its children, which must not be empty.
  pub fn spanning(symbol: Symbol, children: Vec<Node>) -> Node {
    let start = children.first().map(|c| c.loc.0).unwrap_or(0);
    let end = children.last().map(|c| c.loc.1).unwrap_or(start);
    Node::new(symbol, Loc(start, end), children)
  }

  pub fn with_field(mut self, field: FieldId) -> Node {
    self.field = Some(field);
    self
  }
}

/// A concrete syntax tree for one DQL document.
///
/// The tree owns a copy of the source and a clone of the grammar handle it was built with, so node
/// kinds and field names can be looked up without the session that produced it.
pub struct Tree {
  language: Language,
  source: String,
  root: Node,
  comments: Vec<Node>,
}

impl Tree {
  pub fn new(language: Language, source: String, root: Node, comments: Vec<Node>) -> Tree {
    Tree {
      language,
      source,
      root,
      comments,
    }
  }

  pub fn root_node(&self) -> NodeRef<'_> {
    NodeRef {
      tree: self,
      node: &self.root,
    }
  }

  pub fn language(&self) -> &Language {
    &self.language
  }

  pub fn source(&self) -> &str {
    &self.source
  }

  /// Comment nodes in source order. Comments may appear between any two tokens, so they are kept
  /// beside the tree rather than inside it.
  pub fn comments(&self) -> impl ExactSizeIterator<Item = NodeRef<'_>> + '_ {
    self.comments.iter().map(move |node| NodeRef { tree: self, node })
  }
}

impl Debug for Tree {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.root_node().to_sexp())
  }
}

impl Serialize for Tree {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("Tree", 3)?;
    state.serialize_field("language", self.language.name())?;
    state.serialize_field("root", &self.root_node())?;
    state.serialize_field("comments", &self.comments().collect::<Vec<_>>())?;
    state.end()
  }
}

#[derive(Copy, Clone)]
pub struct NodeRef<'t> {
  tree: &'t Tree,
  node: &'t Node,
}

impl<'t> NodeRef<'t> {
  fn wrap(&self, node: &'t Node) -> NodeRef<'t> {
    NodeRef {
      tree: self.tree,
      node,
    }
  }

  pub fn kind(&self) -> &'t str {
    self
      .tree
      .language
      .node_kind_for_id(self.node.symbol)
      .unwrap_or("ERROR")
  }

  pub fn kind_id(&self) -> Symbol {
    self.node.symbol
  }

  pub fn is_named(&self) -> bool {
    self.tree.language.node_kind_is_named(self.node.symbol)
  }

  pub fn start_byte(&self) -> usize {
    self.node.loc.0
  }

  pub fn end_byte(&self) -> usize {
    self.node.loc.1
  }

  pub fn loc(&self) -> Loc {
    self.node.loc
  }

  pub fn utf8_text(&self) -> &'t str {
    &self.tree.source[self.node.loc.0..self.node.loc.1]
  }

  pub fn field_name(&self) -> Option<&'t str> {
    self
      .node
      .field
      .and_then(|id| self.tree.language.field_name_for_id(id))
  }

  pub fn child_count(&self) -> usize {
    self.node.children.len()
  }

  pub fn child(&self, i: usize) -> Option<NodeRef<'t>> {
    self.node.children.get(i).map(|c| self.wrap(c))
  }

  pub fn children(&self) -> impl Iterator<Item = NodeRef<'t>> + 't {
    let tree = self.tree;
    self.node.children.iter().map(move |node| NodeRef { tree, node })
  }

  pub fn named_children(&self) -> impl Iterator<Item = NodeRef<'t>> + 't {
    self.children().filter(|c| c.is_named())
  }

  pub fn named_child_count(&self) -> usize {
    self.named_children().count()
  }

  pub fn child_by_field_name(&self, name: &str) -> Option<NodeRef<'t>> {
    let id = self.tree.language.field_id_for_name(name)?;
    self
      .node
      .children
      .iter()
      .find(|c| c.field == Some(id))
      .map(|c| self.wrap(c))
  }

  /// All children tagged with the field, such as every item of a comma separated list.
  pub fn children_by_field_name(&self, name: &str) -> Vec<NodeRef<'t>> {
    let Some(id) = self.tree.language.field_id_for_name(name) else {
      return Vec::new();
    };
    self
      .node
      .children
      .iter()
      .filter(|c| c.field == Some(id))
      .map(|c| self.wrap(c))
      .collect()
  }

  /// Renders the named nodes below and including this one, e.g.
  /// `(where_clause condition: (conditional_expression ...))`.
  pub fn to_sexp(&self) -> String {
    let mut out = String::new();
    self.write_sexp(&mut out);
    out
  }

  fn write_sexp(&self, out: &mut String) {
    out.push('(');
    out.push_str(self.kind());
    for child in self.named_children() {
      out.push(' ');
      if let Some(field) = child.field_name() {
        out.push_str(field);
        out.push_str(": ");
      };
      child.write_sexp(out);
    }
    out.push(')');
  }
}

impl<'t> Debug for NodeRef<'t> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{{{} {}..{}}}", self.kind(), self.start_byte(), self.end_byte())
  }
}

impl<'t> Serialize for NodeRef<'t> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("Node", 6)?;
    state.serialize_field("kind", self.kind())?;
    state.serialize_field("named", &self.is_named())?;
    state.serialize_field("loc", &self.node.loc)?;
    if let Some(field) = self.field_name() {
      state.serialize_field("field", field)?;
    } else {
      state.skip_field("field")?;
    };
    if self.node.children.is_empty() {
      state.serialize_field("text", self.utf8_text())?;
      state.skip_field("children")?;
    } else {
      state.skip_field("text")?;
      state.serialize_field("children", &self.children().collect::<Vec<_>>())?;
    };
    state.end()
  }
}
