use super::Parser;
use crate::error::SyntaxResult;
use crate::kind::Field;
use crate::kind::Kind;
use crate::token::TT;
use crate::tree::Node;

impl<'a> Parser<'a> {
  pub fn identifier(&mut self) -> SyntaxResult<Node> {
    let t = self.require_predicate(|tt| tt == TT::Identifier, "identifier")?;
    Ok(self.named_leaf(Kind::Identifier, &t))
  }

  /// An identifier in a position where nothing but a name may appear, such as after `.` or `AS`.
  /// Keywords are accepted as names there, so `u.order` and `FROM Order o` work.
  pub fn identifier_name(&mut self) -> SyntaxResult<Node> {
    let t = self.require_predicate(TT::is_word, "identifier")?;
    Ok(self.named_leaf(Kind::Identifier, &t))
  }

  fn name_or_identifier(&mut self, lenient: bool) -> SyntaxResult<Node> {
    if lenient {
      self.identifier_name()
    } else {
      self.identifier()
    }
  }

  pub fn identification_variable(&mut self) -> SyntaxResult<Node> {
    let id = self.identifier()?;
    Ok(self.node(Kind::IdentificationVariable, vec![id]))
  }

  pub fn alias_identification_variable(&mut self, lenient: bool) -> SyntaxResult<Node> {
    let id = self.name_or_identifier(lenient)?;
    Ok(self.node(Kind::AliasIdentificationVariable, vec![id]))
  }

  pub fn alias_result_variable(&mut self, lenient: bool) -> SyntaxResult<Node> {
    let id = self.name_or_identifier(lenient)?;
    Ok(self.node(Kind::AliasResultVariable, vec![id]))
  }

  pub fn result_variable(&mut self) -> SyntaxResult<Node> {
    let id = self.identifier()?;
    Ok(self.node(Kind::ResultVariable, vec![id]))
  }

  pub fn field_identification_variable(&mut self) -> SyntaxResult<Node> {
    let id = self.identifier_name()?;
    Ok(self.node(Kind::FieldIdentificationVariable, vec![id]))
  }

  pub fn abstract_schema_name(&mut self) -> SyntaxResult<Node> {
    let (t0, t1) = self.peek_2();
    let name = if t0.typ == TT::Backslash || t1.typ == TT::Backslash {
      self.fully_qualified_name()?
    } else {
      self.identifier_name()?
    };
    Ok(self.node(Kind::AbstractSchemaName, vec![name]))
  }

  pub fn fully_qualified_name(&mut self) -> SyntaxResult<Node> {
    let mut children = Vec::new();
    if let Some(sep) = self.maybe_leaf(TT::Backslash) {
      children.push(sep);
    };
    children.push(self.identifier_name()?);
    while let Some(sep) = self.maybe_leaf(TT::Backslash) {
      children.push(sep);
      children.push(self.identifier_name()?);
    }
    Ok(self.node(Kind::FullyQualifiedName, children))
  }

  /// Parses `["AS"] alias_identification_variable`, pushing `AS` if present and returning the alias.
  pub fn optional_as_alias(&mut self, children: &mut Vec<Node>) -> SyntaxResult<Node> {
    let as_keyword = self.maybe_leaf(TT::KeywordAs);
    let lenient = as_keyword.is_some();
    children.extend(as_keyword);
    self.alias_identification_variable(lenient)
  }

  /// Whether the next tokens start a dotted path such as `u.name`.
  pub fn at_path(&mut self) -> bool {
    let (t0, t1) = self.peek_2();
    t0.typ == TT::Identifier && t1.typ == TT::Dot
  }

  pub fn state_field_path_expression(&mut self) -> SyntaxResult<Node> {
    let object = self.identification_variable()?;
    let object = self.tag(object, Field::Object);
    let dot = self.require_leaf(TT::Dot)?;
    let field = self.state_field()?;
    let field = self.tag(field, Field::Field);
    Ok(self.node(Kind::StateFieldPathExpression, vec![object, dot, field]))
  }

  /// Embedded fields lead up to the final field: `address.city`.
  pub fn state_field(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.field_identification_variable()?];
    while let Some(dot) = self.maybe_leaf(TT::Dot) {
      children.push(dot);
      children.push(self.field_identification_variable()?);
    }
    Ok(self.node(Kind::StateField, children))
  }

  fn association_path(&mut self, kind: Kind) -> SyntaxResult<Node> {
    let object = self.identification_variable()?;
    let object = self.tag(object, Field::Object);
    let dot = self.require_leaf(TT::Dot)?;
    let field = self.field_identification_variable()?;
    let field = self.tag(field, Field::Field);
    Ok(self.node(kind, vec![object, dot, field]))
  }

  pub fn single_valued_association_path_expression(&mut self) -> SyntaxResult<Node> {
    self.association_path(Kind::SingleValuedAssociationPathExpression)
  }

  pub fn collection_valued_path_expression(&mut self) -> SyntaxResult<Node> {
    self.association_path(Kind::CollectionValuedPathExpression)
  }

  pub fn join_association_path_expression(&mut self) -> SyntaxResult<Node> {
    let object = self.identification_variable()?;
    let dot = self.require_leaf(TT::Dot)?;
    let field = self.field_identification_variable()?;
    Ok(self.node(Kind::JoinAssociationPathExpression, vec![object, dot, field]))
  }

  pub fn identification_variable_declaration(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.range_variable_declaration()?];
    if self.peek().typ == TT::KeywordIndex {
      children.push(self.index_by()?);
    };
    self.repeat_while(
      &mut children,
      |p| {
        matches!(
          p.peek().typ,
          TT::KeywordLeft | TT::KeywordInner | TT::KeywordJoin
        )
      },
      |p| p.join(),
    )?;
    Ok(self.node(Kind::IdentificationVariableDeclaration, children))
  }

  pub fn range_variable_declaration(&mut self) -> SyntaxResult<Node> {
    let entity = self.abstract_schema_name()?;
    let mut children = vec![self.tag(entity, Field::Entity)];
    let alias = self.optional_as_alias(&mut children)?;
    children.push(self.tag(alias, Field::Alias));
    Ok(self.node(Kind::RangeVariableDeclaration, children))
  }

  /// `INDEX BY u.id`. A single-valued association path has the same shape as a one-field state
  /// field path, so the latter is produced.
  pub fn index_by(&mut self) -> SyntaxResult<Node> {
    let children = vec![
      self.require_leaf(TT::KeywordIndex)?,
      self.require_leaf(TT::KeywordBy)?,
      self.state_field_path_expression()?,
    ];
    Ok(self.node(Kind::IndexBy, children))
  }

  pub fn join(&mut self) -> SyntaxResult<Node> {
    let mut children = Vec::new();
    if let Some(left) = self.maybe_leaf(TT::KeywordLeft) {
      children.push(left);
      children.extend(self.maybe_leaf(TT::KeywordOuter));
    } else {
      children.extend(self.maybe_leaf(TT::KeywordInner));
    };
    children.push(self.require_leaf(TT::KeywordJoin)?);
    let target = if self.at_path() {
      self.join_association_declaration()?
    } else {
      self.range_variable_declaration()?
    };
    children.push(target);
    if let Some(with) = self.maybe_leaf(TT::KeywordWith) {
      children.push(with);
      children.push(self.conditional_expression()?);
    };
    Ok(self.node(Kind::Join, children))
  }

  pub fn join_association_declaration(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.join_association_path_expression()?];
    let alias = self.optional_as_alias(&mut children)?;
    children.push(alias);
    if self.peek().typ == TT::KeywordIndex {
      children.push(self.index_by()?);
    };
    Ok(self.node(Kind::JoinAssociationDeclaration, children))
  }
}
