use super::Parser;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::kind::Field;
use crate::kind::Kind;
use crate::token::TT;
use crate::tree::Node;

impl<'a> Parser<'a> {
  /// Parses a whole document: zero or more statements.
  pub fn source_file(&mut self) -> SyntaxResult<Node> {
    let mut statements = Vec::new();
    loop {
      let t = self.peek();
      let statement = match t.typ {
        TT::EOF => break,
        TT::KeywordSelect => self.select_statement()?,
        TT::KeywordUpdate => self.update_statement()?,
        TT::KeywordDelete => self.delete_statement()?,
        _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("statement"))),
      };
      statements.push(statement);
    }
    // The document node covers the whole source, even when it is empty or only comments.
    Ok(Node::new(
      self.symbols.kind(Kind::SourceFile),
      self.source_range(),
      statements,
    ))
  }

  pub fn select_statement(&mut self) -> SyntaxResult<Node> {
    self.nested(|p| {
      let mut children = vec![p.select_clause()?, p.from_clause()?];
      if p.peek().typ == TT::KeywordWhere {
        children.push(p.where_clause()?);
      };
      if p.peek().typ == TT::KeywordGroup {
        children.push(p.group_by_clause()?);
      };
      if p.peek().typ == TT::KeywordHaving {
        children.push(p.having_clause()?);
      };
      if p.peek().typ == TT::KeywordOrder {
        children.push(p.order_by_clause()?);
      };
      Ok(p.node(Kind::SelectStatement, children))
    })
  }

  pub fn update_statement(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.update_clause()?];
    if self.peek().typ == TT::KeywordWhere {
      children.push(self.where_clause()?);
    };
    Ok(self.node(Kind::UpdateStatement, children))
  }

  pub fn delete_statement(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.delete_clause()?];
    if self.peek().typ == TT::KeywordWhere {
      children.push(self.where_clause()?);
    };
    Ok(self.node(Kind::DeleteStatement, children))
  }

  fn keyword(&mut self, typ: TT) -> SyntaxResult<Node> {
    let leaf = self.require_leaf(typ)?;
    Ok(self.tag(leaf, Field::Keyword))
  }

  pub fn select_clause(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.keyword(TT::KeywordSelect)?];
    if let Some(distinct) = self.maybe_leaf(TT::KeywordDistinct) {
      children.push(self.tag(distinct, Field::Distinct));
    };
    self.comma_sep1(&mut children, Some(Field::Expressions), |p| {
      p.select_expression()
    })?;
    Ok(self.node(Kind::SelectClause, children))
  }

  pub fn from_clause(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.keyword(TT::KeywordFrom)?];
    self.comma_sep1(&mut children, Some(Field::Declarations), |p| {
      p.identification_variable_declaration()
    })?;
    Ok(self.node(Kind::FromClause, children))
  }

  pub fn where_clause(&mut self) -> SyntaxResult<Node> {
    let keyword = self.keyword(TT::KeywordWhere)?;
    let condition = self.conditional_expression()?;
    let condition = self.tag(condition, Field::Condition);
    Ok(self.node(Kind::WhereClause, vec![keyword, condition]))
  }

  pub fn having_clause(&mut self) -> SyntaxResult<Node> {
    let keyword = self.keyword(TT::KeywordHaving)?;
    let condition = self.conditional_expression()?;
    let condition = self.tag(condition, Field::Condition);
    Ok(self.node(Kind::HavingClause, vec![keyword, condition]))
  }

  pub fn group_by_clause(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.keyword(TT::KeywordGroup)?, self.keyword(TT::KeywordBy)?];
    self.comma_sep1(&mut children, Some(Field::Items), |p| p.group_by_item())?;
    Ok(self.node(Kind::GroupByClause, children))
  }

  pub fn order_by_clause(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.keyword(TT::KeywordOrder)?, self.keyword(TT::KeywordBy)?];
    self.comma_sep1(&mut children, Some(Field::Items), |p| p.order_by_item())?;
    Ok(self.node(Kind::OrderByClause, children))
  }

  pub fn update_clause(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.keyword(TT::KeywordUpdate)?];
    let entity = self.abstract_schema_name()?;
    children.push(self.tag(entity, Field::Entity));
    let alias = self.optional_as_alias(&mut children)?;
    children.push(self.tag(alias, Field::Alias));
    children.push(self.require_leaf(TT::KeywordSet)?);
    self.comma_sep1(&mut children, Some(Field::Items), |p| p.update_item())?;
    Ok(self.node(Kind::UpdateClause, children))
  }

  pub fn delete_clause(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.keyword(TT::KeywordDelete)?];
    if let Some(from) = self.maybe_leaf(TT::KeywordFrom) {
      children.push(from);
    };
    let entity = self.abstract_schema_name()?;
    children.push(self.tag(entity, Field::Entity));
    let alias = self.optional_as_alias(&mut children)?;
    children.push(self.tag(alias, Field::Alias));
    Ok(self.node(Kind::DeleteClause, children))
  }
}
