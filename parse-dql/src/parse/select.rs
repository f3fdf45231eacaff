use super::Parser;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::kind::Kind;
use crate::token::AGGREGATE_FUNCTIONS;
use crate::token::TT;
use crate::tree::Node;

// Tokens that may follow a complete select expression.
fn ends_select_expression(typ: TT) -> bool {
  matches!(
    typ,
    TT::Comma | TT::KeywordFrom | TT::KeywordAs | TT::KeywordHidden | TT::Identifier
  )
}

// Tokens that may follow a complete order by item.
fn ends_order_by_item(typ: TT) -> bool {
  matches!(
    typ,
    TT::Comma
      | TT::KeywordAsc
      | TT::KeywordDesc
      | TT::ParenthesisClose
      | TT::EOF
      | TT::KeywordSelect
      | TT::KeywordUpdate
      | TT::KeywordDelete
  )
}

impl<'a> Parser<'a> {
  pub fn select_expression(&mut self) -> SyntaxResult<Node> {
    let mut children = Vec::new();
    self.select_expression_value(&mut children)?;
    if matches!(
      self.peek().typ,
      TT::KeywordAs | TT::KeywordHidden | TT::Identifier
    ) {
      let as_keyword = self.maybe_leaf(TT::KeywordAs);
      let hidden = self.maybe_leaf(TT::KeywordHidden);
      let lenient = as_keyword.is_some() || hidden.is_some();
      children.extend(as_keyword);
      children.extend(hidden);
      children.push(self.alias_result_variable(lenient)?);
    };
    Ok(self.node(Kind::SelectExpression, children))
  }

  fn select_expression_value(&mut self, children: &mut Vec<Node>) -> SyntaxResult<()> {
    let (t0, t1) = self.peek_2();
    match t0.typ {
      TT::KeywordNew => {
        children.push(self.new_object_expression()?);
        return Ok(());
      }
      TT::KeywordPartial => {
        children.push(self.partial_object_expression()?);
        return Ok(());
      }
      _ => {}
    };
    // Aggregates, functions, CASE forms, subselects and bare variables stand on their own only when
    // nothing follows them; `COUNT(u) + 1` is a scalar expression.
    let standalone = ends_select_expression(self.token_after_primary().typ);
    if standalone {
      if AGGREGATE_FUNCTIONS.contains(&t0.typ) {
        children.push(self.aggregate_expression()?);
        return Ok(());
      };
      if t0.typ.is_function() {
        children.push(self.function_declaration()?);
        return Ok(());
      };
      if t0.typ.starts_case_expression() {
        children.push(self.case_expression()?);
        return Ok(());
      };
      if t0.typ == TT::ParenthesisOpen && t1.typ == TT::KeywordSelect {
        return self.subselect(children);
      };
      if t0.typ == TT::Identifier {
        children.push(self.identification_variable()?);
        return Ok(());
      };
    };
    children.push(self.scalar_expression()?);
    Ok(())
  }

  pub fn partial_object_expression(&mut self) -> SyntaxResult<Node> {
    let children = vec![
      self.require_leaf(TT::KeywordPartial)?,
      self.identification_variable()?,
      self.require_leaf(TT::Dot)?,
      self.partial_field_set()?,
    ];
    Ok(self.node(Kind::PartialObjectExpression, children))
  }

  pub fn partial_field_set(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.require_leaf(TT::BraceOpen)?];
    self.comma_sep1(&mut children, None, |p| p.field_identification_variable())?;
    children.push(self.require_leaf(TT::BraceClose)?);
    Ok(self.node(Kind::PartialFieldSet, children))
  }

  pub fn new_object_expression(&mut self) -> SyntaxResult<Node> {
    self.nested(|p| {
      let mut children = vec![p.require_leaf(TT::KeywordNew)?];
      children.extend(p.maybe_leaf(TT::KeywordNamed));
      children.push(p.abstract_schema_name()?);
      p.parenthesized(&mut children, |p, children| {
        if p.peek().typ != TT::ParenthesisClose {
          p.comma_sep1(children, None, |p| p.new_object_arg())?;
        };
        Ok(())
      })?;
      Ok(p.node(Kind::NewObjectExpression, children))
    })
  }

  pub fn new_object_arg(&mut self) -> SyntaxResult<Node> {
    let mut children = Vec::new();
    let (t0, t1) = self.peek_2();
    if t0.typ == TT::KeywordNew {
      children.push(self.new_object_expression()?);
    } else if t0.typ == TT::ParenthesisOpen && t1.typ == TT::KeywordSelect {
      self.subselect(&mut children)?;
    } else if t0.typ == TT::Identifier
      && matches!(t1.typ, TT::Comma | TT::ParenthesisClose | TT::KeywordAs)
    {
      children.push(self.identification_variable()?);
    } else {
      children.push(self.scalar_expression()?);
    };
    if let Some(as_keyword) = self.maybe_leaf(TT::KeywordAs) {
      children.push(as_keyword);
      children.push(self.alias_result_variable(true)?);
    };
    Ok(self.node(Kind::NewObjectArg, children))
  }

  /// `u.name = 'x'`. A single-valued association path has the same shape as a one-field state field
  /// path, so the latter is produced.
  pub fn update_item(&mut self) -> SyntaxResult<Node> {
    let children = vec![
      self.state_field_path_expression()?,
      self.require_leaf(TT::Equals)?,
      self.new_value()?,
    ];
    Ok(self.node(Kind::UpdateItem, children))
  }

  pub fn new_value(&mut self) -> SyntaxResult<Node> {
    let value = match self.maybe_leaf(TT::KeywordNull) {
      Some(null) => null,
      None => self.simple_arithmetic_expression()?,
    };
    Ok(self.node(Kind::NewValue, vec![value]))
  }

  pub fn order_by_item(&mut self) -> SyntaxResult<Node> {
    let (t0, t1) = self.peek_2();
    let value = if t0.typ == TT::Identifier && ends_order_by_item(t1.typ) {
      // A bare name in ORDER BY refers to a result alias from the select clause.
      self.result_variable()?
    } else {
      self.simple_arithmetic_expression()?
    };
    let mut children = vec![value];
    if let Some(direction) = self
      .consume_if_pred(|t| matches!(t.typ, TT::KeywordAsc | TT::KeywordDesc))
    {
      children.push(self.leaf(&direction));
    };
    Ok(self.node(Kind::OrderByItem, children))
  }

  pub fn group_by_item(&mut self) -> SyntaxResult<Node> {
    let t = self.peek();
    let value = if self.at_path() {
      self.state_field_path_expression()?
    } else if t.typ == TT::Identifier {
      self.identification_variable()?
    } else {
      return Err(t.error(SyntaxErrorType::ExpectedSyntax("group by item")));
    };
    Ok(self.node(Kind::GroupByItem, vec![value]))
  }
}
