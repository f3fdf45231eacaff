use super::Parser;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::kind::Kind;
use crate::token::Token;
use crate::token::COMPARISON_OPERATORS;
use crate::token::TT;
use crate::tree::Node;

/// Which simple condition follows, decided by the operator after its left operand.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum ConditionForm {
  Between,
  Comparison,
  EmptyCollection,
  In,
  InstanceOf,
  Like,
  Member,
  NullComparison,
}

// Tokens that cannot be part of a condition's left operand outside parentheses.
fn ends_operand(typ: TT) -> bool {
  matches!(
    typ,
    TT::EOF
      | TT::Invalid
      | TT::Comma
      | TT::KeywordAnd
      | TT::KeywordAsc
      | TT::KeywordDelete
      | TT::KeywordDesc
      | TT::KeywordElse
      | TT::KeywordExists
      | TT::KeywordFrom
      | TT::KeywordGroup
      | TT::KeywordHaving
      | TT::KeywordIndex
      | TT::KeywordInner
      | TT::KeywordJoin
      | TT::KeywordLeft
      | TT::KeywordOr
      | TT::KeywordOrder
      | TT::KeywordSelect
      | TT::KeywordSet
      | TT::KeywordThen
      | TT::KeywordUpdate
      | TT::KeywordWhen
      | TT::KeywordWhere
      | TT::KeywordWith
  )
}

// Tokens that carry on an operand past a closing parenthesis, as in `(a + b) * 2 > c`.
fn continues_operand(typ: TT) -> bool {
  COMPARISON_OPERATORS.contains(&typ)
    || matches!(
      typ,
      TT::Asterisk
        | TT::Hyphen
        | TT::Plus
        | TT::Slash
        | TT::KeywordBetween
        | TT::KeywordIn
        | TT::KeywordInstance
        | TT::KeywordIs
        | TT::KeywordLike
        | TT::KeywordMember
        | TT::KeywordNot
    )
}

impl<'a> Parser<'a> {
  pub fn conditional_expression(&mut self) -> SyntaxResult<Node> {
    let term = self.conditional_term()?;
    let mut left = self.node(Kind::ConditionalExpression, vec![term]);
    while let Some(or) = self.maybe_leaf(TT::KeywordOr) {
      let right = self.conditional_term()?;
      left = self.node(Kind::ConditionalExpression, vec![left, or, right]);
    }
    Ok(left)
  }

  pub fn conditional_term(&mut self) -> SyntaxResult<Node> {
    let factor = self.conditional_factor()?;
    let mut left = self.node(Kind::ConditionalTerm, vec![factor]);
    while let Some(and) = self.maybe_leaf(TT::KeywordAnd) {
      let right = self.conditional_factor()?;
      left = self.node(Kind::ConditionalTerm, vec![left, and, right]);
    }
    Ok(left)
  }

  pub fn conditional_factor(&mut self) -> SyntaxResult<Node> {
    let mut children = Vec::new();
    children.extend(self.maybe_leaf(TT::KeywordNot));
    children.push(self.conditional_primary()?);
    Ok(self.node(Kind::ConditionalFactor, children))
  }

  pub fn conditional_primary(&mut self) -> SyntaxResult<Node> {
    self.nested(|p| {
      let mut children = Vec::new();
      if p.at_parenthesised_condition() {
        p.parenthesized(&mut children, |p, children| {
          children.push(p.conditional_expression()?);
          Ok(())
        })?;
      } else {
        children.push(p.simple_conditional_expression()?);
      };
      Ok(p.node(Kind::ConditionalPrimary, children))
    })
  }

  /// Whether the next `(` opens a nested condition rather than an arithmetic operand: the group must
  /// not be a subselect and nothing may continue it as an operand after its closing `)`.
  fn at_parenthesised_condition(&mut self) -> bool {
    let (t0, t1) = self.peek_2();
    if t0.typ != TT::ParenthesisOpen || t1.typ == TT::KeywordSelect {
      return false;
    };
    !continues_operand(self.token_after_primary().typ)
  }

  pub fn simple_conditional_expression(&mut self) -> SyntaxResult<Node> {
    let condition = if self.peek().typ == TT::KeywordExists {
      self.exists_expression()?
    } else {
      match self.condition_form() {
        Ok(ConditionForm::Between) => self.between_expression()?,
        Ok(ConditionForm::Comparison) => self.comparison_expression()?,
        Ok(ConditionForm::EmptyCollection) => self.empty_collection_comparison_expression()?,
        Ok(ConditionForm::In) => self.in_expression()?,
        Ok(ConditionForm::InstanceOf) => self.instance_of_expression()?,
        Ok(ConditionForm::Like) => self.like_expression()?,
        Ok(ConditionForm::Member) => self.collection_member_expression()?,
        Ok(ConditionForm::NullComparison) => self.null_comparison_expression()?,
        Err(stop) => return Err(stop.error(SyntaxErrorType::ExpectedSyntax("condition"))),
      }
    };
    Ok(self.node(Kind::SimpleConditionalExpression, vec![condition]))
  }

  /// Scans past the left operand, skipping anything inside parentheses or `CASE ... END`, to find
  /// the operator that decides the condition's form. Consumes nothing. Without a form, returns the
  /// token the scan stopped at.
  fn condition_form(&mut self) -> Result<ConditionForm, Token> {
    let cp = self.checkpoint();
    let mut depth = 0usize;
    let form = loop {
      let t = self.consume();
      match t.typ {
        TT::EOF | TT::Invalid => break Err(t),
        // The name after `u.` or `:` may be a keyword, as in `u.order` or `:group`.
        TT::Dot | TT::Colon => {
          self.consume();
        }
        TT::ParenthesisOpen | TT::KeywordCase => depth += 1,
        TT::ParenthesisClose | TT::KeywordEnd => {
          if depth == 0 {
            break Err(t);
          };
          depth -= 1;
        }
        _ if depth > 0 => {}
        typ if COMPARISON_OPERATORS.contains(&typ) => break Ok(ConditionForm::Comparison),
        TT::KeywordNot => {
          let next = self.consume();
          break match next.typ {
            TT::KeywordBetween => Ok(ConditionForm::Between),
            TT::KeywordIn => Ok(ConditionForm::In),
            TT::KeywordInstance => Ok(ConditionForm::InstanceOf),
            TT::KeywordLike => Ok(ConditionForm::Like),
            TT::KeywordMember => Ok(ConditionForm::Member),
            _ => Err(next),
          };
        }
        TT::KeywordBetween => break Ok(ConditionForm::Between),
        TT::KeywordIn => break Ok(ConditionForm::In),
        TT::KeywordInstance => break Ok(ConditionForm::InstanceOf),
        TT::KeywordLike => break Ok(ConditionForm::Like),
        TT::KeywordMember => break Ok(ConditionForm::Member),
        TT::KeywordIs => {
          let _ = self.consume_if(TT::KeywordNot);
          let next = self.peek();
          break match next.typ {
            TT::KeywordNull => Ok(ConditionForm::NullComparison),
            TT::KeywordEmpty => Ok(ConditionForm::EmptyCollection),
            _ => Err(next),
          };
        }
        typ if ends_operand(typ) => break Err(t),
        _ => {}
      };
    };
    self.restore_checkpoint(cp);
    form
  }

  pub fn comparison_expression(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.arithmetic_expression()?, self.comparison_operator()?];
    let rhs = match self.peek().typ {
      TT::KeywordAll | TT::KeywordAny | TT::KeywordSome => self.quantified_expression()?,
      _ => self.arithmetic_expression()?,
    };
    children.push(rhs);
    Ok(self.node(Kind::ComparisonExpression, children))
  }

  pub fn comparison_operator(&mut self) -> SyntaxResult<Node> {
    let t = self.require_predicate(
      |tt| COMPARISON_OPERATORS.contains(&tt),
      "comparison operator",
    )?;
    let op = self.leaf(&t);
    Ok(self.node(Kind::ComparisonOperator, vec![op]))
  }

  pub fn between_expression(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.arithmetic_expression()?];
    children.extend(self.maybe_leaf(TT::KeywordNot));
    children.push(self.require_leaf(TT::KeywordBetween)?);
    children.push(self.arithmetic_expression()?);
    children.push(self.require_leaf(TT::KeywordAnd)?);
    children.push(self.arithmetic_expression()?);
    Ok(self.node(Kind::BetweenExpression, children))
  }

  pub fn like_expression(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.string_expression()?];
    children.extend(self.maybe_leaf(TT::KeywordNot));
    children.push(self.require_leaf(TT::KeywordLike)?);
    children.push(self.string_primary()?);
    if let Some(escape) = self.maybe_leaf(TT::KeywordEscape) {
      children.push(escape);
      children.push(self.char_literal()?);
    };
    Ok(self.node(Kind::LikeExpression, children))
  }

  pub fn in_expression(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.arithmetic_expression()?];
    children.extend(self.maybe_leaf(TT::KeywordNot));
    children.push(self.require_leaf(TT::KeywordIn)?);
    self.parenthesized(&mut children, |p, children| {
      if p.peek().typ == TT::KeywordSelect {
        children.push(p.select_statement()?);
        Ok(())
      } else {
        p.comma_sep1(children, None, |p| p.in_parameter())
      }
    })?;
    Ok(self.node(Kind::InExpression, children))
  }

  pub fn in_parameter(&mut self) -> SyntaxResult<Node> {
    let [t0, _, t2] = self.peek_n();
    let value = if t0.typ.starts_input_parameter()
      && matches!(t2.typ, TT::Comma | TT::ParenthesisClose)
    {
      self.input_parameter()?
    } else {
      self.arithmetic_expression()?
    };
    Ok(self.node(Kind::InParameter, vec![value]))
  }

  pub fn null_comparison_expression(&mut self) -> SyntaxResult<Node> {
    let t = self.peek();
    let operand = if t.typ.starts_input_parameter() {
      self.input_parameter()?
    } else if t.typ == TT::KeywordNullif {
      self.nullif_expression()?
    } else if t.typ == TT::KeywordCoalesce {
      self.coalesce_expression()?
    } else if crate::token::AGGREGATE_FUNCTIONS.contains(&t.typ) {
      self.aggregate_expression()?
    } else if t.typ.is_function() {
      self.function_declaration()?
    } else if self.at_path() {
      self.state_field_path_expression()?
    } else if t.typ == TT::Identifier {
      self.identification_variable()?
    } else {
      return Err(t.error(SyntaxErrorType::ExpectedSyntax("expression before IS NULL")));
    };
    let mut children = vec![operand, self.require_leaf(TT::KeywordIs)?];
    children.extend(self.maybe_leaf(TT::KeywordNot));
    children.push(self.require_leaf(TT::KeywordNull)?);
    Ok(self.node(Kind::NullComparisonExpression, children))
  }

  pub fn exists_expression(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.require_leaf(TT::KeywordExists)?];
    self.subselect(&mut children)?;
    Ok(self.node(Kind::ExistsExpression, children))
  }

  pub fn empty_collection_comparison_expression(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![
      self.collection_valued_path_expression()?,
      self.require_leaf(TT::KeywordIs)?,
    ];
    children.extend(self.maybe_leaf(TT::KeywordNot));
    children.push(self.require_leaf(TT::KeywordEmpty)?);
    Ok(self.node(Kind::EmptyCollectionComparisonExpression, children))
  }

  pub fn collection_member_expression(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.entity_expression()?];
    children.extend(self.maybe_leaf(TT::KeywordNot));
    children.push(self.require_leaf(TT::KeywordMember)?);
    children.extend(self.maybe_leaf(TT::KeywordOf));
    children.push(self.collection_valued_path_expression()?);
    Ok(self.node(Kind::CollectionMemberExpression, children))
  }

  pub fn entity_expression(&mut self) -> SyntaxResult<Node> {
    let entity = if self.at_path() {
      self.single_valued_association_path_expression()?
    } else {
      let simple = if self.peek().typ.starts_input_parameter() {
        self.input_parameter()?
      } else {
        self.identification_variable()?
      };
      self.node(Kind::SimpleEntityExpression, vec![simple])
    };
    Ok(self.node(Kind::EntityExpression, vec![entity]))
  }

  pub fn instance_of_expression(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.identification_variable()?];
    children.extend(self.maybe_leaf(TT::KeywordNot));
    children.push(self.require_leaf(TT::KeywordInstance)?);
    children.extend(self.maybe_leaf(TT::KeywordOf));
    if self.peek().typ == TT::ParenthesisOpen {
      self.parenthesized(&mut children, |p, children| {
        p.comma_sep1(children, None, |p| p.instance_of_parameter())
      })?;
    } else {
      children.push(self.instance_of_parameter()?);
    };
    Ok(self.node(Kind::InstanceOfExpression, children))
  }

  pub fn instance_of_parameter(&mut self) -> SyntaxResult<Node> {
    let parameter = if self.peek().typ.starts_input_parameter() {
      self.input_parameter()?
    } else {
      self.abstract_schema_name()?
    };
    Ok(self.node(Kind::InstanceOfParameter, vec![parameter]))
  }

  pub fn quantified_expression(&mut self) -> SyntaxResult<Node> {
    let quantifier = self.require_predicate(
      |tt| matches!(tt, TT::KeywordAll | TT::KeywordAny | TT::KeywordSome),
      "ALL, ANY or SOME",
    )?;
    let mut children = vec![self.leaf(&quantifier)];
    self.subselect(&mut children)?;
    Ok(self.node(Kind::QuantifiedExpression, children))
  }
}
