use super::Parser;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::kind::Kind;
use crate::token::AGGREGATE_FUNCTIONS;
use crate::token::DATETIME_FUNCTIONS;
use crate::token::NUMERIC_FUNCTIONS;
use crate::token::STRING_FUNCTIONS;
use crate::token::TT;
use crate::tree::Node;

impl<'a> Parser<'a> {
  fn function_name(&mut self, names: &[TT], expected: &'static str) -> SyntaxResult<Node> {
    let t = self.require_predicate(|tt| names.contains(&tt), expected)?;
    Ok(self.leaf(&t))
  }

  fn comma(&mut self, children: &mut Vec<Node>) -> SyntaxResult<()> {
    children.push(self.require_leaf(TT::Comma)?);
    Ok(())
  }

  pub fn aggregate_expression(&mut self) -> SyntaxResult<Node> {
    let t = self.require_predicate(|tt| AGGREGATE_FUNCTIONS.contains(&tt), "aggregate function")?;
    let mut children = vec![self.leaf(&t)];
    self.parenthesized(&mut children, |p, children| {
      children.extend(p.maybe_leaf(TT::KeywordDistinct));
      match p.maybe_leaf(TT::Asterisk) {
        Some(star) => children.push(star),
        None => children.push(p.simple_arithmetic_expression()?),
      };
      Ok(())
    })?;
    Ok(self.node(Kind::AggregateExpression, children))
  }

  pub fn case_expression(&mut self) -> SyntaxResult<Node> {
    self.nested(|p| {
      let (t0, t1) = p.peek_2();
      let case = match t0.typ {
        TT::KeywordCase if t1.typ == TT::KeywordWhen => p.general_case_expression()?,
        TT::KeywordCase => p.simple_case_expression()?,
        TT::KeywordCoalesce => p.coalesce_expression()?,
        TT::KeywordNullif => p.nullif_expression()?,
        _ => return Err(t0.error(SyntaxErrorType::ExpectedSyntax("case expression"))),
      };
      Ok(p.node(Kind::CaseExpression, vec![case]))
    })
  }

  // Shared tail of both CASE forms: `ELSE scalar_expression END`.
  fn case_else_end(&mut self, children: &mut Vec<Node>) -> SyntaxResult<()> {
    children.push(self.require_leaf(TT::KeywordElse)?);
    children.push(self.scalar_expression()?);
    children.push(self.require_leaf(TT::KeywordEnd)?);
    Ok(())
  }

  pub fn general_case_expression(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.require_leaf(TT::KeywordCase)?];
    children.push(self.when_clause()?);
    self.repeat_while(
      &mut children,
      |p| p.peek().typ == TT::KeywordWhen,
      |p| p.when_clause(),
    )?;
    self.case_else_end(&mut children)?;
    Ok(self.node(Kind::GeneralCaseExpression, children))
  }

  pub fn when_clause(&mut self) -> SyntaxResult<Node> {
    let children = vec![
      self.require_leaf(TT::KeywordWhen)?,
      self.conditional_expression()?,
      self.require_leaf(TT::KeywordThen)?,
      self.scalar_expression()?,
    ];
    Ok(self.node(Kind::WhenClause, children))
  }

  pub fn simple_case_expression(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.require_leaf(TT::KeywordCase)?, self.case_operand()?];
    children.push(self.simple_when_clause()?);
    self.repeat_while(
      &mut children,
      |p| p.peek().typ == TT::KeywordWhen,
      |p| p.simple_when_clause(),
    )?;
    self.case_else_end(&mut children)?;
    Ok(self.node(Kind::SimpleCaseExpression, children))
  }

  pub fn case_operand(&mut self) -> SyntaxResult<Node> {
    let operand = if self.at_path() {
      self.state_field_path_expression()?
    } else {
      let id = self.identifier()?;
      self.node(Kind::TypeDiscriminator, vec![id])
    };
    Ok(self.node(Kind::CaseOperand, vec![operand]))
  }

  pub fn simple_when_clause(&mut self) -> SyntaxResult<Node> {
    let children = vec![
      self.require_leaf(TT::KeywordWhen)?,
      self.scalar_expression()?,
      self.require_leaf(TT::KeywordThen)?,
      self.scalar_expression()?,
    ];
    Ok(self.node(Kind::SimpleWhenClause, children))
  }

  pub fn coalesce_expression(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.require_leaf(TT::KeywordCoalesce)?];
    self.parenthesized(&mut children, |p, children| {
      p.comma_sep1(children, None, |p| p.scalar_expression())
    })?;
    Ok(self.node(Kind::CoalesceExpression, children))
  }

  pub fn nullif_expression(&mut self) -> SyntaxResult<Node> {
    let mut children = vec![self.require_leaf(TT::KeywordNullif)?];
    self.parenthesized(&mut children, |p, children| {
      children.push(p.scalar_expression()?);
      p.comma(children)?;
      children.push(p.scalar_expression()?);
      Ok(())
    })?;
    Ok(self.node(Kind::NullifExpression, children))
  }

  pub fn function_declaration(&mut self) -> SyntaxResult<Node> {
    let t = self.peek();
    let function = if NUMERIC_FUNCTIONS.contains(&t.typ) {
      self.functions_returning_numerics()?
    } else if STRING_FUNCTIONS.contains(&t.typ) {
      self.functions_returning_strings()?
    } else if DATETIME_FUNCTIONS.contains(&t.typ) {
      self.functions_returning_datetime()?
    } else {
      return Err(t.error(SyntaxErrorType::ExpectedSyntax("function")));
    };
    Ok(self.node(Kind::FunctionDeclaration, vec![function]))
  }

  pub fn functions_returning_numerics(&mut self) -> SyntaxResult<Node> {
    let t = self.peek();
    let name = self.function_name(
      &[
        TT::KeywordAbs,
        TT::KeywordBitAnd,
        TT::KeywordBitOr,
        TT::KeywordDateDiff,
        TT::KeywordLength,
        TT::KeywordLocate,
        TT::KeywordMod,
        TT::KeywordSize,
        TT::KeywordSqrt,
      ],
      "numeric function",
    )?;
    let mut children = vec![name];
    self.parenthesized(&mut children, |p, children| {
      match t.typ {
        TT::KeywordLength => children.push(p.string_primary()?),
        TT::KeywordLocate => {
          children.push(p.string_primary()?);
          p.comma(children)?;
          children.push(p.string_primary()?);
          if let Some(comma) = p.maybe_leaf(TT::Comma) {
            children.push(comma);
            children.push(p.simple_arithmetic_expression()?);
          };
        }
        TT::KeywordAbs | TT::KeywordSqrt => children.push(p.simple_arithmetic_expression()?),
        TT::KeywordMod => {
          children.push(p.simple_arithmetic_expression()?);
          p.comma(children)?;
          children.push(p.simple_arithmetic_expression()?);
        }
        TT::KeywordSize => children.push(p.collection_valued_path_expression()?),
        // DATE_DIFF, BIT_AND, BIT_OR.
        _ => {
          children.push(p.arithmetic_primary()?);
          p.comma(children)?;
          children.push(p.arithmetic_primary()?);
        }
      };
      Ok(())
    })?;
    Ok(self.node(Kind::FunctionsReturningNumerics, children))
  }

  pub fn functions_returning_strings(&mut self) -> SyntaxResult<Node> {
    let t = self.peek();
    let name = self.function_name(
      &[
        TT::KeywordConcat,
        TT::KeywordIdentity,
        TT::KeywordLower,
        TT::KeywordSubstring,
        TT::KeywordTrim,
        TT::KeywordUpper,
      ],
      "string function",
    )?;
    let mut children = vec![name];
    self.parenthesized(&mut children, |p, children| {
      match t.typ {
        TT::KeywordConcat => {
          children.push(p.string_primary()?);
          p.comma(children)?;
          children.push(p.string_primary()?);
        }
        TT::KeywordSubstring => {
          children.push(p.string_primary()?);
          p.comma(children)?;
          children.push(p.simple_arithmetic_expression()?);
          p.comma(children)?;
          children.push(p.simple_arithmetic_expression()?);
        }
        TT::KeywordTrim => p.trim_arguments(children)?,
        TT::KeywordIdentity => {
          children.push(p.single_valued_association_path_expression()?);
          if let Some(comma) = p.maybe_leaf(TT::Comma) {
            children.push(comma);
            children.push(p.string_literal()?);
          };
        }
        // LOWER, UPPER.
        _ => children.push(p.string_primary()?),
      };
      Ok(())
    })?;
    Ok(self.node(Kind::FunctionsReturningStrings, children))
  }

  /// `[[LEADING | TRAILING | BOTH] [char] FROM] string_primary`. `FROM` is required once a trim
  /// mode or character is given.
  fn trim_arguments(&mut self, children: &mut Vec<Node>) -> SyntaxResult<()> {
    let mut specified = false;
    if let Some(mode) = self.consume_if_pred(|t| {
      matches!(
        t.typ,
        TT::KeywordLeading | TT::KeywordTrailing | TT::KeywordBoth
      )
    }) {
      children.push(self.leaf(&mode));
      specified = true;
    };
    let (t0, t1) = self.peek_2();
    if t0.typ == TT::LiteralString && t1.typ == TT::KeywordFrom {
      children.push(self.char_literal()?);
      specified = true;
    };
    if specified {
      children.push(self.require_leaf(TT::KeywordFrom)?);
    } else {
      children.extend(self.maybe_leaf(TT::KeywordFrom));
    };
    children.push(self.string_primary()?);
    Ok(())
  }

  pub fn functions_returning_datetime(&mut self) -> SyntaxResult<Node> {
    let t = self.peek();
    let name = self.function_name(
      &[
        TT::KeywordCurrentDate,
        TT::KeywordCurrentTime,
        TT::KeywordCurrentTimestamp,
        TT::KeywordDateAdd,
        TT::KeywordDateSub,
      ],
      "date function",
    )?;
    let mut children = vec![name];
    if matches!(t.typ, TT::KeywordDateAdd | TT::KeywordDateSub) {
      self.parenthesized(&mut children, |p, children| {
        children.push(p.arithmetic_primary()?);
        p.comma(children)?;
        children.push(p.arithmetic_primary()?);
        p.comma(children)?;
        children.push(p.string_primary()?);
        Ok(())
      })?;
    };
    Ok(self.node(Kind::FunctionsReturningDatetime, children))
  }
}
