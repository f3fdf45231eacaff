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
  fn at_subselect(&mut self) -> bool {
    let (t0, t1) = self.peek_2();
    t0.typ == TT::ParenthesisOpen && t1.typ == TT::KeywordSelect
  }

  pub fn arithmetic_expression(&mut self) -> SyntaxResult<Node> {
    let mut children = Vec::new();
    if self.at_subselect() {
      self.subselect(&mut children)?;
    } else {
      children.push(self.simple_arithmetic_expression()?);
    };
    Ok(self.node(Kind::ArithmeticExpression, children))
  }

  pub fn simple_arithmetic_expression(&mut self) -> SyntaxResult<Node> {
    let term = self.arithmetic_term()?;
    let mut left = self.node(Kind::SimpleArithmeticExpression, vec![term]);
    while let Some(op) = self.consume_if_pred(|t| matches!(t.typ, TT::Plus | TT::Hyphen)) {
      let op = self.leaf(&op);
      let right = self.arithmetic_term()?;
      left = self.node(Kind::SimpleArithmeticExpression, vec![left, op, right]);
    }
    Ok(left)
  }

  pub fn arithmetic_term(&mut self) -> SyntaxResult<Node> {
    let factor = self.arithmetic_factor()?;
    let mut left = self.node(Kind::ArithmeticTerm, vec![factor]);
    while let Some(op) = self.consume_if_pred(|t| matches!(t.typ, TT::Asterisk | TT::Slash)) {
      let op = self.leaf(&op);
      let right = self.arithmetic_factor()?;
      left = self.node(Kind::ArithmeticTerm, vec![left, op, right]);
    }
    Ok(left)
  }

  pub fn arithmetic_factor(&mut self) -> SyntaxResult<Node> {
    let mut children = Vec::new();
    if let Some(sign) = self.consume_if_pred(|t| matches!(t.typ, TT::Plus | TT::Hyphen)) {
      children.push(self.leaf(&sign));
    };
    children.push(self.arithmetic_primary()?);
    Ok(self.node(Kind::ArithmeticFactor, children))
  }

  pub fn arithmetic_primary(&mut self) -> SyntaxResult<Node> {
    self.nested(|p| {
      let t = p.peek();
      let mut children = Vec::new();
      match t.typ {
        TT::Identifier if p.at_path() => children.push(p.state_field_path_expression()?),
        TT::Identifier => children.push(p.identification_variable()?),
        TT::LiteralString
        | TT::LiteralInteger
        | TT::LiteralFloat
        | TT::KeywordTrue
        | TT::KeywordFalse => children.push(p.literal()?),
        TT::ParenthesisOpen => p.parenthesized(&mut children, |p, children| {
          children.push(p.simple_arithmetic_expression()?);
          Ok(())
        })?,
        TT::Question | TT::Colon => children.push(p.input_parameter()?),
        typ if AGGREGATE_FUNCTIONS.contains(&typ) => children.push(p.aggregate_expression()?),
        typ if typ.starts_case_expression() => children.push(p.case_expression()?),
        typ if NUMERIC_FUNCTIONS.contains(&typ) => {
          children.push(p.functions_returning_numerics()?)
        }
        typ if STRING_FUNCTIONS.contains(&typ) => children.push(p.functions_returning_strings()?),
        typ if DATETIME_FUNCTIONS.contains(&typ) => {
          children.push(p.functions_returning_datetime()?)
        }
        _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("expression"))),
      };
      Ok(p.node(Kind::ArithmeticPrimary, children))
    })
  }

  /// Any value expression. Arithmetic covers paths, literals, parameters and functions, so the only
  /// other form is `u INSTANCE OF User`.
  pub fn scalar_expression(&mut self) -> SyntaxResult<Node> {
    self.nested(|p| {
      let [t0, t1, t2] = p.peek_n();
      let instance_of = t0.typ == TT::Identifier
        && (t1.typ == TT::KeywordInstance
          || (t1.typ == TT::KeywordNot && t2.typ == TT::KeywordInstance));
      let value = if instance_of {
        p.instance_of_expression()?
      } else {
        p.simple_arithmetic_expression()?
      };
      Ok(p.node(Kind::ScalarExpression, vec![value]))
    })
  }

  pub fn string_expression(&mut self) -> SyntaxResult<Node> {
    let mut children = Vec::new();
    let (t0, t1) = self.peek_2();
    if self.at_subselect() {
      self.subselect(&mut children)?;
    } else if t0.typ == TT::Identifier && t1.typ != TT::Dot {
      children.push(self.result_variable()?);
    } else {
      children.push(self.string_primary()?);
    };
    Ok(self.node(Kind::StringExpression, children))
  }

  pub fn string_primary(&mut self) -> SyntaxResult<Node> {
    self.nested(|p| {
      let t = p.peek();
      let value = match t.typ {
        TT::Identifier => p.state_field_path_expression()?,
        TT::LiteralString => p.string_literal()?,
        TT::Question | TT::Colon => p.input_parameter()?,
        typ if STRING_FUNCTIONS.contains(&typ) => p.functions_returning_strings()?,
        typ if AGGREGATE_FUNCTIONS.contains(&typ) => p.aggregate_expression()?,
        typ if typ.starts_case_expression() => p.case_expression()?,
        _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("string expression"))),
      };
      Ok(p.node(Kind::StringPrimary, vec![value]))
    })
  }

  pub fn literal(&mut self) -> SyntaxResult<Node> {
    let t = self.peek();
    let value = match t.typ {
      TT::LiteralString => self.string_literal()?,
      TT::LiteralInteger => {
        let t = self.consume();
        self.named_leaf(Kind::IntegerLiteral, &t)
      }
      TT::LiteralFloat => {
        let t = self.consume();
        self.named_leaf(Kind::FloatLiteral, &t)
      }
      TT::KeywordTrue | TT::KeywordFalse => self.boolean_literal()?,
      _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("literal"))),
    };
    Ok(self.node(Kind::Literal, vec![value]))
  }

  pub fn string_literal(&mut self) -> SyntaxResult<Node> {
    let t = self.require(TT::LiteralString)?;
    Ok(self.named_leaf(Kind::StringLiteral, &t))
  }

  /// A string literal holding exactly one character other than a backslash, as in `ESCAPE '!'`.
  pub fn char_literal(&mut self) -> SyntaxResult<Node> {
    let t = self.require(TT::LiteralString)?;
    let inner = self.str(t.loc);
    let inner = &inner[1..inner.len() - 1];
    let mut chars = inner.chars();
    match (chars.next(), chars.next()) {
      (Some(c), None) if c != '\\' && c != '\'' => Ok(self.named_leaf(Kind::CharLiteral, &t)),
      _ => Err(t.loc.error(
        SyntaxErrorType::ExpectedSyntax("character literal"),
        Some(t.typ),
      )),
    }
  }

  pub fn boolean_literal(&mut self) -> SyntaxResult<Node> {
    let t = self.require_predicate(
      |tt| matches!(tt, TT::KeywordTrue | TT::KeywordFalse),
      "boolean",
    )?;
    let value = self.leaf(&t);
    Ok(self.node(Kind::BooleanLiteral, vec![value]))
  }

  pub fn input_parameter(&mut self) -> SyntaxResult<Node> {
    let t = self.peek();
    let parameter = match t.typ {
      TT::Question => self.positional_parameter()?,
      TT::Colon => self.named_parameter()?,
      _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("input parameter"))),
    };
    Ok(self.node(Kind::InputParameter, vec![parameter]))
  }

  /// `?1`. The number is part of the node's text but has no node of its own.
  pub fn positional_parameter(&mut self) -> SyntaxResult<Node> {
    let question = self.require(TT::Question)?;
    let number = self.require(TT::LiteralInteger)?;
    Ok(Node::new(
      self.symbols.kind(Kind::PositionalParameter),
      question.loc + number.loc,
      vec![self.leaf(&question)],
    ))
  }

  pub fn named_parameter(&mut self) -> SyntaxResult<Node> {
    let children = vec![self.require_leaf(TT::Colon)?, self.identifier_name()?];
    Ok(self.node(Kind::NamedParameter, children))
  }
}
