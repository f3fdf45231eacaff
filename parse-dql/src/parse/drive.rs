use super::Parser;
use crate::error::SyntaxResult;
use crate::kind::Field;
use crate::token::Token;
use crate::token::TT;
use crate::tree::Node;

impl<'a> Parser<'a> {
  /// Parses `item {"," item}`, pushing every item (tagged with `field`, if any) and every comma.
  pub fn comma_sep1<F>(
    &mut self,
    children: &mut Vec<Node>,
    field: Option<Field>,
    f: F,
  ) -> SyntaxResult<()>
  where
    F: Fn(&mut Self) -> SyntaxResult<Node>,
  {
    loop {
      let item = f(self)?;
      children.push(match field {
        Some(field) => self.tag(item, field),
        None => item,
      });
      match self.maybe_leaf(TT::Comma) {
        Some(comma) => children.push(comma),
        None => break,
      };
    }
    Ok(())
  }

  pub fn repeat_while<F, W>(&mut self, children: &mut Vec<Node>, w: W, f: F) -> SyntaxResult<()>
  where
    F: Fn(&mut Self) -> SyntaxResult<Node>,
    W: Fn(&mut Self) -> bool,
  {
    while w(self) {
      children.push(f(self)?);
    }
    Ok(())
  }

  /// Parses `"(" inner ")"`, pushing both parentheses and whatever `f` pushes in between.
  pub fn parenthesized<F>(&mut self, children: &mut Vec<Node>, f: F) -> SyntaxResult<()>
  where
    F: FnOnce(&mut Self, &mut Vec<Node>) -> SyntaxResult<()>,
  {
    children.push(self.require_leaf(TT::ParenthesisOpen)?);
    f(self, children)?;
    children.push(self.require_leaf(TT::ParenthesisClose)?);
    Ok(())
  }

  /// Parses `"(" select_statement ")"`, the subselect form shared by many rules.
  pub fn subselect(&mut self, children: &mut Vec<Node>) -> SyntaxResult<()> {
    self.parenthesized(children, |p, children| {
      children.push(p.select_statement()?);
      Ok(())
    })
  }

  /// Looks past the primary form starting at the next token without consuming anything, and returns
  /// the token after it. A primary form is a `CASE ... END` block, a parenthesised group, or a word
  /// with an optional parenthesised argument list.
  pub fn token_after_primary(&mut self) -> Token {
    let cp = self.checkpoint();
    let first = self.consume();
    match first.typ {
      TT::KeywordCase => self.skip_through(TT::KeywordCase, TT::KeywordEnd),
      TT::ParenthesisOpen => self.skip_through(TT::ParenthesisOpen, TT::ParenthesisClose),
      _ => {
        if self.consume_if(TT::ParenthesisOpen).is_match() {
          self.skip_through(TT::ParenthesisOpen, TT::ParenthesisClose);
        };
      }
    };
    let after = self.peek();
    self.restore_checkpoint(cp);
    after
  }

  /// Consumes tokens until the `close` that balances an already consumed `open`.
  fn skip_through(&mut self, open: TT, close: TT) {
    let mut depth = 1usize;
    while depth > 0 {
      let t = self.consume();
      match t.typ {
        TT::EOF => break,
        typ if typ == open => depth += 1,
        typ if typ == close => depth -= 1,
        _ => {}
      };
    }
  }
}
