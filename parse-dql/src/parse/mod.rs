use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::kind::Field;
use crate::kind::Kind;
use crate::kind::SymbolMap;
use crate::lex::lex_next;
use crate::lex::Lexer;
use crate::loc::Loc;
use crate::token::Token;
use crate::token::TT;
use crate::tree::Node;
use crate::ParseOptions;

pub mod cond;
pub mod decl;
pub mod drive;
pub mod expr;
pub mod func;
pub mod select;
pub mod stmt;
#[cfg(test)]
mod tests;

#[derive(Debug)]
#[must_use]
pub struct MaybeToken {
  typ: TT,
  loc: Loc,
  matched: bool,
}

impl MaybeToken {
  pub fn is_match(&self) -> bool {
    self.matched
  }

  pub fn match_loc(&self) -> Option<Loc> {
    if self.matched {
      Some(self.loc)
    } else {
      None
    }
  }

  pub fn error(&self, err: SyntaxErrorType) -> SyntaxError {
    debug_assert!(!self.matched);
    self.loc.error(err, Some(self.typ))
  }
}

pub struct ParserCheckpoint {
  next_tok_i: usize,
}

pub struct Parser<'a> {
  lexer: Lexer<'a>,
  // Tokens are lexed once and kept, so rewinding to a checkpoint never lexes again.
  buf: Vec<Token>,
  next_tok_i: usize,
  symbols: &'a SymbolMap,
  options: ParseOptions,
  depth: u32,
}

// Grammar rules are methods spread over the submodules, one per area of the language, so that every
// rule can reach the token buffer and symbol map through `self`.
impl<'a> Parser<'a> {
  pub fn new(lexer: Lexer<'a>, symbols: &'a SymbolMap, options: ParseOptions) -> Parser<'a> {
    Parser {
      lexer,
      buf: Vec::new(),
      next_tok_i: 0,
      symbols,
      options,
      depth: 0,
    }
  }

  pub fn source_range(&self) -> Loc {
    self.lexer.source_range()
  }

  pub fn str(&self, loc: Loc) -> &str {
    &self.lexer[loc]
  }

  pub fn into_comments(self) -> Vec<Loc> {
    self.lexer.into_comments()
  }

  pub fn checkpoint(&self) -> ParserCheckpoint {
    ParserCheckpoint {
      next_tok_i: self.next_tok_i,
    }
  }

  pub fn restore_checkpoint(&mut self, checkpoint: ParserCheckpoint) {
    self.next_tok_i = checkpoint.next_tok_i;
  }

  fn forward<K: FnOnce(&Token) -> bool>(&mut self, keep: K) -> (bool, Token) {
    if self.buf.len() == self.next_tok_i {
      let token = lex_next(&mut self.lexer);
      self.buf.push(token);
    }
    let t = self.buf[self.next_tok_i].clone();
    let k = keep(&t);
    if k {
      self.next_tok_i += 1;
    };
    (k, t)
  }

  pub fn consume(&mut self) -> Token {
    self.forward(|_| true).1
  }

  pub fn peek(&mut self) -> Token {
    self.forward(|_| false).1
  }

  pub fn peek_n<const N: usize>(&mut self) -> [Token; N] {
    let cp = self.checkpoint();
    let tokens = std::array::from_fn(|_| self.consume());
    self.restore_checkpoint(cp);
    tokens
  }

  pub fn peek_2(&mut self) -> (Token, Token) {
    let [a, b] = self.peek_n();
    (a, b)
  }

  pub fn consume_if(&mut self, typ: TT) -> MaybeToken {
    let (matched, t) = self.forward(|t| t.typ == typ);
    MaybeToken {
      typ,
      matched,
      loc: t.loc,
    }
  }

  pub fn consume_if_pred<F: FnOnce(&Token) -> bool>(&mut self, pred: F) -> Option<Token> {
    let (matched, t) = self.forward(pred);
    matched.then_some(t)
  }

  pub fn require(&mut self, typ: TT) -> SyntaxResult<Token> {
    let t = self.consume();
    if t.typ != typ {
      Err(t.error(SyntaxErrorType::RequiredTokenNotFound(typ)))
    } else {
      Ok(t)
    }
  }

  pub fn require_predicate<P: FnOnce(TT) -> bool>(
    &mut self,
    pred: P,
    expected: &'static str,
  ) -> SyntaxResult<Token> {
    let t = self.consume();
    if !pred(t.typ) {
      Err(t.error(SyntaxErrorType::ExpectedSyntax(expected)))
    } else {
      Ok(t)
    }
  }

  /// Runs a rule one nesting level deeper, failing once the configured depth is exceeded.
  pub fn nested<T, F>(&mut self, f: F) -> SyntaxResult<T>
  where
    F: FnOnce(&mut Self) -> SyntaxResult<T>,
  {
    if self.depth >= self.options.max_depth {
      let t = self.peek();
      return Err(t.loc.error(SyntaxErrorType::NestingTooDeep, Some(t.typ)));
    };
    self.depth += 1;
    let res = f(self);
    self.depth -= 1;
    res
  }

  pub fn node(&self, kind: Kind, children: Vec<Node>) -> Node {
    Node::spanning(self.symbols.kind(kind), children)
  }

  /// A named leaf for a token whose text is the whole node, such as an identifier or literal.
  pub fn named_leaf(&self, kind: Kind, token: &Token) -> Node {
    Node::leaf(self.symbols.kind(kind), token.loc)
  }

  /// An anonymous leaf for a keyword or punctuation token.
  pub fn leaf(&self, token: &Token) -> Node {
    Node::leaf(self.symbols.token(token.typ), token.loc)
  }

  pub fn tag(&self, node: Node, field: Field) -> Node {
    node.with_field(self.symbols.field(field))
  }

  pub fn require_leaf(&mut self, typ: TT) -> SyntaxResult<Node> {
    let t = self.require(typ)?;
    Ok(self.leaf(&t))
  }

  pub fn maybe_leaf(&mut self, typ: TT) -> Option<Node> {
    self.consume_if(typ).match_loc().map(|loc| {
      Node::leaf(self.symbols.token(typ), loc)
    })
  }
}
