use crate::char::CharFilter;
use crate::char::DIGIT;
use crate::char::ID_CONTINUE;
use crate::char::ID_START_CHARSTR;
use crate::char::WHITESPACE_CHARS;
use crate::loc::Loc;
use crate::token::Token;
use crate::token::TT;
use ahash::HashMap;
use ahash::HashMapExt;
use aho_corasick::AhoCorasick;
use aho_corasick::AhoCorasickBuilder;
use aho_corasick::AhoCorasickKind;
use aho_corasick::Anchored;
use aho_corasick::Input;
use aho_corasick::MatchKind;
use aho_corasick::StartKind;
use core::ops::Index;
use memchr::memchr;
use memchr::memchr2;
use once_cell::sync::Lazy;

#[cfg(test)]
mod tests;

#[derive(Copy, Clone)]
pub struct LexerCheckpoint {
  next: usize,
}

// Contains the match length.
#[derive(Copy, Clone)]
struct Match(usize);

impl Match {
  pub fn len(&self) -> usize {
    self.0
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

struct PatternMatcher {
  patterns: Vec<TT>,
  matcher: AhoCorasick,
}

impl PatternMatcher {
  pub fn new<D: AsRef<str>>(patterns: Vec<(TT, D)>) -> Self {
    let (tts, syns): (Vec<_>, Vec<_>) = patterns.into_iter().unzip();
    let byte_syns: Vec<Vec<u8>> = syns.iter().map(|s| s.as_ref().as_bytes().to_vec()).collect();
    let matcher = AhoCorasickBuilder::new()
      .start_kind(StartKind::Anchored)
      .kind(Some(AhoCorasickKind::DFA))
      .match_kind(MatchKind::LeftmostLongest)
      .build(byte_syns)
      .unwrap();
    PatternMatcher {
      patterns: tts,
      matcher,
    }
  }

  pub fn find(&self, lexer: &Lexer) -> LexResult<(TT, Match)> {
    self
      .matcher
      .find(Input::new(&lexer.source[lexer.next..]).anchored(Anchored::Yes))
      .map(|m| (
        self.patterns[m.pattern().as_usize()],
        Match(m.end()),
      ))
      .ok_or(LexNotFound)
  }
}

#[derive(Debug)]
struct LexNotFound;

type LexResult<T> = Result<T, LexNotFound>;

pub struct Lexer<'a> {
  source: &'a str,
  next: usize,
  comments: Vec<Loc>,
}

impl<'a> Lexer<'a> {
  pub fn new(code: &'a str) -> Lexer<'a> {
    Lexer {
      source: code,
      next: 0,
      comments: Vec::new(),
    }
  }

  pub fn next(&self) -> usize {
    self.next
  }

  fn end(&self) -> usize {
    self.source.len()
  }

  fn remaining(&self) -> usize {
    self.end() - self.next
  }

  pub fn source_range(&self) -> Loc {
    Loc(0, self.end())
  }

  fn eof_range(&self) -> Loc {
    Loc(self.end(), self.end())
  }

  fn at_end(&self) -> bool {
    self.next >= self.end()
  }

  fn peek(&self) -> LexResult<char> {
    self.source[self.next..].chars().next().ok_or(LexNotFound)
  }

  fn peek_or_eof(&self, n: usize) -> Option<char> {
    self.source[self.next..].chars().nth(n)
  }

  pub fn checkpoint(&self) -> LexerCheckpoint {
    LexerCheckpoint { next: self.next }
  }

  pub fn since_checkpoint(&self, checkpoint: LexerCheckpoint) -> Loc {
    Loc(checkpoint.next, self.next)
  }

  /// Comments skipped so far, in source order. The parser's token buffer lexes every token exactly
  /// once, so no comment is recorded twice.
  pub fn into_comments(self) -> Vec<Loc> {
    self.comments
  }

  fn while_not_char(&self, c: char) -> Match {
    Match(memchr(c as u8, self.source[self.next..].as_bytes()).unwrap_or(self.remaining()))
  }

  fn while_not_2_chars(&self, a: char, b: char) -> Match {
    Match(memchr2(a as u8, b as u8, self.source[self.next..].as_bytes()).unwrap_or(self.remaining()))
  }

  fn while_chars(&self, chars: &CharFilter) -> Match {
    let mut len = 0;
    for ch in self.source[self.next..].chars() {
      if chars.has(ch) {
        len += ch.len_utf8();
      } else {
        break;
      }
    }
    Match(len)
  }

  fn consume(&mut self, m: Match) -> Match {
    self.next += m.len();
    m
  }

  fn skip_expect(&mut self, n: usize) {
    debug_assert!(self.next + n <= self.end());
    self.next += n;
  }

  fn drive_fallible(&mut self, f: impl FnOnce(&mut Self) -> LexResult<TT>) -> Token {
    let cp = self.checkpoint();
    let typ = f(self).unwrap_or(TT::Invalid);
    Token {
      loc: self.since_checkpoint(cp),
      typ,
    }
  }
}

impl<'a> Index<Loc> for Lexer<'a> {
  type Output = str;

  fn index(&self, index: Loc) -> &Self::Output {
    &self.source[index.0..index.1]
  }
}

#[rustfmt::skip]
pub static OPERATORS_MAPPING: Lazy<HashMap<TT, &'static str>> = Lazy::new(|| {
  let mut map = HashMap::<TT, &'static str>::new();
  map.insert(TT::Asterisk, "*");
  map.insert(TT::Backslash, "\\");
  map.insert(TT::BraceClose, "}");
  map.insert(TT::BraceOpen, "{");
  map.insert(TT::ChevronLeft, "<");
  map.insert(TT::ChevronLeftChevronRight, "<>");
  map.insert(TT::ChevronLeftEquals, "<=");
  map.insert(TT::ChevronRight, ">");
  map.insert(TT::ChevronRightEquals, ">=");
  map.insert(TT::Colon, ":");
  map.insert(TT::Comma, ",");
  map.insert(TT::Dot, ".");
  map.insert(TT::Equals, "=");
  map.insert(TT::ExclamationEquals, "!=");
  map.insert(TT::Hyphen, "-");
  map.insert(TT::ParenthesisClose, ")");
  map.insert(TT::ParenthesisOpen, "(");
  map.insert(TT::Plus, "+");
  map.insert(TT::Question, "?");
  map.insert(TT::Slash, "/");
  map
});

// Keys are the names the grammar tables give these tokens; source text matches them case-insensitively.
pub static KEYWORDS_MAPPING: Lazy<HashMap<TT, &'static str>> = Lazy::new(|| {
  let mut map = HashMap::<TT, &'static str>::new();
  map.insert(TT::KeywordAbs, "ABS");
  map.insert(TT::KeywordAll, "ALL");
  map.insert(TT::KeywordAnd, "AND");
  map.insert(TT::KeywordAny, "ANY");
  map.insert(TT::KeywordAs, "AS");
  map.insert(TT::KeywordAsc, "ASC");
  map.insert(TT::KeywordAvg, "AVG");
  map.insert(TT::KeywordBetween, "BETWEEN");
  map.insert(TT::KeywordBitAnd, "BIT_AND");
  map.insert(TT::KeywordBitOr, "BIT_OR");
  map.insert(TT::KeywordBoth, "BOTH");
  map.insert(TT::KeywordBy, "BY");
  map.insert(TT::KeywordCase, "CASE");
  map.insert(TT::KeywordCoalesce, "COALESCE");
  map.insert(TT::KeywordConcat, "CONCAT");
  map.insert(TT::KeywordCount, "COUNT");
  map.insert(TT::KeywordCurrentDate, "CURRENT_DATE");
  map.insert(TT::KeywordCurrentTime, "CURRENT_TIME");
  map.insert(TT::KeywordCurrentTimestamp, "CURRENT_TIMESTAMP");
  map.insert(TT::KeywordDateAdd, "DATE_ADD");
  map.insert(TT::KeywordDateDiff, "DATE_DIFF");
  map.insert(TT::KeywordDateSub, "DATE_SUB");
  map.insert(TT::KeywordDelete, "DELETE");
  map.insert(TT::KeywordDesc, "DESC");
  map.insert(TT::KeywordDistinct, "DISTINCT");
  map.insert(TT::KeywordElse, "ELSE");
  map.insert(TT::KeywordEmpty, "EMPTY");
  map.insert(TT::KeywordEnd, "END");
  map.insert(TT::KeywordEscape, "ESCAPE");
  map.insert(TT::KeywordExists, "EXISTS");
  map.insert(TT::KeywordFalse, "false");
  map.insert(TT::KeywordFrom, "FROM");
  map.insert(TT::KeywordGroup, "GROUP");
  map.insert(TT::KeywordHaving, "HAVING");
  map.insert(TT::KeywordHidden, "HIDDEN");
  map.insert(TT::KeywordIdentity, "IDENTITY");
  map.insert(TT::KeywordIn, "IN");
  map.insert(TT::KeywordIndex, "INDEX");
  map.insert(TT::KeywordInner, "INNER");
  map.insert(TT::KeywordInstance, "INSTANCE");
  map.insert(TT::KeywordIs, "IS");
  map.insert(TT::KeywordJoin, "JOIN");
  map.insert(TT::KeywordLeading, "LEADING");
  map.insert(TT::KeywordLeft, "LEFT");
  map.insert(TT::KeywordLength, "LENGTH");
  map.insert(TT::KeywordLike, "LIKE");
  map.insert(TT::KeywordLocate, "LOCATE");
  map.insert(TT::KeywordLower, "LOWER");
  map.insert(TT::KeywordMax, "MAX");
  map.insert(TT::KeywordMember, "MEMBER");
  map.insert(TT::KeywordMin, "MIN");
  map.insert(TT::KeywordMod, "MOD");
  map.insert(TT::KeywordNamed, "NAMED");
  map.insert(TT::KeywordNew, "NEW");
  map.insert(TT::KeywordNot, "NOT");
  map.insert(TT::KeywordNull, "NULL");
  map.insert(TT::KeywordNullif, "NULLIF");
  map.insert(TT::KeywordOf, "OF");
  map.insert(TT::KeywordOr, "OR");
  map.insert(TT::KeywordOrder, "ORDER");
  map.insert(TT::KeywordOuter, "OUTER");
  map.insert(TT::KeywordPartial, "PARTIAL");
  map.insert(TT::KeywordSelect, "SELECT");
  map.insert(TT::KeywordSet, "SET");
  map.insert(TT::KeywordSize, "SIZE");
  map.insert(TT::KeywordSome, "SOME");
  map.insert(TT::KeywordSqrt, "SQRT");
  map.insert(TT::KeywordSubstring, "SUBSTRING");
  map.insert(TT::KeywordSum, "SUM");
  map.insert(TT::KeywordThen, "THEN");
  map.insert(TT::KeywordTrailing, "TRAILING");
  map.insert(TT::KeywordTrim, "TRIM");
  map.insert(TT::KeywordTrue, "true");
  map.insert(TT::KeywordUpdate, "UPDATE");
  map.insert(TT::KeywordUpper, "UPPER");
  map.insert(TT::KeywordWhen, "WHEN");
  map.insert(TT::KeywordWhere, "WHERE");
  map.insert(TT::KeywordWith, "WITH");
  map
});

// Lowercased spellings, for looking up an identifier-shaped word.
pub static KEYWORD_STRS: Lazy<HashMap<String, TT>> = Lazy::new(|| {
  HashMap::<String, TT>::from_iter(
    KEYWORDS_MAPPING
      .iter()
      .map(|(tt, v)| (v.to_ascii_lowercase(), *tt)),
  )
});

#[rustfmt::skip]
static SIG: Lazy<PatternMatcher> = Lazy::new(|| {
  let mut patterns: Vec<(TT, String)> = Vec::new();
  for (&k, &v) in OPERATORS_MAPPING.iter() {
    patterns.push((k, v.into()));
  }
  // Keywords share the identifier shape, so they are told apart after the whole word is lexed.
  for c in ID_START_CHARSTR.chars() {
    patterns.push((TT::Identifier, c.to_string()));
  }
  for c in "0123456789".chars() {
    patterns.push((TT::LiteralInteger, c.to_string()));
  }
  patterns.push((TT::LiteralString, "'".into()));

  PatternMatcher::new(patterns)
});

static ML_COMMENT_END: Lazy<PatternMatcher> = Lazy::new(|| {
  PatternMatcher::new::<&str>(vec![(TT::CommentMultilineEnd, "*/")])
});

static INSIG: Lazy<PatternMatcher> = Lazy::new(|| {
  let mut patterns: Vec<(TT, String)> = WHITESPACE_CHARS
    .iter()
    .map(|c| (TT::Whitespace, c.to_string()))
    .collect();
  patterns.push((TT::CommentMultiline, "/*".into()));
  patterns.push((TT::CommentSingle, "--".into()));
  PatternMatcher::new(patterns)
});

fn lex_multiline_comment(lexer: &mut Lexer<'_>) -> LexResult<()> {
  // Consume `/*`.
  lexer.skip_expect(2);
  loop {
    lexer.consume(lexer.while_not_char('*'));
    if lexer.at_end() {
      return Err(LexNotFound);
    };
    if let Ok((_, mat)) = ML_COMMENT_END.find(lexer) {
      lexer.consume(mat);
      return Ok(());
    };
    lexer.skip_expect(1);
  }
}

fn lex_single_comment(lexer: &mut Lexer<'_>) {
  // Consume `--`.
  lexer.skip_expect(2);
  // The line terminator itself is whitespace, not part of the comment.
  lexer.consume(lexer.while_not_char('\n'));
}

fn lex_identifier_or_keyword(lexer: &mut Lexer<'_>) -> TT {
  let start = lexer.next();
  lexer.consume(lexer.while_chars(&ID_CONTINUE));
  let word = &lexer[Loc(start, lexer.next())];
  KEYWORD_STRS
    .get(word.to_ascii_lowercase().as_str())
    .copied()
    .unwrap_or(TT::Identifier)
}

fn lex_number(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  lexer.consume(lexer.while_chars(&DIGIT));
  // A fraction needs digits on both sides of the dot; `1.` is an integer followed by a dot.
  let has_fraction = lexer.peek_or_eof(0) == Some('.')
    && lexer.peek_or_eof(1).is_some_and(|c| DIGIT.has(c));
  if !has_fraction {
    return Ok(TT::LiteralInteger);
  };
  lexer.skip_expect(1);
  lexer.consume(lexer.while_chars(&DIGIT));
  if lexer
    .peek_or_eof(0)
    .filter(|&c| matches!(c, 'e' | 'E'))
    .is_some()
  {
    lexer.skip_expect(1);
    match lexer.peek()? {
      '+' | '-' => lexer.skip_expect(1),
      _ => {}
    };
    if lexer.consume(lexer.while_chars(&DIGIT)).is_empty() {
      return Ok(TT::Invalid);
    };
  };
  Ok(TT::LiteralFloat)
}

fn lex_string(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  // Consume the opening quote.
  lexer.skip_expect(1);
  loop {
    lexer.consume(lexer.while_not_2_chars('\\', '\''));
    match lexer.peek()? {
      '\\' => {
        lexer.skip_expect(1);
        // An escape swallows whatever character follows, quote included.
        let escaped = lexer.peek()?;
        lexer.skip_expect(escaped.len_utf8());
      }
      '\'' => {
        lexer.skip_expect(1);
        break;
      }
      _ => unreachable!(),
    };
  }
  Ok(TT::LiteralString)
}

/// Skips whitespace and comments before the next significant token, recording each comment. An
/// unterminated block comment stops the skip and is returned as the range it covers.
fn skip_insignificant(lexer: &mut Lexer<'_>) -> Result<(), Loc> {
  while let Ok((tt, mat)) = INSIG.find(lexer) {
    match tt {
      TT::Whitespace => {
        lexer.consume(mat);
      }
      TT::CommentMultiline => {
        let cp = lexer.checkpoint();
        let terminated = lex_multiline_comment(lexer);
        let loc = lexer.since_checkpoint(cp);
        if terminated.is_err() {
          return Err(loc);
        };
        lexer.comments.push(loc);
      }
      TT::CommentSingle => {
        let cp = lexer.checkpoint();
        lex_single_comment(lexer);
        let loc = lexer.since_checkpoint(cp);
        lexer.comments.push(loc);
      }
      _ => unreachable!(),
    };
  }
  Ok(())
}

pub fn lex_next(lexer: &mut Lexer<'_>) -> Token {
  if let Err(loc) = skip_insignificant(lexer) {
    return Token {
      loc,
      typ: TT::Invalid,
    };
  };

  // EOF is different from Invalid, so we should emit this specifically instead of letting drive_fallible return an Invalid.
  if lexer.at_end() {
    return Token {
      loc: lexer.eof_range(),
      typ: TT::EOF,
    };
  };

  let token = lexer.drive_fallible(|lexer| {
    SIG.find(lexer).and_then(|(tt, mat)| match tt {
      TT::Identifier => Ok(lex_identifier_or_keyword(lexer)),
      TT::LiteralInteger => lex_number(lexer),
      TT::LiteralString => lex_string(lexer),
      typ => {
        lexer.consume(mat);
        Ok(typ)
      }
    })
  });
  if token.loc.is_empty() {
    // Nothing matched; cover the offending character so the error points at it.
    let c = lexer.peek_or_eof(0).map(|c| c.len_utf8()).unwrap_or(0);
    return Token {
      loc: Loc(token.loc.0, token.loc.0 + c),
      typ: TT::Invalid,
    };
  };
  token
}
