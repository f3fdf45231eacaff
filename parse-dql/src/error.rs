use crate::loc::Loc;
use crate::token::TT;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Formatter;
use dql_language::LoadError;
use std::error::Error;
use std::fmt::Display;

/// A stable classification of syntax errors produced by the parser.
///
/// Diagnostic codes (prefix `DQ`) are assigned per variant and are stable:
/// - `DQ0001`: [`SyntaxErrorType::ExpectedSyntax`]
/// - `DQ0002`: [`SyntaxErrorType::RequiredTokenNotFound`]
/// - `DQ0003`: [`SyntaxErrorType::UnexpectedEnd`]
/// - `DQ0004`: [`SyntaxErrorType::InvalidToken`]
/// - `DQ0005`: [`SyntaxErrorType::NestingTooDeep`]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SyntaxErrorType {
  ExpectedSyntax(&'static str),
  RequiredTokenNotFound(TT),
  UnexpectedEnd,
  InvalidToken,
  NestingTooDeep,
}

#[derive(Clone)]
pub struct SyntaxError {
  pub typ: SyntaxErrorType,
  pub loc: Loc,
  pub actual_token: Option<TT>,
}

impl SyntaxError {
  pub fn new(typ: SyntaxErrorType, loc: Loc, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError {
      typ,
      loc,
      actual_token,
    }
  }

  pub fn code(&self) -> &'static str {
    self.typ.code()
  }

  pub fn message(&self) -> String {
    self.typ.message(self.actual_token)
  }
}

impl Debug for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} around loc [{}:{}]", self, self.loc.0, self.loc.1)
  }
}

impl Display for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "[{}] {}", self.code(), self.message())
  }
}

impl Error for SyntaxError {}

impl PartialEq for SyntaxError {
  fn eq(&self, other: &Self) -> bool {
    self.typ == other.typ
  }
}

impl Eq for SyntaxError {}

pub type SyntaxResult<T> = Result<T, SyntaxError>;

impl SyntaxErrorType {
  /// Stable diagnostic code for this syntax error variant.
  pub fn code(&self) -> &'static str {
    match self {
      SyntaxErrorType::ExpectedSyntax(_) => "DQ0001",
      SyntaxErrorType::RequiredTokenNotFound(_) => "DQ0002",
      SyntaxErrorType::UnexpectedEnd => "DQ0003",
      SyntaxErrorType::InvalidToken => "DQ0004",
      SyntaxErrorType::NestingTooDeep => "DQ0005",
    }
  }

  /// Human-readable message describing this syntax error.
  pub fn message(&self, actual_token: Option<TT>) -> String {
    let found = actual_token
      .map(|tok| format!(", found {:?}", tok))
      .unwrap_or_default();
    match self {
      SyntaxErrorType::ExpectedSyntax(expected) => format!("expected {}{}", expected, found),
      SyntaxErrorType::RequiredTokenNotFound(token) => {
        format!("expected token {:?}{}", token, found)
      }
      SyntaxErrorType::UnexpectedEnd => "unexpected end of input".into(),
      SyntaxErrorType::InvalidToken => "unrecognised input".into(),
      SyntaxErrorType::NestingTooDeep => "expression nested too deeply".into(),
    }
  }
}

/// Why a [`crate::Session`] refused a grammar handle.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum LanguageError {
  /// The handle's table format is newer or older than this engine reads.
  IncompatibleVersion(u32),
  /// A named node kind the engine produces is absent from the handle's tables.
  MissingNodeKind(&'static str),
  /// An anonymous token the engine produces is absent from the handle's tables.
  MissingToken(&'static str),
  MissingField(&'static str),
}

impl Display for LanguageError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      LanguageError::IncompatibleVersion(found) => write!(
        f,
        "grammar handle uses table format version {found}, engine supports {}..={}",
        crate::MIN_COMPATIBLE_LANGUAGE_VERSION,
        crate::LANGUAGE_VERSION
      ),
      LanguageError::MissingNodeKind(kind) => {
        write!(f, "grammar handle has no node kind `{kind}`")
      }
      LanguageError::MissingToken(token) => write!(f, "grammar handle has no token `{token}`"),
      LanguageError::MissingField(field) => write!(f, "grammar handle has no field `{field}`"),
    }
  }
}

impl Error for LanguageError {}

/// Any failure of the one-shot [`crate::parse`] helper.
#[derive(Debug, derive_more::From)]
pub enum ParseError {
  Load(LoadError),
  Language(LanguageError),
  Syntax(SyntaxError),
}

impl Display for ParseError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      ParseError::Load(err) => write!(f, "[{}] {}", err.typ.code(), err),
      ParseError::Language(err) => Display::fmt(err, f),
      ParseError::Syntax(err) => Display::fmt(err, f),
    }
  }
}

impl Error for ParseError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      ParseError::Load(err) => Some(err),
      ParseError::Language(err) => Some(err),
      ParseError::Syntax(err) => Some(err),
    }
  }
}
