use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::loc::Loc;
use ahash::HashSet;
use ahash::HashSetExt;
use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub enum TT {
  // Special token used to represent the end of the source code. Easier than using and handling Option everywhere.
  EOF,
  // Special token used to represent source code the lexer could not make sense of, so that peeking never needs error handling.
  Invalid,
  // These are only used by lexer.
  CommentMultiline,
  CommentMultilineEnd,
  CommentSingle,
  Whitespace,

  Asterisk,
  Backslash,
  BraceClose,
  BraceOpen,
  ChevronLeft,
  ChevronLeftChevronRight,
  ChevronLeftEquals,
  ChevronRight,
  ChevronRightEquals,
  Colon,
  Comma,
  Dot,
  Equals,
  ExclamationEquals,
  Hyphen,
  Identifier,
  KeywordAbs,
  KeywordAll,
  KeywordAnd,
  KeywordAny,
  KeywordAs,
  KeywordAsc,
  KeywordAvg,
  KeywordBetween,
  KeywordBitAnd,
  KeywordBitOr,
  KeywordBoth,
  KeywordBy,
  KeywordCase,
  KeywordCoalesce,
  KeywordConcat,
  KeywordCount,
  KeywordCurrentDate,
  KeywordCurrentTime,
  KeywordCurrentTimestamp,
  KeywordDateAdd,
  KeywordDateDiff,
  KeywordDateSub,
  KeywordDelete,
  KeywordDesc,
  KeywordDistinct,
  KeywordElse,
  KeywordEmpty,
  KeywordEnd,
  KeywordEscape,
  KeywordExists,
  KeywordFalse,
  KeywordFrom,
  KeywordGroup,
  KeywordHaving,
  KeywordHidden,
  KeywordIdentity,
  KeywordIn,
  KeywordIndex,
  KeywordInner,
  KeywordInstance,
  KeywordIs,
  KeywordJoin,
  KeywordLeading,
  KeywordLeft,
  KeywordLength,
  KeywordLike,
  KeywordLocate,
  KeywordLower,
  KeywordMax,
  KeywordMember,
  KeywordMin,
  KeywordMod,
  KeywordNamed,
  KeywordNew,
  KeywordNot,
  KeywordNull,
  KeywordNullif,
  KeywordOf,
  KeywordOr,
  KeywordOrder,
  KeywordOuter,
  KeywordPartial,
  KeywordSelect,
  KeywordSet,
  KeywordSize,
  KeywordSome,
  KeywordSqrt,
  KeywordSubstring,
  KeywordSum,
  KeywordThen,
  KeywordTrailing,
  KeywordTrim,
  KeywordTrue,
  KeywordUpdate,
  KeywordUpper,
  KeywordWhen,
  KeywordWhere,
  KeywordWith,
  LiteralFloat,
  LiteralInteger,
  LiteralString,
  ParenthesisClose,
  ParenthesisOpen,
  Plus,
  Question,
  Slash,
}

pub static AGGREGATE_FUNCTIONS: Lazy<HashSet<TT>> = Lazy::new(|| {
  let mut set = HashSet::<TT>::new();
  set.insert(TT::KeywordAvg);
  set.insert(TT::KeywordCount);
  set.insert(TT::KeywordMax);
  set.insert(TT::KeywordMin);
  set.insert(TT::KeywordSum);
  set
});

pub static NUMERIC_FUNCTIONS: Lazy<HashSet<TT>> = Lazy::new(|| {
  let mut set = HashSet::<TT>::new();
  set.insert(TT::KeywordAbs);
  set.insert(TT::KeywordBitAnd);
  set.insert(TT::KeywordBitOr);
  set.insert(TT::KeywordDateDiff);
  set.insert(TT::KeywordLength);
  set.insert(TT::KeywordLocate);
  set.insert(TT::KeywordMod);
  set.insert(TT::KeywordSize);
  set.insert(TT::KeywordSqrt);
  set
});

pub static STRING_FUNCTIONS: Lazy<HashSet<TT>> = Lazy::new(|| {
  let mut set = HashSet::<TT>::new();
  set.insert(TT::KeywordConcat);
  set.insert(TT::KeywordIdentity);
  set.insert(TT::KeywordLower);
  set.insert(TT::KeywordSubstring);
  set.insert(TT::KeywordTrim);
  set.insert(TT::KeywordUpper);
  set
});

pub static DATETIME_FUNCTIONS: Lazy<HashSet<TT>> = Lazy::new(|| {
  let mut set = HashSet::<TT>::new();
  set.insert(TT::KeywordCurrentDate);
  set.insert(TT::KeywordCurrentTime);
  set.insert(TT::KeywordCurrentTimestamp);
  set.insert(TT::KeywordDateAdd);
  set.insert(TT::KeywordDateSub);
  set
});

pub static COMPARISON_OPERATORS: Lazy<HashSet<TT>> = Lazy::new(|| {
  let mut set = HashSet::<TT>::new();
  set.insert(TT::ChevronLeft);
  set.insert(TT::ChevronLeftChevronRight);
  set.insert(TT::ChevronLeftEquals);
  set.insert(TT::ChevronRight);
  set.insert(TT::ChevronRightEquals);
  set.insert(TT::Equals);
  set.insert(TT::ExclamationEquals);
  set
});

impl TT {
  pub fn is_keyword(self) -> bool {
    self >= TT::KeywordAbs && self <= TT::KeywordWith
  }

  /// Whether the token can stand for an identifier in a position where nothing else may appear,
  /// such as after `.` or `AS`. Keywords are words too, so `u.order` names a field.
  pub fn is_word(self) -> bool {
    self == TT::Identifier || self.is_keyword()
  }

  pub fn is_function(self) -> bool {
    NUMERIC_FUNCTIONS.contains(&self)
      || STRING_FUNCTIONS.contains(&self)
      || DATETIME_FUNCTIONS.contains(&self)
  }

  pub fn starts_case_expression(self) -> bool {
    matches!(self, TT::KeywordCase | TT::KeywordCoalesce | TT::KeywordNullif)
  }

  pub fn starts_input_parameter(self) -> bool {
    matches!(self, TT::Question | TT::Colon)
  }
}

#[derive(Clone, Debug)]
pub struct Token {
  pub loc: Loc,
  pub typ: TT,
}

impl Token {
  pub fn error(&self, typ: SyntaxErrorType) -> SyntaxError {
    let typ = match self.typ {
      TT::EOF => SyntaxErrorType::UnexpectedEnd,
      TT::Invalid => SyntaxErrorType::InvalidToken,
      _ => typ,
    };
    self.loc.error(typ, Some(self.typ))
  }
}
