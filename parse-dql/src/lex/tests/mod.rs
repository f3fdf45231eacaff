use crate::lex::lex_next;
use crate::lex::Lexer;
use crate::loc::Loc;
use crate::token::TT;
use crate::token::TT::*;

fn check<const N: usize>(code: &str, expecteds: [TT; N]) {
  let mut lexer = Lexer::new(code);
  for expected in expecteds {
    let t = lex_next(&mut lexer);
    assert_eq!(t.typ, expected, "in {code:?}");
  }
  let t = lex_next(&mut lexer);
  assert_eq!(EOF, t.typ, "in {code:?}");
}

#[test]
fn test_lex_keywords() {
  check("SELECT", [KeywordSelect]);
  check("select Select sElEcT", [KeywordSelect, KeywordSelect, KeywordSelect]);
  check("current_timestamp", [KeywordCurrentTimestamp]);
  check("TRUE false", [KeywordTrue, KeywordFalse]);
  check("date_add bit_or", [KeywordDateAdd, KeywordBitOr]);
}

#[test]
fn test_lex_identifiers() {
  check("u", [Identifier]);
  check("_user2", [Identifier]);
  // Words that merely start with a keyword are identifiers.
  check("selection fromage orders", [Identifier, Identifier, Identifier]);
  check("current_dates", [Identifier]);
}

#[test]
fn test_lex_literal_numbers() {
  check("1", [LiteralInteger]);
  check("929", [LiteralInteger]);
  check("1.5", [LiteralFloat]);
  check("1.5e10 2.0E-3 3.25e+1", [LiteralFloat, LiteralFloat, LiteralFloat]);
  check("1.", [LiteralInteger, Dot]);
  check("1.e", [LiteralInteger, Dot, Identifier]);
  check("1.5e", [Invalid]);
  check("-4", [Hyphen, LiteralInteger]);
}

#[test]
fn test_lex_literal_strings() {
  check("'hello world'", [LiteralString]);
  check("''", [LiteralString]);
  check(r"'it\'s'", [LiteralString]);
  check("'line\nbreak'", [LiteralString]);
  check("'unterminated", [Invalid]);
}

#[test]
fn test_lex_operators() {
  check(
    "= < <= <> > >= !=",
    [
      Equals,
      ChevronLeft,
      ChevronLeftEquals,
      ChevronLeftChevronRight,
      ChevronRight,
      ChevronRightEquals,
      ExclamationEquals,
    ],
  );
  check("( ) { } , . + - * / ? : \\", [
    ParenthesisOpen,
    ParenthesisClose,
    BraceOpen,
    BraceClose,
    Comma,
    Dot,
    Plus,
    Hyphen,
    Asterisk,
    Slash,
    Question,
    Colon,
    Backslash,
  ]);
  check("?1", [Question, LiteralInteger]);
  check(":name", [Colon, Identifier]);
}

#[test]
fn test_lex_comments() {
  check("-- only a comment", []);
  check("/* block */", []);
  check("u -- trailing\nv", [Identifier, Identifier]);
  check("u /* a * b */ v", [Identifier, Identifier]);
  check("a - b", [Identifier, Hyphen, Identifier]);
  check("a / b", [Identifier, Slash, Identifier]);
}

#[test]
fn test_lex_unterminated_block_comment() {
  let source = "u /* unterminated * /";
  let mut lexer = Lexer::new(source);
  assert_eq!(lex_next(&mut lexer).typ, Identifier);
  let t = lex_next(&mut lexer);
  assert_eq!(t.typ, Invalid);
  assert_eq!(t.loc, Loc(2, source.len()));
  assert_eq!(lex_next(&mut lexer).typ, EOF);
  assert!(lexer.into_comments().is_empty());

  check("u /* closed */ /* open", [Identifier, Invalid]);
}

#[test]
fn test_lex_records_comment_locations() {
  let source = "-- first\nSELECT /* second */ u";
  let mut lexer = Lexer::new(source);
  while lex_next(&mut lexer).typ != EOF {}
  let comments = lexer.into_comments();
  assert_eq!(comments, vec![Loc(0, 8), Loc(16, 28)]);
  assert_eq!(&source[16..28], "/* second */");
}

#[test]
fn test_lex_invalid_character() {
  let mut lexer = Lexer::new("u # v");
  assert_eq!(lex_next(&mut lexer).typ, Identifier);
  let t = lex_next(&mut lexer);
  assert_eq!(t.typ, Invalid);
  assert_eq!(t.loc, Loc(2, 3));
}

#[test]
fn test_lex_select_statement() {
  check(
    "SELECT u.name FROM App\\Entity\\User u WHERE u.id = :id",
    [
      KeywordSelect,
      Identifier,
      Dot,
      Identifier,
      KeywordFrom,
      Identifier,
      Backslash,
      Identifier,
      Backslash,
      Identifier,
      Identifier,
      KeywordWhere,
      Identifier,
      Dot,
      Identifier,
      Equals,
      Colon,
      Identifier,
    ],
  );
}
