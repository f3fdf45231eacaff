use crate::error::LanguageError;
use crate::error::SyntaxResult;
use crate::kind::Kind;
use crate::kind::SymbolMap;
use crate::lex::Lexer;
use crate::parse::Parser;
use crate::tree::Node;
use crate::tree::Tree;
use crate::ParseOptions;
use crate::LANGUAGE_VERSION;
use crate::MIN_COMPATIBLE_LANGUAGE_VERSION;
use dql_language::Language;
use tracing::debug;
use tracing::debug_span;

/// A parser bound to one grammar handle.
///
/// Binding checks the handle once: its table format version must be one this parser reads, and
/// every node kind, token and field the parser emits must be in its tables. A session never parses
/// with a handle that failed either check.
pub struct Session {
  language: Language,
  symbols: SymbolMap,
  options: ParseOptions,
}

impl Session {
  pub fn new(language: &Language) -> Result<Session, LanguageError> {
    Session::with_options(language, ParseOptions::default())
  }

  pub fn with_options(language: &Language, options: ParseOptions) -> Result<Session, LanguageError> {
    let version = language.abi_version();
    if !(MIN_COMPATIBLE_LANGUAGE_VERSION..=LANGUAGE_VERSION).contains(&version) {
      return Err(LanguageError::IncompatibleVersion(version));
    };
    let symbols = SymbolMap::resolve(language)?;
    Ok(Session {
      language: language.clone(),
      symbols,
      options,
    })
  }

  pub fn language(&self) -> &Language {
    &self.language
  }

  pub fn options(&self) -> ParseOptions {
    self.options
  }

  pub fn parse(&self, source: &str) -> SyntaxResult<Tree> {
    let _span = debug_span!("parse", len = source.len()).entered();
    let mut parser = Parser::new(Lexer::new(source), &self.symbols, self.options);
    let root = parser.source_file()?;
    let comments = if self.options.include_comments {
      let comment = self.symbols.kind(Kind::Comment);
      parser
        .into_comments()
        .into_iter()
        .map(|loc| Node::leaf(comment, loc))
        .collect()
    } else {
      Vec::new()
    };
    debug!(
      statements = root.children.len(),
      comments = comments.len(),
      "parsed document"
    );
    Ok(Tree::new(
      self.language.clone(),
      source.to_string(),
      root,
      comments,
    ))
  }
}
