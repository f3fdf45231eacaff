//! Parser for Doctrine Query Language (DQL) that builds concrete syntax trees whose node kinds and
//! field names come from the compiled grammar tables in [`dql_language`].
//!
//! ```
//! let tree = parse_dql::parse("SELECT u FROM User u WHERE u.id = ?1").unwrap();
//! assert_eq!(tree.root_node().kind(), "source_file");
//! ```

pub mod char;
pub mod error;
pub mod kind;
pub mod lex;
pub mod loc;
pub mod parse;
pub mod session;
pub mod token;
pub mod tree;
#[cfg(test)]
mod util;

pub use error::ParseError;
pub use session::Session;
pub use tree::NodeRef;
pub use tree::Tree;

/// Newest grammar table format version the parser can bind to.
pub const LANGUAGE_VERSION: u32 = 1;

/// Oldest grammar table format version the parser can bind to.
pub const MIN_COMPATIBLE_LANGUAGE_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug)]
pub struct ParseOptions {
  /// How deeply statements, conditions and expressions may nest before parsing fails.
  pub max_depth: u32,
  /// Whether comments are recorded on the tree.
  pub include_comments: bool,
}

impl Default for ParseOptions {
  fn default() -> Self {
    ParseOptions {
      max_depth: 64,
      include_comments: true,
    }
  }
}

/// Parses `source` with the embedded DQL grammar and default options.
pub fn parse(source: &str) -> Result<Tree, ParseError> {
  let language = dql_language::language()?;
  let session = Session::new(language)?;
  Ok(session.parse(source)?)
}
