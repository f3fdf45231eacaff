//! Compiled grammar tables for Doctrine Query Language (DQL).
//!
//! The tables are produced ahead of time from the DQL grammar definition and embedded into this
//! crate. [`language`] hands out the process-wide handle that parsing engines bind to:
//!
//! ```
//! let language = dql_language::language().expect("Error loading Doctrine Query Language grammar");
//! assert_eq!(language.name(), "dql");
//! ```

use error::LoadResult;
use once_cell::sync::Lazy;

pub mod error;
pub mod language;

pub use error::LoadError;
pub use error::LoadErrorType;
pub use language::FieldId;
pub use language::Language;
pub use language::Symbol;

pub const LANGUAGE_NAME: &str = "dql";

/// Newest table format version this loader understands.
pub const LANGUAGE_VERSION: u32 = 1;

/// Oldest table format version this loader understands.
pub const MIN_COMPATIBLE_LANGUAGE_VERSION: u32 = 1;

/// The embedded table blob, as emitted by the grammar compiler.
pub static TABLES: &[u8] = include_bytes!("tables.json");

static LANGUAGE: Lazy<LoadResult<Language>> = Lazy::new(|| Language::from_tables(TABLES));

/// Returns the DQL grammar handle.
///
/// The embedded tables are decoded on the first call only; every call returns the same handle,
/// or the same error if the tables could not be loaded.
pub fn language() -> LoadResult<&'static Language> {
  match &*LANGUAGE {
    Ok(language) => Ok(language),
    Err(err) => Err(err.clone()),
  }
}
