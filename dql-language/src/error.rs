use core::fmt;
use core::fmt::Debug;
use core::fmt::Formatter;
use std::error::Error;
use std::fmt::Display;

/// Why a table blob could not be turned into a [`crate::Language`].
///
/// Diagnostic codes (prefix `DL`) are assigned per variant and are stable:
/// - `DL0001`: [`LoadErrorType::Missing`]
/// - `DL0002`: [`LoadErrorType::Malformed`]
/// - `DL0003`: [`LoadErrorType::IncompatibleVersion`]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum LoadErrorType {
  /// The blob is empty or contains only whitespace.
  Missing,
  /// The blob does not decode, or decodes into inconsistent tables.
  Malformed,
  /// The tables were compiled for a table format this loader does not read.
  IncompatibleVersion { found: u32 },
}

#[derive(Clone)]
pub struct LoadError {
  pub typ: LoadErrorType,
  pub detail: String,
}

impl LoadError {
  pub fn new(typ: LoadErrorType, detail: impl Into<String>) -> LoadError {
    LoadError {
      typ,
      detail: detail.into(),
    }
  }

  pub fn missing() -> LoadError {
    LoadError::new(LoadErrorType::Missing, "grammar tables are empty")
  }

  pub fn malformed(detail: impl Into<String>) -> LoadError {
    LoadError::new(LoadErrorType::Malformed, detail)
  }
}

impl Debug for LoadError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "[{}] {}", self.typ.code(), self)
  }
}

impl Display for LoadError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.typ.message(), self.detail)
  }
}

impl Error for LoadError {}

impl PartialEq for LoadError {
  fn eq(&self, other: &Self) -> bool {
    self.typ == other.typ
  }
}

impl Eq for LoadError {}

pub type LoadResult<T> = Result<T, LoadError>;

impl LoadErrorType {
  /// Stable diagnostic code for this load error variant.
  pub fn code(&self) -> &'static str {
    match self {
      LoadErrorType::Missing => "DL0001",
      LoadErrorType::Malformed => "DL0002",
      LoadErrorType::IncompatibleVersion { .. } => "DL0003",
    }
  }

  pub fn message(&self) -> String {
    match self {
      LoadErrorType::Missing => "grammar tables missing".into(),
      LoadErrorType::Malformed => "grammar tables malformed".into(),
      LoadErrorType::IncompatibleVersion { found } => format!(
        "grammar tables use format version {found}, supported versions are {}..={}",
        crate::MIN_COMPATIBLE_LANGUAGE_VERSION,
        crate::LANGUAGE_VERSION
      ),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn codes_are_stable() {
    assert_eq!(LoadErrorType::Missing.code(), "DL0001");
    assert_eq!(LoadErrorType::Malformed.code(), "DL0002");
    assert_eq!(
      LoadErrorType::IncompatibleVersion { found: 9 }.code(),
      "DL0003"
    );
  }

  #[test]
  fn display_includes_detail() {
    let err = LoadError::malformed("symbol table is empty");
    assert_eq!(
      err.to_string(),
      "grammar tables malformed: symbol table is empty"
    );
    assert!(format!("{err:?}").starts_with("[DL0002]"));
  }
}
