use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::token::TT;
use serde::Serialize;
use std::cmp::max;
use std::cmp::min;
use std::ops::Add;
use std::ops::AddAssign;

/// A location within the current source expressed as UTF-8 byte offsets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  pub fn error(self, typ: SyntaxErrorType, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError::new(typ, self, actual_token)
  }

  pub fn is_empty(&self) -> bool {
    self.0 >= self.1
  }

  pub fn len(&self) -> usize {
    self.1 - self.0
  }

  pub fn extend(&mut self, other: Loc) {
    self.0 = min(self.0, other.0);
    self.1 = max(self.1, other.1);
  }

  /// One-based line and column (in characters) of the start of this location.
  pub fn line_col(&self, source: &str) -> (usize, usize) {
    let before = &source[..self.0.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let col = before[line_start..].chars().count() + 1;
    (line, col)
  }
}

impl Add for Loc {
  type Output = Loc;

  fn add(self, rhs: Self) -> Self::Output {
    let mut new = self;
    new.extend(rhs);
    new
  }
}

impl AddAssign for Loc {
  fn add_assign(&mut self, rhs: Self) {
    self.extend(rhs);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extends_to_cover_both() {
    assert_eq!(Loc(4, 6) + Loc(1, 2), Loc(1, 6));
    let mut loc = Loc(3, 3);
    loc += Loc(5, 9);
    assert_eq!(loc, Loc(3, 9));
    assert!(Loc(2, 2).is_empty());
  }

  #[test]
  fn line_col_counts_characters() {
    let source = "SELECT u\nFROM Üser u";
    assert_eq!(Loc(0, 6).line_col(source), (1, 1));
    assert_eq!(Loc(9, 13).line_col(source), (2, 1));
    // `u` after the two-byte `Ü`.
    assert_eq!(Loc(20, 21).line_col(source), (2, 11));
  }
}
