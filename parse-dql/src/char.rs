use ahash::HashSet;
use ahash::HashSetExt;
use core::ops::RangeInclusive;
use once_cell::sync::Lazy;

#[derive(Clone)]
pub struct CharFilter {
  chars: HashSet<char>,
}

impl CharFilter {
  pub fn new() -> CharFilter {
    CharFilter {
      chars: HashSet::new(),
    }
  }

  pub fn add_char(&mut self, c: char) {
    self.chars.insert(c);
  }

  pub fn add_chars(&mut self, chars: RangeInclusive<char>) {
    for c in chars {
      self.chars.insert(c);
    }
  }

  pub fn has(&self, c: char) -> bool {
    self.chars.contains(&c)
  }
}

// The grammar only recognises ASCII identifiers.
pub const ID_START_CHARSTR: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_";

pub const WHITESPACE_CHARS: [char; 7] = [
  '\x09', // Horizontal tab
  '\x0a', // Line feed
  '\x0b', // Vertical tab
  '\x0c', // Form feed
  '\x0d', // Carriage return
  '\x20', // Space
  '\u{00A0}', // NO-BREAK SPACE
];

pub static DIGIT: Lazy<CharFilter> = Lazy::new(|| {
  let mut filter = CharFilter::new();
  filter.add_chars('0'..='9');
  filter
});

pub static ID_CONTINUE: Lazy<CharFilter> = Lazy::new(|| {
  let mut filter = CharFilter::new();
  filter.add_chars('a'..='z');
  filter.add_chars('A'..='Z');
  filter.add_chars('0'..='9');
  filter.add_char('_');
  filter
});
