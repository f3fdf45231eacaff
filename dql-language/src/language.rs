use crate::error::LoadError;
use crate::error::LoadErrorType;
use crate::error::LoadResult;
use crate::LANGUAGE_VERSION;
use crate::MIN_COMPATIBLE_LANGUAGE_VERSION;
use ahash::HashMap;
use ahash::HashMapExt;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::sync::Arc;
use tracing::debug;
use tracing::debug_span;

/// Index of a node kind in a language's symbol table.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct Symbol(pub u16);

/// Index of a field name in a language's field table.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct FieldId(pub u16);

// Only the version is read first, so a blob from a newer generator is reported as a version
// mismatch instead of whatever shape error its new layout happens to trigger.
#[derive(Deserialize)]
struct RawHeader {
  abi_version: u32,
}

#[derive(Deserialize)]
struct RawTables {
  name: String,
  symbol_count: usize,
  field_count: usize,
  root: String,
  #[serde(default)]
  extras: Vec<String>,
  fields: Vec<String>,
  symbols: Vec<RawSymbol>,
}

#[derive(Deserialize)]
struct RawSymbol {
  name: String,
  named: bool,
}

#[derive(PartialEq, Eq)]
struct SymbolInfo {
  name: String,
  named: bool,
}

struct Tables {
  name: String,
  abi_version: u32,
  symbols: Vec<SymbolInfo>,
  fields: Vec<String>,
  root: Symbol,
  extras: Vec<Symbol>,
  symbol_ids: HashMap<(String, bool), Symbol>,
  field_ids: HashMap<String, FieldId>,
}

/// Handle to a set of compiled grammar tables.
///
/// The handle is immutable and cheap to clone; clones share the same tables. Two handles compare
/// equal when they describe the same tables, so a handle loaded twice from the same blob is
/// interchangeable with the first.
#[derive(Clone)]
pub struct Language(Arc<Tables>);

impl Language {
  /// Decodes and validates a table blob.
  pub fn from_tables(bytes: &[u8]) -> LoadResult<Language> {
    let _span = debug_span!("load_language", len = bytes.len()).entered();
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
      return Err(LoadError::missing());
    };
    let header: RawHeader = serde_json::from_slice(bytes)
      .map_err(|err| LoadError::malformed(format!("unreadable header: {err}")))?;
    if header.abi_version < MIN_COMPATIBLE_LANGUAGE_VERSION
      || header.abi_version > LANGUAGE_VERSION
    {
      return Err(LoadError::new(
        LoadErrorType::IncompatibleVersion {
          found: header.abi_version,
        },
        "recompile the grammar with a matching generator",
      ));
    };
    let raw: RawTables = serde_json::from_slice(bytes)
      .map_err(|err| LoadError::malformed(format!("unreadable tables: {err}")))?;
    let tables = Tables::build(header.abi_version, raw)?;
    debug!(
      name = %tables.name,
      symbols = tables.symbols.len(),
      fields = tables.fields.len(),
      "loaded grammar tables"
    );
    Ok(Language(Arc::new(tables)))
  }

  pub fn name(&self) -> &str {
    &self.0.name
  }

  pub fn abi_version(&self) -> u32 {
    self.0.abi_version
  }

  pub fn node_kind_count(&self) -> usize {
    self.0.symbols.len()
  }

  pub fn node_kind_for_id(&self, id: Symbol) -> Option<&str> {
    self.0.symbols.get(id.0 as usize).map(|s| s.name.as_str())
  }

  pub fn node_kind_is_named(&self, id: Symbol) -> bool {
    self.0.symbols.get(id.0 as usize).is_some_and(|s| s.named)
  }

  pub fn id_for_node_kind(&self, kind: &str, named: bool) -> Option<Symbol> {
    self.0.symbol_ids.get(&(kind.to_string(), named)).copied()
  }

  pub fn field_count(&self) -> usize {
    self.0.fields.len()
  }

  pub fn field_name_for_id(&self, id: FieldId) -> Option<&str> {
    self.0.fields.get(id.0 as usize).map(|f| f.as_str())
  }

  pub fn field_id_for_name(&self, name: &str) -> Option<FieldId> {
    self.0.field_ids.get(name).copied()
  }

  /// Symbol of the node that spans a whole document.
  pub fn root_symbol(&self) -> Symbol {
    self.0.root
  }

  /// Symbols that may appear anywhere between tokens, such as comments.
  pub fn extras(&self) -> &[Symbol] {
    &self.0.extras
  }

  pub fn is_same_handle(&self, other: &Language) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl PartialEq for Language {
  fn eq(&self, other: &Self) -> bool {
    if self.is_same_handle(other) {
      return true;
    };
    let (a, b) = (&*self.0, &*other.0);
    a.name == b.name
      && a.abi_version == b.abi_version
      && a.symbols == b.symbols
      && a.fields == b.fields
      && a.root == b.root
      && a.extras == b.extras
  }
}

impl Eq for Language {}

impl Debug for Language {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.debug_struct("Language")
      .field("name", &self.0.name)
      .field("abi_version", &self.0.abi_version)
      .field("node_kind_count", &self.0.symbols.len())
      .field("field_count", &self.0.fields.len())
      .finish()
  }
}

impl Tables {
  fn build(abi_version: u32, raw: RawTables) -> LoadResult<Tables> {
    if raw.name.is_empty() {
      return Err(LoadError::malformed("language name is empty"));
    };
    if raw.symbols.is_empty() {
      return Err(LoadError::malformed("symbol table is empty"));
    };
    if raw.symbols.len() != raw.symbol_count {
      return Err(LoadError::malformed(format!(
        "header declares {} symbols but table holds {}",
        raw.symbol_count,
        raw.symbols.len()
      )));
    };
    if raw.fields.len() != raw.field_count {
      return Err(LoadError::malformed(format!(
        "header declares {} fields but table holds {}",
        raw.field_count,
        raw.fields.len()
      )));
    };
    if raw.symbols.len() > u16::MAX as usize || raw.fields.len() > u16::MAX as usize {
      return Err(LoadError::malformed("table exceeds 16-bit symbol space"));
    };

    let mut symbol_ids = HashMap::<(String, bool), Symbol>::with_capacity(raw.symbols.len());
    let mut symbols = Vec::with_capacity(raw.symbols.len());
    for (i, sym) in raw.symbols.into_iter().enumerate() {
      if sym.name.is_empty() {
        return Err(LoadError::malformed(format!("symbol {i} has no name")));
      };
      let key = (sym.name.clone(), sym.named);
      if symbol_ids.insert(key, Symbol(i as u16)).is_some() {
        return Err(LoadError::malformed(format!(
          "duplicate symbol `{}`",
          sym.name
        )));
      };
      symbols.push(SymbolInfo {
        name: sym.name,
        named: sym.named,
      });
    }

    let mut field_ids = HashMap::<String, FieldId>::with_capacity(raw.fields.len());
    for (i, field) in raw.fields.iter().enumerate() {
      if field.is_empty() {
        return Err(LoadError::malformed(format!("field {i} has no name")));
      };
      if field_ids.insert(field.clone(), FieldId(i as u16)).is_some() {
        return Err(LoadError::malformed(format!("duplicate field `{field}`")));
      };
    }

    let named_symbol = |name: &str, role: &str| {
      symbol_ids
        .get(&(name.to_string(), true))
        .copied()
        .ok_or_else(|| LoadError::malformed(format!("{role} symbol `{name}` is not in the symbol table")))
    };
    let root = named_symbol(&raw.root, "root")?;
    let extras = raw
      .extras
      .iter()
      .map(|name| named_symbol(name, "extra"))
      .collect::<LoadResult<Vec<_>>>()?;

    Ok(Tables {
      name: raw.name,
      abi_version,
      symbols,
      fields: raw.fields,
      root,
      extras,
      symbol_ids,
      field_ids,
    })
  }
}
