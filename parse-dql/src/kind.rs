use crate::error::LanguageError;
use crate::lex::KEYWORDS_MAPPING;
use crate::lex::OPERATORS_MAPPING;
use crate::token::TT;
use ahash::HashMap;
use ahash::HashMapExt;
use dql_language::FieldId;
use dql_language::Language;
use dql_language::Symbol;

macro_rules! node_kinds {
  ($($variant:ident => $name:literal,)*) => {
    /// Named node kinds the parser produces.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub enum Kind {
      $($variant,)*
    }

    impl Kind {
      pub const ALL: &'static [Kind] = &[$(Kind::$variant,)*];

      pub fn name(self) -> &'static str {
        match self {
          $(Kind::$variant => $name,)*
        }
      }
    }
  };
}

node_kinds! {
  AbstractSchemaName => "abstract_schema_name",
  AggregateExpression => "aggregate_expression",
  AliasIdentificationVariable => "alias_identification_variable",
  AliasResultVariable => "alias_result_variable",
  ArithmeticExpression => "arithmetic_expression",
  ArithmeticFactor => "arithmetic_factor",
  ArithmeticPrimary => "arithmetic_primary",
  ArithmeticTerm => "arithmetic_term",
  BetweenExpression => "between_expression",
  BooleanLiteral => "boolean_literal",
  CaseExpression => "case_expression",
  CaseOperand => "case_operand",
  CharLiteral => "char_literal",
  CoalesceExpression => "coalesce_expression",
  CollectionMemberExpression => "collection_member_expression",
  CollectionValuedPathExpression => "collection_valued_path_expression",
  Comment => "comment",
  ComparisonExpression => "comparison_expression",
  ComparisonOperator => "comparison_operator",
  ConditionalExpression => "conditional_expression",
  ConditionalFactor => "conditional_factor",
  ConditionalPrimary => "conditional_primary",
  ConditionalTerm => "conditional_term",
  DeleteClause => "delete_clause",
  DeleteStatement => "delete_statement",
  EmptyCollectionComparisonExpression => "empty_collection_comparison_expression",
  EntityExpression => "entity_expression",
  ExistsExpression => "exists_expression",
  FieldIdentificationVariable => "field_identification_variable",
  FloatLiteral => "float_literal",
  FromClause => "from_clause",
  FullyQualifiedName => "fully_qualified_name",
  FunctionDeclaration => "function_declaration",
  FunctionsReturningDatetime => "functions_returning_datetime",
  FunctionsReturningNumerics => "functions_returning_numerics",
  FunctionsReturningStrings => "functions_returning_strings",
  GeneralCaseExpression => "general_case_expression",
  GroupByClause => "group_by_clause",
  GroupByItem => "group_by_item",
  HavingClause => "having_clause",
  IdentificationVariable => "identification_variable",
  IdentificationVariableDeclaration => "identification_variable_declaration",
  Identifier => "identifier",
  InExpression => "in_expression",
  InParameter => "in_parameter",
  IndexBy => "index_by",
  InputParameter => "input_parameter",
  InstanceOfExpression => "instance_of_expression",
  InstanceOfParameter => "instance_of_parameter",
  IntegerLiteral => "integer_literal",
  Join => "join",
  JoinAssociationDeclaration => "join_association_declaration",
  JoinAssociationPathExpression => "join_association_path_expression",
  LikeExpression => "like_expression",
  Literal => "literal",
  NamedParameter => "named_parameter",
  NewObjectArg => "new_object_arg",
  NewObjectExpression => "new_object_expression",
  NewValue => "new_value",
  NullComparisonExpression => "null_comparison_expression",
  NullifExpression => "nullif_expression",
  OrderByClause => "order_by_clause",
  OrderByItem => "order_by_item",
  PartialFieldSet => "partial_field_set",
  PartialObjectExpression => "partial_object_expression",
  PositionalParameter => "positional_parameter",
  QuantifiedExpression => "quantified_expression",
  RangeVariableDeclaration => "range_variable_declaration",
  ResultVariable => "result_variable",
  ScalarExpression => "scalar_expression",
  SelectClause => "select_clause",
  SelectExpression => "select_expression",
  SelectStatement => "select_statement",
  SimpleArithmeticExpression => "simple_arithmetic_expression",
  SimpleCaseExpression => "simple_case_expression",
  SimpleConditionalExpression => "simple_conditional_expression",
  SimpleEntityExpression => "simple_entity_expression",
  SimpleWhenClause => "simple_when_clause",
  SingleValuedAssociationPathExpression => "single_valued_association_path_expression",
  SourceFile => "source_file",
  StateField => "state_field",
  StateFieldPathExpression => "state_field_path_expression",
  StringExpression => "string_expression",
  StringLiteral => "string_literal",
  StringPrimary => "string_primary",
  TypeDiscriminator => "type_discriminator",
  UpdateClause => "update_clause",
  UpdateItem => "update_item",
  UpdateStatement => "update_statement",
  WhenClause => "when_clause",
  WhereClause => "where_clause",
}

/// Field names the parser attaches to children.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Field {
  Alias,
  Condition,
  Declarations,
  Distinct,
  Entity,
  Expressions,
  Field,
  Items,
  Keyword,
  Object,
}

impl Field {
  pub const ALL: &'static [Field] = &[
    Field::Alias,
    Field::Condition,
    Field::Declarations,
    Field::Distinct,
    Field::Entity,
    Field::Expressions,
    Field::Field,
    Field::Items,
    Field::Keyword,
    Field::Object,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Field::Alias => "alias",
      Field::Condition => "condition",
      Field::Declarations => "declarations",
      Field::Distinct => "distinct",
      Field::Entity => "entity",
      Field::Expressions => "expressions",
      Field::Field => "field",
      Field::Items => "items",
      Field::Keyword => "keyword",
      Field::Object => "object",
    }
  }
}

/// Every node kind, token and field the parser emits, resolved against one grammar handle.
pub struct SymbolMap {
  kinds: HashMap<Kind, Symbol>,
  tokens: HashMap<TT, Symbol>,
  fields: HashMap<Field, FieldId>,
}

impl SymbolMap {
  pub fn resolve(language: &Language) -> Result<SymbolMap, LanguageError> {
    let mut kinds = HashMap::<Kind, Symbol>::with_capacity(Kind::ALL.len());
    for &kind in Kind::ALL {
      let symbol = language
        .id_for_node_kind(kind.name(), true)
        .ok_or(LanguageError::MissingNodeKind(kind.name()))?;
      kinds.insert(kind, symbol);
    }

    let mut tokens = HashMap::<TT, Symbol>::new();
    for (&tt, &name) in KEYWORDS_MAPPING.iter().chain(OPERATORS_MAPPING.iter()) {
      let symbol = language
        .id_for_node_kind(name, false)
        .ok_or(LanguageError::MissingToken(name))?;
      tokens.insert(tt, symbol);
    }

    let mut fields = HashMap::<Field, FieldId>::with_capacity(Field::ALL.len());
    for &field in Field::ALL {
      let id = language
        .field_id_for_name(field.name())
        .ok_or(LanguageError::MissingField(field.name()))?;
      fields.insert(field, id);
    }

    Ok(SymbolMap {
      kinds,
      tokens,
      fields,
    })
  }

  pub fn kind(&self, kind: Kind) -> Symbol {
    self.kinds[&kind]
  }

  /// Symbol for an anonymous keyword or punctuation token. Every such token is resolved when the
  /// map is built, so only identifier, literal and end tokens are absent.
  pub fn token(&self, tt: TT) -> Symbol {
    match self.tokens.get(&tt) {
      Some(symbol) => *symbol,
      None => panic!("{tt:?} is not an anonymous token"),
    }
  }

  pub fn field(&self, field: Field) -> FieldId {
    self.fields[&field]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolves_against_embedded_language() {
    let language = dql_language::language().unwrap();
    let symbols = SymbolMap::resolve(language).unwrap();
    let select = symbols.kind(Kind::SelectStatement);
    assert_eq!(language.node_kind_for_id(select), Some("select_statement"));
    let keyword = symbols.token(TT::KeywordSelect);
    assert_eq!(language.node_kind_for_id(keyword), Some("SELECT"));
    assert!(!language.node_kind_is_named(keyword));
    let not_equal = symbols.token(TT::ChevronLeftChevronRight);
    assert_eq!(language.node_kind_for_id(not_equal), Some("<>"));
    let field = symbols.field(Field::Declarations);
    assert_eq!(language.field_name_for_id(field), Some("declarations"));
  }

  #[test]
  fn kind_names_are_unique() {
    let mut names: Vec<_> = Kind::ALL.iter().map(|k| k.name()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), Kind::ALL.len());
  }
}
