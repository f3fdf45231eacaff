use super::Parser;
use crate::error::SyntaxErrorType;
use crate::kind::SymbolMap;
use crate::lex::Lexer;
use crate::loc::Loc;
use crate::parse;
use crate::token::TT;
use crate::tree::NodeRef;
use crate::tree::Tree;
use crate::util::test::evaluate_test_input_files;
use crate::util::test::outline;
use crate::ParseOptions;

fn parse_ok(source: &str) -> Tree {
  match parse(source) {
    Ok(tree) => tree,
    Err(err) => panic!("failed to parse {source:?}: {err:?}"),
  }
}

fn parse_err(source: &str) -> SyntaxErrorType {
  match parse(source) {
    Ok(tree) => panic!("parsed {source:?} as {tree:?}"),
    Err(crate::ParseError::Syntax(err)) => err.typ,
    Err(err) => panic!("unexpected error for {source:?}: {err}"),
  }
}

/// First node of the kind in a depth-first walk.
fn find<'t>(node: NodeRef<'t>, kind: &str) -> Option<NodeRef<'t>> {
  if node.kind() == kind {
    return Some(node);
  };
  node.named_children().find_map(|c| find(c, kind))
}

fn first<'t>(tree: &'t Tree, kind: &str) -> NodeRef<'t> {
  find(tree.root_node(), kind).unwrap_or_else(|| panic!("no {kind} in {tree:?}"))
}

fn named_kinds(node: NodeRef<'_>) -> Vec<&str> {
  node.named_children().map(|c| c.kind()).collect()
}

#[test]
fn test_parser() {
  let symbols = SymbolMap::resolve(dql_language::language().unwrap()).unwrap();
  let lexer = Lexer::new("SELECT u FROM User u");
  let mut p = Parser::new(lexer, &symbols, ParseOptions::default());
  // Initial state.
  let cp = p.checkpoint();
  assert_eq!(p.next_tok_i, 0);

  // Peek the first token.
  let t = p.peek();
  assert_eq!(p.next_tok_i, 0);
  assert_eq!(p.buf.len(), 1);
  assert_eq!(t.typ, TT::KeywordSelect);

  // Consume the first token.
  let t = p.consume();
  assert_eq!(p.next_tok_i, 1);
  assert_eq!(p.buf.len(), 1);
  assert_eq!(t.typ, TT::KeywordSelect);

  // Look ahead without moving.
  let (a, b) = p.peek_2();
  assert_eq!((a.typ, b.typ), (TT::Identifier, TT::KeywordFrom));
  assert_eq!(p.next_tok_i, 1);
  assert_eq!(p.buf.len(), 3);

  // Reset to a past point; buffered tokens are kept.
  p.restore_checkpoint(cp);
  assert_eq!(p.next_tok_i, 0);
  assert_eq!(p.buf.len(), 3);
  assert!(p.consume_if(TT::KeywordSelect).is_match());
  assert!(!p.consume_if(TT::KeywordFrom).is_match());
  assert_eq!(p.next_tok_i, 1);
}

#[test]
fn test_parse_statements() {
  evaluate_test_input_files("parse/tests/fixtures", |input| outline(&parse_ok(&input)));
}

#[test]
fn empty_and_comment_only_documents() {
  let tree = parse_ok("");
  assert_eq!(tree.root_node().child_count(), 0);

  let source = "-- nothing to see\n/* here */";
  let tree = parse_ok(source);
  let root = tree.root_node();
  assert_eq!(root.kind(), "source_file");
  assert_eq!(root.child_count(), 0);
  assert_eq!((root.start_byte(), root.end_byte()), (0, source.len()));
  let comments: Vec<_> = tree.comments().map(|c| c.utf8_text()).collect();
  assert_eq!(comments, ["-- nothing to see", "/* here */"]);
  assert!(tree.comments().all(|c| c.kind() == "comment" && c.is_named()));
}

#[test]
fn multiple_statements() {
  let tree = parse_ok("SELECT u FROM User u DELETE FROM Phone p UPDATE User u SET u.a = 1");
  assert_eq!(named_kinds(tree.root_node()), [
    "select_statement",
    "delete_statement",
    "update_statement"
  ]);
}

#[test]
fn keywords_ignore_case() {
  let tree = parse_ok("select u from User u where u.name like 'a%' order by u.name desc");
  let clause = first(&tree, "select_clause");
  let keyword = clause.child_by_field_name("keyword").unwrap();
  assert_eq!(keyword.kind(), "SELECT");
  assert_eq!(keyword.utf8_text(), "select");
  assert!(!keyword.is_named());
  first(&tree, "like_expression");
  let item = first(&tree, "order_by_item");
  assert_eq!(item.child(1).unwrap().kind(), "DESC");
}

#[test]
fn keywords_name_fields_and_parameters() {
  let tree = parse_ok("SELECT u FROM User u WHERE u.order = :group ORDER BY u.select");
  let path = first(&tree, "state_field_path_expression");
  assert_eq!(path.child_by_field_name("field").unwrap().utf8_text(), "order");
  assert_eq!(first(&tree, "named_parameter").utf8_text(), ":group");
  let item = first(&tree, "order_by_item");
  assert_eq!(item.utf8_text(), "u.select");
}

#[test]
fn select_clause_fields() {
  let tree = parse_ok("SELECT DISTINCT u, p FROM User u, Phone p");
  let clause = first(&tree, "select_clause");
  assert_eq!(clause.child_by_field_name("distinct").unwrap().kind(), "DISTINCT");
  let expressions = clause.children_by_field_name("expressions");
  assert_eq!(expressions.len(), 2);
  assert_eq!(expressions[1].utf8_text(), "p");
  let from = first(&tree, "from_clause");
  assert_eq!(from.children_by_field_name("declarations").len(), 2);
}

#[test]
fn select_expression_forms() {
  let tree = parse_ok(
    "SELECT COUNT(u.id), u.name AS name, NEW UserDto(u.id, u.name), PARTIAL u.{id, name}, \
     u.age + 1 HIDDEN older, (SELECT MAX(p.id) FROM Phone p) FROM User u",
  );
  let clause = first(&tree, "select_clause");
  let values: Vec<_> = clause
    .children_by_field_name("expressions")
    .into_iter()
    .map(|e| e.named_children().next().unwrap().kind())
    .collect();
  assert_eq!(values, [
    "aggregate_expression",
    "scalar_expression",
    "new_object_expression",
    "partial_object_expression",
    "scalar_expression",
    "select_statement",
  ]);
  let aliased = clause.children_by_field_name("expressions")[1];
  assert_eq!(named_kinds(aliased), ["scalar_expression", "alias_result_variable"]);
  let hidden = clause.children_by_field_name("expressions")[4];
  assert_eq!(hidden.child(1).unwrap().kind(), "HIDDEN");
  let fields = first(&tree, "partial_field_set");
  assert_eq!(named_kinds(fields), [
    "field_identification_variable",
    "field_identification_variable"
  ]);
}

#[test]
fn new_object_with_named_and_nested_arguments() {
  let tree = parse_ok("SELECT NEW NAMED \\App\\Dto(u.id AS id, NEW Inner(u.name)) FROM User u");
  let object = first(&tree, "new_object_expression");
  assert_eq!(object.child(1).unwrap().kind(), "NAMED");
  let name = first(&tree, "fully_qualified_name");
  assert_eq!(name.utf8_text(), "\\App\\Dto");
  assert_eq!(name.named_child_count(), 2);
  let args: Vec<_> = object
    .named_children()
    .filter(|c| c.kind() == "new_object_arg")
    .collect();
  assert_eq!(args.len(), 2);
  assert_eq!(named_kinds(args[0]), ["scalar_expression", "alias_result_variable"]);
  assert_eq!(named_kinds(args[1]), ["new_object_expression"]);
}

#[test]
fn arithmetic_precedence() {
  let tree = parse_ok("SELECT u.a + u.b * 2 FROM User u");
  let sum = first(&tree, "simple_arithmetic_expression");
  assert_eq!(named_kinds(sum), ["simple_arithmetic_expression", "arithmetic_term"]);
  assert_eq!(sum.child(1).unwrap().kind(), "+");
  let product = sum.child(2).unwrap();
  assert_eq!(product.utf8_text(), "u.b * 2");
  assert_eq!(named_kinds(product), ["arithmetic_term", "arithmetic_factor"]);

  let tree = parse_ok("SELECT -(u.a - 1) FROM User u");
  let factor = first(&tree, "arithmetic_factor");
  assert_eq!(factor.child(0).unwrap().kind(), "-");
}

#[test]
fn conditional_precedence() {
  let tree = parse_ok("SELECT u FROM User u WHERE u.a = 1 OR u.b = 2 AND NOT u.c = 3");
  let or = first(&tree, "where_clause").child_by_field_name("condition").unwrap();
  assert_eq!(named_kinds(or), ["conditional_expression", "conditional_term"]);
  assert_eq!(or.child(1).unwrap().kind(), "OR");
  let and = or.child(2).unwrap();
  assert_eq!(and.utf8_text(), "u.b = 2 AND NOT u.c = 3");
  assert_eq!(named_kinds(and), ["conditional_term", "conditional_factor"]);
  let not = and.child(2).unwrap();
  assert_eq!(not.child(0).unwrap().kind(), "NOT");
}

#[test]
fn parenthesised_conditions_and_operands() {
  let tree = parse_ok("SELECT u FROM User u WHERE (u.a = 1 OR u.b = 2) AND u.c = 3");
  let primary = first(&tree, "conditional_primary");
  assert_eq!(named_kinds(primary), ["conditional_expression"]);
  assert_eq!(primary.child(0).unwrap().kind(), "(");

  let tree = parse_ok("SELECT u FROM User u WHERE (u.a + 1) * 2 > 3");
  let primary = first(&tree, "conditional_primary");
  assert_eq!(named_kinds(primary), ["simple_conditional_expression"]);
  first(&tree, "comparison_expression");
}

#[test]
fn simple_condition_forms() {
  for (condition, kind) in [
    ("u.id = ?1", "comparison_expression"),
    ("u.name <> 'x'", "comparison_expression"),
    ("u.age >= ALL (SELECT p.age FROM Person p)", "comparison_expression"),
    ("(SELECT COUNT(p) FROM Phone p WHERE p.user = u) > 2", "comparison_expression"),
    ("u.age BETWEEN 18 AND 65", "between_expression"),
    ("u.age NOT BETWEEN :min AND :max", "between_expression"),
    ("u.name LIKE 'a!%' ESCAPE '!'", "like_expression"),
    ("LOWER(u.name) NOT LIKE :pattern", "like_expression"),
    ("u.id IN (1, 2, 3)", "in_expression"),
    ("u.id IN (?1, :ids)", "in_expression"),
    ("u.id NOT IN (SELECT t.id FROM Team t)", "in_expression"),
    ("u.email IS NULL", "null_comparison_expression"),
    ("u.email IS NOT NULL", "null_comparison_expression"),
    ("u.groups IS EMPTY", "empty_collection_comparison_expression"),
    ("u.groups IS NOT EMPTY", "empty_collection_comparison_expression"),
    (":group MEMBER OF u.groups", "collection_member_expression"),
    ("u.manager NOT MEMBER u.peers", "collection_member_expression"),
    ("u INSTANCE OF Admin", "instance_of_expression"),
    ("u NOT INSTANCE OF (Admin, \\App\\Guest, :kind)", "instance_of_expression"),
    ("EXISTS (SELECT p FROM Phone p WHERE p.user = u)", "exists_expression"),
  ] {
    let source = format!("SELECT u FROM User u WHERE {condition}");
    let tree = parse_ok(&source);
    let simple = first(&tree, "simple_conditional_expression");
    assert_eq!(named_kinds(simple), [kind], "in {source:?}");
    assert_eq!(simple.utf8_text(), condition);
  }
}

#[test]
fn in_list_parameters() {
  let tree = parse_ok("SELECT u FROM User u WHERE u.id IN (?1, :ids, u.a + 1)");
  let list = first(&tree, "in_expression");
  let params: Vec<_> = list
    .named_children()
    .filter(|c| c.kind() == "in_parameter")
    .map(|c| c.named_children().next().unwrap().kind())
    .collect();
  assert_eq!(params, [
    "input_parameter",
    "input_parameter",
    "arithmetic_expression"
  ]);
}

#[test]
fn from_declarations() {
  let tree = parse_ok(
    "SELECT u FROM User u INDEX BY u.id LEFT OUTER JOIN u.address a WITH a.city = 'Paris' \
     INNER JOIN Team AS t JOIN u.phones p INDEX BY p.number",
  );
  let declaration = first(&tree, "identification_variable_declaration");
  assert_eq!(named_kinds(declaration), [
    "range_variable_declaration",
    "index_by",
    "join",
    "join",
    "join"
  ]);
  let joins: Vec<_> = declaration
    .named_children()
    .filter(|c| c.kind() == "join")
    .collect();
  assert_eq!(named_kinds(joins[0]), [
    "join_association_declaration",
    "conditional_expression"
  ]);
  assert_eq!(joins[0].child(1).unwrap().kind(), "OUTER");
  assert_eq!(named_kinds(joins[1]), ["range_variable_declaration"]);
  assert_eq!(joins[1].child(0).unwrap().kind(), "INNER");
  assert_eq!(named_kinds(joins[2].named_children().next().unwrap()), [
    "join_association_path_expression",
    "alias_identification_variable",
    "index_by"
  ]);
}

#[test]
fn grouping_and_ordering() {
  let tree = parse_ok(
    "SELECT u.name, COUNT(u.id) AS total FROM User u GROUP BY u.name, u \
     HAVING COUNT(u.id) > 1 ORDER BY total DESC, u.name",
  );
  let group = first(&tree, "group_by_clause");
  let items: Vec<_> = group
    .children_by_field_name("items")
    .into_iter()
    .map(|i| i.named_children().next().unwrap().kind())
    .collect();
  assert_eq!(items, ["state_field_path_expression", "identification_variable"]);
  first(&tree, "having_clause");
  let order = first(&tree, "order_by_clause");
  let items = order.children_by_field_name("items");
  assert_eq!(named_kinds(items[0]), ["result_variable"]);
  assert_eq!(items[0].child_count(), 2);
  assert_eq!(named_kinds(items[1]), ["simple_arithmetic_expression"]);
}

#[test]
fn case_expressions() {
  let tree = parse_ok(
    "SELECT CASE WHEN u.age > 18 THEN 'adult' WHEN u.age > 12 THEN 'teen' ELSE 'child' END AS c, \
     CASE u.status WHEN 1 THEN 'on' ELSE 'off' END, COALESCE(u.nick, u.name, 'anon'), \
     NULLIF(u.a, 0) FROM User u",
  );
  let general = first(&tree, "general_case_expression");
  assert_eq!(named_kinds(general), [
    "when_clause",
    "when_clause",
    "scalar_expression"
  ]);
  let simple = first(&tree, "simple_case_expression");
  assert_eq!(named_kinds(simple), [
    "case_operand",
    "simple_when_clause",
    "scalar_expression"
  ]);
  let coalesce = first(&tree, "coalesce_expression");
  assert_eq!(coalesce.named_child_count(), 3);
  let nullif = first(&tree, "nullif_expression");
  assert_eq!(nullif.named_child_count(), 2);

  let tree = parse_ok("SELECT u FROM User u WHERE CASE kind WHEN 1 THEN 2 ELSE 3 END = 2");
  assert_eq!(named_kinds(first(&tree, "case_operand")), ["type_discriminator"]);
}

#[test]
fn functions() {
  let tree = parse_ok(
    "SELECT TRIM(LEADING 'x' FROM u.name), TRIM(u.name), CONCAT(u.first, u.last), \
     SUBSTRING(u.name, 1, 3), LENGTH(u.name), LOCATE('a', u.name, 2), MOD(u.a, 2), \
     SIZE(u.phones), CURRENT_DATE, DATE_ADD(u.created, 1, 'day'), IDENTITY(u.address, 'id') \
     FROM User u",
  );
  let clause = first(&tree, "select_clause");
  let functions: Vec<_> = clause
    .children_by_field_name("expressions")
    .into_iter()
    .map(|e| {
      let declaration = e.named_children().next().unwrap();
      assert_eq!(declaration.kind(), "function_declaration");
      declaration.named_children().next().unwrap().kind()
    })
    .collect();
  assert_eq!(functions, [
    "functions_returning_strings",
    "functions_returning_strings",
    "functions_returning_strings",
    "functions_returning_strings",
    "functions_returning_numerics",
    "functions_returning_numerics",
    "functions_returning_numerics",
    "functions_returning_numerics",
    "functions_returning_datetime",
    "functions_returning_datetime",
    "functions_returning_strings",
  ]);
  let trim = first(&tree, "functions_returning_strings");
  assert_eq!(named_kinds(trim), ["char_literal", "string_primary"]);
  assert_eq!(trim.child(2).unwrap().kind(), "LEADING");
}

#[test]
fn literals_and_parameters() {
  let tree = parse_ok("SELECT u FROM User u WHERE u.a = 1.5e3 OR u.b = true OR u.c = ?12");
  assert_eq!(first(&tree, "float_literal").utf8_text(), "1.5e3");
  let boolean = first(&tree, "boolean_literal");
  assert_eq!(boolean.child(0).unwrap().kind(), "true");
  let positional = first(&tree, "positional_parameter");
  assert_eq!(positional.utf8_text(), "?12");
  assert_eq!(positional.child_count(), 1);
}

#[test]
fn syntax_errors() {
  assert_eq!(parse_err("SELECT u"), SyntaxErrorType::UnexpectedEnd);
  assert_eq!(
    parse_err("SELECT u FROM User u WHERE"),
    SyntaxErrorType::UnexpectedEnd
  );
  assert_eq!(
    parse_err("FROM User u"),
    SyntaxErrorType::ExpectedSyntax("statement")
  );
  assert_eq!(
    parse_err("SELECT u, FROM User u"),
    SyntaxErrorType::ExpectedSyntax("expression")
  );
  assert_eq!(
    parse_err("SELECT u FROM User u ORDER u.name"),
    SyntaxErrorType::RequiredTokenNotFound(TT::KeywordBy)
  );
  assert_eq!(
    parse_err("SELECT u FROM User u WHERE u.name"),
    SyntaxErrorType::UnexpectedEnd
  );
  assert_eq!(
    parse_err("SELECT u FROM User u WHERE u.name ORDER BY u.id"),
    SyntaxErrorType::ExpectedSyntax("condition")
  );
  assert_eq!(
    parse_err("SELECT u FROM User u WHERE u.name LIKE 'a' ESCAPE 'ab'"),
    SyntaxErrorType::ExpectedSyntax("character literal")
  );
  assert_eq!(
    parse_err("SELECT TRIM(LEADING u.name) FROM User u"),
    SyntaxErrorType::RequiredTokenNotFound(TT::KeywordFrom)
  );
  assert_eq!(parse_err("SELECT u FROM User u #"), SyntaxErrorType::InvalidToken);
  assert_eq!(
    parse_err("SELECT u FROM User u WHERE u.name = 'open"),
    SyntaxErrorType::InvalidToken
  );
}

#[test]
fn error_location_points_at_offending_token() {
  let source = "SELECT u FROM User u ORDER u.name";
  let Err(crate::ParseError::Syntax(err)) = parse(source) else {
    panic!("expected a syntax error");
  };
  assert_eq!(&source[err.loc.0..err.loc.1], "u");
  assert_eq!(err.loc.0, 27);
  assert_eq!(err.actual_token, Some(TT::Identifier));
}

#[test]
fn missing_condition_operator_points_past_the_operand() {
  let syntax_error = |source: &str| match parse(source) {
    Err(crate::ParseError::Syntax(err)) => err,
    other => panic!("expected a syntax error for {source:?}, got {other:?}"),
  };

  let source = "SELECT u FROM User u WHERE u.a IS";
  let err = syntax_error(source);
  assert_eq!(err.typ, SyntaxErrorType::UnexpectedEnd);
  assert_eq!(err.loc, Loc(source.len(), source.len()));

  let source = "SELECT u FROM User u WHERE u.a IS 5";
  let err = syntax_error(source);
  assert_eq!(err.typ, SyntaxErrorType::ExpectedSyntax("condition"));
  assert_eq!(&source[err.loc.0..err.loc.1], "5");

  let source = "SELECT u FROM User u WHERE u.a NOT 5";
  let err = syntax_error(source);
  assert_eq!(err.actual_token, Some(TT::LiteralInteger));
  assert_eq!(err.loc.0, source.len() - 1);

  let source = "SELECT u FROM User u WHERE u.name GROUP BY u.id";
  let err = syntax_error(source);
  assert_eq!(err.actual_token, Some(TT::KeywordGroup));
  assert_eq!(&source[err.loc.0..err.loc.1], "GROUP");
}

#[test]
fn unterminated_block_comment_is_rejected() {
  assert_eq!(
    parse_err("SELECT u FROM User u /* x"),
    SyntaxErrorType::InvalidToken
  );
  let source = "DELETE FROM User u /* WHERE u.id = 1";
  let Err(crate::ParseError::Syntax(err)) = parse(source) else {
    panic!("expected a syntax error");
  };
  assert_eq!(err.typ, SyntaxErrorType::InvalidToken);
  assert_eq!(err.code(), "DQ0004");
  assert_eq!(&source[err.loc.0..err.loc.1], "/* WHERE u.id = 1");
}

#[test]
fn nesting_is_limited() {
  let nested = |n: usize| {
    format!(
      "SELECT u FROM User u WHERE {}u.id = 1{}",
      "(".repeat(n),
      ")".repeat(n)
    )
  };
  parse_ok(&nested(30));
  assert_eq!(parse_err(&nested(200)), SyntaxErrorType::NestingTooDeep);

  let arithmetic = format!("SELECT {}1{} FROM User u", "(".repeat(200), ")".repeat(200));
  assert_eq!(parse_err(&arithmetic), SyntaxErrorType::NestingTooDeep);

  let mut subselects = String::from("SELECT u FROM User u WHERE u.id IN ");
  for _ in 0..100 {
    subselects.push_str("(SELECT u FROM User u WHERE u.id IN ");
  }
  subselects.push_str("(1)");
  subselects.push_str(&")".repeat(100));
  assert_eq!(parse_err(&subselects), SyntaxErrorType::NestingTooDeep);
}
