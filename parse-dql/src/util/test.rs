use crate::tree::NodeRef;
use crate::tree::Tree;
use similar::ChangeTag;
use similar::TextDiff;
use std::env::var;
use std::fs::read_dir;
use std::fs::read_to_string;
use std::fs::write;

/// Renders the named nodes of a tree one per line, indented by depth. Nodes without named children
/// also show their source text.
pub fn outline(tree: &Tree) -> String {
  let mut out = String::new();
  write_outline(tree.root_node(), 0, &mut out);
  out
}

fn write_outline(node: NodeRef<'_>, depth: usize, out: &mut String) {
  for _ in 0..depth {
    out.push_str("  ");
  }
  if let Some(field) = node.field_name() {
    out.push_str(field);
    out.push_str(": ");
  };
  out.push_str(node.kind());
  if node.named_child_count() == 0 {
    out.push_str(&format!(" {:?}", node.utf8_text()));
  };
  out.push('\n');
  for child in node.named_children() {
    write_outline(child, depth + 1, out);
  }
}

/// Runs `tester` over every `.dql` file one directory below `dir_in_src` and compares the result with
/// the `.outline` file next to it.
pub fn evaluate_test_input_files<T: Fn(String) -> String>(dir_in_src: &str, tester: T) {
  let base_dir = format!("{}/src/{}", env!("CARGO_MANIFEST_DIR"), dir_in_src);
  for f_typ in read_dir(&base_dir).unwrap() {
    let f_typ = f_typ.unwrap();
    if !f_typ.file_type().unwrap().is_dir() {
      continue;
    };
    let typ = f_typ.file_name().to_str().unwrap().to_string();
    for f_name in read_dir(format!("{}/{}", base_dir, typ)).unwrap() {
      let name = f_name.unwrap().file_name().to_str().unwrap().to_string();
      let Some(stem) = name.strip_suffix(".dql") else {
        continue;
      };
      let input = read_to_string(format!("{}/{}/{}", base_dir, typ, name)).unwrap();
      println!("Testing {}/{}...", typ, name);
      let actual = tester(input);
      let expected_path = format!("{}/{}/{}.outline", base_dir, typ, stem);
      let expected = read_to_string(&expected_path).unwrap_or_default();
      if actual == expected {
        continue;
      };
      if var("DQL_REGENERATE_TEST_OUTLINES").is_ok_and(|v| v == "1") {
        write(&expected_path, &actual).unwrap();
        continue;
      };
      let mut msg = format!("Failed {}/{}, got:\n", typ, name);
      let diff = TextDiff::from_lines(&expected, &actual);
      for change in diff.iter_all_changes() {
        let sign = match change.tag() {
          ChangeTag::Delete => "-",
          ChangeTag::Insert => "+",
          ChangeTag::Equal => " ",
        };
        msg.push_str(sign);
        msg.push_str(change.as_str().unwrap());
      }
      panic!("{}", msg);
    }
  }
}
