use clap::Parser;
use clap::ValueEnum;
use parse_dql::error::SyntaxError;
use parse_dql::ParseOptions;
use parse_dql::Session;
use serde::Serialize;
use std::fs;
use std::io::stdin;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(author, version, about = "Doctrine Query Language parser")]
struct Cli {
  /// Query file to parse. Reads stdin when omitted.
  file: Option<PathBuf>,

  /// How to print the syntax tree.
  #[arg(long, value_enum, default_value_t = Format::Sexp)]
  format: Format,

  /// Print the loaded grammar's name, version and table sizes as JSON, then exit.
  #[arg(long)]
  language_info: bool,

  /// Leave comments out of JSON output.
  #[arg(long)]
  no_comments: bool,

  /// How deeply statements and expressions may nest.
  #[arg(long, default_value_t = ParseOptions::default().max_depth)]
  max_depth: u32,

  /// Emit tracing spans (JSON) on stderr for profiling/debugging.
  #[arg(long)]
  trace: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
  Sexp,
  Json,
}

#[derive(Serialize)]
struct LanguageInfo<'a> {
  name: &'a str,
  abi_version: u32,
  node_kind_count: usize,
  field_count: usize,
}

// Exit status when the grammar or input could not be loaded, as opposed to rejected.
const EXIT_UNAVAILABLE: u8 = 2;

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.trace);

  let language = match dql_language::language() {
    Ok(language) => language,
    Err(err) => {
      eprintln!("error[{}]: {err}", err.typ.code());
      return ExitCode::from(EXIT_UNAVAILABLE);
    }
  };

  if cli.language_info {
    let info = LanguageInfo {
      name: language.name(),
      abi_version: language.abi_version(),
      node_kind_count: language.node_kind_count(),
      field_count: language.field_count(),
    };
    return print_json(&info);
  };

  let options = ParseOptions {
    max_depth: cli.max_depth,
    include_comments: !cli.no_comments,
  };
  let session = match Session::with_options(language, options) {
    Ok(session) => session,
    Err(err) => {
      eprintln!("error: {err}");
      return ExitCode::from(EXIT_UNAVAILABLE);
    }
  };

  let (name, source) = match read_source(cli.file) {
    Ok(res) => res,
    Err(err) => {
      eprintln!("{err}");
      return ExitCode::from(EXIT_UNAVAILABLE);
    }
  };

  let tree = match session.parse(&source) {
    Ok(tree) => tree,
    Err(err) => {
      report_syntax_error(&name, &source, &err);
      return ExitCode::FAILURE;
    }
  };

  match cli.format {
    Format::Sexp => {
      println!("{}", tree.root_node().to_sexp());
      ExitCode::SUCCESS
    }
    Format::Json => print_json(&tree),
  }
}

fn read_source(file: Option<PathBuf>) -> Result<(String, String), String> {
  match file {
    Some(path) => {
      let source = fs::read_to_string(&path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
      Ok((path.display().to_string(), source))
    }
    None => {
      let mut source = String::new();
      stdin()
        .read_to_string(&mut source)
        .map_err(|err| format!("failed to read stdin: {err}"))?;
      Ok(("<stdin>".to_string(), source))
    }
  }
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
  match serde_json::to_string_pretty(value) {
    Ok(serialized) => {
      println!("{serialized}");
      ExitCode::SUCCESS
    }
    Err(err) => {
      eprintln!("failed to serialize JSON: {err}");
      ExitCode::FAILURE
    }
  }
}

/// Prints the error with its position and the offending line, underlining the offending token.
fn report_syntax_error(name: &str, source: &str, err: &SyntaxError) {
  let (line, col) = err.loc.line_col(source);
  let text = source.lines().nth(line - 1).unwrap_or("");
  let start = err.loc.0.min(source.len());
  let end = err.loc.1.clamp(start, source.len());
  let width = source[start..end]
    .lines()
    .next()
    .map(|l| l.chars().count())
    .unwrap_or(0)
    .max(1);
  eprintln!("error[{}]: {}", err.code(), err.message());
  eprintln!("  --> {name}:{line}:{col}");
  eprintln!("   |");
  eprintln!("   | {text}");
  eprintln!("   | {}{}", " ".repeat(col - 1), "^".repeat(width));
}

fn init_tracing(enabled: bool) {
  if !enabled {
    return;
  }
  let _ = tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_span_events(FmtSpan::CLOSE)
    .with_max_level(Level::DEBUG)
    .json()
    .with_ansi(false)
    .try_init();
}
