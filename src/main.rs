use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tagged_html::{Attributes, Html, Options, ParseError, Value};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "tagged-html")]
#[command(about = "Compile tagged markup templates into tokens, trees or rendered output")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream
    Tokens(InputArgs),
    /// Print the node forest
    Tree(InputArgs),
    /// Materialize elements as {"name", "attributes", "children"} objects
    Render(InputArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Template file (.json with fragments/values, anything else is literal
    /// markup) or a directory of them
    #[arg(required_unless_present = "stdin")]
    file: Option<PathBuf>,

    /// Read a literal template from stdin
    #[arg(long)]
    stdin: bool,

    /// Read stdin as a JSON template document
    #[arg(long, requires = "stdin")]
    json: bool,

    /// Reject templates nested deeper than this
    #[arg(long)]
    max_depth: Option<usize>,
}

#[derive(Clone, Copy)]
enum Mode {
    Tokens,
    Tree,
    Render,
}

impl Mode {
    fn extension(self) -> &'static str {
        match self {
            Mode::Tokens => "tokens.json",
            Mode::Tree => "tree.json",
            Mode::Render => "render.json",
        }
    }
}

/// Template document: the literal fragments and the values between them
#[derive(Debug, Deserialize)]
struct TemplateFile {
    fragments: Vec<String>,
    #[serde(default)]
    values: Vec<serde_json::Value>,
}

impl TemplateFile {
    fn literal(source: String) -> Self {
        Self {
            fragments: vec![source],
            values: Vec::new(),
        }
    }

    fn from_json(source: &str) -> Result<Self, String> {
        serde_json::from_str(source).map_err(|e| format!("invalid template document: {}", e))
    }
}

type JsonValue = Value<serde_json::Value>;

fn main() {
    let cli = Cli::parse();

    let (mode, args) = match cli.command {
        Commands::Tokens(args) => (Mode::Tokens, args),
        Commands::Tree(args) => (Mode::Tree, args),
        Commands::Render(args) => (Mode::Render, args),
    };
    let options = Options {
        max_depth: args.max_depth,
    };

    if args.stdin {
        run_stdin(mode, args.json, &options);
    } else if let Some(path) = args.file {
        run_path(mode, &path, &options);
    } else {
        eprintln!("Error: provide a file/directory or use --stdin");
        std::process::exit(1);
    }
}

fn run_stdin(mode: Mode, json_input: bool, options: &Options) {
    let mut source = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut source) {
        eprintln!("Error: failed to read stdin: {}", e);
        std::process::exit(1);
    }

    let template = if json_input {
        TemplateFile::from_json(&source)
    } else {
        Ok(TemplateFile::literal(source))
    };

    match template.map(|t| compile(mode, t, options)) {
        Ok(Ok(output)) => println!("{}", output),
        Ok(Err(e)) => exit_with_parse_error(&e, "<stdin>"),
        Err(message) => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
    }
}

fn run_path(mode: Mode, path: &Path, options: &Options) {
    if path.is_file() {
        let start = Instant::now();
        if !compile_file(mode, path, options) {
            std::process::exit(1);
        }
        print_summary(1, start.elapsed());
    } else if path.is_dir() {
        run_directory(mode, path, options);
    } else {
        eprintln!("Error: {} does not exist", path.display());
        std::process::exit(1);
    }
}

fn run_directory(mode: Mode, dir: &Path, options: &Options) {
    let start = Instant::now();
    let mut file_count = 0;
    let mut failed = false;

    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| is_template(e.path()))
    {
        file_count += 1;
        failed |= !compile_file(mode, entry.path(), options);
    }

    if file_count == 0 {
        eprintln!("No templates found in {}", dir.display());
        std::process::exit(1);
    }

    print_summary(file_count, start.elapsed());
    if failed {
        std::process::exit(1);
    }
}

/// `.html` markup and `.json` template documents, but not our own output
fn is_template(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.ends_with(".tokens.json")
        || name.ends_with(".tree.json")
        || name.ends_with(".render.json")
        || name.ends_with(".expected.json")
    {
        return false;
    }
    name.ends_with(".html") || name.ends_with(".json")
}

/// Compile one file and write the result next to it. Returns false on error.
fn compile_file(mode: Mode, path: &Path, options: &Options) -> bool {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: failed to read {}: {}", path.display(), e);
            return false;
        }
    };

    let template = if path.extension().is_some_and(|ext| ext == "json") {
        match TemplateFile::from_json(&source) {
            Ok(template) => template,
            Err(message) => {
                eprintln!("Error: {}: {}", path.display(), message);
                return false;
            }
        }
    } else {
        TemplateFile::literal(source)
    };

    let filename = path.display().to_string();
    match compile(mode, template, options) {
        Ok(output) => {
            let output_path = path.with_extension(mode.extension());
            if let Err(e) = fs::write(&output_path, output + "\n") {
                eprintln!("Error: failed to write {}: {}", output_path.display(), e);
                return false;
            }
            print_generated(&output_path.display().to_string());
            true
        }
        Err(e) => {
            print_parse_error(&e, &filename);
            false
        }
    }
}

fn compile(mode: Mode, template: TemplateFile, options: &Options) -> Result<String, ParseError> {
    let fragments: Vec<&str> = template.fragments.iter().map(String::as_str).collect();
    let values: Vec<JsonValue> = template.values.into_iter().map(Value::from).collect();

    let json = match mode {
        Mode::Tokens => serde_json::to_string_pretty(&tagged_html::tokenize(&fragments, values)?),
        Mode::Tree => {
            serde_json::to_string_pretty(&tagged_html::parse_with(&fragments, values, options)?)
        }
        Mode::Render => {
            let mut html = Html::with_options(json_element, options.clone());
            serde_json::to_string_pretty(&html.render(&fragments, values)?)
        }
    };

    Ok(json.expect("Failed to serialize output"))
}

/// Element constructor used by `render`
fn json_element(
    name: JsonValue,
    attributes: Attributes<serde_json::Value>,
    children: Vec<JsonValue>,
) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "attributes": attributes,
        "children": children,
    })
}

fn print_parse_error(error: &ParseError, filename: &str) {
    let rendered = if io::stderr().is_terminal() {
        error.render_color()
    } else {
        error.render()
    };
    eprintln!("{}: {}", filename, rendered.trim_end());
}

fn exit_with_parse_error(error: &ParseError, filename: &str) -> ! {
    print_parse_error(error, filename);
    std::process::exit(1);
}

fn print_generated(path: &str) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("  \x1b[32m✓\x1b[0m {}", path);
    } else {
        eprintln!("  ✓ {}", path);
    }
}

fn print_summary(count: usize, elapsed: std::time::Duration) {
    let is_tty = io::stderr().is_terminal();
    let time_str = format_duration(elapsed);
    let files_word = if count == 1 { "template" } else { "templates" };

    if is_tty {
        eprintln!("\n\x1b[1mCompiled {} {} in {}\x1b[0m", count, files_word, time_str);
    } else {
        eprintln!("\nCompiled {} {} in {}", count, files_word, time_str);
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
