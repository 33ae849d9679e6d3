//! Binary to generate/update the .expected.json and .expected.err fixture files
//!
//! Usage:
//!   cargo run --bin accept_expected            # Update all
//!   cargo run --bin accept_expected -- attrs   # Update only fixtures matching "attrs"

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tagged_html::{Value, parse, tokenize};
use walkdir::WalkDir;

#[derive(Deserialize)]
struct Fixture {
    fragments: Vec<String>,
    #[serde(default)]
    values: Vec<serde_json::Value>,
}

fn main() {
    let filter: Option<String> = std::env::args().nth(1);
    let fixture_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");

    let mut updated = 0;
    let mut skipped = 0;

    for entry in WalkDir::new(&fixture_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| is_fixture(e.path()))
    {
        let path = entry.path();
        let path_str = path.to_string_lossy();

        if let Some(ref f) = filter {
            if !path_str.contains(f) {
                skipped += 1;
                continue;
            }
        }

        process_file(path);
        updated += 1;
    }

    println!("Updated {} files, skipped {}", updated, skipped);
}

fn is_fixture(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.ends_with(".json") && !name.ends_with(".expected.json")
}

fn process_file(path: &Path) {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {:?}: {}", path, e);
            return;
        }
    };

    let fixture: Fixture = match serde_json::from_str(&source) {
        Ok(fixture) => fixture,
        Err(e) => {
            eprintln!("Invalid fixture {:?}: {}", path, e);
            return;
        }
    };

    let is_error_test = path.to_string_lossy().contains("/errors/");
    let fragments: Vec<&str> = fixture.fragments.iter().map(String::as_str).collect();
    let values = || -> Vec<Value<serde_json::Value>> {
        fixture.values.iter().cloned().map(Value::from).collect()
    };

    let result = tokenize(&fragments, values())
        .and_then(|tokens| Ok((tokens, parse(&fragments, values())?)));

    match result {
        Ok((tokens, tree)) => {
            if is_error_test {
                eprintln!("ERROR: {:?} is in errors/ but parsed successfully", path);
                return;
            }

            let expected_json = path.with_extension("expected.json");
            let json = serde_json::json!({
                "tokens": tokens,
                "tree": tree,
            });
            let text =
                serde_json::to_string_pretty(&json).expect("Failed to serialize expected output");
            if let Err(e) = fs::write(&expected_json, text + "\n") {
                eprintln!("Failed to write {:?}: {}", expected_json, e);
            } else {
                println!("  wrote {}", expected_json.display());
            }
        }
        Err(e) => {
            if is_error_test {
                let expected_err = path.with_extension("expected.err");
                if let Err(err) = fs::write(&expected_err, e.render()) {
                    eprintln!("Failed to write {:?}: {}", expected_err, err);
                } else {
                    println!("  wrote {}", expected_err.display());
                }
            } else {
                eprintln!("ERROR: {:?} failed to parse but is not in errors/: {}", path, e);
            }
        }
    }
}
