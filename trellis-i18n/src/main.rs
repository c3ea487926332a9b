use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::ExitCode;
use trellis_i18n::{ValidationOutcome, extract_placeholders, validate};

/// Check that translations keep the placeholders of their source strings
#[derive(Parser, Debug)]
#[command(name = "trellis-check", version)]
struct Args {
    /// Source string (HTML as shown in the editor)
    source: Option<String>,

    /// Translation to check
    translation: Option<String>,

    /// JSON file holding a list of {"source": ..., "translation": ...} pairs
    #[arg(long, short, conflicts_with_all = ["source", "translation"])]
    file: Option<PathBuf>,

    /// Print the placeholders found on each side
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Deserialize)]
struct Pair {
    source: String,
    translation: String,
}

fn check(pair: &Pair, verbose: bool) -> ValidationOutcome {
    if verbose {
        let show = |text: &str| {
            extract_placeholders(text)
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!("  source:      [{}]", show(&pair.source));
        println!("  translation: [{}]", show(&pair.translation));
    }
    validate(&pair.source, &pair.translation)
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let pairs = match (&args.file, args.source, args.translation) {
        (Some(path), _, _) => {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str::<Vec<Pair>>(&content)?
        }
        (None, Some(source), Some(translation)) => vec![Pair {
            source,
            translation,
        }],
        _ => return Err("expected SOURCE and TRANSLATION, or --file".into()),
    };

    let mut failures = 0;
    for (i, pair) in pairs.iter().enumerate() {
        // Empty translations are not checked.
        if pair.translation.is_empty() {
            println!("[{}] skipped (empty translation)", i);
            continue;
        }
        match check(pair, args.verbose) {
            ValidationOutcome::Valid => println!("[{}] ok", i),
            ValidationOutcome::Invalid(reason) => {
                failures += 1;
                println!("[{}] {}: {:?} -> {:?}", i, reason, pair.source, pair.translation);
            }
        }
    }

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
