//! Replays a directory of sample policies against their `.cel` expectations.
//!
//! Each `NAME.yaml` is converted; if `NAME.cel` exists, every `rule: expression`
//! line in it must match the compiled expression of that rule.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use pattern_cel::convert_policy;
use pattern_cel::path_de::policies_from_str;

/// replay sample policies against their expected expressions
#[derive(Parser, Debug)]
#[command(name = "dev-test-runner")]
struct Args {
    /// directory holding `NAME.yaml` / `NAME.cel` pairs
    #[arg(default_value = "samples")]
    dir: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args.dir) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            eprintln!("{} {failed} sample(s) failed", "error:".red().bold());
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(dir: &Path) -> Result<usize> {
    let pattern = dir.join("*.yaml");
    let mut failed = 0;
    for entry in glob::glob(&pattern.to_string_lossy())? {
        let path = entry?;
        match check(&path) {
            Ok(()) => eprintln!("✅ {}", path.display()),
            Err(error) => {
                failed += 1;
                eprintln!("❌ {}: {error:#}", path.display());
            }
        }
    }
    Ok(failed)
}

fn check(path: &Path) -> Result<()> {
    let source = std::fs::read_to_string(path)?;
    // samples without a `.cel` file only print their expressions
    let expectations = std::fs::read_to_string(path.with_extension("cel")).unwrap_or_default();
    let expected = parse_expectations(&expectations)?;

    for legacy in policies_from_str(&source)? {
        let converted = convert_policy(&legacy)?;
        for (rule, validation) in legacy.spec.rules.iter().zip(&converted.spec.validations) {
            match expected.get(rule.name.as_str()) {
                Some(want) if *want != validation.expression => {
                    anyhow::bail!(
                        "rule '{}'\n  expected: {want}\n  actual:   {}",
                        rule.name,
                        validation.expression
                    );
                }
                Some(_) => {}
                None => println!("{}: {}", rule.name.yellow(), validation.expression),
            }
        }
    }
    Ok(())
}

fn parse_expectations(text: &str) -> Result<BTreeMap<&str, &str>> {
    let mut out = BTreeMap::new();
    for (n, line) in text.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let (rule, expr) = line
            .split_once(": ")
            .with_context(|| format!("line {}: expected `rule: expression`", n + 1))?;
        out.insert(rule, expr);
    }
    Ok(out)
}
