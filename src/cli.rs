//! CLI: read legacy policies → (translated policies | per-rule expressions)
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;

use crate::compile::compile_rule;
use crate::convert::convert_policy;
use crate::path_de::{OutputFormat, policies_from_str};
use crate::policy::{LegacyClusterPolicy, ValidatingPolicy};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// translate legacy pattern-based validation policies into expression-based validating policies
#[derive(Parser, Debug)]
#[command(name = "pattern-cel", version)]
pub struct CommandLineInterface {
    /// log verbosity; RUST_LOG takes precedence when set
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// convert policies and print the translated documents
    Convert(ConvertOut),
    /// print the compiled expression of every rule
    Expr(ExprOut),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    None,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct ConvertOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// output encoding
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    format: OutputFormat,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct ExprOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

/// Policies decoded from one input file.
#[derive(Debug)]
struct SourceFile {
    path: PathBuf,
    policies: Vec<LegacyClusterPolicy>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Read and decode all inputs in parallel; results keep input order.
    fn load(&self) -> Result<Vec<SourceFile>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        source_paths
            .into_par_iter()
            .map(|path| -> Result<SourceFile> {
                log::info!("reading {}", path.display());
                let source = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read source file {}", path.display()))?;
                let policies = policies_from_str(&source)
                    .with_context(|| format!("invalid policy document in {}", path.display()))?;
                log::debug!("{}: {} policies", path.display(), policies.len());
                Ok(SourceFile { path, policies })
            })
            .collect()
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn init_logging(&self) {
        let level = match self.log_level {
            LogLevel::None => return,
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };

        let env = env_logger::Env::default().filter_or("RUST_LOG", level);

        env_logger::Builder::from_env(env)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(matches!(self.log_level, LogLevel::Debug | LogLevel::Trace))
            .init();
    }

    pub fn run(&self) -> Result<ExitCode> {
        match &self.cmd {
            Command::Convert(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(ExitCode::SUCCESS);
                }

                let sources = target.input_settings.load()?;
                let converted = convert_all(&sources)?;
                let rendered = target.format.render(&converted)?;
                if let Some(out) = target.out.as_ref() {
                    write_output(out, &rendered)?;
                    log::info!("wrote {} policies to {}", converted.len(), out.display());
                } else {
                    print!("{rendered}");
                }
                Ok(ExitCode::SUCCESS)
            }
            Command::Expr(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(ExitCode::SUCCESS);
                }

                let mut failures = 0usize;
                for source in target.input_settings.load()? {
                    for policy in &source.policies {
                        for rule in &policy.spec.rules {
                            let label = format!("{}/{}", policy.metadata.name, rule.name);
                            match compile_rule(&rule.validate) {
                                Ok(expr) => println!("{}: {expr}", label.bold()),
                                Err(error) => {
                                    failures += 1;
                                    println!("{}: {} {error}", label.bold(), "error:".red());
                                }
                            }
                        }
                    }
                }
                if failures > 0 {
                    eprintln!("{} {failures} rule(s) could not be translated", "error:".red().bold());
                    return Ok(ExitCode::FAILURE);
                }
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// Convert every policy; translations run in parallel, the first failure in
/// input order is reported.
fn convert_all(sources: &[SourceFile]) -> Result<Vec<ValidatingPolicy>> {
    let jobs: Vec<(&Path, &LegacyClusterPolicy)> = sources
        .iter()
        .flat_map(|s| s.policies.iter().map(move |p| (s.path.as_path(), p)))
        .collect();

    let results: Vec<_> = jobs
        .par_iter()
        .map(|(path, policy)| {
            convert_policy(policy).with_context(|| {
                format!("{}: failed to convert policy '{}'", path.display(), policy.metadata.name)
            })
        })
        .collect();

    results.into_iter().collect()
}

fn write_output(out: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let before = out.len();
            for entry in glob::glob(pattern)? {
                out.push(entry?);
            }
            if out.len() == before {
                return Err(anyhow!("glob pattern matched no files: {pattern}"));
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
