//! Minimal CLI: load definitions → (check | schema | types)
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, info};

use shapedef::{Normalizer, Outcome};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// validate and normalize JSON documents against named type definitions
#[derive(Parser, Debug)]
#[command(name = "shapedef", version)]
pub struct CommandLineInterface {
    /// more log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// normalize each input document against a type and print the results
    Check(CheckOut),
    /// print the JSON Schema for a type
    Schema(SchemaOut),
    /// print every loaded definition in canonical form
    Types(TypesOut),
}

#[derive(Args, Debug, Clone)]
struct DefinitionSettings {
    /// definition files, loaded in order; later files may redefine earlier types
    #[arg(long, short = 'd', num_args = 1.., required = true)]
    defs: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is checked separately
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    definitions: DefinitionSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    /// name of the type to normalize against
    #[arg(long = "type", short = 't')]
    type_name: String,

    /// output file for normalized documents (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    #[command(flatten)]
    definitions: DefinitionSettings,

    /// name of the type to describe
    #[arg(long = "type", short = 't')]
    type_name: String,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct TypesOut {
    #[command(flatten)]
    definitions: DefinitionSettings,

    /// dump the parsed definitions as JSON instead of source
    #[arg(long)]
    json: bool,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// One JSON document to check, with where it came from.
#[derive(Debug)]
struct Document {
    origin: String,
    value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl DefinitionSettings {
    fn load(&self) -> Result<Normalizer> {
        let mut normalizer = Normalizer::new();
        for path in resolve_file_path_patterns(&self.defs)? {
            let source = read_source(&path)?;
            normalizer
                .add_definitions_from_source(&source)
                .with_context(|| format!("invalid definitions in {}", path.display()))?;
            info!(path = %path.display(), types = normalizer.registry().len(), "loaded definitions");
        }
        Ok(normalizer)
    }
}

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        for source_path in resolve_file_path_patterns(&self.input)? {
            let origin = source_path.display().to_string();
            let source = read_source(&source_path)?;
            if self.ndjson {
                for (index, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let origin = format!("{origin}:{}", index + 1);
                    let json_value = serde_json::from_str::<Value>(line)
                        .with_context(|| format!("failed to parse JSON line ({origin})"))?;
                    self.select(origin, json_value, &mut documents)?;
                }
            } else {
                let json_value = serde_json::from_str::<Value>(&source)
                    .with_context(|| format!("failed to parse JSON source file ({origin})"))?;
                self.select(origin, json_value, &mut documents)?;
            }
        }
        debug!(count = documents.len(), "loaded input documents");
        Ok(documents)
    }

    /// Apply `--json-pointer` then `--jq-expr`, pushing what survives.
    fn select(&self, origin: String, json_value: Value, out: &mut Vec<Document>) -> Result<()> {
        let json_value = match self.json_pointer.as_deref() {
            None => json_value,
            Some(pointer) => json_value
                .pointer(pointer)
                .cloned()
                .with_context(|| format!("JSON Pointer {pointer} selects nothing in {origin}"))?,
        };
        match self.jq_expr.as_ref() {
            None => out.push(Document { origin, value: json_value }),
            Some(jq_expr) => {
                let results = crate::jq_exec::run_jaq(jq_expr, &json_value)
                    .with_context(|| format!("failed to apply jq expression to {origin}"))?;
                for (index, value) in results.into_iter().enumerate() {
                    out.push(Document { origin: format!("{origin}#{index}"), value });
                }
            }
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn init_tracing(&self) {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let default_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .with(filter)
            .init();
    }

    pub fn run(&self) -> Result<ExitCode> {
        match &self.cmd {
            Command::Check(target) => {
                let normalizer = target.definitions.load()?;
                // unknown type is a usage error, not a per-document failure
                normalizer.registry().resolve(&target.type_name)?;
                let documents = target.input_settings.load_documents()?;

                // registry is read-only from here on
                let outcomes = documents
                    .par_iter()
                    .map(|doc| normalizer.normalize(&doc.value, &target.type_name))
                    .collect::<shapedef::Result<Vec<_>>>()?;

                let mut rendered = String::new();
                let mut failures = 0usize;
                for (doc, outcome) in documents.iter().zip(outcomes) {
                    match outcome {
                        Outcome::Normalized(value) => {
                            let text = if target.input_settings.ndjson {
                                serde_json::to_string(&value)?
                            } else {
                                serde_json::to_string_pretty(&value)?
                            };
                            rendered.push_str(&text);
                            rendered.push('\n');
                        }
                        Outcome::Mismatch(mismatch) => {
                            failures += 1;
                            eprintln!("{} {}: {mismatch}", "✗".red().bold(), doc.origin);
                        }
                    }
                }
                write_output(target.out.as_deref(), &rendered)?;

                if failures > 0 {
                    eprintln!(
                        "{} of {} documents do not match `{}`",
                        failures.to_string().red().bold(),
                        documents.len(),
                        target.type_name,
                    );
                    return Ok(ExitCode::FAILURE);
                }
                eprintln!("{} {} documents match `{}`", "✓".green().bold(), documents.len(), target.type_name);
                Ok(ExitCode::SUCCESS)
            }
            Command::Schema(target) => {
                let normalizer = target.definitions.load()?;
                let schema = shapedef::schema::document_for(normalizer.registry(), &target.type_name)?;
                let schema_src = serde_json::to_string_pretty(&schema)?;
                write_output(target.out.as_deref(), &format!("{schema_src}\n"))?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Types(target) => {
                let normalizer = target.definitions.load()?;
                let rendered = if target.json {
                    format!("{}\n", serde_json::to_string_pretty(normalizer.registry())?)
                } else {
                    normalizer.registry().to_string()
                };
                write_output(target.out.as_deref(), &rendered)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

const STDIN_MARKER: &str = "-";

fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == STDIN_MARKER {
        return std::io::read_to_string(std::io::stdin()).context("failed to read stdin");
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_output(out: Option<&Path>, contents: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            print!("{contents}");
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        CommandLineInterface::command().debug_assert();
    }

    #[test]
    fn literal_paths_pass_through_unresolved() {
        let paths = resolve_file_path_patterns(["a.json", "-"]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("a.json"), PathBuf::from("-")]);
    }

    #[test]
    fn check_arguments_parse() {
        let cli = CommandLineInterface::try_parse_from([
            "shapedef", "-vv", "check", "-d", "types.shape", "-t", "Circle", "-i", "a.json", "b.json", "--ndjson",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Check(check) = cli.cmd else { panic!("expected check") };
        assert_eq!(check.type_name, "Circle");
        assert_eq!(check.input_settings.input, ["a.json", "b.json"]);
        assert!(check.input_settings.ndjson);
    }

    #[test]
    fn json_pointer_selects_a_subdocument() {
        let settings = InputSettings {
            ndjson: false,
            json_pointer: Some("/data/0".into()),
            jq_expr: None,
            input: vec![],
        };
        let mut docs = Vec::new();
        settings
            .select("doc".into(), serde_json::json!({ "data": [{ "cx": 1 }] }), &mut docs)
            .unwrap();
        assert_eq!(docs[0].value, serde_json::json!({ "cx": 1 }));
        assert!(settings.select("doc".into(), serde_json::json!({}), &mut docs).is_err());
    }
}
