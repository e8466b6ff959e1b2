//! Runs the JSON fixture suites in `fixtures/` against the normalizer.
//!
//! Each fixture file holds an array of suites:
//!
//! ```json
//! [{ "name": "...", "source": "type T = array", "type": "T",
//!    "cases": [{ "input": [1], "expected": [1] }, { "input": {} }] }]
//! ```
//!
//! A case without `expected` must be rejected. `"expected": null` is a real
//! expectation (the value normalizes to `null`), not a rejection.
use std::path::Path;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use serde::Deserialize;
use serde_json::Value;
use shapedef::Normalizer;

#[derive(Debug, Deserialize)]
struct Suite {
    name: String,
    source: String,
    #[serde(rename = "type")]
    type_name: String,
    cases: Vec<Case>,
}

#[derive(Debug, Deserialize)]
struct Case {
    input: Value,
    #[serde(default, deserialize_with = "present")]
    expected: Option<Value>,
}

/// Any value that is present, `null` included, is `Some`.
fn present<'de, D: serde::Deserializer<'de>>(de: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(de).map(Some)
}

#[derive(Debug, Default)]
struct Tally {
    passed: usize,
    failed: usize,
}

fn main() -> ExitCode {
    match run() {
        Ok(tally) if tally.failed == 0 => {
            eprintln!("✅ {} cases passed", tally.passed);
            ExitCode::SUCCESS
        }
        Ok(tally) => {
            eprintln!("❌ {} failed, {} passed", tally.failed.to_string().red().bold(), tally.passed);
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<Tally> {
    let pattern = std::env::args()
        .nth(1)
        .unwrap_or_else(|| format!("{}/../fixtures/*.json", env!("CARGO_MANIFEST_DIR")));

    let mut tally = Tally::default();
    let mut files = 0usize;
    for entry in glob::glob(&pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
        let path = entry?;
        files += 1;
        for suite in load_suites(&path)? {
            run_suite(&path, &suite, &mut tally)?;
        }
    }
    if files == 0 {
        anyhow::bail!("no fixture files match {pattern}");
    }
    Ok(tally)
}

fn load_suites(path: &Path) -> Result<Vec<Suite>> {
    let source = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let de = &mut serde_json::Deserializer::from_str(&source);
    serde_path_to_error::deserialize(de)
        .map_err(|e| anyhow!("{}: invalid fixture at {}: {}", path.display(), e.path(), e.inner()))
}

fn run_suite(path: &Path, suite: &Suite, tally: &mut Tally) -> Result<()> {
    let normalizer = Normalizer::from_source(&suite.source)
        .with_context(|| format!("{}: suite `{}` has invalid definitions", path.display(), suite.name))?;

    for (index, case) in suite.cases.iter().enumerate() {
        let actual = normalizer
            .normalize(&case.input, &suite.type_name)
            .with_context(|| format!("{}: suite `{}`", path.display(), suite.name))?
            .into_value();
        if actual == case.expected {
            tally.passed += 1;
            continue;
        }
        tally.failed += 1;
        eprintln!("{} {} #{index}: input {}", "❌".red(), suite.name.bold(), case.input);
        eprintln!("    expected: {}", render(case.expected.as_ref()));
        eprintln!("    actual:   {}", render(actual.as_ref()));
    }
    Ok(())
}

fn render(value: Option<&Value>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "rejected".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_expected_means_rejected() {
        let case: Case = serde_json::from_str(r#"{ "input": {} }"#).unwrap();
        assert_eq!(case.expected, None);
    }

    #[test]
    fn null_expected_is_an_expectation() {
        let case: Case = serde_json::from_str(r#"{ "input": null, "expected": null }"#).unwrap();
        assert_eq!(case.expected, Some(Value::Null));
    }
}
