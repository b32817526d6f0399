// SPDX-License-Identifier: Apache-2.0

//! Reads JSON documents from files (or stdin) and prints value counts.
//!
//! Usage: `demos [FILE]...`. Stdin is parsed in stream mode, files in
//! fixed mode, so both paths of the engine get exercised.

use std::collections::BTreeMap;
use std::process::ExitCode;

use pulljson::{JsonIter, ParseError, ValueType};

#[derive(Debug, Default)]
struct Stats {
    counts: BTreeMap<&'static str, usize>,
    max_depth: usize,
    /// Containers nested past the session's depth limit, skipped unvisited.
    truncated: usize,
}

impl Stats {
    fn visit(&mut self, iter: &mut JsonIter<'_>, depth: usize) -> Result<(), ParseError> {
        self.max_depth = self.max_depth.max(depth);
        let kind = iter.what_is_next()?;
        let name = match kind {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Array => "array",
            ValueType::Object => "object",
            ValueType::Null => "null",
            ValueType::Invalid => "invalid",
        };
        *self.counts.entry(name).or_default() += 1;
        let container = matches!(kind, ValueType::Array | ValueType::Object);
        if container && depth >= iter.config().max_depth {
            self.truncated += 1;
            return iter.skip();
        }
        match kind {
            ValueType::Array => {
                while iter.read_array()? {
                    self.visit(iter, depth + 1)?;
                }
            }
            ValueType::Object => {
                iter.read_object_cb(|iter, _field| {
                    self.visit(iter, depth + 1)?;
                    Ok(true)
                })?;
            }
            _ => iter.skip()?,
        }
        Ok(())
    }
}

fn report(source: &str, result: Result<Stats, ParseError>) -> bool {
    match result {
        Ok(stats) => {
            println!("{source}: max depth {}", stats.max_depth);
            if stats.truncated > 0 {
                println!("  {} containers too deep to visit", stats.truncated);
            }
            for (kind, count) in &stats.counts {
                println!("  {kind:>8}: {count}");
            }
            true
        }
        Err(err) => {
            eprintln!("{source}: {err}");
            false
        }
    }
}

fn stats_of(iter: &mut JsonIter<'_>) -> Result<Stats, ParseError> {
    let mut stats = Stats::default();
    stats.visit(iter, 0)?;
    Ok(stats)
}

fn main() -> ExitCode {
    let paths: Vec<String> = std::env::args().skip(1).collect();
    let mut ok = true;
    if paths.is_empty() {
        let stdin = std::io::stdin().lock();
        let mut iter = JsonIter::from_reader(stdin, 4096);
        ok &= report("<stdin>", stats_of(&mut iter));
    }
    for path in &paths {
        match std::fs::read(path) {
            Ok(bytes) => ok &= report(path, stats_of(&mut JsonIter::new(&bytes))),
            Err(err) => {
                eprintln!("{path}: {err}");
                ok = false;
            }
        }
    }
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_values() {
        let mut iter = JsonIter::new(br#"{"a": [1, "x", null], "b": true}"#);
        let stats = stats_of(&mut iter).unwrap();
        assert_eq!(stats.counts["object"], 1);
        assert_eq!(stats.counts["array"], 1);
        assert_eq!(stats.counts["number"], 1);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.truncated, 0);
    }

    #[test]
    fn test_deep_input_is_skipped_past_limit() {
        let doc = format!("{}{}", "[".repeat(100_000), "]".repeat(100_000));
        let mut iter = JsonIter::new(doc.as_bytes());
        let limit = iter.config().max_depth;
        let stats = stats_of(&mut iter).unwrap();
        assert_eq!(stats.max_depth, limit);
        assert_eq!(stats.truncated, 1);
        assert_eq!(stats.counts["array"], limit + 1);
        assert_eq!(iter.position(), doc.len());
    }
}
