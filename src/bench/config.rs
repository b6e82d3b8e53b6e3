//! Implementation table: which normalizers to run and how to start them.
//!
//! Implementations come from a TOML file
//!
//! ```toml
//! [[implementation]]
//! name = "cpp"
//! command = "build/ltlnorm --quiet"
//! ```
//!
//! or, without one, from the built-in table ([`default_implementations`]).

use std::path::Path;

use serde::Deserialize;
use shlex::Shlex;
use tracing::warn;

use crate::{BenchError, BenchResult};

/// Environment variable overriding the path of the C++ normalizer.
pub const LTLNORM_PATH_VAR: &str = "LTLNORM_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplementationSpec {
    pub name: String,
    /// Program followed by its arguments
    pub command: Vec<String>,
}

impl ImplementationSpec {
    pub fn new(name: impl Into<String>, command: Vec<String>) -> Self {
        ImplementationSpec {
            name: name.into(),
            command,
        }
    }

    /// Command line as typed in a shell.
    pub fn command_line(&self) -> String {
        shlex::try_join(self.command.iter().map(String::as_str))
            .unwrap_or_else(|_| self.command.join(" "))
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCommand {
    Line(String),
    Argv(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawImplementation {
    name: String,
    command: RawCommand,
}

#[derive(Debug, Deserialize)]
struct HarnessConfig {
    #[serde(rename = "implementation", default)]
    implementations: Vec<RawImplementation>,
}

/// Split a command line with shell quoting rules.
pub fn split_command(line: &str) -> BenchResult<Vec<String>> {
    let mut lexer = Shlex::new(line);
    let parts: Vec<String> = lexer.by_ref().collect();
    if lexer.had_error {
        return Err(BenchError::Config(format!("unbalanced quotes in command: {line}")));
    }
    if parts.is_empty() {
        return Err(BenchError::Config("empty command".into()));
    }
    Ok(parts)
}

/// Built-in implementations, with the C++ normalizer found at `ltlnorm_path`
/// or `build/ltlnorm`.
pub fn builtin_implementations(ltlnorm_path: Option<String>) -> Vec<ImplementationSpec> {
    let owl = ["owl/bin/owl", "ltl2delta2", "--method", "SE20_SIGMA_2_AND_GF_SIGMA_1", "--strict"];
    let cpp = ltlnorm_path
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "build/ltlnorm".to_string());
    vec![
        ImplementationSpec::new("owl", owl.iter().map(|s| s.to_string()).collect()),
        ImplementationSpec::new("cpp", vec![cpp]),
    ]
}

/// Built-in implementations, honouring `LTLNORM_PATH`.
pub fn default_implementations() -> Vec<ImplementationSpec> {
    builtin_implementations(std::env::var(LTLNORM_PATH_VAR).ok())
}

/// Parse an implementation table from TOML text.
pub fn parse_implementations(text: &str) -> BenchResult<Vec<ImplementationSpec>> {
    let cfg: HarnessConfig =
        toml::from_str(text).map_err(|e| BenchError::Config(e.to_string()))?;

    let mut specs: Vec<ImplementationSpec> = Vec::new();
    for raw in cfg.implementations {
        if specs.iter().any(|s| s.name == raw.name) {
            return Err(BenchError::Config(format!(
                "implementation {} is defined twice",
                raw.name
            )));
        }
        let command = match raw.command {
            RawCommand::Line(line) => split_command(&line)?,
            RawCommand::Argv(argv) if !argv.is_empty() => argv,
            RawCommand::Argv(_) => {
                return Err(BenchError::Config(format!(
                    "implementation {} has an empty command",
                    raw.name
                )));
            }
        };
        specs.push(ImplementationSpec::new(raw.name, command));
    }
    Ok(specs)
}

/// Load the implementation table from a TOML file.
pub fn load_implementations(path: &Path) -> BenchResult<Vec<ImplementationSpec>> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| BenchError::Config(format!("cannot read {}: {e}", path.display())))?;
    parse_implementations(&s)
}

/// The table from `path` if given, the built-in one otherwise.
pub fn resolve_implementations(path: Option<&Path>) -> BenchResult<Vec<ImplementationSpec>> {
    match path {
        Some(p) => load_implementations(p),
        None => Ok(default_implementations()),
    }
}

/// Select implementations by a comma-separated list of names, in the order
/// of the list. Unknown names are reported and skipped.
pub fn select_implementations(
    available: &[ImplementationSpec],
    wanted: &str,
) -> Vec<ImplementationSpec> {
    let mut selected: Vec<ImplementationSpec> = Vec::new();
    for name in wanted.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        match available.iter().find(|s| s.name == name) {
            Some(spec) if !selected.contains(spec) => selected.push(spec.clone()),
            Some(_) => {}
            None => warn!("Unknown implementation {name}. Ignoring."),
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let specs = builtin_implementations(None);
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "owl");
        assert_eq!(specs[0].command[0], "owl/bin/owl");
        assert_eq!(specs[1].command, vec!["build/ltlnorm".to_string()]);

        let custom = builtin_implementations(Some("/opt/ltlnorm".into()));
        assert_eq!(custom[1].command, vec!["/opt/ltlnorm".to_string()]);
    }

    #[test]
    fn test_parse_toml_table() {
        let text = r#"
            [[implementation]]
            name = "cpp"
            command = "build/ltlnorm --flag 'two words'"

            [[implementation]]
            name = "spot"
            command = ["ltlfilt", "--nnf"]
        "#;
        let specs = parse_implementations(text).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].command, vec!["build/ltlnorm", "--flag", "two words"]);
        assert_eq!(specs[1].command, vec!["ltlfilt", "--nnf"]);
    }

    #[test]
    fn test_parse_rejects_duplicates_and_bad_quotes() {
        let dup = r#"
            [[implementation]]
            name = "a"
            command = "x"
            [[implementation]]
            name = "a"
            command = "y"
        "#;
        assert!(matches!(parse_implementations(dup), Err(BenchError::Config(_))));

        let quotes = r#"
            [[implementation]]
            name = "a"
            command = "x 'unterminated"
        "#;
        assert!(parse_implementations(quotes).is_err());
    }

    #[test]
    fn test_select_keeps_requested_order() {
        let specs = builtin_implementations(None);
        let selected = select_implementations(&specs, "cpp,owl");
        let names: Vec<&str> = selected.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["cpp", "owl"]);
    }

    #[test]
    fn test_select_ignores_unknown_and_repeated() {
        let specs = builtin_implementations(None);
        let selected = select_implementations(&specs, "owl,java,owl");
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "owl");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("impls.toml");
        std::fs::write(&path, "[[implementation]]\nname = \"cat\"\ncommand = \"cat\"\n").unwrap();
        let specs = resolve_implementations(Some(&path)).unwrap();
        assert_eq!(specs, vec![ImplementationSpec::new("cat", vec!["cat".into()])]);
        assert!(load_implementations(&dir.path().join("missing.toml")).is_err());
    }
}
