//! Interactive database shell
//!
//! Reads `command(arg1, arg2, ...)` lines after a `:` prompt. Input is
//! lowercased and arguments are split on `", "`. Errors are printed and
//! the loop continues; `exit()` or end of input stops it.

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::cli::commands::package::{describe_record, summarize_record};
use crate::cli::commands::Project;
use crate::core::add::{add_package, AddRequest};
use crate::core::remove::remove_package;
use crate::core::store::PackageStore;

const PROMPT: &str = ":";
const RULE: &str = "----------";
const INVALID: &str = "Invalid command!";

const HELP: &str = "\
Commands:
    get(name)
    new(name, version, type, source_url, upstream_url, repository)
    remove(name)
    list()
    help()
    exit()";

const NEW_USAGE: &str = "\
Missing parameters:
    { str } packageName - The name of the package
    { str } packageVersion - The version of the package
    { str } packageURLType - The URL type of the package's source
    { str } packageSourceURL - The URL of the package's source
    { str } packageUpstreamURL - The URL of the package's upstream source
    { str } packageRepository - Which repository is the package under";

const NAME_USAGE: &str =
    "Missing parameters: { str } packageName - The name of the package in the database";

/// A parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Show one package
    Get(String),
    /// Add a package
    New(AddRequest),
    /// Remove a package
    Remove(String),
    /// List packages
    List,
    /// Show usage
    Help,
    /// Leave the shell
    Exit,
}

/// Why a line could not be turned into a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Not of the form `name(args)` or unknown name
    Invalid,
    /// Known command with too few arguments; carries the usage text
    MissingParameters(&'static str),
}

/// Parse one input line
pub fn parse_line(line: &str) -> Result<ShellCommand, ParseError> {
    let prompt = line.trim().to_lowercase();
    let (name, rest) = prompt.split_once('(').ok_or(ParseError::Invalid)?;
    let inner = rest.strip_suffix(')').unwrap_or(rest);
    let args: Vec<&str> = inner.split(", ").collect();
    let first = args.first().copied().unwrap_or("");

    match name {
        "get" | "remove" => {
            if first.is_empty() {
                return Err(ParseError::MissingParameters(NAME_USAGE));
            }
            Ok(if name == "get" {
                ShellCommand::Get(first.to_string())
            } else {
                ShellCommand::Remove(first.to_string())
            })
        }
        "new" => match args.as_slice() {
            [pkg, version, source_type, source_url, upstream_url, repository, ..]
                if !pkg.is_empty() =>
            {
                Ok(ShellCommand::New(AddRequest {
                    name: (*pkg).to_string(),
                    version: (*version).to_string(),
                    source_type: (*source_type).to_string(),
                    source_url: (*source_url).to_string(),
                    upstream_url: (*upstream_url).to_string(),
                    repository: (*repository).to_string(),
                }))
            }
            _ => Err(ParseError::MissingParameters(NEW_USAGE)),
        },
        "list" => Ok(ShellCommand::List),
        "help" => Ok(ShellCommand::Help),
        "exit" => Ok(ShellCommand::Exit),
        _ => Err(ParseError::Invalid),
    }
}

/// Execute the shell command against stdin/stdout
pub async fn execute(project: &Project) -> Result<()> {
    let mut store = project.open_store()?;
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    writeln!(
        stdout,
        "CLI for ALARM Package Database || v{}",
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(stdout, "Type \"help()\" for help!")?;

    run(project, &mut store, stdin, &mut stdout).await
}

/// Read-eval-print loop over arbitrary input and output
pub async fn run<R, W>(
    project: &Project,
    store: &mut PackageStore,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(ParseError::Invalid) => {
                writeln!(out, "{INVALID}")?;
                continue;
            }
            Err(ParseError::MissingParameters(usage)) => {
                write_block(out, &[usage.to_string()])?;
                continue;
            }
        };

        if command == ShellCommand::Exit {
            break;
        }

        let output = evaluate(project, store, command);
        write_block(out, &output)?;
    }

    Ok(())
}

fn evaluate(project: &Project, store: &mut PackageStore, command: ShellCommand) -> Vec<String> {
    match command {
        ShellCommand::Get(name) => match store.get(&name) {
            Ok(record) => describe_record(&project.layout, &record),
            Err(_) => vec!["Function error: Package was not found".to_string()],
        },
        ShellCommand::New(request) => match add_package(&project.layout, store, request) {
            Ok(result) => describe_record(&project.layout, &result.record),
            Err(e) => vec![format!("Function error: {e}")],
        },
        ShellCommand::Remove(name) => match remove_package(&project.layout, store, &name) {
            Ok(result) => {
                let mut lines = vec![format!("Package \"{}\" was deleted!", result.record.name)];
                lines.extend(
                    result
                        .refused_paths
                        .iter()
                        .map(|stored| format!("Left {stored} in place")),
                );
                lines
            }
            Err(e) => vec![format!("Function error: {e}")],
        },
        ShellCommand::List => {
            let mut lines: Vec<String> = store.list().iter().map(summarize_record).collect();
            if lines.is_empty() {
                lines.push("No packages in the database.".to_string());
            }
            lines
        }
        ShellCommand::Help => vec![HELP.to_string()],
        ShellCommand::Exit => Vec::new(),
    }
}

fn write_block<W: Write>(out: &mut W, lines: &[String]) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{RULE}")?;
    for line in lines {
        writeln!(out, "{line}")?;
    }
    writeln!(out, "{RULE}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AppConfig;
    use crate::infra::layout::ProjectLayout;
    use tempfile::TempDir;

    #[test]
    fn test_parse_get() {
        assert_eq!(parse_line("get(linux)"), Ok(ShellCommand::Get("linux".to_string())));
        assert_eq!(parse_line("GET(Linux)"), Ok(ShellCommand::Get("linux".to_string())));
    }

    #[test]
    fn test_parse_new_splits_on_comma_space() {
        let parsed = parse_line("new(zlib, 1.3, https, https://zlib.net/zlib-{x}.tar.gz, https://archlinux.org/packages/core/x86_64/zlib/, core)");
        match parsed {
            Ok(ShellCommand::New(request)) => {
                assert_eq!(request.name, "zlib");
                assert_eq!(request.version, "1.3");
                assert_eq!(request.source_url, "https://zlib.net/zlib-{x}.tar.gz");
                assert_eq!(request.repository, "core");
            }
            other => panic!("Expected New, got: {other:?}"),
        }
    }

    #[test]
    fn test_parse_missing_parameters() {
        assert_eq!(parse_line("get()"), Err(ParseError::MissingParameters(NAME_USAGE)));
        assert_eq!(parse_line("new(zlib, 1.3)"), Err(ParseError::MissingParameters(NEW_USAGE)));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_line("list"), Err(ParseError::Invalid));
        assert_eq!(parse_line("frobnicate(x)"), Err(ParseError::Invalid));
        assert_eq!(parse_line(""), Err(ParseError::Invalid));
        assert_eq!(parse_line("list()"), Ok(ShellCommand::List));
    }

    #[tokio::test]
    async fn test_session_adds_lists_and_removes() {
        let temp = TempDir::new().unwrap();
        let project = Project {
            layout: ProjectLayout::with_default_db(temp.path()),
            config: AppConfig::default(),
        };
        let mut store = PackageStore::create(project.layout.db_path()).unwrap();

        let input = "new(zlib, 1.3, https, https://zlib.net/zlib-{x}.tar.gz, https://example.com/zlib, core)\n\
                     bogus\n\
                     list()\n\
                     get(missing)\n\
                     remove(zlib)\n\
                     exit()\n\
                     list()\n";
        let mut out = Vec::new();

        run(&project, &mut store, input.as_bytes(), &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Package Name: zlib"));
        assert!(text.contains("Invalid command!"));
        assert!(text.contains("zlib @ 1.3 (marked for build)"));
        assert!(text.contains("Function error: Package was not found"));
        assert!(text.contains("Package \"zlib\" was deleted!"));
        // nothing after exit() runs
        assert_eq!(text.matches("zlib @ 1.3").count(), 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_session_ends_at_eof() {
        let temp = TempDir::new().unwrap();
        let project = Project {
            layout: ProjectLayout::with_default_db(temp.path()),
            config: AppConfig::default(),
        };
        let mut store = PackageStore::create(project.layout.db_path()).unwrap();

        let mut out = Vec::new();
        run(&project, &mut store, &b"help()\n"[..], &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("get(name)"));
        assert!(text.ends_with(":\n"));
    }
}
