//! External process execution
//!
//! Thin wrapper over `tokio::process` for the tools the build procedures
//! shell out to (`tar`, `make`, `makepkg`).

use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::error::ProcessError;

/// Locate a tool in `PATH`
pub fn require_tool(tool: &str) -> Result<PathBuf, ProcessError> {
    which::which(tool).map_err(|_| ProcessError::ToolNotFound {
        tool: tool.to_string(),
    })
}

/// Run `program` with `args` in `cwd` and return its stdout
///
/// Fails with [`ProcessError::Failed`] carrying stderr when the exit status
/// is non-zero.
pub async fn run(
    program: &str,
    args: &[&str],
    cwd: &Path,
    envs: &[(&str, String)],
) -> Result<String, ProcessError> {
    let command_line = if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    };
    tracing::debug!("Running `{command_line}` in {}", cwd.display());

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .envs(envs.iter().map(|(k, v)| (*k, v.as_str())))
        .output()
        .await
        .map_err(|e| ProcessError::Spawn {
            command: command_line.clone(),
            error: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(ProcessError::Failed {
            command: command_line,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
