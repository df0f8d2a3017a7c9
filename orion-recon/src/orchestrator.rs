//! Discovery orchestration
//!
//! Runs `subfinder` for subdomain enumeration and pipes its output into
//! `httpx` for probing. httpx writes one JSON record per live host to the
//! configured output file, which [`crate::parse_file`] reads back.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Discovery configuration
#[derive(Debug, Clone)]
pub struct ReconConfig {
    /// Where httpx writes its JSON lines
    pub output_file: PathBuf,
    /// Deadline for the whole subfinder | httpx pipeline
    pub timeout_secs: u64,
    pub subfinder_bin: String,
    pub httpx_bin: String,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from("results.json"),
            timeout_secs: 900,
            subfinder_bin: "subfinder".to_string(),
            httpx_bin: "httpx".to_string(),
        }
    }
}

/// Errors from discovery and result loading
#[derive(Debug, Error)]
pub enum ReconError {
    #[error("Invalid target domain: {0}")]
    InvalidTarget(String),

    #[error("Failed to start discovery tools: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Discovery tools exited with {status}: {stderr}")]
    ToolFailed { status: String, stderr: String },

    #[error("Discovery timed out after {0} seconds")]
    Timeout(u64),

    #[error("Failed to read results from {path}: {error}")]
    Read {
        path: String,
        #[source]
        error: std::io::Error,
    },
}

/// Reject anything that is not a plain hostname before it reaches a shell
pub fn validate_target(target: &str) -> Result<(), ReconError> {
    let valid = !target.is_empty()
        && target.len() <= 253
        && !target.starts_with(['-', '.'])
        && target
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(ReconError::InvalidTarget(target.to_string()))
    }
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Shell pipeline for one target
pub fn build_command(target: &str, config: &ReconConfig) -> String {
    format!(
        "{} -d {} -silent | {} -json -silent -o {} -status-code -ip -td -asn -cdn -irh -no-color",
        config.subfinder_bin,
        target,
        config.httpx_bin,
        shell_quote(&config.output_file.display().to_string()),
    )
}

/// Run the discovery pipeline and return the path of the results file
pub async fn run_discovery(target: &str, config: &ReconConfig) -> Result<PathBuf, ReconError> {
    validate_target(target)?;
    let command = build_command(target, config);

    info!("Starting discovery for: {}", target);
    debug!("Discovery command: {}", command);

    let child = Command::new("sh")
        .arg("-c")
        .arg(&command)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(ReconError::Spawn)?;

    let output = tokio::time::timeout(
        Duration::from_secs(config.timeout_secs),
        child.wait_with_output(),
    )
    .await
    .map_err(|_| ReconError::Timeout(config.timeout_secs))?
    .map_err(ReconError::Spawn)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!("Discovery failed for {}: {}", target, output.status);
        return Err(ReconError::ToolFailed {
            status: output.status.to_string(),
            stderr,
        });
    }

    info!("Discovery results saved to {}", config.output_file.display());
    Ok(config.output_file.clone())
}

/// Check that a discovery binary can be found on PATH
pub async fn tool_available(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {}", shell_quote(binary)))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReconConfig::default();
        assert_eq!(config.output_file, PathBuf::from("results.json"));
        assert_eq!(config.subfinder_bin, "subfinder");
    }

    #[test]
    fn test_build_command() {
        let config = ReconConfig::default();
        let command = build_command("example.com", &config);

        assert!(command.starts_with("subfinder -d example.com -silent | httpx -json"));
        assert!(command.contains("-o 'results.json'"));
        assert!(command.ends_with("-asn -cdn -irh -no-color"));
    }

    #[test]
    fn test_validate_target() {
        assert!(validate_target("example.com").is_ok());
        assert!(validate_target("dev-api.example.co.uk").is_ok());
        assert!(validate_target("").is_err());
        assert!(validate_target("-oops.com").is_err());
        assert!(validate_target("example.com; rm -rf /").is_err());
        assert!(validate_target("$(id).example.com").is_err());
    }

    #[test]
    fn test_shell_quote_escapes_quotes() {
        assert_eq!(shell_quote("it's.json"), r"'it'\''s.json'");
    }

    #[tokio::test]
    async fn test_failing_tools_are_reported() {
        let config = ReconConfig {
            subfinder_bin: "false".to_string(),
            httpx_bin: "false".to_string(),
            ..Default::default()
        };

        let err = run_discovery("example.com", &config).await.unwrap_err();
        assert!(matches!(err, ReconError::ToolFailed { .. }));
    }

    #[tokio::test]
    async fn test_invalid_target_never_spawns() {
        let err = run_discovery("a.com && reboot", &ReconConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ReconError::InvalidTarget(_)));
    }

    #[tokio::test]
    async fn test_tool_available() {
        assert!(tool_available("sh").await);
        assert!(!tool_available("orion-no-such-binary").await);
    }
}
