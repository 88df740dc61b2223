use anyhow::{Context, Result};
use std::process::Command;
use tracing::debug;

/// Supplies candidate crash lines, already narrowed to the crash signature.
pub trait CrashLineSource: Send + Sync {
    /// Short name shown in the report (e.g. `dmesg`)
    fn name(&self) -> &str;

    /// Signature the lines were selected by (e.g. `segfault`)
    fn signature(&self) -> &str;

    fn candidate_lines(&self) -> Result<String>;
}

/// Runs a command (by default `dmesg -T`) and keeps the lines that contain
/// the signature.
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
    signature: String,
}

impl CommandSource {
    pub fn new(program: impl Into<String>, args: Vec<String>, signature: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args,
            signature: signature.into(),
        }
    }

    /// Build from a command line given as `[program, args...]`
    pub fn from_command_line(command: &[String], signature: &str) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec(), signature))
    }
}

impl Default for CommandSource {
    fn default() -> Self {
        Self::new("dmesg", vec!["-T".to_string()], "segfault")
    }
}

impl CrashLineSource for CommandSource {
    fn name(&self) -> &str {
        std::path::Path::new(&self.program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.program)
    }

    fn signature(&self) -> &str {
        &self.signature
    }

    fn candidate_lines(&self) -> Result<String> {
        debug!("Running {} {:?}", self.program, self.args);
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .with_context(|| format!("Failed to run {}", self.program))?;

        if !output.status.success() {
            anyhow::bail!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .filter(|line| line.contains(&self.signature))
            .map(|line| format!("{}\n", line))
            .collect())
    }
}

/// Fixed candidate text, for tests
#[cfg(test)]
pub(crate) struct StaticSource(pub String);

#[cfg(test)]
impl CrashLineSource for StaticSource {
    fn name(&self) -> &str {
        "dmesg"
    }

    fn signature(&self) -> &str {
        "segfault"
    }

    fn candidate_lines(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
