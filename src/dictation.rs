//! Voice input behind a small capability interface.
//!
//! The controller only ever sees the [`Dictation`] trait, so the rest of
//! the app can be exercised in tests without a recognizer on the host.

use std::process::Command;
use std::sync::Arc;

use anyhow::{Result, anyhow};

/// Capability interface for speech-to-text capture.
pub trait Dictation: Send + Sync {
    /// Whether the host can capture speech at all.
    fn is_available(&self) -> bool;

    /// Capture one utterance, blocking until the recognizer finishes,
    /// and return the transcript.
    fn capture(&self) -> Result<String>;
}

/// Dictation backed by an external transcriber command. The command is
/// expected to record a single utterance and print the transcript on
/// stdout.
pub struct CommandDictation {
    program: String,
    args: Vec<String>,
}

impl CommandDictation {
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl Dictation for CommandDictation {
    fn is_available(&self) -> bool {
        true
    }

    fn capture(&self) -> Result<String> {
        let output = Command::new(&self.program).args(&self.args).output()?;
        if !output.status.success() {
            return Err(anyhow!("transcriber exited with {}", output.status));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Fallback for hosts without a configured recognizer.
pub struct NoDictation;

impl Dictation for NoDictation {
    fn is_available(&self) -> bool {
        false
    }

    fn capture(&self) -> Result<String> {
        Err(anyhow!("no transcriber configured"))
    }
}

/// Build the dictation capability from the configured transcriber command.
pub fn from_config(command: Option<&str>) -> Arc<dyn Dictation> {
    match command.and_then(CommandDictation::from_command_line) {
        Some(dictation) => Arc::new(dictation),
        None => Arc::new(NoDictation),
    }
}
