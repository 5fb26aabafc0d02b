//! Clipboard sinks.

use super::ClipboardSink;
use crate::error::ExportError;
use parking_lot::Mutex;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// Clipboard helpers tried in order when no command is configured.
const CANDIDATES: &[&[&str]] = &[
    &["pbcopy"],
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
    &["xsel", "--clipboard", "--input"],
    &["clip.exe"],
];

/// Host clipboard, reached through a platform helper that reads stdin.
#[derive(Debug, Clone, Default)]
pub struct SystemClipboard {
    command: Option<Vec<String>>,
}

impl SystemClipboard {
    /// Search `PATH` for a known clipboard helper.
    pub fn detect() -> Self {
        let command = CANDIDATES
            .iter()
            .find(|argv| find_in_path(argv[0]).is_some())
            .map(|argv| argv.iter().map(|s| s.to_string()).collect());
        debug!(command = ?command, "Clipboard helper detected");
        Self { command }
    }

    /// Use an explicit command line, e.g. `["xclip", "-selection", "clipboard"]`.
    pub fn with_command(command: Vec<String>) -> Self {
        Self {
            command: Some(command).filter(|argv| !argv.is_empty()),
        }
    }

    pub fn command(&self) -> Option<&[String]> {
        self.command.as_deref()
    }
}

impl ClipboardSink for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ExportError> {
        let argv = self.command.as_ref().ok_or_else(|| {
            ExportError::ClipboardUnavailable("no clipboard helper found on PATH".to_string())
        })?;
        let (program, args) = argv.split_first().ok_or_else(|| {
            ExportError::ClipboardUnavailable("empty clipboard command".to_string())
        })?;

        let unavailable =
            |e: std::io::Error| ExportError::ClipboardUnavailable(format!("{}: {}", program, e));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(unavailable)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).map_err(unavailable)?;
        }
        let status = child.wait().map_err(unavailable)?;
        if !status.success() {
            return Err(ExportError::ClipboardUnavailable(format!(
                "{} exited with {}",
                program, status
            )));
        }
        Ok(())
    }
}

fn find_in_path(program: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// In-process clipboard for tests and headless embedding.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
    unavailable: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard that rejects every write.
    pub fn unavailable() -> Self {
        Self {
            contents: Mutex::new(None),
            unavailable: true,
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ExportError> {
        if self.unavailable {
            return Err(ExportError::ClipboardUnavailable(
                "clipboard disabled".to_string(),
            ));
        }
        *self.contents.lock() = Some(text.to_string());
        Ok(())
    }
}
