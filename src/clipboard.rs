//! Clipboard access for chat replies.
//!
//! Prefers the platform copy utility, piping the text to its stdin. When no
//! utility can be spawned the text is emitted as an OSC 52 escape sequence
//! instead, which also covers SSH sessions; that path always reports
//! success, since a terminal without OSC 52 support just drops the
//! sequence.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Capability interface for copying text to the host clipboard.
pub trait Clipboard {
    fn copy(&self, text: &str) -> bool;
}

/// Copy utilities probed in order.
const COPY_COMMANDS: &[&[&str]] = &[
    &["pbcopy"],
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
];

pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> bool {
        for command in COPY_COMMANDS {
            if pipe_to_command(command, text) {
                return true;
            }
        }

        write_osc52(&mut io::stdout(), text).is_ok()
    }
}

fn pipe_to_command(command: &[&str], text: &str) -> bool {
    let Ok(mut child) = Command::new(command[0])
        .args(&command[1..])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    else {
        return false;
    };

    let wrote = child
        .stdin
        .take()
        .map(|mut stdin| stdin.write_all(text.as_bytes()).is_ok())
        .unwrap_or(false);

    wrote && child.wait().map(|status| status.success()).unwrap_or(false)
}

/// Write an OSC 52 clipboard sequence carrying `text` to `out`.
fn write_osc52<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    write!(out, "\x1b]52;c;{}\x07", BASE64.encode(text))?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    #[test]
    fn osc52_sequence_is_well_formed() {
        let mut out = Vec::new();
        write_osc52(&mut out, "hola").unwrap();
        assert_eq!(out, b"\x1b]52;c;aG9sYQ==\x07");
    }

    #[test]
    fn osc52_handles_empty_text() {
        let mut out = Vec::new();
        write_osc52(&mut out, "").unwrap();
        assert_eq!(out, b"\x1b]52;c;\x07");
    }

    #[test]
    fn osc52_payload_decodes_back() {
        let text = "Error: Network response was not ok\nMetadata{}";
        let mut out = Vec::new();
        write_osc52(&mut out, text).unwrap();

        let payload = &out[b"\x1b]52;c;".len()..out.len() - 1];
        let decoded = BASE64.decode(payload).unwrap();
        assert_eq!(decoded, text.as_bytes());
    }

    #[test]
    fn system_clipboard_always_reports_success() {
        // With no copy utility on the host, the OSC 52 fallback still
        // succeeds.
        assert!(SystemClipboard.copy("aspirin"));
    }

    #[test]
    fn unknown_command_is_skipped() {
        assert!(!pipe_to_command(&["botica-no-such-copy-utility"], "x"));
    }
}
