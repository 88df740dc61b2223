use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// An HTML email ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html_body: String,
}

impl EmailMessage {
    /// RFC 5322 message with a single `text/html` part.
    ///
    /// Control characters in header values become spaces, so a CR/LF in a
    /// scanned path cannot start a new header. A non-ASCII subject is sent
    /// as an RFC 2047 encoded word.
    pub fn to_mime(&self) -> String {
        let to: Vec<String> = self.to.iter().map(|addr| header_value(addr)).collect();
        format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/html; charset=\"utf-8\"\r\nContent-Transfer-Encoding: 8bit\r\n\r\n{}\r\n",
            header_value(&self.from),
            to.join(", "),
            encode_word(&header_value(&self.subject)),
            self.html_body
        )
    }
}

fn header_value(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// `=?utf-8?Q?...?=` form of `value`, or `value` itself when it is ASCII
fn encode_word(value: &str) -> String {
    if value.is_ascii() {
        return value.to_string();
    }

    let mut encoded = String::from("=?utf-8?Q?");
    for byte in value.bytes() {
        match byte {
            b' ' => encoded.push('_'),
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'!' | b'*' | b'+' | b'-' | b'/' => {
                encoded.push(char::from(byte))
            }
            _ => encoded.push_str(&format!("={:02X}", byte)),
        }
    }
    encoded.push_str("?=");
    encoded
}

/// Mail transport.
pub trait Mailer {
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Hands messages to the local MTA through `sendmail -t -oi`.
#[derive(Debug, Clone)]
pub struct SendmailMailer {
    program: PathBuf,
}

impl SendmailMailer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Mailer for SendmailMailer {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        debug!("Sending '{}' to {} via {}", message.subject, message.to.join(", "), self.program.display());

        let mut child = Command::new(&self.program)
            .args(["-t", "-oi"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start {}", self.program.display()))?;

        child
            .stdin
            .take()
            .context("sendmail stdin unavailable")?
            .write_all(message.to_mime().as_bytes())
            .context("Failed to write message to sendmail")?;

        let output = child.wait_with_output().context("Failed to wait for sendmail")?;
        if !output.status.success() {
            anyhow::bail!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}
