//! Report delivery: dated report files and email
//!
//! Every channel is independent. A failing output directory does not stop
//! the emails and a failing email does not stop the files; all failures are
//! collected in the returned [`DeliveryOutcome`].

pub mod email;
pub mod files;

use std::path::PathBuf;
use tracing::{info, warn};

use crate::report::{Report, to_html, truncate_chars};
pub use email::{EmailMessage, Mailer, SendmailMailer};

/// Delivery part of the configuration, passed through the scan untouched.
#[derive(Debug, Clone, Default)]
pub struct DeliverySettings {
    pub output_dirs: Vec<PathBuf>,
    pub recipients: Vec<String>,
    pub truncated_recipients: Vec<String>,
    pub from: String,
    /// Characters kept in the truncated email (0 disables it)
    pub truncate_after: usize,
}

/// One channel that could not deliver.
#[derive(Debug)]
pub struct DeliveryFailure {
    pub channel: String,
    pub error: anyhow::Error,
}

#[derive(Debug, Default)]
pub struct DeliveryOutcome {
    pub files_written: Vec<PathBuf>,
    pub emails_sent: Vec<String>,
    pub failures: Vec<DeliveryFailure>,
}

impl DeliveryOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct DeliveryCoordinator<M: Mailer> {
    settings: DeliverySettings,
    hostname: String,
    mailer: M,
}

impl<M: Mailer> DeliveryCoordinator<M> {
    pub fn new(settings: DeliverySettings, hostname: impl Into<String>, mailer: M) -> Self {
        Self {
            settings,
            hostname: hostname.into(),
            mailer,
        }
    }

    pub fn deliver(&self, report: &Report) -> DeliveryOutcome {
        let mut outcome = DeliveryOutcome::default();
        let text = report.render();
        let hits = report.total_hits();

        let file_name = files::report_file_name(&self.hostname, hits, &report.directory);
        for output_dir in &self.settings.output_dirs {
            match files::persist(output_dir, &report.day_stamp(), &file_name, &text) {
                Ok(path) => {
                    info!("Report saved to {}", path.display());
                    outcome.files_written.push(path);
                }
                Err(error) => {
                    warn!("Skipping output directory {}: {:#}", output_dir.display(), error);
                    outcome.failures.push(DeliveryFailure {
                        channel: format!("file {}", output_dir.display()),
                        error,
                    });
                }
            }
        }

        let subject = self.subject(report);
        if self.settings.truncate_after > 0 && !self.settings.truncated_recipients.is_empty() {
            let truncated = truncate_chars(&text, self.settings.truncate_after);
            self.send(
                &mut outcome,
                &self.settings.truncated_recipients,
                format!("{} - Truncated", subject),
                to_html(truncated),
            );
        }

        if !self.settings.recipients.is_empty() {
            self.send(&mut outcome, &self.settings.recipients, subject, report.render_html());
        }

        outcome
    }

    pub fn subject(&self, report: &Report) -> String {
        format!(
            "Log Monitor (hits: {}) for {} {}",
            report.total_hits(),
            self.hostname,
            report.directory.display()
        )
    }

    fn send(&self, outcome: &mut DeliveryOutcome, to: &[String], subject: String, html_body: String) {
        let message = EmailMessage {
            from: self.settings.from.clone(),
            to: to.to_vec(),
            subject,
            html_body,
        };

        match self.mailer.send(&message) {
            Ok(()) => {
                info!("Sent '{}' to {}", message.subject, message.to.join(", "));
                outcome.emails_sent.push(message.subject);
            }
            Err(error) => {
                warn!("Failed to send '{}': {:#}", message.subject, error);
                outcome.failures.push(DeliveryFailure {
                    channel: format!("email '{}'", message.subject),
                    error,
                });
            }
        }
    }
}

/// Name of this host as used in file names and subjects
pub fn hostname() -> String {
    ["/proc/sys/kernel/hostname", "/etc/hostname"]
        .iter()
        .filter_map(|path| std::fs::read_to_string(path).ok())
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
        .or_else(|| std::env::var("HOSTNAME").ok().filter(|name| !name.is_empty()))
        .unwrap_or_else(|| "localhost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportAggregator;
    use crate::scanner::ScanConfiguration;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    impl Mailer for RecordingMailer {
        fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("connection refused");
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn report(dir: &TempDir) -> Report {
        std::fs::write(dir.path().join("app.log"), "INFO start\nERROR disk full\nINFO done\n").unwrap();
        let config = ScanConfiguration::new(dir.path(), vec!["ERROR".to_string()]);
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ReportAggregator::new(&config, day)
            .run(day.and_hms_opt(12, 0, 0).unwrap())
            .unwrap()
    }

    fn settings(output_dirs: Vec<PathBuf>) -> DeliverySettings {
        DeliverySettings {
            output_dirs,
            recipients: vec!["ops@example.com".to_string()],
            truncated_recipients: vec!["pager@example.com".to_string()],
            from: "monitor@example.com".to_string(),
            truncate_after: 40,
        }
    }

    #[test]
    fn test_delivers_files_and_both_emails() {
        let logs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let report = report(&logs);

        let coordinator = DeliveryCoordinator::new(
            settings(vec![out.path().to_path_buf()]),
            "web01",
            RecordingMailer::default(),
        );
        let outcome = coordinator.deliver(&report);

        assert!(outcome.is_complete());
        assert_eq!(outcome.files_written.len(), 1);
        let written = &outcome.files_written[0];
        assert!(written.starts_with(out.path().join("20240101")));
        assert!(written.file_name().unwrap().to_string_lossy().starts_with("LogMonitor-web01_(hits:1)_"));
        assert_eq!(std::fs::read_to_string(written).unwrap(), report.render());

        let sent = coordinator.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        let expected = format!("Log Monitor (hits: 1) for web01 {}", logs.path().display());
        assert_eq!(sent[0].subject, format!("{} - Truncated", expected));
        assert_eq!(sent[0].to, vec!["pager@example.com"]);
        assert_eq!(sent[0].html_body, to_html(truncate_chars(&report.render(), 40)));
        assert_eq!(sent[1].subject, expected);
        assert_eq!(sent[1].html_body, report.render_html());
    }

    #[test]
    fn test_channels_fail_independently() {
        let logs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let blocker = out.path().join("blocked");
        std::fs::write(&blocker, "").unwrap();
        let good = out.path().join("good");
        let report = report(&logs);

        let coordinator = DeliveryCoordinator::new(
            settings(vec![blocker, good.clone()]),
            "web01",
            RecordingMailer::default(),
        );
        let outcome = coordinator.deliver(&report);

        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.files_written.len(), 1);
        assert!(outcome.files_written[0].starts_with(&good));
        assert_eq!(outcome.emails_sent.len(), 2);
    }

    #[test]
    fn test_mail_failure_does_not_block_files() {
        let logs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let report = report(&logs);

        let mailer = RecordingMailer {
            fail: true,
            ..RecordingMailer::default()
        };
        let coordinator = DeliveryCoordinator::new(settings(vec![out.path().to_path_buf()]), "web01", mailer);
        let outcome = coordinator.deliver(&report);

        assert_eq!(outcome.files_written.len(), 1);
        assert_eq!(outcome.failures.len(), 2);
        assert!(outcome.emails_sent.is_empty());
    }

    #[test]
    fn test_truncated_email_needs_length_and_recipients() {
        let logs = TempDir::new().unwrap();
        let report = report(&logs);
        let mut settings = settings(vec![]);
        settings.truncate_after = 0;

        let coordinator = DeliveryCoordinator::new(settings, "web01", RecordingMailer::default());
        let outcome = coordinator.deliver(&report);

        assert_eq!(outcome.emails_sent.len(), 1);
        assert!(!outcome.emails_sent[0].ends_with("Truncated"));
    }

    #[test]
    fn test_hostname_is_never_empty() {
        assert!(!hostname().is_empty());
    }
}
