//! User-facing notices.
//!
//! Transaction-affecting failures (insufficient balance, gas estimation,
//! invalid orbit) are reported to the person at the keyboard in addition to
//! being returned as errors. The presentation layer decides how to render
//! them; library code only emits them through [`Notifier`].

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Visual weight of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeSeverity {
    Info,
    Success,
    Warning,
    Error,
}

/// A modal-style message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub title: String,
    pub text: String,
}

impl Notice {
    pub fn new(severity: NoticeSeverity, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            text: text.into(),
        }
    }

    pub fn error(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NoticeSeverity::Error, title, text)
    }

    pub fn warning(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NoticeSeverity::Warning, title, text)
    }

    pub fn success(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NoticeSeverity::Success, title, text)
    }
}

/// Sink for user-facing notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            NoticeSeverity::Info | NoticeSeverity::Success => {
                info!(title = %notice.title, "{}", notice.text)
            }
            NoticeSeverity::Warning => warn!(title = %notice.title, "{}", notice.text),
            NoticeSeverity::Error => error!(title = %notice.title, "{}", notice.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_constructors() {
        let notice = Notice::warning("Insufficient Balance", "Recharge your account");
        assert_eq!(notice.severity, NoticeSeverity::Warning);
        assert_eq!(notice.title, "Insufficient Balance");

        let notice = Notice::error("Invalid Orbit", "Orbit 5 does not exist");
        assert_eq!(notice.severity, NoticeSeverity::Error);
    }

    #[test]
    fn test_tracing_notifier_accepts_all_severities() {
        let notifier = TracingNotifier;
        notifier.notify(Notice::success("ok", "done"));
        notifier.notify(Notice::warning("careful", "low balance"));
        notifier.notify(Notice::error("failed", "reverted"));
    }
}
