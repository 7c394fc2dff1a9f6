//! User-facing notices and the delivery seam.

use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A transient user-visible message (alarm fire, schedule outcome, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub title: String,
    pub body: String,
    pub severity: Severity,
}

impl Notice {
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            severity: Severity::Info,
        }
    }

    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            severity: Severity::Warning,
        }
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            severity: Severity::Error,
        }
    }
}

/// Delivery channel for notices. Real sinks live in the binary; delivery is
/// best-effort and a failed attempt is never retried.
pub trait NotificationSink {
    fn deliver(&mut self, notice: &Notice) -> Result<()>;

    /// Optional audio cue, attempted once per alarm fire, independent of
    /// the visual notice.
    fn audio_cue(&mut self) -> Result<()> {
        Ok(())
    }
}
