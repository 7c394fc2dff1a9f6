use anyhow::{Context, Result};
use std::io::Write;

use weaver_core::{Notice, NotificationSink, Severity};

/// Console delivery: notices go to stdout with a severity tag, the audio
/// cue is the terminal bell.
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn deliver(&mut self, notice: &Notice) -> Result<()> {
        let tag = match notice.severity {
            Severity::Info => "",
            Severity::Warning => "warning: ",
            Severity::Error => "error: ",
        };
        let mut out = std::io::stdout().lock();
        writeln!(out, "{tag}{}: {}", notice.title, notice.body).context("write notice")?;
        Ok(())
    }

    fn audio_cue(&mut self) -> Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(b"\x07").context("ring bell")?;
        out.flush().context("flush bell")?;
        Ok(())
    }
}
