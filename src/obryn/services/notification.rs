use std::io::Write;

use anyhow::Result;

/// Audio cue fired after a completed exchange. Best-effort: callers log and
/// swallow failures, a broken cue never fails the flow.
pub trait Notifier: Send + Sync {
    fn notify(&self) -> Result<()>;
}

/// Terminal bell as the notification cue.
pub struct TerminalBellNotifier;

impl Notifier for TerminalBellNotifier {
    fn notify(&self) -> Result<()> {
        let mut stdout = std::io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()?;
        Ok(())
    }
}

/// Silent notifier for headless use.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self) -> Result<()> {
        Ok(())
    }
}
