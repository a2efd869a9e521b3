/// Which side of the reconciliation a callback refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Attachments,
    Files,
}

impl Phase {
    pub fn noun(self) -> &'static str {
        match self {
            Phase::Attachments => "attachments",
            Phase::Files => "files",
        }
    }
}

/// Trait for reporting cleanup progress.
///
/// The CLI implements it with indicatif. All methods have default no-op
/// implementations.
pub trait ProgressReporter {
    fn on_scan_start(&self, _phase: Phase, _total: usize) {}
    fn on_scan_progress(&self, _phase: Phase, _checked: usize) {}
    fn on_scan_complete(&self, _phase: Phase, _found: usize) {}
    fn on_delete_start(&self, _phase: Phase, _total: usize) {}
    fn on_delete_progress(&self, _phase: Phase, _processed: usize) {}
    fn on_delete_complete(&self, _phase: Phase, _deleted: usize, _failed: usize) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
