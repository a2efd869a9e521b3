use indicatif::{ProgressBar, ProgressStyle};
use media_cleanup_core::{Phase, ProgressReporter};
use std::cell::RefCell;
use std::time::Duration;

/// CLI progress reporter using indicatif progress bars.
///
/// Bars draw to stderr and indicatif hides them when that is not a terminal.
pub struct CliReporter {
    bar: RefCell<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: RefCell::new(None),
        }
    }

    fn start_bar(&self, total: usize, label: String) {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} {msg} [{bar:30.cyan/dim}] {pos}/{len}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸─")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(label);
        pb.enable_steady_tick(Duration::from_millis(80));
        if let Some(old) = self.bar.borrow_mut().replace(pb) {
            old.finish_and_clear();
        }
    }

    fn set_position(&self, position: usize) {
        if let Some(pb) = self.bar.borrow().as_ref() {
            pb.set_position(position as u64);
        }
    }

    fn finish_bar(&self) {
        if let Some(pb) = self.bar.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self, phase: Phase, total: usize) {
        self.start_bar(total, format!("Checking {}", phase.noun()));
    }

    fn on_scan_progress(&self, _phase: Phase, checked: usize) {
        self.set_position(checked);
    }

    fn on_scan_complete(&self, _phase: Phase, _found: usize) {
        self.finish_bar();
    }

    fn on_delete_start(&self, phase: Phase, total: usize) {
        self.start_bar(total, format!("Deleting {}", phase.noun()));
    }

    fn on_delete_progress(&self, _phase: Phase, processed: usize) {
        self.set_position(processed);
    }

    fn on_delete_complete(&self, _phase: Phase, _deleted: usize, _failed: usize) {
        self.finish_bar();
    }
}
