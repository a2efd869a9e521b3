use crate::config::QueryErrorPolicy;
use crate::confirm::Confirmer;
use crate::deletion::{self, DeletionOutcome};
use crate::error::Error;
use crate::progress::{Phase, ProgressReporter};
use crate::resolver::PathResolver;
use crate::scanner;
use crate::storage::MetadataStore;
use std::path::PathBuf;
use tracing::{info, warn};

/// Exit code for a run whose deletions partly failed, under `strict`.
pub const EXIT_PARTIAL_FAILURE: i32 = 2;

/// Which reconciliation phases to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Full,
    AttachmentsOnly,
    FilesOnly,
}

impl Mode {
    pub fn from_flags(attachments_only: bool, files_only: bool) -> Result<Self, Error> {
        match (attachments_only, files_only) {
            (true, true) => Err(Error::Usage(
                "--attachments-only and --files-only are mutually exclusive; \
                 run without either to clean both."
                    .to_string(),
            )),
            (true, false) => Ok(Mode::AttachmentsOnly),
            (false, true) => Ok(Mode::FilesOnly),
            (false, false) => Ok(Mode::Full),
        }
    }

    fn runs(self, phase: Phase) -> bool {
        match (self, phase) {
            (Mode::Full, _) => true,
            (Mode::AttachmentsOnly, Phase::Attachments) => true,
            (Mode::FilesOnly, Phase::Files) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseOutcome {
    DryRun,
    Declined,
    Deleted(DeletionOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    pub found: usize,
    pub outcome: PhaseOutcome,
}

impl PhaseReport {
    pub fn deleted(&self) -> usize {
        match &self.outcome {
            PhaseOutcome::Deleted(outcome) => outcome.deleted,
            _ => 0,
        }
    }

    pub fn failed(&self) -> usize {
        match &self.outcome {
            PhaseOutcome::Deleted(outcome) => outcome.failures.len(),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileTotals {
    pub total: usize,
    pub valid: usize,
    pub hidden: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub attachments: Option<PhaseReport>,
    pub files: Option<PhaseReport>,
    pub file_totals: Option<FileTotals>,
}

impl CleanupReport {
    pub fn failures(&self) -> usize {
        self.attachments.iter().chain(self.files.iter()).map(PhaseReport::failed).sum()
    }

    /// Per-item delete failures are warnings: the run exits 0 regardless,
    /// unless `strict` asks for them to fail the command.
    pub fn exit_code(&self, strict: bool) -> i32 {
        if strict && self.failures() > 0 {
            EXIT_PARTIAL_FAILURE
        } else {
            0
        }
    }
}

/// Drives the attachment and file phases: scan, report, confirm, delete.
/// Phases run strictly one after the other and share no state.
pub struct CleanupEngine<'a> {
    store: &'a dyn MetadataStore,
    resolver: &'a dyn PathResolver,
    confirmer: &'a dyn Confirmer,
    reporter: &'a dyn ProgressReporter,
    upload_root: PathBuf,
    query_error_policy: QueryErrorPolicy,
}

impl<'a> CleanupEngine<'a> {
    pub fn new(
        store: &'a dyn MetadataStore,
        resolver: &'a dyn PathResolver,
        confirmer: &'a dyn Confirmer,
        reporter: &'a dyn ProgressReporter,
        upload_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            resolver,
            confirmer,
            reporter,
            upload_root: upload_root.into(),
            query_error_policy: QueryErrorPolicy::default(),
        }
    }

    pub fn with_query_error_policy(mut self, policy: QueryErrorPolicy) -> Self {
        self.query_error_policy = policy;
        self
    }

    pub fn run(&self, mode: Mode, dry_run: bool) -> Result<CleanupReport, Error> {
        let mut report = CleanupReport::default();

        if mode.runs(Phase::Attachments) {
            let missing = scanner::scan_attachments(self.store, self.resolver, self.reporter)?;
            let outcome = match self.gate(Phase::Attachments, missing.len(), dry_run)? {
                Some(outcome) => outcome,
                None => PhaseOutcome::Deleted(deletion::delete_attachments(
                    &missing,
                    self.store,
                    self.resolver,
                    &self.upload_root,
                    self.reporter,
                )),
            };
            report.attachments = Some(PhaseReport {
                found: missing.len(),
                outcome,
            });
        }

        if mode.runs(Phase::Files) {
            let scan = scanner::scan_files(
                &self.upload_root,
                self.store,
                self.query_error_policy,
                self.reporter,
            )?;
            report.file_totals = Some(FileTotals {
                total: scan.total,
                valid: scan.valid,
                hidden: scan.hidden,
                skipped: scan.skipped,
            });
            let outcome = match self.gate(Phase::Files, scan.orphans.len(), dry_run)? {
                Some(outcome) => outcome,
                None => PhaseOutcome::Deleted(deletion::delete_files(&scan.orphans, self.reporter)),
            };
            report.files = Some(PhaseReport {
                found: scan.orphans.len(),
                outcome,
            });
        }

        Ok(report)
    }

    /// `Some(outcome)` when the phase stops before deleting, `None` to go ahead.
    fn gate(&self, phase: Phase, found: usize, dry_run: bool) -> Result<Option<PhaseOutcome>, Error> {
        if dry_run {
            return Ok(Some(PhaseOutcome::DryRun));
        }
        if found == 0 {
            return Ok(None);
        }

        let prompt = format!(
            "Are you sure you want to delete {} invalid {}?",
            found,
            phase.noun()
        );
        if self.confirmer.confirm(&prompt)? {
            Ok(None)
        } else {
            warn!("Skipped deleting {} invalid {}.", found, phase.noun());
            info!("Deleted 0 invalid {}.", phase.noun());
            Ok(Some(PhaseOutcome::Declined))
        }
    }
}
