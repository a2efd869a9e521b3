pub mod config;
pub mod confirm;
pub mod deletion;
pub mod engine;
pub mod error;
pub mod progress;
pub mod resolver;
pub mod scanner;
pub mod storage;

pub use config::{AppConfig, QueryErrorPolicy};
pub use confirm::{AssumeYes, Confirmer};
pub use deletion::{DeletionFailure, DeletionOutcome, FailureReason};
pub use engine::{CleanupEngine, CleanupReport, FileTotals, Mode, PhaseOutcome, PhaseReport};
pub use error::Error;
pub use progress::{Phase, ProgressReporter, SilentReporter};
pub use resolver::{PathResolver, UploadsResolver};
pub use storage::{Database, MetadataStore, StoreSettings};
