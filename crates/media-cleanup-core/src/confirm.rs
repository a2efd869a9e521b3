use crate::error::Error;

/// Gate in front of each deletion phase.
pub trait Confirmer {
    fn confirm(&self, prompt: &str) -> Result<bool, Error>;
}

/// Answers yes to everything, for `--yes` and non-interactive runs.
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&self, _prompt: &str) -> Result<bool, Error> {
        Ok(true)
    }
}
