//! Operator confirmation.
//!
//! Policy code decides *whether* to ask; a [`Confirmer`] decides *how*. The
//! CLI supplies a terminal prompt, tests supply canned answers.

pub trait Confirmer {
    /// Ask a yes/no question. `Ok(false)` means the operator declined.
    fn confirm(&self, question: &str) -> anyhow::Result<bool>;
}

/// Answers yes to everything (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&self, question: &str) -> anyhow::Result<bool> {
        tracing::debug!(question, "assuming yes");
        Ok(true)
    }
}

/// Answers no to everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeNo;

impl Confirmer for AssumeNo {
    fn confirm(&self, question: &str) -> anyhow::Result<bool> {
        tracing::debug!(question, "assuming no");
        Ok(false)
    }
}
