//! Terminal confirmation prompts.

use dialoguer::{Confirm, theme::ColorfulTheme};

use push_core::confirm::Confirmer;

/// Asks on the terminal, defaulting to yes.
pub struct PromptConfirmer {
    theme: ColorfulTheme,
}

impl PromptConfirmer {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Confirmer for PromptConfirmer {
    fn confirm(&self, question: &str) -> anyhow::Result<bool> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(question)
            .default(true)
            .interact()?;
        tracing::debug!(question, answer, "operator answered");
        Ok(answer)
    }
}
