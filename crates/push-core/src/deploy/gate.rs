//! Release gate for deploys to shared environments.
//!
//! [`assess`] decides what needs acknowledging; [`enforce`] asks.

use crate::confirm::Confirmer;
use crate::error::PushError;
use crate::git::RepoMetadata;
use crate::ui;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateFinding {
    /// The working tree has uncommitted changes
    Dirty,
    /// No tag points at the current commit
    Untagged,
    /// Tagged, but not as `vX.Y` or `vX.Y-suffix`
    MalformedTag(String),
}

impl GateFinding {
    fn question(&self) -> String {
        match self {
            GateFinding::Dirty => {
                "Repository is dirty and therefore not properly tagged. Deploy anyway?".into()
            }
            GateFinding::Untagged => "This revision is not tagged. Deploy anyway?".into(),
            GateFinding::MalformedTag(tag) => {
                format!("Repository tag {tag} does not match format vX.Y. Deploy anyway?")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// `no_tag` was set
    Skipped,
    /// Clean tree at a well-formed tag
    Release(String),
    /// The operator confirmed each finding
    Acknowledged(Vec<GateFinding>),
}

/// What stands between this revision and a release deploy.
///
/// The tag format is only checked on a clean, tagged tree.
pub fn assess(repo: &RepoMetadata) -> Vec<GateFinding> {
    let mut findings = Vec::new();
    if repo.dirty {
        findings.push(GateFinding::Dirty);
    }
    match repo.tag() {
        None => findings.push(GateFinding::Untagged),
        Some(tag) if !repo.dirty && !is_release_tag(tag) => {
            findings.push(GateFinding::MalformedTag(tag.to_string()));
        }
        Some(_) => {}
    }
    findings
}

/// Ask the operator to acknowledge every finding.
///
/// The first refusal aborts with [`PushError::Declined`].
pub fn enforce(
    repo: &RepoMetadata,
    no_tag: bool,
    confirmer: &dyn Confirmer,
) -> anyhow::Result<GateOutcome> {
    if no_tag {
        ui::notice("Not checking to see if the project is tagged because 'no_tag' is set.");
        return Ok(GateOutcome::Skipped);
    }

    let findings = assess(repo);
    for finding in &findings {
        if !confirmer.confirm(&finding.question())? {
            if *finding == GateFinding::Untagged {
                ui::warn("This revision is not tagged.");
            }
            return Err(PushError::Declined.into());
        }
    }

    if findings.is_empty() {
        let tag = repo.tag().unwrap_or_default().to_string();
        ui::success(format!(
            "Project is tagged at version {tag} and ready for release."
        ));
        return Ok(GateOutcome::Release(tag));
    }

    for finding in &findings {
        match finding {
            GateFinding::Dirty => ui::warn("Repository is dirty and therefore not tagged."),
            GateFinding::Untagged => ui::warn("This revision is not tagged."),
            GateFinding::MalformedTag(_) => {}
        }
    }
    Ok(GateOutcome::Acknowledged(findings))
}

/// `v<digits>.<digits>` optionally followed by `-<anything>`.
pub fn is_release_tag(tag: &str) -> bool {
    let Some(rest) = tag.strip_prefix('v') else {
        return false;
    };
    let version = rest.split_once('-').map_or(rest, |(version, _)| version);
    let Some((major, minor)) = version.split_once('.') else {
        return false;
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    digits(major) && digits(minor)
}
