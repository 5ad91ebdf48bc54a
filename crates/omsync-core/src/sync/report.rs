//! Typed results of a sync run.

use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::sync::watermark::Watermark;

/// Which half of a run a report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Notes,
    Attachments,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Notes => write!(f, "notes"),
            Self::Attachments => write!(f, "attachments"),
        }
    }
}

/// Recoverable condition recorded while a phase kept going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncWarning {
    /// The owning memo file was not found, so the attachment stays unlinked.
    RelinkTargetMissing {
        attachment: String,
        memo: String,
        path: PathBuf,
    },
}

impl fmt::Display for SyncWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RelinkTargetMissing {
                attachment,
                memo,
                path,
            } => write!(
                f,
                "{attachment} was saved but not linked: memo {memo} not found at {}",
                path.display()
            ),
        }
    }
}

/// `success | partial(warnings) | failed(error)`
///
/// A failed phase keeps the warnings it gathered before the error.
#[derive(Debug)]
pub enum PhaseOutcome {
    Success,
    Partial(Vec<SyncWarning>),
    Failed {
        error: Error,
        warnings: Vec<SyncWarning>,
    },
}

impl PhaseOutcome {
    pub(crate) fn from_result(result: Result<()>, warnings: Vec<SyncWarning>) -> Self {
        match result {
            Err(error) => Self::Failed { error, warnings },
            Ok(()) if warnings.is_empty() => Self::Success,
            Ok(()) => Self::Partial(warnings),
        }
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed { error, .. } => Some(error),
            Self::Success | Self::Partial(_) => None,
        }
    }

    pub fn warnings(&self) -> &[SyncWarning] {
        match self {
            Self::Success => &[],
            Self::Partial(warnings) | Self::Failed { warnings, .. } => warnings,
        }
    }
}

/// Counters and outcome for one phase.
#[derive(Debug)]
pub struct PhaseReport {
    pub phase: SyncPhase,
    /// Listing pages fetched (always 1 for attachments once the listing succeeds)
    pub pages: usize,
    /// Files created in the vault
    pub written: usize,
    /// Embeds appended to memo files
    pub linked: usize,
    pub outcome: PhaseOutcome,
}

impl PhaseReport {
    pub const fn new(phase: SyncPhase) -> Self {
        Self {
            phase,
            pages: 0,
            written: 0,
            linked: 0,
            outcome: PhaseOutcome::Success,
        }
    }
}

impl fmt::Display for PhaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} written", self.phase, self.written)?;
        if self.phase == SyncPhase::Attachments {
            write!(f, ", {} linked", self.linked)?;
        }
        match &self.outcome {
            PhaseOutcome::Success => Ok(()),
            PhaseOutcome::Partial(warnings) => write!(f, " ({} warnings)", warnings.len()),
            PhaseOutcome::Failed { error, warnings } if warnings.is_empty() => {
                write!(f, " (failed: {error})")
            }
            PhaseOutcome::Failed { error, warnings } => {
                write!(f, " (failed: {error}; {} warnings)", warnings.len())
            }
        }
    }
}

/// Result of one orchestrated run.
#[derive(Debug)]
pub struct SyncReport {
    pub notes: PhaseReport,
    pub attachments: PhaseReport,
    /// Watermark the run filtered against
    pub previous_watermark: Watermark,
    /// Watermark to persist for the next run
    pub watermark: Watermark,
}

impl SyncReport {
    pub const fn has_failures(&self) -> bool {
        self.notes.outcome.is_failed() || self.attachments.outcome.is_failed()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &SyncWarning> {
        [&self.notes.outcome, &self.attachments.outcome]
            .into_iter()
            .flat_map(PhaseOutcome::warnings)
    }

    pub fn watermark_advanced(&self) -> bool {
        self.watermark > self.previous_watermark
    }
}
