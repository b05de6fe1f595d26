//! Script generation progress
//!
//! Progress is a single cursor over six ordered phases. The status of every
//! phase is derived from the cursor, and the cursor never moves backwards.

use strum::{EnumCount, EnumIter, IntoEnumIterator};
use thiserror::Error;

/// Ordered stages of podcast generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumCount)]
pub enum ProgressPhase {
    TrendAnalysis,
    DataGathering,
    AnalysisSynthesis,
    ContentStructuring,
    ScriptGeneration,
    AudioGeneration,
}

impl ProgressPhase {
    /// Phase message as it appears in `log` frames
    pub const fn message(self) -> &'static str {
        match self {
            Self::TrendAnalysis => "Analyzing Market Trends...",
            Self::DataGathering => "Gathering Financial Data...",
            Self::AnalysisSynthesis => "Generating Comprehensive Analysis...",
            Self::ContentStructuring => "Structuring Podcast Content...",
            Self::ScriptGeneration => "Generating Podcast Script...",
            Self::AudioGeneration => "Generating Podcast Audio...",
        }
    }

    /// Label shown once the phase is done
    pub const fn completed_message(self) -> &'static str {
        match self {
            Self::TrendAnalysis => "Analyzing Market Trends Completed",
            Self::DataGathering => "Gathering Financial Data Completed",
            Self::AnalysisSynthesis => "Generating Comprehensive Analysis Completed",
            Self::ContentStructuring => "Structuring Podcast Content Completed",
            Self::ScriptGeneration => "Generating Podcast Script Completed",
            Self::AudioGeneration => "Generating Podcast Audio Completed",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Phase whose message is exactly `message`
    pub fn from_message(message: &str) -> Option<Self> {
        Self::iter().find(|phase| phase.message() == message)
    }

    /// Whether `message` is one of the six phase messages
    pub fn is_canonical(message: &str) -> bool {
        Self::from_message(message).is_some()
    }
}

/// Display status of a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStatus {
    Pending,
    Active,
    Completed,
}

/// Monotone progress cursor in `0..=6`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressCursor(usize);

impl ProgressCursor {
    pub const MAX: usize = ProgressPhase::COUNT;

    /// Cursor value after the script has been received
    pub const SCRIPT_COMPLETE: usize = ProgressPhase::ScriptGeneration.index() + 1;

    pub const fn value(self) -> usize {
        self.0
    }

    /// Mark `phase` done, as announced by its `log` frame
    pub fn reach(&mut self, phase: ProgressPhase) {
        self.raise_to(phase.index() + 1);
    }

    pub fn mark_script_complete(&mut self) {
        self.raise_to(Self::SCRIPT_COMPLETE);
    }

    pub fn mark_audio_complete(&mut self) {
        self.raise_to(Self::MAX);
    }

    fn raise_to(&mut self, value: usize) {
        self.0 = self.0.max(value.min(Self::MAX));
    }

    pub const fn status(self, phase: ProgressPhase) -> PhaseStatus {
        let index = phase.index();
        if self.0 > index {
            PhaseStatus::Completed
        } else if self.0 == index {
            PhaseStatus::Active
        } else {
            PhaseStatus::Pending
        }
    }

    /// Label for a phase: the completed label once done, else the phase message
    pub const fn label(self, phase: ProgressPhase) -> &'static str {
        match self.status(phase) {
            PhaseStatus::Completed => phase.completed_message(),
            PhaseStatus::Active | PhaseStatus::Pending => phase.message(),
        }
    }
}

/// Lifecycle of one generation attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenerationState {
    #[default]
    Idle,
    GeneratingScript,
    ScriptReady,
    ScriptFailed,
    GeneratingAudio,
    AudioReady,
    AudioFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal generation transition from {from:?} to {to:?}")]
pub struct IllegalTransition {
    pub from: GenerationState,
    pub to: GenerationState,
}

impl GenerationState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::ScriptFailed | Self::AudioFailed | Self::AudioReady)
    }

    /// Move to `to` if the lifecycle allows it
    pub const fn transition(self, to: Self) -> Result<Self, IllegalTransition> {
        let allowed = matches!(
            (self, to),
            (Self::Idle, Self::GeneratingScript)
                | (Self::GeneratingScript, Self::ScriptReady | Self::ScriptFailed)
                | (Self::ScriptReady, Self::GeneratingAudio)
                | (Self::GeneratingAudio, Self::AudioReady | Self::AudioFailed)
        );

        if allowed {
            Ok(to)
        } else {
            Err(IllegalTransition { from: self, to })
        }
    }
}
