//! Audio playback clock and word highlighting
//!
//! The highlighted word is always derived from the playback position, never
//! stored, so play, pause, seek and rate changes cannot make them diverge.

use std::time::Duration;

use thiserror::Error;

/// Duration assumed before the real audio length is known
pub const DEFAULT_DURATION_SECS: f64 = 180.0;

/// Time slot of one spoken word, in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct WordTiming {
    pub word: String,
    pub start_time: f64,
    pub end_time: f64,
}

/// Words of a script laid out over the audio duration
#[derive(Debug, Clone, PartialEq)]
pub struct WordTimeline {
    timings: Vec<WordTiming>,
    duration: f64,
    uniform: bool,
}

impl WordTimeline {
    /// Equal slots for every whitespace-separated word
    #[allow(clippy::cast_precision_loss)]
    pub fn uniform(text: &str, duration: f64) -> Self {
        let words: Vec<&str> = text.split_whitespace().collect();
        let slot = if words.is_empty() { 0.0 } else { duration / words.len() as f64 };

        let timings = words
            .into_iter()
            .enumerate()
            .map(|(i, word)| WordTiming {
                word: word.to_owned(),
                start_time: i as f64 * slot,
                end_time: (i + 1) as f64 * slot,
            })
            .collect();

        Self {
            timings,
            duration,
            uniform: true,
        }
    }

    /// Use provider timestamps, or equal slots when there are none
    pub fn from_timestamps(text: &str, timings: Vec<WordTiming>, duration: f64) -> Self {
        if timings.is_empty() {
            return Self::uniform(text, duration);
        }

        Self {
            timings,
            duration,
            uniform: false,
        }
    }

    pub fn timings(&self) -> &[WordTiming] {
        &self.timings
    }

    pub const fn len(&self) -> usize {
        self.timings.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.timings.is_empty()
    }

    pub const fn duration(&self) -> f64 {
        self.duration
    }

    /// Same words laid out over a measured duration
    pub fn with_duration(&self, duration: f64) -> Self {
        if self.uniform {
            let text = self.timings.iter().map(|t| t.word.as_str()).collect::<Vec<_>>().join(" ");
            Self::uniform(&text, duration)
        } else {
            Self {
                duration,
                ..self.clone()
            }
        }
    }

    /// Index of the word spoken at `time`
    ///
    /// `None` for an empty script or a non-positive duration. Positions
    /// outside the audio clamp to the first or last word.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn word_index_at(&self, time: f64) -> Option<usize> {
        let count = self.timings.len();
        if count == 0 || self.duration.is_nan() || self.duration <= 0.0 {
            return None;
        }

        let last = count - 1;
        let time = if time.is_nan() { 0.0 } else { time };

        if self.uniform {
            let index = ((time / self.duration) * count as f64).floor();
            return Some(if index <= 0.0 { 0 } else { (index as usize).min(last) });
        }

        let started = self.timings.partition_point(|t| t.start_time <= time);
        Some(started.saturating_sub(1).min(last))
    }

    pub fn word_at(&self, time: f64) -> Option<&str> {
        self.word_index_at(time).map(|i| self.timings[i].word.as_str())
    }
}

/// Supported playback speeds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackRate {
    #[default]
    Normal,
    OneAndHalf,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("unsupported playback rate {0}")]
pub struct UnsupportedRate(pub f64);

impl PlaybackRate {
    pub const ALL: [Self; 3] = [Self::Normal, Self::OneAndHalf, Self::Double];

    pub const fn as_f64(self) -> f64 {
        match self {
            Self::Normal => 1.0,
            Self::OneAndHalf => 1.5,
            Self::Double => 2.0,
        }
    }
}

impl TryFrom<f64> for PlaybackRate {
    type Error = UnsupportedRate;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|rate| (rate.as_f64() - value).abs() < f64::EPSILON)
            .ok_or(UnsupportedRate(value))
    }
}

/// Playback position, the single source of truth for highlighting
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackClock {
    duration: f64,
    position: f64,
    playing: bool,
    rate: PlaybackRate,
}

impl PlaybackClock {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            position: 0.0,
            playing: false,
            rate: PlaybackRate::Normal,
        }
    }

    pub const fn position(&self) -> f64 {
        self.position
    }

    pub const fn duration(&self) -> f64 {
        self.duration
    }

    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    pub const fn rate(&self) -> PlaybackRate {
        self.rate
    }

    pub fn play(&mut self) {
        if self.position < self.duration {
            self.playing = true;
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Jump to `time`, clamped to the audio
    pub fn seek(&mut self, time: f64) {
        self.position = if time.is_nan() { 0.0 } else { time.clamp(0.0, self.duration) };
    }

    pub fn set_rate(&mut self, rate: PlaybackRate) {
        self.rate = rate;
    }

    /// Replace the assumed duration once the real one is known
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration.max(0.0);
        self.seek(self.position);
    }

    /// Advance by `elapsed` wall time while playing
    pub fn tick(&mut self, elapsed: Duration) {
        if !self.playing {
            return;
        }

        self.position = (self.position + elapsed.as_secs_f64() * self.rate.as_f64()).min(self.duration);
        if self.position >= self.duration {
            self.playing = false;
        }
    }

    /// Word highlighted at the current position
    pub fn highlighted(&self, timeline: &WordTimeline) -> Option<usize> {
        timeline.word_index_at(self.position)
    }
}

/// Format seconds as `m:ss`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 { seconds.floor() as u64 } else { 0 };
    format!("{}:{:02}", total / 60, total % 60)
}
