use std::sync::{Mutex, PoisonError};

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::PodcastApi;
use super::audio::AudioHandle;
use crate::progress::{GenerationState, ProgressCursor, ProgressPhase};
use crate::protocol::StreamEvent;
use crate::script::{ParsedScript, parse_script};
use crate::session::{SessionReader, SessionStore};

pub const SCRIPT_FAILED: &str = "Failed to generate script. Please try again.";
pub const AUDIO_FAILED: &str = "Failed to generate audio. Please try again.";

/// Entry of the thinking log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Log(String),
    Error(String),
}

/// Observable state of the current generation attempt
#[derive(Debug, Clone, Default)]
pub struct Generation {
    pub attempt: Option<Uuid>,
    pub state: GenerationState,
    pub cursor: ProgressCursor,
    /// Every `log` message in arrival order
    pub processing_log: Vec<String>,
    pub thinking_log: Vec<LogEntry>,
    pub final_script: String,
    pub script_lines: Vec<String>,
    pub audio: Option<AudioHandle>,
}

impl Generation {
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.thinking_log.iter().filter_map(|entry| match entry {
            LogEntry::Error(message) => Some(message.as_str()),
            LogEntry::Log(_) => None,
        })
    }

    /// Phase messages move the cursor; anything else is thinking output
    fn on_log(&mut self, message: String) {
        match ProgressPhase::from_message(&message) {
            Some(phase) => self.cursor.reach(phase),
            None => self.thinking_log.push(LogEntry::Log(message.clone())),
        }
        self.processing_log.push(message);
    }

    fn on_script(&mut self, parsed: ParsedScript) {
        self.thinking_log = parsed.thinking.into_iter().map(LogEntry::Log).collect();
        self.final_script = parsed.script;
        self.script_lines = parsed.lines;
        self.cursor.mark_script_complete();
        self.transition(GenerationState::ScriptReady);
    }

    fn fail(&mut self, to: GenerationState, message: impl Into<String>) {
        self.thinking_log.push(LogEntry::Error(message.into()));
        self.transition(to);
    }

    fn transition(&mut self, to: GenerationState) {
        match self.state.transition(to) {
            Ok(state) => self.state = state,
            Err(e) => tracing::warn!(error = %e, "ignoring generation transition"),
        }
    }
}

/// Result of [`PodcastConsumer::generate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The attempt ran to a terminal state
    Finished(GenerationState),
    /// A newer submission or a cancel took over
    Superseded,
    /// Nothing to do: empty input, or this input was already generated
    Skipped,
}

struct Attempt {
    id: Uuid,
    input_text: String,
    cancel: CancellationToken,
}

/// Drives script and audio generation for one session
pub struct PodcastConsumer<A> {
    api: A,
    session: SessionStore,
    generation: watch::Sender<Generation>,
    current: Mutex<Option<Attempt>>,
}

impl<A: PodcastApi> PodcastConsumer<A> {
    pub fn new(api: A, session: SessionStore) -> Self {
        Self {
            api,
            session,
            generation: watch::Sender::new(Generation::default()),
            current: Mutex::new(None),
        }
    }

    /// Writing handle for the owner of the session
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn session_reader(&self) -> SessionReader {
        self.session.reader()
    }

    pub fn snapshot(&self) -> Generation {
        self.generation.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Generation> {
        self.generation.subscribe()
    }

    /// Generate a script and audio for the session's current input
    ///
    /// Runs at most once per distinct input text. A different input
    /// supersedes the running attempt, whose remaining results are dropped.
    pub async fn generate(&self) -> AttemptOutcome {
        let Some((id, cancel)) = self.begin() else {
            return AttemptOutcome::Skipped;
        };

        tracing::debug!(attempt = %id, "starting podcast generation");

        let Some(script) = self.run_script(id, &cancel).await else {
            return self.outcome(id, &cancel);
        };

        self.run_audio(id, &cancel, &script).await;
        self.outcome(id, &cancel)
    }

    /// Stop the running attempt and release its audio
    pub fn cancel(&self) {
        if let Some(attempt) = self.lock_current().take() {
            attempt.cancel.cancel();
        }

        let previous = self.generation.send_replace(Generation::default());
        if let Some(audio) = previous.audio {
            audio.release();
            self.session.set_audio_url(None);
        }
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, Option<Attempt>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Option<(Uuid, CancellationToken)> {
        let input_text = self.session.snapshot().input_text;
        if input_text.trim().is_empty() {
            return None;
        }

        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        {
            let mut current = self.lock_current();
            if current.as_ref().is_some_and(|a| a.input_text == input_text) {
                tracing::debug!("generation already started for this input");
                return None;
            }

            if let Some(previous) = current.take() {
                tracing::debug!(attempt = %previous.id, "superseding podcast generation");
                previous.cancel.cancel();
            }

            *current = Some(Attempt {
                id,
                input_text,
                cancel: cancel.clone(),
            });
        }

        let previous = self.generation.send_replace(Generation {
            attempt: Some(id),
            state: GenerationState::GeneratingScript,
            ..Generation::default()
        });
        if let Some(audio) = previous.audio {
            audio.release();
        }

        Some((id, cancel))
    }

    /// Apply `f` if `id` is still the current attempt
    fn update(&self, id: Uuid, f: impl FnOnce(&mut Generation)) -> bool {
        self.generation.send_if_modified(|generation| {
            if generation.attempt != Some(id) {
                return false;
            }
            f(generation);
            true
        })
    }

    fn outcome(&self, id: Uuid, cancel: &CancellationToken) -> AttemptOutcome {
        let generation = self.generation.borrow();
        if cancel.is_cancelled() || generation.attempt != Some(id) {
            AttemptOutcome::Superseded
        } else {
            AttemptOutcome::Finished(generation.state)
        }
    }

    /// Consume frames until the script arrives; `None` when the attempt ends
    /// without one
    async fn run_script(&self, id: Uuid, cancel: &CancellationToken) -> Option<String> {
        let session = self.session.snapshot();

        let events = tokio::select! {
            () = cancel.cancelled() => return None,
            events = self.api.script_events(&session.input_text, &session.selected_voice_id) => events,
        };

        let mut events = match events {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(error = %e, "script generation request failed");
                self.update(id, |g| g.fail(GenerationState::ScriptFailed, SCRIPT_FAILED));
                return None;
            }
        };

        loop {
            let next = tokio::select! {
                () = cancel.cancelled() => return None,
                next = events.next() => next,
            };

            match next {
                Some(Ok(StreamEvent::Log { message })) => {
                    self.update(id, |g| g.on_log(message));
                }
                Some(Ok(StreamEvent::Script { content })) => {
                    let parsed = parse_script(&content);
                    let script = parsed.script.clone();

                    if !self.update(id, |g| g.on_script(parsed)) {
                        return None;
                    }
                    self.session.set_summary(script.as_str());
                    return Some(script);
                }
                Some(Ok(StreamEvent::Error { message })) => {
                    tracing::warn!(%message, "script generation reported an error");
                    self.update(id, |g| g.fail(GenerationState::ScriptFailed, message));
                    return None;
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "script stream failed");
                    self.update(id, |g| g.fail(GenerationState::ScriptFailed, SCRIPT_FAILED));
                    return None;
                }
                None => {
                    tracing::warn!("script stream ended without a terminal frame");
                    self.update(id, |g| g.fail(GenerationState::ScriptFailed, SCRIPT_FAILED));
                    return None;
                }
            }
        }
    }

    async fn run_audio(&self, id: Uuid, cancel: &CancellationToken, script: &str) {
        if !self.update(id, |g| g.transition(GenerationState::GeneratingAudio)) {
            return;
        }

        if script.trim().is_empty() {
            tracing::warn!("script payload had no final script");
            self.update(id, |g| g.fail(GenerationState::AudioFailed, AUDIO_FAILED));
            return;
        }

        // Voice selected now, not at submission
        let voice_id = self.session.snapshot().selected_voice_id;

        let result = tokio::select! {
            () = cancel.cancelled() => return,
            result = self.api.generate_audio(script, &voice_id) => result,
        };

        match result {
            Ok(audio) => {
                let handle = AudioHandle::new(audio);
                let url = handle.url();

                let stored = self.update(id, |g| {
                    g.cursor.mark_audio_complete();
                    g.transition(GenerationState::AudioReady);
                    g.audio = Some(handle.clone());
                });

                if stored {
                    self.session.set_audio_url(Some(url));
                } else {
                    handle.release();
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "audio generation failed");
                self.update(id, |g| g.fail(GenerationState::AudioFailed, AUDIO_FAILED));
            }
        }
    }
}
