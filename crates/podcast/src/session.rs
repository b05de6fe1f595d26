//! Per-user podcast session record
//!
//! One writer updates the record; any number of readers take snapshots or
//! subscribe to changes. [`SessionStore`] is the writer and is not `Clone`;
//! readers hold a [`SessionReader`], which cannot modify the record.

use tokio::sync::watch;

/// Current podcast session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodcastSession {
    pub input_text: String,
    pub selected_voice_id: String,
    pub summary_text: String,
    pub audio_url: Option<String>,
}

/// Writing handle to the session record
#[derive(Debug)]
pub struct SessionStore {
    tx: watch::Sender<PodcastSession>,
}

/// Read-only handle to the session record
#[derive(Debug, Clone)]
pub struct SessionReader {
    rx: watch::Receiver<PodcastSession>,
}

impl SessionReader {
    pub fn snapshot(&self) -> PodcastSession {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PodcastSession> {
        self.rx.clone()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            tx: watch::Sender::new(PodcastSession::default()),
        }
    }

    /// Replace the record for a new submission
    pub fn submit(&self, input_text: impl Into<String>, voice_id: impl Into<String>) {
        self.tx.send_replace(PodcastSession {
            input_text: input_text.into(),
            selected_voice_id: voice_id.into(),
            summary_text: String::new(),
            audio_url: None,
        });
    }

    pub fn select_voice(&self, voice_id: impl Into<String>) {
        let voice_id = voice_id.into();
        self.tx.send_if_modified(|session| {
            if session.selected_voice_id == voice_id {
                return false;
            }
            session.selected_voice_id = voice_id;
            true
        });
    }

    pub fn set_summary(&self, summary: impl Into<String>) {
        let summary = summary.into();
        self.tx.send_modify(|session| session.summary_text = summary);
    }

    pub fn set_audio_url(&self, audio_url: Option<String>) {
        self.tx.send_modify(|session| session.audio_url = audio_url);
    }

    pub fn snapshot(&self) -> PodcastSession {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PodcastSession> {
        self.tx.subscribe()
    }

    /// Hand out a read-only view of the record
    pub fn reader(&self) -> SessionReader {
        SessionReader {
            rx: self.tx.subscribe(),
        }
    }
}
