use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use uuid::Uuid;

/// Playable audio held by a session until released
///
/// Clones share the same audio; releasing any clone frees it for all.
#[derive(Debug, Clone)]
pub struct AudioHandle {
    id: Uuid,
    audio: Arc<Mutex<Option<Bytes>>>,
}

impl AudioHandle {
    pub fn new(audio: Bytes) -> Self {
        Self {
            id: Uuid::new_v4(),
            audio: Arc::new(Mutex::new(Some(audio))),
        }
    }

    /// Session-local locator for this audio
    pub fn url(&self) -> String {
        format!("stockast-audio:{}", self.id)
    }

    /// Audio bytes, unless released
    pub fn bytes(&self) -> Option<Bytes> {
        self.audio.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn release(&self) {
        if self.audio.lock().unwrap_or_else(PoisonError::into_inner).take().is_some() {
            tracing::debug!(audio = %self.id, "released audio");
        }
    }

    pub fn is_released(&self) -> bool {
        self.audio.lock().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}

impl PartialEq for AudioHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_frees_every_clone() {
        let handle = AudioHandle::new(Bytes::from_static(b"ID3"));
        let shared = handle.clone();

        assert_eq!(shared.bytes().unwrap(), Bytes::from_static(b"ID3"));
        handle.release();

        assert!(shared.is_released());
        assert!(shared.bytes().is_none());
        assert!(shared.url().starts_with("stockast-audio:"));
    }
}
