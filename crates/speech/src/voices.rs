use serde::Serialize;

/// Voice used when a request or configuration does not name one
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// Presenter gender shown next to a voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    Male,
    Female,
}

/// Display metadata for a synthesis voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceProfile {
    pub voice_id: &'static str,
    pub name: &'static str,
    pub gender: Gender,
    pub description: &'static str,
    pub avatar: &'static str,
}

static VOICES: [VoiceProfile; 5] = [
    VoiceProfile {
        voice_id: "21m00Tcm4TlvDq8ikWAM",
        name: "Rachel",
        gender: Gender::Female,
        description: "Clear and professional female voice",
        avatar: "https://api.dicebear.com/9.x/notionists/svg?seed=Rachel",
    },
    VoiceProfile {
        voice_id: "AZnzlk1XvdvUeBnXmlld",
        name: "Domi",
        gender: Gender::Female,
        description: "Warm and friendly female voice",
        avatar: "https://api.dicebear.com/9.x/notionists/svg?seed=Domi",
    },
    VoiceProfile {
        voice_id: "ErXwobaYiN019PkySvjV",
        name: "Antoni",
        gender: Gender::Male,
        description: "Deep and authoritative male voice",
        avatar: "https://api.dicebear.com/9.x/notionists/svg?seed=Antoni",
    },
    VoiceProfile {
        voice_id: "VR6AewLTigWG4xSOukaG",
        name: "Arnold",
        gender: Gender::Male,
        description: "Strong and confident male voice",
        avatar: "https://api.dicebear.com/9.x/notionists/svg?seed=Arnold",
    },
    VoiceProfile {
        voice_id: "pNInz6obpgDQGcFmaJgB",
        name: "Adam",
        gender: Gender::Male,
        description: "Natural and engaging male voice",
        avatar: "https://api.dicebear.com/9.x/notionists/svg?seed=Adam",
    },
];

/// All voices offered to the user, in display order
pub fn catalog() -> &'static [VoiceProfile] {
    &VOICES
}

/// Look up a voice by its provider identifier
pub fn find(voice_id: &str) -> Option<&'static VoiceProfile> {
    VOICES.iter().find(|voice| voice.voice_id == voice_id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn voice_ids_are_unique() {
        let ids: HashSet<_> = catalog().iter().map(|v| v.voice_id).collect();
        assert_eq!(ids.len(), catalog().len());
    }

    #[test]
    fn default_voice_is_in_catalog() {
        assert_eq!(find(DEFAULT_VOICE_ID).map(|v| v.name), Some("Rachel"));
    }

    #[test]
    fn unknown_voice_is_none() {
        assert!(find("nope").is_none());
    }

    #[test]
    fn serializes_with_snake_case_id() {
        let json = serde_json::to_value(&catalog()[2]).unwrap();
        assert_eq!(json["voice_id"], "ErXwobaYiN019PkySvjV");
        assert_eq!(json["gender"], "Male");
    }
}
