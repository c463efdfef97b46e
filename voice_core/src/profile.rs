use serde::{Deserialize, Serialize};

/// Prebuilt voices offered by the synthesis backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrebuiltVoice {
    Aoede,
    Kore,
    Puck,
    Charon,
    Fenrir,
    Zephyr,
}

impl PrebuiltVoice {
    pub const ALL: [PrebuiltVoice; 6] = [
        PrebuiltVoice::Aoede,
        PrebuiltVoice::Kore,
        PrebuiltVoice::Puck,
        PrebuiltVoice::Charon,
        PrebuiltVoice::Fenrir,
        PrebuiltVoice::Zephyr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrebuiltVoice::Aoede => "Aoede",
            PrebuiltVoice::Kore => "Kore",
            PrebuiltVoice::Puck => "Puck",
            PrebuiltVoice::Charon => "Charon",
            PrebuiltVoice::Fenrir => "Fenrir",
            PrebuiltVoice::Zephyr => "Zephyr",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == name)
    }

    /// Fallback mapping when the model suggests a voice outside the
    /// supported set.
    pub fn fallback_for(gender: Gender) -> Self {
        match gender {
            Gender::Female => PrebuiltVoice::Aoede,
            Gender::Male => PrebuiltVoice::Zephyr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
}

/// Vocal identity descriptor produced by the analysis step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceProfile {
    pub name: String,
    pub gender: Gender,
    pub characteristics: Vec<String>,
    pub best_match_voice: PrebuiltVoice,
    pub pitch: f32,
    pub pacing: f32,
    pub accent: String,
    pub neural_identity_descriptor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_script: Option<String>,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            name: "User Identity".into(),
            gender: Gender::Female,
            characteristics: vec!["Natural".into()],
            best_match_voice: PrebuiltVoice::Aoede,
            pitch: 1.0,
            pacing: 1.0,
            accent: "Neutral".into(),
            neural_identity_descriptor: "A natural human voice.".into(),
            suggested_script: None,
        }
    }
}

/// Raw shape of the analysis model's JSON reply. Every field is optional so
/// a partially-filled reply still yields a usable profile.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProfile {
    name: Option<String>,
    gender: Option<String>,
    characteristics: Option<Vec<String>>,
    best_match_voice: Option<String>,
    pitch: Option<f32>,
    pacing: Option<f32>,
    accent: Option<String>,
    neural_identity_descriptor: Option<String>,
    suggested_script: Option<String>,
}

impl VoiceProfile {
    /// Parse the analysis model's text output into a profile.
    ///
    /// The model sometimes wraps its JSON in markdown code fences; those are
    /// stripped first. Anything unparseable falls back to the default
    /// profile, and an out-of-set voice suggestion falls back by gender.
    pub fn parse_model_output(raw: &str) -> Self {
        let cleaned = raw.replace("```json", "").replace("```", "");
        let parsed: RawProfile = match serde_json::from_str(cleaned.trim()) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("analysis reply was not valid JSON: {e}");
                return Self::default();
            }
        };

        let fallback = Self::default();
        let gender = match parsed.gender.as_deref() {
            Some("Male") => Gender::Male,
            _ => Gender::Female,
        };
        let best_match_voice = parsed
            .best_match_voice
            .as_deref()
            .and_then(PrebuiltVoice::from_name)
            .unwrap_or_else(|| PrebuiltVoice::fallback_for(gender));

        Self {
            name: parsed.name.unwrap_or(fallback.name),
            gender,
            characteristics: parsed.characteristics.unwrap_or(fallback.characteristics),
            best_match_voice,
            pitch: parsed.pitch.unwrap_or(fallback.pitch),
            pacing: parsed.pacing.unwrap_or(fallback.pacing),
            accent: parsed.accent.unwrap_or(fallback.accent),
            neural_identity_descriptor: parsed
                .neural_identity_descriptor
                .unwrap_or(fallback.neural_identity_descriptor),
            suggested_script: parsed.suggested_script,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Neutral,
    Happy,
    Sad,
    Excited,
    Serious,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Excited => "excited",
            Emotion::Serious => "serious",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Wav,
    Mp3,
}

/// Knobs for a synthesis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SynthesisConfig {
    pub speed: f32,
    pub pitch: f32,
    pub emphasis: String,
    pub emotion: Emotion,
    pub format: OutputFormat,
    pub professional_mode: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            pitch: 1.0,
            emphasis: "moderate".into(),
            emotion: Emotion::Neutral,
            format: OutputFormat::Wav,
            professional_mode: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_complete_reply() {
        let raw = r#"{
            "name": "Cloned Identity",
            "gender": "Male",
            "characteristics": ["warm", "measured"],
            "bestMatchVoice": "Charon",
            "pitch": 0.9,
            "pacing": 1.1,
            "accent": "Coastal",
            "neuralIdentityDescriptor": "Low, warm male voice.",
            "suggestedScript": "Hello there."
        }"#;
        let profile = VoiceProfile::parse_model_output(raw);
        assert_eq!(profile.gender, Gender::Male);
        assert_eq!(profile.best_match_voice, PrebuiltVoice::Charon);
        assert_eq!(profile.pacing, 1.1);
        assert_eq!(profile.suggested_script.as_deref(), Some("Hello there."));
    }

    #[test]
    fn strips_markdown_fences() {
        let raw = "```json\n{\"gender\": \"Male\", \"bestMatchVoice\": \"Puck\"}\n```";
        let profile = VoiceProfile::parse_model_output(raw);
        assert_eq!(profile.best_match_voice, PrebuiltVoice::Puck);
    }

    #[test]
    fn unknown_voice_falls_back_by_gender() {
        let male = VoiceProfile::parse_model_output(
            r#"{"gender": "Male", "bestMatchVoice": "NotAVoice"}"#,
        );
        assert_eq!(male.best_match_voice, PrebuiltVoice::Zephyr);

        let female = VoiceProfile::parse_model_output(
            r#"{"gender": "Female", "bestMatchVoice": "NotAVoice"}"#,
        );
        assert_eq!(female.best_match_voice, PrebuiltVoice::Aoede);
    }

    #[test]
    fn garbage_reply_yields_default_profile() {
        let profile = VoiceProfile::parse_model_output("the model rambled instead of JSON");
        assert_eq!(profile.name, "User Identity");
        assert_eq!(profile.best_match_voice, PrebuiltVoice::Aoede);
    }

    #[test]
    fn emotion_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Emotion::Excited).unwrap(), "\"excited\"");
        let parsed: Emotion = serde_json::from_str("\"serious\"").unwrap();
        assert_eq!(parsed, Emotion::Serious);
    }

    #[test]
    fn synthesis_config_default_fills_missing_fields() {
        let config: SynthesisConfig = serde_json::from_str(r#"{"speed": 1.5}"#).unwrap();
        assert_eq!(config.speed, 1.5);
        assert_eq!(config.emotion, Emotion::Neutral);
        assert_eq!(config.format, OutputFormat::Wav);
        assert!(!config.professional_mode);
    }
}
