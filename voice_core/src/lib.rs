//! Client for the remote voice analysis and speech synthesis service.

mod profile;

pub use profile::{
    Emotion, Gender, OutputFormat, PrebuiltVoice, SynthesisConfig, VoiceProfile,
};

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_ANALYSIS_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Explicit client configuration. Credentials are passed in here rather than
/// read from ambient process state inside the client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub analysis_model: String,
    pub tts_model: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            analysis_model: DEFAULT_ANALYSIS_MODEL.into(),
            tts_model: DEFAULT_TTS_MODEL.into(),
        }
    }

    /// Read the API key from `GEMINI_API_KEY`. Meant for the composition
    /// root only; everything downstream takes the config by value.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .context("GEMINI_API_KEY must be set in the environment")?;
        Ok(Self::new(api_key))
    }
}

// Wire format of the generateContent endpoint.

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize)]
struct InlineData {
    data: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(rename = "responseModalities", skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(rename = "speechConfig", skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Serialize)]
struct SpeechConfig {
    #[serde(rename = "voiceConfig")]
    voice_config: VoiceConfig,
}

#[derive(Serialize)]
struct VoiceConfig {
    #[serde(rename = "prebuiltVoiceConfig")]
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Serialize)]
struct PrebuiltVoiceConfig {
    #[serde(rename = "voiceName")]
    voice_name: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<CandidateInlineData>,
}

#[derive(Deserialize)]
struct CandidateInlineData {
    data: String,
}

impl GenerateResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .find_map(|p| p.text.as_deref())
    }

    fn first_audio(&self) -> Option<&str> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .find_map(|p| p.inline_data.as_ref().map(|d| d.data.as_str()))
    }
}

pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { config, client })
    }

    fn generate(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, model
        );
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(request)
            .send()?
            .error_for_status()? // convert non-200 into error
            .json::<GenerateResponse>()?;
        Ok(response)
    }

    /// Analyze an uploaded voice sample (base64 audio plus its mime type)
    /// and return the model's profile of the speaker.
    pub fn analyze_voice(&self, audio_base64: &str, mime_type: &str) -> Result<VoiceProfile> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            data: audio_base64.to_string(),
                            mime_type: mime_type.to_string(),
                        }),
                    },
                    Part {
                        text: Some(analysis_prompt()),
                        inline_data: None,
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".into()),
                response_modalities: None,
                speech_config: None,
            }),
        };

        let response = self.generate(&self.config.analysis_model, &request)?;
        let text = response.first_text().unwrap_or("{}");
        Ok(VoiceProfile::parse_model_output(text))
    }

    /// Synthesize speech for `text` in the analyzed speaker's voice.
    ///
    /// Returns the raw base64 PCM payload (16-bit mono at 24 kHz); WAV
    /// rendering is the caller's concern.
    pub fn synthesize(
        &self,
        text: &str,
        profile: &VoiceProfile,
        config: &SynthesisConfig,
    ) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(synthesis_prompt(text, profile, config)),
                    inline_data: None,
                }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: None,
                response_modalities: Some(vec!["AUDIO".into()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: profile.best_match_voice.as_str().into(),
                        },
                    },
                }),
            }),
        };

        let response = self.generate(&self.config.tts_model, &request)?;
        response
            .first_audio()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("synthesis returned no audio data"))
    }
}

fn analysis_prompt() -> String {
    let voices: Vec<&str> = PrebuiltVoice::ALL.iter().map(|v| v.as_str()).collect();
    format!(
        "VOICE ANALYSIS & TRANSCRIPTION TASK:\n\
         1. IDENTITY: Deconstruct this speaker's timbre, gender, and regional accent patterns.\n\
         2. TRANSCRIPTION: Transcribe the exact words spoken in the audio sample.\n\n\
         MANDATORY: Map identity to closest base voice from: {}.\n\
         (Use 'Aoede' for female voices.)\n\n\
         Return JSON format:\n\
         {{\n\
           \"gender\": \"Female\" | \"Male\",\n\
           \"characteristics\": [\"list\", \"of\", \"traits\"],\n\
           \"bestMatchVoice\": \"string\",\n\
           \"neuralIdentityDescriptor\": \"Detailed description for a TTS engine to mirror this voice precisely.\",\n\
           \"accent\": \"string\",\n\
           \"suggestedScript\": \"The full transcription of the provided audio.\",\n\
           \"pitch\": 1.0,\n\
           \"pacing\": 1.0,\n\
           \"name\": \"Cloned Identity\"\n\
         }}",
        voices.join(", ")
    )
}

fn synthesis_prompt(text: &str, profile: &VoiceProfile, config: &SynthesisConfig) -> String {
    let professional_directives = if config.professional_mode {
        "\nPROFESSIONAL MASTERING:\n\
         - Eliminate background noise, room echo, and vocal artifacts.\n\
         - Ensure crisp articulation of vowels and consonants.\n\
         - Balance the frequency response for a broadcast feel.\n\
         - Professional, authoritative yet natural pacing.\n"
    } else {
        ""
    };

    format!(
        "TASK: Reconstruct the following text using the analyzed vocal identity fingerprint.\n\
         GENDER: {:?}\n\
         IDENTITY: {}\n\
         ACCENT: {}\n\
         EMOTION: {}\n\
         SPEED: {}x\n\
         {}\n\
         MANDATORY: Maintain the exact timbre of the original speaker.\n\n\
         TEXT TO SYNTHESIZE: \"{}\"",
        profile.gender,
        profile.neural_identity_descriptor,
        profile.accent,
        config.emotion.as_str(),
        config.speed,
        professional_directives,
        text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_prompt_lists_all_voices() {
        let prompt = analysis_prompt();
        for voice in PrebuiltVoice::ALL {
            assert!(prompt.contains(voice.as_str()));
        }
        assert!(prompt.contains("bestMatchVoice"));
    }

    #[test]
    fn synthesis_prompt_reflects_config() {
        let profile = VoiceProfile::default();
        let config = SynthesisConfig {
            emotion: Emotion::Excited,
            speed: 1.25,
            professional_mode: true,
            ..Default::default()
        };
        let prompt = synthesis_prompt("Hello world", &profile, &config);
        assert!(prompt.contains("EMOTION: excited"));
        assert!(prompt.contains("SPEED: 1.25x"));
        assert!(prompt.contains("PROFESSIONAL MASTERING"));
        assert!(prompt.contains("\"Hello world\""));
    }

    #[test]
    fn plain_config_omits_mastering_directives() {
        let prompt = synthesis_prompt(
            "Hi",
            &VoiceProfile::default(),
            &SynthesisConfig::default(),
        );
        assert!(!prompt.contains("PROFESSIONAL MASTERING"));
    }

    #[test]
    fn audio_extraction_finds_inline_data() {
        let raw = r#"{
            "candidates": [{
                "content": { "parts": [
                    { "text": "ignored" },
                    { "inlineData": { "data": "UENN" } }
                ]}
            }]
        }"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.first_audio(), Some("UENN"));
        assert_eq!(response.first_text(), Some("ignored"));
    }

    #[test]
    fn empty_candidates_yield_no_audio() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(response.first_audio().is_none());
    }
}
