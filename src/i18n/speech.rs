//! Read-aloud through a pluggable speech synthesizer

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, warn};

use super::{translate, Language};

/// A voice offered by the synthesizer
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    pub name: String,
    /// BCP 47 tag such as `es-MX`
    pub lang: String,
}

impl Voice {
    pub fn new(name: &str, lang: &str) -> Self {
        Self {
            name: name.to_string(),
            lang: lang.to_string(),
        }
    }

    fn speaks(&self, prefix: &str) -> bool {
        self.lang.to_lowercase().starts_with(prefix)
    }
}

/// Something to be spoken
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
}

/// Platform text-to-speech
pub trait SpeechSynthesizer: Send + Sync {
    fn voices(&self) -> Vec<Voice>;
    fn speak(&self, utterance: &Utterance);
    fn cancel(&self);
}

/// Pick a voice for `language`: one in that language, else the first English
/// voice, else whatever comes first.
pub fn resolve_voice(voices: &[Voice], language: Language) -> Option<&Voice> {
    voices
        .iter()
        .find(|voice| voice.speaks(language.as_str()))
        .or_else(|| voices.iter().find(|voice| voice.speaks("en")))
        .or_else(|| voices.first())
}

/// Reads UI text aloud, one utterance at a time
pub struct Narrator {
    synth: Option<Arc<dyn SpeechSynthesizer>>,
    speaking: AtomicBool,
}

impl Narrator {
    pub fn new(synth: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            synth: Some(synth),
            speaking: AtomicBool::new(false),
        }
    }

    /// A narrator on a platform without speech support
    pub fn unsupported() -> Self {
        Self {
            synth: None,
            speaking: AtomicBool::new(false),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.synth.is_some()
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    /// Speak `text`, cutting off whatever is playing. Returns the utterance
    /// handed to the synthesizer, if any.
    pub fn speak(&self, text: &str, language: Language) -> Option<Utterance> {
        let synth = match &self.synth {
            Some(synth) => synth,
            None => {
                warn!("speech synthesis is not supported here");
                return None;
            }
        };

        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.cancel();

        let voices = synth.voices();
        let voice = resolve_voice(&voices, language).cloned();
        let lang = voice
            .as_ref()
            .map(|voice| voice.lang.clone())
            .unwrap_or_else(|| language.locale().to_string());

        let utterance = Utterance {
            text: text.to_string(),
            lang,
            voice,
            rate: 1.0,
            pitch: 1.0,
        };

        debug!("speaking {} characters in {}", utterance.text.len(), utterance.lang);
        self.speaking.store(true, Ordering::SeqCst);
        synth.speak(&utterance);
        Some(utterance)
    }

    /// Translate `key` and speak the result
    pub fn speak_key(&self, key: &str, fallback: Option<&str>, language: Language) -> Option<Utterance> {
        self.speak(&translate(language, key, fallback), language)
    }

    pub fn cancel(&self) {
        if let Some(synth) = &self.synth {
            synth.cancel();
            self.speaking.store(false, Ordering::SeqCst);
        }
    }

    /// Called by the platform when an utterance ends or fails
    pub fn finished(&self) {
        self.speaking.store(false, Ordering::SeqCst);
    }
}
