use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("{0} is not available")]
    Unavailable(&'static str),

    #[error("capability failed: {0}")]
    Failed(String),
}

/// Produce a transcript from live audio. `stop` must release the microphone
/// unconditionally, including on abnormal exit.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self) -> Result<String, CapabilityError>;

    fn stop(&self);
}

/// Speak a given text aloud.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn speak(&self, text: &str) -> Result<(), CapabilityError>;
}

/// Placeholder for platforms without speech recognition.
pub struct UnavailableRecognizer;

#[async_trait]
impl SpeechRecognizer for UnavailableRecognizer {
    async fn recognize(&self) -> Result<String, CapabilityError> {
        Err(CapabilityError::Unavailable("speech recognition"))
    }

    fn stop(&self) {}
}

/// Placeholder for platforms without speech synthesis.
pub struct UnavailableSynthesizer;

#[async_trait]
impl SpeechSynthesizer for UnavailableSynthesizer {
    async fn speak(&self, _text: &str) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unavailable("speech synthesis"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceSessionState {
    Idle,
    Listening,
    Speaking,
    Error,
}

/// One voice-chat session: listen for a transcript, optionally speak the
/// reply. A failed capability parks the session in `Error` and makes it
/// inert instead of retrying the platform on every call.
pub struct VoiceSession {
    recognizer: Box<dyn SpeechRecognizer>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    state: VoiceSessionState,
}

impl VoiceSession {
    pub fn new(recognizer: Box<dyn SpeechRecognizer>, synthesizer: Box<dyn SpeechSynthesizer>) -> Self {
        Self {
            recognizer,
            synthesizer,
            state: VoiceSessionState::Idle,
        }
    }

    pub fn state(&self) -> VoiceSessionState {
        self.state
    }

    /// Listen once. `Ok(Some(text))` is a terminal transcript, `Ok(None)`
    /// means nothing usable was heard.
    pub async fn listen(&mut self) -> Result<Option<String>, CapabilityError> {
        if self.state == VoiceSessionState::Error {
            return Err(CapabilityError::Unavailable("voice session"));
        }

        self.state = VoiceSessionState::Listening;
        match self.recognizer.recognize().await {
            Ok(transcript) => {
                self.state = VoiceSessionState::Idle;
                let transcript = transcript.trim().to_string();
                if transcript.is_empty() {
                    debug!("No speech detected");
                    Ok(None)
                } else {
                    Ok(Some(transcript))
                }
            }
            Err(err) => {
                self.state = VoiceSessionState::Error;
                Err(err)
            }
        }
    }

    /// Speak the assistant reply. Best-effort: a synthesis failure is logged
    /// and leaves the session usable.
    pub async fn speak_reply(&mut self, text: &str) {
        if self.state == VoiceSessionState::Error {
            return;
        }

        self.state = VoiceSessionState::Speaking;
        if let Err(err) = self.synthesizer.speak(text).await {
            warn!(error = %err, "Speech synthesis failed");
        }
        self.state = VoiceSessionState::Idle;
    }
}

impl Drop for VoiceSession {
    // The microphone is released however the session ends
    fn drop(&mut self) {
        self.recognizer.stop();
    }
}
