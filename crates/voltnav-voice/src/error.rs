use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Voice enumeration error: {0}")]
    VoiceList(String),
}
