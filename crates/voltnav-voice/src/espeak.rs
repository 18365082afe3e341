//! The `espeak-ng` speech backend.
//!
//! Utterances and voice enumeration both shell out to the `espeak-ng`
//! binary. Voice settings are translated to its command-line flags.

use crate::error::VoiceError;
use crate::sink::{SpeechSink, Utterance};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use voltnav_types::VoiceInfo;

/// Maximum text size for a single utterance (4 KiB). Navigation prompts are a
/// sentence long; anything larger is a caller bug.
const MAX_UTTERANCE_BYTES: usize = 4 * 1024;

/// espeak-ng speaking speed at rate 1.0, in words per minute.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;
const MIN_WORDS_PER_MINUTE: f32 = 80.0;
const MAX_WORDS_PER_MINUTE: f32 = 450.0;
/// espeak-ng pitch at pitch 1.0 (scale 0-99).
const BASE_PITCH: f32 = 50.0;
/// espeak-ng amplitude at volume 1.0 (scale 0-200).
const BASE_AMPLITUDE: f32 = 100.0;

/// Time allowed for `espeak-ng --voices` before the child is killed.
pub const VOICE_LIST_TIMEOUT: Duration = Duration::from_secs(10);
/// How often a running `--voices` child is polled for exit.
const VOICE_LIST_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Language of the voice espeak-ng uses when none is given.
pub const ESPEAK_DEFAULT_LANGUAGE: &str = "en";

/// Speaks through the `espeak-ng` command-line synthesizer.
///
/// Each utterance runs as its own child process playing straight to the
/// default audio device. Cancelling kills that process, so the newest
/// utterance always wins.
#[derive(Debug)]
pub struct EspeakSink {
    binary: PathBuf,
    current: Option<Child>,
    voice_list_timeout: Duration,
}

impl EspeakSink {
    pub fn new(binary: impl AsRef<Path>) -> Self {
        Self {
            binary: binary.as_ref().to_path_buf(),
            current: None,
            voice_list_timeout: VOICE_LIST_TIMEOUT,
        }
    }

    /// Overrides how long voice enumeration may take.
    pub fn with_voice_list_timeout(mut self, timeout: Duration) -> Self {
        self.voice_list_timeout = timeout;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// True while a spawned utterance has not exited yet.
    pub fn is_speaking(&mut self) -> bool {
        match self.current.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

impl Default for EspeakSink {
    fn default() -> Self {
        Self::new("espeak-ng")
    }
}

/// Command-line flags for an utterance. The text itself goes to stdin.
pub fn espeak_args(utterance: &Utterance) -> Vec<String> {
    let wpm = (BASE_WORDS_PER_MINUTE * utterance.rate)
        .round()
        .clamp(MIN_WORDS_PER_MINUTE, MAX_WORDS_PER_MINUTE);
    let pitch = (BASE_PITCH * utterance.pitch).round().clamp(0.0, 99.0);
    let amplitude = (BASE_AMPLITUDE * utterance.volume).round().clamp(0.0, 200.0);

    let mut args = vec![
        "-s".to_string(),
        (wpm as u32).to_string(),
        "-p".to_string(),
        (pitch as u32).to_string(),
        "-a".to_string(),
        (amplitude as u32).to_string(),
    ];
    if let Some(voice) = &utterance.voice {
        args.push("-v".to_string());
        args.push(voice.name.clone());
    }
    args.push("--stdin".to_string());
    args
}

/// Parses the table printed by `espeak-ng --voices`.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  af              --/M      Afrikaans          gmw/af
///  2  en              --/M      English_(Great_Britain) gmw/en          (en 2)
/// ```
///
/// The language column is what `-v` accepts, so it becomes the voice name.
pub fn parse_voice_list(output: &str) -> Vec<VoiceInfo> {
    output
        .lines()
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let priority = columns.next()?;
            if priority.parse::<u32>().is_err() {
                // Header or junk.
                return None;
            }
            let language = columns.next()?;
            Some(VoiceInfo::new(
                language,
                language,
                language == ESPEAK_DEFAULT_LANGUAGE,
            ))
        })
        .collect()
}

impl SpeechSink for EspeakSink {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), VoiceError> {
        if utterance.text.len() > MAX_UTTERANCE_BYTES {
            return Err(VoiceError::Synthesis(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                utterance.text.len(),
                MAX_UTTERANCE_BYTES
            )));
        }

        // Only one child is tracked at a time.
        self.cancel();

        let mut child = Command::new(&self.binary)
            .args(espeak_args(utterance))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                VoiceError::Synthesis(format!("Failed to spawn {:?}: {}", self.binary, e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| VoiceError::Synthesis("Failed to open stdin".to_string()))?;
        // Utterances are far below the pipe buffer size, so this cannot block
        // on the child.
        let written = stdin.write_all(utterance.text.as_bytes());
        drop(stdin);

        if let Err(e) = written {
            let _ = child.kill();
            let _ = child.wait();
            return Err(VoiceError::Synthesis(format!(
                "Failed to write to espeak-ng stdin: {}",
                e
            )));
        }

        debug!(pid = child.id(), "espeak-ng utterance started");
        self.current = Some(child);
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.current.take() {
            if let Ok(None) = child.try_wait() {
                debug!(pid = child.id(), "cancelling in-flight utterance");
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }

    fn voices(&self) -> Result<Vec<VoiceInfo>, VoiceError> {
        let mut child = Command::new(&self.binary)
            .arg("--voices")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| VoiceError::VoiceList(format!("Failed to run {:?}: {}", self.binary, e)))?;

        // Drain stdout on a separate thread so a full pipe cannot stall the
        // child while we poll it.
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| VoiceError::VoiceList("Failed to open stdout".to_string()))?;
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = tx.send(stdout.read_to_end(&mut buf).map(|_| buf));
        });

        let deadline = Instant::now() + self.voice_list_timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!(binary = ?self.binary, "voice enumeration timed out");
                    return Err(VoiceError::VoiceList(format!(
                        "{:?} --voices timed out after {} ms",
                        self.binary,
                        self.voice_list_timeout.as_millis()
                    )));
                }
                Ok(None) => thread::sleep(VOICE_LIST_POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    return Err(VoiceError::VoiceList(format!(
                        "Failed to wait for {:?}: {}",
                        self.binary, e
                    )));
                }
            }
        };

        if !status.success() {
            return Err(VoiceError::VoiceList(format!(
                "{:?} --voices exited with {}",
                self.binary, status
            )));
        }

        // The child has exited; the pipe closes unless it left descendants
        // holding it, so the read gets the rest of the deadline at most.
        let remaining = deadline.saturating_duration_since(Instant::now());
        let stdout = match rx.recv_timeout(remaining.max(VOICE_LIST_POLL_INTERVAL)) {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => {
                return Err(VoiceError::VoiceList(format!(
                    "Failed to read {:?} --voices output: {}",
                    self.binary, e
                )))
            }
            Err(_) => {
                return Err(VoiceError::VoiceList(format!(
                    "{:?} --voices output did not close",
                    self.binary
                )))
            }
        };

        Ok(parse_voice_list(&String::from_utf8_lossy(&stdout)))
    }

    fn wait_until_idle(&mut self) -> Result<(), VoiceError> {
        let Some(mut child) = self.current.take() else {
            return Ok(());
        };
        let status = child
            .wait()
            .map_err(|e| VoiceError::Synthesis(format!("Failed to wait for espeak-ng: {}", e)))?;
        if status.success() {
            Ok(())
        } else {
            Err(VoiceError::Synthesis(format!(
                "espeak-ng exited with {}",
                status
            )))
        }
    }
}

impl Drop for EspeakSink {
    fn drop(&mut self) {
        self.cancel();
    }
}
