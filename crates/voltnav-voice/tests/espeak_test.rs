//! Exercises `EspeakSink` against a stand-in `espeak-ng` shell script.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use voltnav_types::{VoiceInfo, VoiceSettings};
use voltnav_voice::{EspeakSink, InstructionAnnouncer, SpeechSink, Utterance, VoiceError};

/// Serializes script creation and spawning. Forking while another test still
/// holds a freshly written script open for writing makes `exec` fail with
/// ETXTBSY.
static SPAWN_LOCK: Mutex<()> = Mutex::new(());

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A script that logs its arguments and stdin, and answers `--voices`.
fn recording_script(dir: &Path) -> PathBuf {
    let log = dir.join("calls.log");
    let body = format!(
        r#"if [ "$1" = "--voices" ]; then
  echo "Pty Language       Age/Gender VoiceName          File"
  echo " 5  en-us           --/M      English_(America)  gmw/en-US"
  echo " 2  en              --/M      English            gmw/en"
  exit 0
fi
echo "args: $*" >> "{log}"
echo "text: $(cat)" >> "{log}""#,
        log = log.display()
    );
    write_script(dir, "espeak-ng", &body)
}

#[test]
fn speaks_text_via_stdin_with_mapped_flags() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let mut sink = EspeakSink::new(recording_script(dir.path()));

    let settings = VoiceSettings {
        rate: 2.0,
        voice: Some(VoiceInfo::new("en-us", "en-us", false)),
        ..Default::default()
    };
    sink.speak(&Utterance::new("In 300 meters, turn left", &settings))
        .unwrap();
    sink.wait_until_idle().unwrap();

    let log = fs::read_to_string(dir.path().join("calls.log")).unwrap();
    assert_eq!(
        log,
        "args: -s 350 -p 50 -a 80 -v en-us --stdin\ntext: In 300 meters, turn left\n"
    );
}

#[test]
fn lists_voices_from_binary() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let sink = EspeakSink::new(recording_script(dir.path()));

    let voices = sink.voices().unwrap();
    assert_eq!(
        voices,
        vec![
            VoiceInfo::new("en-us", "en-us", false),
            VoiceInfo::new("en", "en", true),
        ]
    );
}

#[test]
fn cancel_kills_in_flight_utterance() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "espeak-ng", "cat > /dev/null\nexec sleep 30");
    let mut sink = EspeakSink::new(script);

    sink.speak(&Utterance::new("Continue north", &VoiceSettings::default()))
        .unwrap();
    assert!(sink.is_speaking());

    let started = Instant::now();
    sink.cancel();
    assert!(!sink.is_speaking());
    assert!(started.elapsed() < Duration::from_secs(10));

    // Nothing left to wait for.
    sink.wait_until_idle().unwrap();
}

#[test]
fn failing_binary_surfaces_exit_status() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "espeak-ng", "cat > /dev/null\nexit 3");
    let mut sink = EspeakSink::new(script);

    sink.speak(&Utterance::new("Arriving", &VoiceSettings::default()))
        .unwrap();
    match sink.wait_until_idle() {
        Err(VoiceError::Synthesis(msg)) => assert!(msg.contains("exited"), "got: {msg}"),
        other => panic!("expected exit status error, got {:?}", other),
    }
    assert!(matches!(sink.voices(), Err(VoiceError::VoiceList(_))));
}

#[test]
fn hung_voice_listing_is_killed_at_the_deadline() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "espeak-ng", "exec sleep 30");
    let sink = EspeakSink::new(script).with_voice_list_timeout(Duration::from_millis(200));

    let started = Instant::now();
    match sink.voices() {
        Err(VoiceError::VoiceList(msg)) => assert!(msg.contains("timed out"), "got: {msg}"),
        other => panic!("expected timeout, got {:?}", other),
    }
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn initialize_gives_up_on_a_hung_binary() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "espeak-ng", "exec sleep 30");
    let sink = EspeakSink::new(script).with_voice_list_timeout(Duration::from_millis(200));
    let mut announcer = InstructionAnnouncer::new(sink);

    let started = Instant::now();
    announcer.initialize("en");
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(announcer.settings().voice, None);
}
