//! Default voice selection.

use voltnav_types::VoiceInfo;

/// Picks the voice to use for `language` (e.g. `en`).
///
/// Prefers a voice whose language tag contains `language` and which the
/// backend marks as its default, then any voice whose tag contains it.
/// Matching is case-insensitive. Returns `None` when nothing matches, in
/// which case the backend's own default is used.
pub fn select_default_voice(voices: &[VoiceInfo], language: &str) -> Option<VoiceInfo> {
    let wanted = language.to_ascii_lowercase();
    let matches = |voice: &&VoiceInfo| voice.language.to_ascii_lowercase().contains(&wanted);

    voices
        .iter()
        .filter(matches)
        .find(|voice| voice.is_default)
        .or_else(|| voices.iter().find(matches))
        .cloned()
}
