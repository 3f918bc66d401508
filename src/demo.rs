//! Renders a short phrase with a synth and plays it through an external command.

use std::{io, path::Path, process::Command};

use log::{debug, info};
use thiserror::Error;

use crate::{
    audio::{
        operations::{peak, scale_samples},
        wav::{write_wav_file, WriteWavError},
    },
    config::Config,
    note::NoteEvent,
    presets::{Preset, PresetError},
    synth::Synth,
};

/// The demo phrase, as `(pitch, duration, wait)` in seconds. Each note starts `wait` after the last.
pub const DEMO_PHRASE: [(f64, f64, f64); 8] = [
    (60.0, 1.0, 1.0),
    (65.0, 0.5, 0.5),
    (67.0, 0.25, 0.25),
    (72.0, 0.25, 0.25),
    (48.0, 0.25, 0.5),
    (58.0, 0.25, 0.5),
    (60.0, 0.125, 0.25),
    (72.0, 0.125, 0.25),
];

/// Time added after the phrase for the last notes to ring out, in seconds.
const TAIL: f64 = 1.0;

/// Headroom so that overlapping notes don't clip.
const HEADROOM: f64 = 1.1;

/// Sample times from zero for `duration` seconds, excluding the end point.
pub fn time_axis(duration: f64, sample_rate: u32) -> Vec<f64> {
    let n = (duration * sample_rate as f64).ceil() as usize;
    let step = duration / n.max(1) as f64;
    (0..n).map(|i| i as f64 * step).collect()
}

/// The notes of the demo phrase, at the default velocity.
pub fn phrase_notes() -> Vec<NoteEvent> {
    let mut now = 0.0;
    DEMO_PHRASE
        .iter()
        .map(|&(pitch, duration, wait)| {
            let note = NoteEvent::new(pitch, now, now + duration);
            now += wait;
            note
        })
        .collect()
}

/// Length of the rendered demo phrase in seconds.
pub fn phrase_duration() -> f64 {
    DEMO_PHRASE.iter().map(|&(_, _, wait)| wait).sum::<f64>() + TAIL
}

/// Renders the demo phrase into a new buffer.
pub fn render_phrase(synth: &Synth) -> Vec<f64> {
    let t = time_axis(phrase_duration(), synth.sample_rate());
    let mut out = vec![0.0; t.len()];
    for note in phrase_notes() {
        debug!("Rendering {note}");
        synth.render_note(&t, &mut out, &note);
    }
    scale_samples(&mut out, HEADROOM.recip());
    debug!("Rendered {} samples, peaking at {:.3}", out.len(), peak(&out));
    out
}

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error(transparent)]
    Preset(#[from] PresetError),
    #[error("Failed to write WAV file: {0}")]
    Wav(#[from] WriteWavError),
    #[error("Failed to run {player:?}: {source}")]
    Spawn { player: String, source: io::Error },
    #[error("{player:?} exited with {status}")]
    Player {
        player: String,
        status: std::process::ExitStatus,
    },
}

/// Plays a WAV file with the external `player` command, waiting for it to finish.
pub fn play_file(player: &str, path: &Path) -> Result<(), PlaybackError> {
    let status = Command::new(player)
        .arg(path)
        .status()
        .map_err(|source| PlaybackError::Spawn {
            player: player.to_string(),
            source,
        })?;
    if !status.success() {
        return Err(PlaybackError::Player {
            player: player.to_string(),
            status,
        });
    }
    Ok(())
}

/// Renders the demo phrase with `preset`, writes it to `path` and plays it.
pub fn play_preset(preset: &Preset, config: &Config, path: &Path) -> Result<(), PlaybackError> {
    let synth = preset.build(config.sample_rate).map_err(PresetError::from)?;
    let samples = render_phrase(&synth);
    write_wav_file(path, &samples, config.sample_rate)?;
    info!("Playing {}", preset.name);
    play_file(&config.player, path)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::presets;

    #[test]
    fn test_time_axis() {
        let t = time_axis(0.5, 8);
        assert_eq!(t, [0.0, 0.125, 0.25, 0.375]);
        assert_eq!(time_axis(1.0, 44100).len(), 44100);
        assert_eq!(time_axis(0.00001, 44100).len(), 1);
        assert!(time_axis(0.0, 44100).is_empty());
    }

    #[test]
    fn test_phrase_notes() {
        let notes = phrase_notes();
        assert_eq!(notes.len(), 8);
        assert_eq!(notes[0], NoteEvent::new(60.0, 0.0, 1.0));
        assert_eq!(notes[1], NoteEvent::new(65.0, 1.0, 1.5));
        assert_eq!(notes[7].onset, 3.25);
        assert_eq!(phrase_duration(), 4.5);
    }

    #[test]
    fn test_render_phrase() {
        let synth = presets::by_name("Sine").unwrap().build(8000).unwrap();
        let out = render_phrase(&synth);
        assert_eq!(out.len(), 36000);
        assert!(out.iter().all(|s| s.abs() <= 1.0));
        assert!(out.iter().any(|&s| s != 0.0));
        // Nothing sounds after the last release.
        assert!(out[3 * 8000 + 4000..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_missing_player() {
        let result = play_file("malsynth-no-such-player", Path::new("missing.wav"));
        assert!(matches!(result, Err(PlaybackError::Spawn { .. })));
    }
}
