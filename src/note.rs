use std::sync::OnceLock;

use crate::util::hz_from_pitch;

pub const DEFAULT_VELOCITY: u8 = 64;

/// A request to render one note.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NoteEvent {
    /// MIDI pitch, which may be fractional to indicate tuning.
    pub pitch: f64,
    /// Onset time in seconds.
    pub onset: f64,
    /// Release time in seconds. The note sounds on for the synth's release duration.
    pub release: f64,
    /// Loudness between 0 and 127.
    pub velocity: u8,
}

impl NoteEvent {
    pub fn new(pitch: f64, onset: f64, release: f64) -> Self {
        Self {
            pitch,
            onset,
            release,
            velocity: DEFAULT_VELOCITY,
        }
    }

    pub fn with_velocity(self, velocity: u8) -> Self {
        Self {
            velocity: velocity.min(127),
            ..self
        }
    }

    /// Time between onset and release, in seconds.
    pub fn duration(&self) -> f64 {
        self.release - self.onset
    }

    pub fn frequency(&self) -> f64 {
        hz_from_pitch(self.pitch)
    }

    /// Name of the nearest equal-tempered note, e.g. `C4`.
    pub fn name(&self) -> &'static str {
        note_name(self.pitch.round().clamp(0.0, 127.0) as u8)
    }
}

impl std::fmt::Display for NoteEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {:.3}s-{:.3}s v{}",
            self.name(),
            self.onset,
            self.release,
            self.velocity
        )
    }
}

fn note_name(note: u8) -> &'static str {
    static NOTE_NAMES: OnceLock<Vec<String>> = OnceLock::new();

    let names = NOTE_NAMES.get_or_init(|| {
        let notes = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
        (0..128)
            .map(|n: usize| format!("{}{}", notes[n % 12], n as i32 / 12 - 1))
            .collect()
    });

    &names[note as usize]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_note_names() {
        assert_eq!(NoteEvent::new(60.0, 0.0, 1.0).name(), "C4");
        assert_eq!(NoteEvent::new(69.2, 0.0, 1.0).name(), "A4");
        assert_eq!(NoteEvent::new(0.0, 0.0, 1.0).name(), "C-1");
        assert_eq!(NoteEvent::new(127.0, 0.0, 1.0).name(), "G9");
    }

    #[test]
    fn test_note_event() {
        let note = NoteEvent::new(69.0, 0.5, 0.75).with_velocity(200);
        assert_eq!(note.velocity, 127);
        assert_eq!(note.duration(), 0.25);
        assert_eq!(note.frequency(), 440.0);
        assert_eq!(note.to_string(), "A4 0.500s-0.750s v127");
    }
}
