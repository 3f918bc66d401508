//! A catalog of ready-made synth configurations.
//!
//! Every preset is a plain `SynthOpts` built by overriding one of a few base configurations.

use thiserror::Error;

use crate::{
    filter::FilterOpts,
    synth::{
        oscillators::{Oscillator, Waveform},
        Synth, SynthError, SynthOpts,
    },
};

pub struct Preset {
    pub name: &'static str,
    opts: fn(u32) -> SynthOpts,
}

impl Preset {
    pub fn opts(&self, sample_rate: u32) -> SynthOpts {
        (self.opts)(sample_rate)
    }

    pub fn build(&self, sample_rate: u32) -> Result<Synth, SynthError> {
        Synth::new(self.opts(sample_rate))
    }
}

impl std::fmt::Debug for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PresetError {
    #[error("No preset with id {0}")]
    UnknownId(usize),
    #[error("No preset named {0:?}")]
    UnknownName(String),
    #[error("Invalid preset: {0}")]
    Synth(#[from] SynthError),
}

macro_rules! preset {
    ($name:literal, $opts:ident) => {
        Preset {
            name: $name,
            opts: $opts,
        }
    };
}

static PRESETS: [Preset; 25] = [
    preset!("Sine", sine),
    preset!("Saw", saw),
    preset!("Square", square),
    preset!("FilteredSaw", filtered_saw),
    preset!("FollowSaw", follow_saw),
    preset!("FilteredSquare", filtered_square),
    preset!("FollowSquare", follow_square),
    preset!("FilteredDoubleSaw", filtered_double_saw),
    preset!("DoubleFollowSaw", double_follow_saw),
    preset!("DoubleFollowSquare", double_follow_square),
    preset!("DoubleSaw", double_saw),
    preset!("DoubleSquare", double_square),
    preset!("TripleSine", triple_sine),
    preset!("ShortSine", short_sine),
    preset!("ShortSaw", short_saw),
    preset!("ShortSquare", short_square),
    preset!("ShortFollowSaw", short_follow_saw),
    preset!("ShortFollowSquare", short_follow_square),
    preset!("ShortDoubleSaw", short_double_saw),
    preset!("ShortDoubleFollowSaw", short_double_follow_saw),
    preset!("ShortDoubleFollowSquare", short_double_follow_square),
    preset!("ShortTripleSine", short_triple_sine),
    preset!("Noise", noise),
    preset!("ShortNoise", short_noise),
    preset!("FilteredShortNoise", filtered_short_noise),
];

/// All presets, in menu order. A preset's id is its index.
pub fn catalog() -> &'static [Preset] {
    &PRESETS
}

pub fn get(id: usize) -> Result<&'static Preset, PresetError> {
    PRESETS.get(id).ok_or(PresetError::UnknownId(id))
}

pub fn by_name(name: &str) -> Result<&'static Preset, PresetError> {
    PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| PresetError::UnknownName(name.to_string()))
}

const STATIC_LOWPASS: FilterOpts = FilterOpts::Static {
    cutoff: 440.0,
    order: 1,
};

const FOLLOW_LOWPASS: FilterOpts = FilterOpts::PitchTracking {
    factor: 0.5,
    order: 1,
};

fn detuned_pair(detune: f64) -> Vec<Oscillator> {
    vec![Oscillator::default(), Oscillator::detuned(detune)]
}

fn detuned_triple(detune: f64) -> Vec<Oscillator> {
    vec![
        Oscillator::default(),
        Oscillator::detuned(detune),
        Oscillator::detuned(-detune),
    ]
}

/// Decays to silence rather than sustaining.
fn short(decay: f64, opts: SynthOpts) -> SynthOpts {
    SynthOpts {
        decay,
        sustain: 0.0,
        ..opts
    }
}

fn sine(sample_rate: u32) -> SynthOpts {
    SynthOpts::new(sample_rate)
}

fn saw(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        waveform: Waveform::Saw,
        amp: 0.3,
        ..SynthOpts::new(sample_rate)
    }
}

fn square(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        waveform: Waveform::Square,
        amp: 0.3,
        ..SynthOpts::new(sample_rate)
    }
}

fn noise(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        waveform: Waveform::Noise,
        amp: 0.3,
        ..SynthOpts::new(sample_rate)
    }
}

fn filtered_saw(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        amp: 1.0,
        filter: Some(STATIC_LOWPASS),
        ..saw(sample_rate)
    }
}

fn follow_saw(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        amp: 0.6,
        filter: Some(FOLLOW_LOWPASS),
        ..saw(sample_rate)
    }
}

fn filtered_square(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        amp: 1.0,
        filter: Some(STATIC_LOWPASS),
        ..square(sample_rate)
    }
}

fn follow_square(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        amp: 0.6,
        filter: Some(FOLLOW_LOWPASS),
        ..square(sample_rate)
    }
}

fn double_saw(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        amp: 0.2,
        oscillators: detuned_pair(0.1),
        ..saw(sample_rate)
    }
}

fn double_square(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        amp: 0.2,
        oscillators: detuned_pair(0.25),
        ..square(sample_rate)
    }
}

fn triple_sine(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        amp: 0.5,
        oscillators: detuned_triple(0.15),
        ..sine(sample_rate)
    }
}

fn filtered_double_saw(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        amp: 0.3,
        filter: Some(FilterOpts::Static {
            cutoff: 2500.0,
            order: 3,
        }),
        ..double_saw(sample_rate)
    }
}

fn double_follow_saw(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        oscillators: detuned_pair(0.1),
        filter: Some(FilterOpts::PitchTracking {
            factor: 0.75,
            order: 1,
        }),
        ..follow_saw(sample_rate)
    }
}

fn double_follow_square(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        amp: 0.3,
        oscillators: detuned_pair(0.1),
        filter: Some(FilterOpts::PitchTracking {
            factor: 1.5,
            order: 1,
        }),
        ..follow_square(sample_rate)
    }
}

fn short_sine(sample_rate: u32) -> SynthOpts {
    short(0.15, sine(sample_rate))
}

fn short_saw(sample_rate: u32) -> SynthOpts {
    short(0.2, saw(sample_rate))
}

fn short_square(sample_rate: u32) -> SynthOpts {
    short(0.1, square(sample_rate))
}

fn short_follow_saw(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        release: 0.1,
        ..short(0.1, follow_saw(sample_rate))
    }
}

fn short_follow_square(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        release: 0.1,
        ..short(0.1, follow_square(sample_rate))
    }
}

fn short_double_saw(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        amp: 0.4,
        release: 0.15,
        ..short(0.3, double_saw(sample_rate))
    }
}

fn short_double_follow_saw(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        amp: 0.8,
        release: 0.15,
        ..short(0.2, double_follow_saw(sample_rate))
    }
}

fn short_double_follow_square(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        amp: 0.7,
        release: 0.15,
        ..short(0.15, double_follow_square(sample_rate))
    }
}

fn short_triple_sine(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        release: 0.08,
        ..short(0.15, triple_sine(sample_rate))
    }
}

fn short_noise(sample_rate: u32) -> SynthOpts {
    short(0.1, noise(sample_rate))
}

fn filtered_short_noise(sample_rate: u32) -> SynthOpts {
    SynthOpts {
        filter: Some(FilterOpts::Static {
            cutoff: 4000.0,
            order: 3,
        }),
        ..short_noise(sample_rate)
    }
}
