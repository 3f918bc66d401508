use std::{
    fs::File,
    io::{BufWriter, Seek, Write},
    path::Path,
};

use thiserror::Error;

/// Converts a sample between -1.0 and 1.0 to a 16-bit integer, clipping anything outside that range.
#[inline]
pub fn pcm16_from_sample(sample: f64) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f64) as i16
}

/// Encodes mono samples as headerless 16-bit signed little-endian PCM.
///
/// This is the raw export for callers that do their own framing. Use `write_wav` when a
/// player needs a RIFF header.
pub fn encode_pcm16(samples: &[f64]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|&s| pcm16_from_sample(s).to_le_bytes())
        .collect()
}

/// Writes mono samples as a 16-bit PCM WAV stream.
pub fn write_wav<W: Write + Seek>(
    writer: W,
    samples: &[f64],
    sample_rate: u32,
) -> Result<(), WriteWavError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut wav = hound::WavWriter::new(writer, spec)?;
    let mut wav_samples = wav.get_i16_writer(samples.len() as u32);
    for &sample in samples {
        wav_samples.write_sample(pcm16_from_sample(sample));
    }
    wav_samples.flush()?;
    wav.finalize()?;
    Ok(())
}

/// Writes mono samples to a 16-bit PCM WAV file at `path`.
pub fn write_wav_file(
    path: impl AsRef<Path>,
    samples: &[f64],
    sample_rate: u32,
) -> Result<(), WriteWavError> {
    let file = File::create(path)?;
    write_wav(BufWriter::new(file), samples, sample_rate)
}

#[derive(Error, Debug)]
pub enum WriteWavError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Format error: {0}")]
    BadFormat(&'static str),
    #[error("Unexpected error")]
    UnexpectedError,
}

impl From<hound::Error> for WriteWavError {
    fn from(err: hound::Error) -> Self {
        use hound::Error as A;
        use WriteWavError as B;
        match err {
            A::IoError(inner) => B::IoError(inner),
            A::FormatError(inner) => B::BadFormat(inner),
            A::Unsupported => B::BadFormat("Unsupported format"),
            _ => B::UnexpectedError,
        }
    }
}
