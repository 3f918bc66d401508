pub mod audio;
pub mod config;
pub mod demo;
pub mod filter;
pub mod note;
pub mod presets;
pub mod synth;
pub mod util;

pub use note::NoteEvent;
pub use synth::{Synth, SynthError, SynthOpts};
