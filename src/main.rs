use std::{
    fs,
    io::{self, BufRead, Write},
    path::Path,
    process,
};

use log::{error, warn};
use malsynth::{
    config::Config,
    demo::{play_preset, PlaybackError},
    presets::{self, Preset},
};

enum Selection {
    One(&'static Preset),
    All,
    Quit,
}

fn welcome() {
    let welcome = "malsynth demo";
    println!("{welcome}");
    println!("{}", "-".repeat(welcome.len()));
    println!();
}

fn print_menu() {
    let catalog = presets::catalog();
    for (i, preset) in catalog.iter().enumerate() {
        println!("{i:>3}: {}", preset.name);
    }
    println!("{:>3}: Play all synths", catalog.len());
}

/// Prompts until the user picks a preset, all presets, or quits.
fn select(input: &mut impl BufRead) -> io::Result<Selection> {
    let all = presets::catalog().len().to_string();
    loop {
        print!("\nEnter the number corresponding to the synth you would like to hear ('q' to quit): ");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(Selection::Quit);
        }
        let answer = line.trim();

        if answer == "q" {
            return Ok(Selection::Quit);
        }
        if answer == all {
            return Ok(Selection::All);
        }
        match answer.parse().map(presets::get) {
            Ok(Ok(preset)) => return Ok(Selection::One(preset)),
            _ => println!("Invalid input, try again."),
        }
    }
}

fn play(preset: &Preset, config: &Config, path: &Path) -> Result<(), PlaybackError> {
    let result = play_preset(preset, config, path);
    if let Err(err) = fs::remove_file(path) {
        warn!("Failed to remove {}: {err}", path.display());
    }
    result
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = Config::from_env();
    let wav_path = std::env::temp_dir().join(format!("malsynth-{}.wav", process::id()));

    welcome();
    print_menu();

    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        let selected = match select(&mut input) {
            Ok(Selection::Quit) => return,
            Ok(Selection::All) => presets::catalog().iter().collect(),
            Ok(Selection::One(preset)) => vec![preset],
            Err(err) => {
                error!("Failed to read input: {err}");
                process::exit(1);
            }
        };

        for preset in selected {
            if let Err(err) = play(preset, &config, &wav_path) {
                error!("{err}");
                break;
            }
        }
        println!();
    }
}
