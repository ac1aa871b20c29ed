/// Entry point for the decryption effect.

use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use sneakers::config::EffectConfig;
use sneakers::source;
use sneakers::ui::clock::WallClock;
use sneakers::ui::screen::TermScreen;
use sneakers::{Decryptor, Outcome, RandomSource, Speeds};

/// Movie-style terminal decryption: the text types in masked, scrambles
/// for a while, then decodes character by character.
///
/// SOURCE is a file path, an http(s) URL, or `-` for stdin. Any key
/// advances past the pauses; Ctrl+C, Esc or q aborts.
#[derive(Parser, Debug)]
#[command(name = "sneakers")]
#[command(author, version, about)]
struct Cli {
    /// Text to decrypt: file path, http(s) URL, or `-` for stdin
    source: String,

    /// Seconds per typed mask glyph
    #[arg(short = 's', long)]
    type_effect_speed: Option<f64>,

    /// How long the jumble phase runs, in seconds
    #[arg(short = 'j', long)]
    jumble_seconds: Option<f64>,

    /// Seconds between jumble frames
    #[arg(short = 'l', long)]
    jumble_loop_speed: Option<f64>,

    /// Seconds between reveal frames
    #[arg(short = 'r', long)]
    reveal_loop_speed: Option<f64>,
}

impl Cli {
    /// Built-in speeds, overlaid by sneakers.toml, overlaid by flags.
    fn speeds(&self, base: Speeds) -> Speeds {
        let mut speeds = base;
        if let Some(v) = self.type_effect_speed {
            speeds.type_effect = v;
        }
        if let Some(v) = self.jumble_seconds {
            speeds.jumble_seconds = v;
        }
        if let Some(v) = self.jumble_loop_speed {
            speeds.jumble_loop = v;
        }
        if let Some(v) = self.reveal_loop_speed {
            speeds.reveal_loop = v;
        }
        speeds
    }
}

fn main() {
    process::exit(match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    });
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    let speeds = cli.speeds(EffectConfig::load().speed);
    if let Err(e) = speeds.validate() {
        eprintln!("Error: {e}");
        return Ok(2);
    }

    let text = source::load_text(&cli.source)?;

    // Everything that can fail loudly now has; switch the screen over.
    let screen = TermScreen::new().context("terminal init failed")?;
    let mut effect = Decryptor::new(screen, WallClock, RandomSource::from_entropy(), speeds);

    let outcome = effect.run(&text);
    let cleanup = effect.screen.restore();

    // Report only after the terminal is back to normal.
    let outcome = outcome.context("drawing failed")?;
    cleanup.context("terminal cleanup failed")?;
    println!();

    Ok(match outcome {
        Outcome::Completed => 0,
        Outcome::Interrupted => 130,
    })
}
