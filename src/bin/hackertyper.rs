/// Entry point for the keypress-gated typing effect.

use std::io::{self, Write};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use sneakers::config::EffectConfig;
use sneakers::effect::typer::Typer;
use sneakers::source;
use sneakers::ui::screen::{self, KeyPress, RawMode};

/// Fake typing for the cameras: every key you mash types the next few
/// characters of the loaded text, so the output is always flawless.
///
/// SOURCE is a file path, an http(s) URL, or `-` for stdin. Ctrl+C or
/// Esc stops early.
#[derive(Parser, Debug)]
#[command(name = "hackertyper")]
#[command(author, version, about)]
struct Cli {
    /// Text to type: file path, http(s) URL, or `-` for stdin
    source: String,

    /// Characters typed per keypress
    #[arg(short, long)]
    speed: Option<usize>,
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

    let step = cli.speed.unwrap_or_else(|| EffectConfig::load().chars_per_key);
    if step == 0 {
        eprintln!("Error: --speed must be at least 1");
        return Ok(2);
    }

    let text = source::load_text(&cli.source)?;
    let mut typer = Typer::new(&text, step);

    // No alternate screen here: the typed text should stay in the
    // scrollback when the effect ends.
    let mut raw = RawMode::enter().context("terminal init failed")?;
    let result = type_along(&mut typer);
    let cleanup = raw.restore();

    let interrupted = result.context("typing failed")?;
    cleanup.context("terminal cleanup failed")?;
    println!();

    Ok(if interrupted { 130 } else { 0 })
}

/// One keypress, one chunk. Returns true if the user bailed out early.
fn type_along(typer: &mut Typer) -> io::Result<bool> {
    let mut out = io::stdout();
    while !typer.done() {
        if screen::read_typing_key()? == KeyPress::Interrupt {
            return Ok(true);
        }
        for &ch in typer.next_chunk() {
            screen::put_raw(&mut out, ch)?;
        }
        out.flush()?;
    }
    Ok(false)
}
