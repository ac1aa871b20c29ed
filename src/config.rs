/// External configuration loader.
///
/// Reads `sneakers.toml` from the executable's directory (or CWD).
/// Falls back to the built-in speeds if the file is missing or incomplete;
/// explicit command line flags override both.

use serde::Deserialize;
use std::path::PathBuf;

use crate::effect::phases::Speeds;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct EffectConfig {
    pub speed: Speeds,
    pub chars_per_key: usize,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    hackertyper: TomlTyper,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_type_effect")]
    type_effect: f64,
    #[serde(default = "default_jumble_seconds")]
    jumble_seconds: f64,
    #[serde(default = "default_jumble_loop")]
    jumble_loop: f64,
    #[serde(default = "default_reveal_loop")]
    reveal_loop: f64,
}

#[derive(Deserialize, Debug)]
struct TomlTyper {
    #[serde(default = "default_chars_per_key")]
    chars_per_key: usize,
}

// ── Defaults ──

fn default_type_effect() -> f64 { Speeds::DEFAULT.type_effect }
fn default_jumble_seconds() -> f64 { Speeds::DEFAULT.jumble_seconds }
fn default_jumble_loop() -> f64 { Speeds::DEFAULT.jumble_loop }
fn default_reveal_loop() -> f64 { Speeds::DEFAULT.reveal_loop }
fn default_chars_per_key() -> usize { 1 }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            type_effect: default_type_effect(),
            jumble_seconds: default_jumble_seconds(),
            jumble_loop: default_jumble_loop(),
            reveal_loop: default_reveal_loop(),
        }
    }
}

impl Default for TomlTyper {
    fn default() -> Self {
        TomlTyper {
            chars_per_key: default_chars_per_key(),
        }
    }
}

// ── Loading ──

impl EffectConfig {
    /// Load config from `sneakers.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());

        EffectConfig {
            speed: Speeds {
                type_effect: toml_cfg.speed.type_effect,
                jumble_seconds: toml_cfg.speed.jumble_seconds,
                jumble_loop: toml_cfg.speed.jumble_loop,
                reveal_loop: toml_cfg.speed.reveal_loop,
            },
            chars_per_key: toml_cfg.hackertyper.chars_per_key,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds its config.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for sneakers.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("sneakers.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: sneakers.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
