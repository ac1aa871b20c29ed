/// Where the text comes from: stdin, a local file, or an http(s) URL.
///
/// Loading happens fully up front, before any terminal mode switch, so
/// failures print as ordinary errors and leave the screen untouched.

use std::fs;
use std::io::Read;

use anyhow::{Context, Result};

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Read the whole text behind `source` into memory. `-` means stdin.
pub fn load_text(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        Ok(text)
    } else if is_url(source) {
        ureq::get(source)
            .call()
            .with_context(|| format!("fetching {source}"))?
            .into_string()
            .with_context(|| format!("reading response from {source}"))
    } else {
        fs::read_to_string(source).with_context(|| format!("reading {source}"))
    }
}
