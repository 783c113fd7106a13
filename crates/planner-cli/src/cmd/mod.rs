//! Subcommand handlers.

pub mod check;
pub mod process;

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::Context as _;

/// Read the input document text from a file, or stdin when no path is given.
pub fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading document from stdin")?;
            Ok(text)
        }
    }
}
