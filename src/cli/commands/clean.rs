//! Stand-alone text normalization.

use std::io::Read;
use std::path::Path;

use crate::error::ResultExt;
use crate::normalize;

/// Normalize lyrics from `path` (or stdin) and print the result.
pub fn cmd_clean(path: Option<&Path>) -> anyhow::Result<()> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(format!("Reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .with_context("Reading stdin")?;
            buf
        }
    };

    match normalize::normalize(&raw) {
        Some(clean) => println!("{}", clean),
        None => println!("<too short>"),
    }
    Ok(())
}
