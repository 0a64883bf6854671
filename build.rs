//! Build script for monthlist.
//!
//! Copies the `.env.example` template into the local data directory, next to
//! the `.env` the binary reads at start-up:
//! - Linux: `~/.local/share/monthlist/.env.example`
//! - macOS: `~/Library/Application Support/monthlist/.env.example`
//! - Windows: `%LOCALAPPDATA%/monthlist/.env.example`
//!
//! A missing template only produces a cargo warning.

use std::{env, fs, path::PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let template = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("monthlist");
    fs::create_dir_all(&out_dir)?;

    if template.is_file() {
        fs::copy(&template, out_dir.join(".env.example"))?;
    } else {
        println!(
            "cargo:warning=.env.example not found at {}",
            template.display()
        );
    }

    Ok(())
}
