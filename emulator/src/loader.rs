//! Flat-binary image loading.
//!
//! The program arrives as a raw binary file read in its entirety; the
//! resulting byte count is the loaded length and defines where the
//! instruction stream ends. Everything here is resolved before the core
//! runs — a bad file never reaches the execution loop.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use rv64_core::MemoryImage;

/// Reads a flat binary and places it at `base`.
pub fn load_image(path: &Path, base: u64) -> Result<MemoryImage> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read program image {}", path.display()))?;
    if bytes.is_empty() {
        bail!("program image {} is empty", path.display());
    }
    Ok(MemoryImage::new(bytes, base))
}
