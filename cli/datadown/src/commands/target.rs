//! `datadown target`: platform table listing and resolution.

use std::path::Path;

use anyhow::Result;
use datadown_loader::{PlatformKey, Resolver};
use datadown_targets::PLATFORMS;

/// List the supported platforms and their artifact names.
pub fn list(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&PLATFORMS)?);
        return Ok(());
    }

    println!("Supported platforms:");
    println!();
    for entry in &PLATFORMS {
        println!(
            "  {:<14} {:<26} {}",
            entry.key.to_string(),
            entry.triple.to_string(),
            entry.artifact_filename()
        );
    }
    println!();
    println!("Host platform: {}", PlatformKey::host());
    Ok(())
}

/// Show what a platform key resolves to without loading anything.
pub fn resolve(key: Option<&str>, binding_dir: &Path) -> Result<()> {
    let key = match key {
        Some(k) => k.parse::<PlatformKey>()?,
        None => PlatformKey::host(),
    };
    let resolution = Resolver::new()
        .with_platform(key)
        .with_binding_dir(binding_dir)
        .resolve()?;

    println!("Platform: {}", resolution.key);
    println!("Target:   {}", resolution.entry.triple);
    println!("Artifact: {}", resolution.filename);
    println!("Path:     {}", resolution.path.display());
    Ok(())
}
