//! `datadown doctor`: binding diagnostics.

use anyhow::Result;
use datadown_loader::BindingCell;

/// Print how the binding resolves on this host and whether it loads.
///
/// Resolution failures are reported, not returned: the point is to diagnose them.
pub fn run(cell: &BindingCell, config_file: Option<&std::path::Path>) -> Result<()> {
    println!("=== Datadown Doctor ===");
    println!();
    println!("datadown version: {}", env!("CARGO_PKG_VERSION"));
    println!("ABI version:      {}", datadown_ffi::ABI_VERSION);
    println!();

    println!("--- Configuration ---");
    match config_file {
        Some(path) => println!("  datadown.toml: {}", path.display()),
        None => println!("  datadown.toml: not found"),
    }
    println!("  Binding dir:   {}", cell.resolver().binding_dir().display());
    println!();

    println!("--- Host ---");
    println!(
        "  Reported:  {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    println!("  Platform:  {}", cell.resolver().platform());
    println!();

    println!("--- Resolution ---");
    match cell.resolver().resolve() {
        Ok(resolution) => {
            println!("  Target:    {}", resolution.entry.triple);
            println!("  Artifact:  {}", resolution.filename);
            println!(
                "  Path:      {} ({})",
                resolution.path.display(),
                if resolution.path.is_file() { "present" } else { "missing" }
            );
        }
        Err(e) => {
            println!("  {e}");
            return Ok(());
        }
    }
    println!();

    println!("--- Load ---");
    for line in load_status(cell) {
        println!("  {line}");
    }

    Ok(())
}

/// One line per fact about the load attempt, triggering it if needed.
fn load_status(cell: &BindingCell) -> Vec<String> {
    match cell.resolve_and_load() {
        Ok(handle) => vec![
            format!("Loaded:    {}", handle.path().display()),
            format!("Module ABI: v{}", handle.abi_version()),
        ],
        Err(e) => vec![format!("Failed:    {}", datadown_loader::report(e.as_ref()))],
    }
}
