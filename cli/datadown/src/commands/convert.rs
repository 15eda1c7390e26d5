//! `datadown convert`: markdown to structured data through the native module.

use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use datadown_ffi::OutputFormat;
use datadown_loader::BindingCell;

/// Convert a file (or stdin) and write the result to a file (or stdout).
pub fn run(
    cell: &BindingCell,
    format: OutputFormat,
    input: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let text = read_input(input, io::stdin().lock())?;

    let converted = convert_text(cell, &text, format)?;

    match output {
        Some(path) => std::fs::write(path, &converted)
            .with_context(|| format!("writing {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(converted.as_bytes())?;
            if !converted.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

/// Read markdown from `input`, or from `stdin` when it is absent or `-`.
fn read_input(input: Option<&Path>, mut stdin: impl Read) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        _ => {
            let mut buf = String::new();
            stdin
                .read_to_string(&mut buf)
                .context("reading markdown from stdin")?;
            Ok(buf)
        }
    }
}

/// Load the binding on first use and convert `text`.
pub fn convert_text(cell: &BindingCell, text: &str, format: OutputFormat) -> Result<String> {
    let handle = cell.resolve_and_load()?;
    log::debug!("converting {} bytes to {format} with {}", text.len(), handle.path().display());
    handle
        .convert(text, format)
        .with_context(|| format!("converting to {format}"))
}
