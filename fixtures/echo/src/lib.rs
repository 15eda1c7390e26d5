//! Conversion module used by the loader's tests.
//!
//! Answers `json` with a document holding the input's first heading and
//! rejects every other format.

use datadown_ffi::{ConversionError, OutputFormat, Result};

fn convert(input: &str, format: OutputFormat) -> Result<String> {
    if format != OutputFormat::Json {
        return Err(ConversionError::UnsupportedFormat {
            message: format!("{format} is not built into this module"),
        });
    }
    let heading = input
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .ok_or_else(|| ConversionError::Failed {
            message: "document has no heading".into(),
        })?;
    let doc = serde_json::json!({
        "type": "document",
        "children": [{ "type": "heading", "level": 1, "text": heading }],
    });
    Ok(doc.to_string())
}

datadown_ffi::export_binding!(convert);
