//! Host platform model and the native binding platform table.
//!
//! A binding is selected in three steps:
//! - **Platform key:** the host's `(os, arch)` pair, e.g. `linux-x64`
//! - **Target triple:** the build target the key maps to, e.g. `x86_64-unknown-linux-gnu`
//! - **Artifact name:** `index.<triple>.<ext>`, where `ext` is the host's
//!   dynamic library extension

pub mod error;
pub mod platform;
pub mod table;
pub mod triple;

pub use error::TargetError;
pub use platform::{Architecture, OperatingSystem, PlatformKey};
pub use table::{lookup, supported_keys, validate_table, PlatformEntry, ValidationIssue, PLATFORMS};
pub use triple::TargetTriple;
