//! Resolves and loads the precompiled datadown conversion module for the
//! host platform.
//!
//! Resolution is a table lookup followed by exactly one load attempt:
//!
//! 1. form the host's [`PlatformKey`] (`linux-x64`, `darwin-arm64`, ...)
//! 2. look up its [`TargetTriple`]; a miss is [`BindingError::UnsupportedPlatform`]
//! 3. derive `index.<triple>.<ext>` and load it from the binding directory;
//!    any failure is [`BindingError::BindingLoadFailure`]
//! 4. check the module's export surface before handing out an [`ArtifactHandle`]
//!
//! The process-wide handle is owned by a [`BindingCell`] reachable through
//! [`binding`]. The first call performs the load; every later call observes
//! the same handle or the same cached failure.
//!
//! ```no_run
//! use datadown_loader::OutputFormat;
//!
//! let handle = datadown_loader::resolve_and_load()?;
//! let json = handle.convert("# Hello World\n\nThis is **bold**.", OutputFormat::Json)?;
//! println!("{json}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cell;
pub mod error;
pub mod handle;
pub mod native;
pub mod resolver;

pub use cell::{binding, resolve_and_load, BindingCell, BindingState, SharedOutcome};
pub use error::{report, BindingError, LoadCause};
pub use handle::{ArtifactHandle, Converter};
pub use native::{ArtifactOpener, NativeLibrary, NativeOpener};
pub use resolver::{LoadOutcome, Resolution, Resolver, ResolverConfig};

pub use datadown_ffi::{ConversionError, OutputFormat};
pub use datadown_targets::{PlatformKey, TargetTriple};
