//! The loaded module and the capability contract it must satisfy.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use datadown_ffi::{ConversionError, NativeExports, OutputFormat};
use datadown_targets::{PlatformKey, TargetTriple};

/// What a loaded conversion module must provide.
///
/// Implemented by [`NativeLibrary`](crate::NativeLibrary) for dynamically
/// loaded artifacts. The shape is checked when the artifact is opened, so a
/// structurally wrong artifact fails at load time rather than at first use.
pub trait Converter: Send + Sync {
    /// ABI version the module implements.
    fn abi_version(&self) -> u32;

    /// Convert markdown `input` to `format`.
    fn convert(&self, input: &str, format: OutputFormat) -> Result<String, ConversionError>;
}

impl Converter for NativeExports {
    fn abi_version(&self) -> u32 {
        NativeExports::abi_version(self)
    }

    fn convert(&self, input: &str, format: OutputFormat) -> Result<String, ConversionError> {
        NativeExports::convert(self, input, format)
    }
}

struct Loaded {
    key: PlatformKey,
    triple: TargetTriple,
    path: PathBuf,
    converter: Box<dyn Converter>,
}

/// Handle to a successfully loaded conversion module.
///
/// Clones share one module instance; the module stays loaded while any clone
/// exists.
#[derive(Clone)]
pub struct ArtifactHandle {
    inner: Arc<Loaded>,
}

impl ArtifactHandle {
    pub(crate) fn new(
        key: PlatformKey,
        triple: TargetTriple,
        path: PathBuf,
        converter: Box<dyn Converter>,
    ) -> Self {
        Self {
            inner: Arc::new(Loaded {
                key,
                triple,
                path,
                converter,
            }),
        }
    }

    /// Convert markdown `input` to `format`. Errors come from the module unchanged.
    pub fn convert(&self, input: &str, format: OutputFormat) -> Result<String, ConversionError> {
        self.inner.converter.convert(input, format)
    }

    pub fn platform(&self) -> &PlatformKey {
        &self.inner.key
    }

    pub fn target(&self) -> &TargetTriple {
        &self.inner.triple
    }

    /// Path the module was loaded from.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn abi_version(&self) -> u32 {
        self.inner.converter.abi_version()
    }

    /// Whether two handles refer to the same loaded instance.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl fmt::Debug for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactHandle")
            .field("platform", &self.inner.key)
            .field("target", &self.inner.triple)
            .field("path", &self.inner.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shout;

    impl Converter for Shout {
        fn abi_version(&self) -> u32 {
            datadown_ffi::ABI_VERSION
        }

        fn convert(&self, input: &str, _format: OutputFormat) -> Result<String, ConversionError> {
            Ok(input.to_uppercase())
        }
    }

    fn handle() -> ArtifactHandle {
        ArtifactHandle::new(
            PlatformKey::from_names("linux", "x64"),
            TargetTriple::from_static("x86_64-unknown-linux-gnu"),
            PathBuf::from("/opt/datadown/index.x86_64-unknown-linux-gnu.so"),
            Box::new(Shout),
        )
    }

    #[test]
    fn delegates_to_converter() {
        let h = handle();
        assert_eq!(h.convert("abc", OutputFormat::Json).unwrap(), "ABC");
        assert_eq!(h.abi_version(), datadown_ffi::ABI_VERSION);
        assert_eq!(h.platform().to_string(), "linux-x64");
        assert_eq!(h.target().as_str(), "x86_64-unknown-linux-gnu");
    }

    #[test]
    fn clones_share_the_instance() {
        let a = handle();
        let b = a.clone();
        assert!(ArtifactHandle::ptr_eq(&a, &b));
        assert!(!ArtifactHandle::ptr_eq(&a, &handle()));
    }

    #[test]
    fn debug_names_the_artifact() {
        let debug = format!("{:?}", handle());
        assert!(debug.contains("index.x86_64-unknown-linux-gnu.so"));
    }
}
