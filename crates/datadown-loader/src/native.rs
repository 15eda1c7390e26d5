//! Opening artifacts with the platform's dynamic loader.

use std::path::Path;

use datadown_ffi::abi::{self, AbiVersionFn, ConvertFn, FreeBufferFn};
use datadown_ffi::{ConversionError, NativeExports, OutputFormat};
use libloading::{Library, Symbol};

use crate::error::LoadCause;
use crate::handle::Converter;

/// Turns an artifact path into a [`Converter`]. One call is one load attempt.
pub trait ArtifactOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn Converter>, LoadCause>;
}

/// Opens artifacts with `dlopen`/`LoadLibrary` through `libloading`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeOpener;

impl ArtifactOpener for NativeOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn Converter>, LoadCause> {
        Ok(Box::new(NativeLibrary::open(path)?))
    }
}

/// A dynamically loaded conversion module.
pub struct NativeLibrary {
    exports: NativeExports,
    // Keeps the code behind `exports` mapped.
    _library: Library,
}

impl NativeLibrary {
    /// Load the library at `path` and verify its export surface.
    pub fn open(path: &Path) -> Result<Self, LoadCause> {
        // Surface a missing file as an I/O error rather than a loader message.
        std::fs::metadata(path)?;

        // SAFETY: loading runs the library's initialisers. Artifacts come from
        // the trusted build pipeline for this exact target.
        let library = unsafe { Library::new(path) }?;

        let abi_version: AbiVersionFn = symbol(&library, abi::SYMBOL_ABI_VERSION)?;
        let convert: ConvertFn = symbol(&library, abi::SYMBOL_CONVERT)?;
        let free_buffer: FreeBufferFn = symbol(&library, abi::SYMBOL_FREE_BUFFER)?;

        // SAFETY: the symbols carry the contract's names and the library is
        // stored next to the exports, so they outlive every call.
        let exports = unsafe { NativeExports::new(abi_version, convert, free_buffer) };

        let found = exports.abi_version();
        if found != abi::ABI_VERSION {
            return Err(LoadCause::AbiMismatch {
                expected: abi::ABI_VERSION,
                found,
            });
        }

        Ok(Self {
            exports,
            _library: library,
        })
    }
}

fn symbol<T: Copy>(library: &Library, name: &'static str) -> Result<T, LoadCause> {
    // SAFETY: `T` is the function pointer type the contract assigns to `name`.
    let sym: Symbol<'_, T> = unsafe { library.get(name.as_bytes()) }
        .map_err(|source| LoadCause::MissingExport { symbol: name, source })?;
    Ok(*sym)
}

impl Converter for NativeLibrary {
    fn abi_version(&self) -> u32 {
        self.exports.abi_version()
    }

    fn convert(&self, input: &str, format: OutputFormat) -> Result<String, ConversionError> {
        self.exports.convert(input, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
    use std::io;
    use std::path::PathBuf;
    use std::process::Command;
    use std::sync::OnceLock;

    use datadown_targets::PlatformKey;

    use crate::error::BindingError;
    use crate::resolver::Resolver;

    const FIXTURES: [&str; 3] = [
        "datadown-fixture-echo",
        "datadown-fixture-stale",
        "datadown-fixture-partial",
    ];

    /// Build the fixture modules once per test run and return their output directory.
    fn fixture_dir() -> &'static Path {
        static DIR: OnceLock<PathBuf> = OnceLock::new();
        DIR.get_or_init(|| {
            let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
            // A separate target dir keeps this build off the lock held by the outer one.
            let target = root.join("target").join("fixtures");
            let mut cmd = Command::new(env!("CARGO"));
            cmd.current_dir(&root).arg("build").arg("--target-dir").arg(&target);
            for package in FIXTURES {
                cmd.args(["-p", package]);
            }
            let output = cmd.output().unwrap();
            assert!(
                output.status.success(),
                "building fixture modules failed:\n{}",
                String::from_utf8_lossy(&output.stderr)
            );
            target.join("debug")
        })
    }

    fn fixture(package: &str) -> PathBuf {
        let stem = package.replace('-', "_");
        fixture_dir().join(format!("{DLL_PREFIX}{stem}{DLL_SUFFIX}"))
    }

    #[test]
    fn loads_a_real_module() {
        let library = NativeLibrary::open(&fixture("datadown-fixture-echo")).unwrap();
        assert_eq!(library.abi_version(), abi::ABI_VERSION);

        let out = library.convert("# Hello World\n\nbody", OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["children"][0]["text"], "Hello World");
    }

    #[test]
    fn real_module_errors_pass_through() {
        let library = NativeLibrary::open(&fixture("datadown-fixture-echo")).unwrap();

        let err = library.convert("# x", OutputFormat::Yaml).unwrap_err();
        assert_eq!(
            err,
            ConversionError::UnsupportedFormat {
                message: "yaml is not built into this module".into()
            }
        );

        let err = library.convert("no heading", OutputFormat::Json).unwrap_err();
        assert!(matches!(err, ConversionError::Failed { .. }), "got {err:?}");
    }

    #[test]
    fn abi_version_mismatch_is_rejected() {
        let err = NativeOpener.open(&fixture("datadown-fixture-stale")).err().unwrap();
        match err {
            LoadCause::AbiMismatch { expected, found } => {
                assert_eq!(expected, abi::ABI_VERSION);
                assert_eq!(found, 7);
            }
            other => panic!("expected ABI mismatch, got {other:?}"),
        }
    }

    #[test]
    fn missing_export_is_named() {
        let err = NativeOpener.open(&fixture("datadown-fixture-partial")).err().unwrap();
        match err {
            LoadCause::MissingExport { symbol, .. } => assert_eq!(symbol, abi::SYMBOL_CONVERT),
            other => panic!("expected missing export, got {other:?}"),
        }
    }

    #[test]
    fn resolver_loads_the_host_artifact() {
        let host = PlatformKey::host();
        let Some(entry) = datadown_targets::lookup(&host) else {
            eprintln!("{host} has no artifact in the platform table, skipping");
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        std::fs::copy(fixture("datadown-fixture-echo"), dir.path().join(entry.artifact_filename()))
            .unwrap();

        let handle = Resolver::new().with_binding_dir(dir.path()).resolve_and_load().unwrap();
        assert_eq!(handle.platform(), &host);
        assert_eq!(handle.path(), dir.path().join(entry.artifact_filename()));
        assert!(handle.convert("# Hi", OutputFormat::Json).is_ok());
    }

    #[test]
    fn resolver_reports_a_stale_host_artifact() {
        let host = PlatformKey::host();
        let Some(entry) = datadown_targets::lookup(&host) else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        std::fs::copy(fixture("datadown-fixture-stale"), dir.path().join(entry.artifact_filename()))
            .unwrap();

        match Resolver::new().with_binding_dir(dir.path()).resolve_and_load() {
            Err(BindingError::BindingLoadFailure {
                filename,
                cause: LoadCause::AbiMismatch { found: 7, .. },
                ..
            }) => assert_eq!(filename, entry.artifact_filename()),
            other => panic!("expected ABI mismatch, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = NativeOpener
            .open(&dir.path().join("index.x86_64-unknown-linux-gnu.so"))
            .err()
            .unwrap();
        match err {
            LoadCause::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("expected I/O error, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_file_is_rejected_by_the_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.x86_64-unknown-linux-gnu.so");
        std::fs::write(&path, b"this is not a shared library").unwrap();

        let err = NativeOpener.open(&path).err().unwrap();
        assert!(matches!(err, LoadCause::Library(_)), "got {err:?}");
    }
}
