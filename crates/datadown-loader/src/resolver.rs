//! Platform resolution and the single load attempt.

use std::fmt;
use std::path::{Path, PathBuf};

use datadown_targets::{PlatformEntry, PlatformKey};
use serde::{Deserialize, Serialize};

use crate::error::{self, BindingError, Result};
use crate::handle::ArtifactHandle;
use crate::native::{ArtifactOpener, NativeOpener};

/// Result of one resolution and load attempt.
pub type LoadOutcome = Result<ArtifactHandle>;

/// Where to look for artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolverConfig {
    /// Directory holding the `index.<triple>.<ext>` artifacts. Defaults to
    /// the directory of the running executable.
    #[serde(default)]
    pub binding_dir: Option<PathBuf>,
}

/// The artifact a platform key resolves to, before anything is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub key: PlatformKey,
    pub entry: &'static PlatformEntry,
    /// `index.<triple>.<ext>`
    pub filename: String,
    /// `filename` inside the binding directory.
    pub path: PathBuf,
}

/// Maps a platform key to its artifact and loads it.
pub struct Resolver {
    key: PlatformKey,
    binding_dir: PathBuf,
    opener: Box<dyn ArtifactOpener>,
}

impl Resolver {
    /// Resolver for the running host, loading from [`default_binding_dir`].
    pub fn new() -> Self {
        Self {
            key: PlatformKey::host(),
            binding_dir: default_binding_dir(),
            opener: Box::new(NativeOpener),
        }
    }

    /// Resolver for the running host using the directory from `config`.
    pub fn from_config(config: &ResolverConfig) -> Self {
        let resolver = Self::new();
        match &config.binding_dir {
            Some(dir) => resolver.with_binding_dir(dir),
            None => resolver,
        }
    }

    /// Resolve for `key` instead of the host.
    pub fn with_platform(mut self, key: PlatformKey) -> Self {
        self.key = key;
        self
    }

    pub fn with_binding_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.binding_dir = dir.into();
        self
    }

    /// Replace how artifacts are opened.
    pub fn with_opener(mut self, opener: impl ArtifactOpener + 'static) -> Self {
        self.opener = Box::new(opener);
        self
    }

    pub fn platform(&self) -> &PlatformKey {
        &self.key
    }

    pub fn binding_dir(&self) -> &Path {
        &self.binding_dir
    }

    /// Look up the platform table and derive the artifact path. No I/O.
    pub fn resolve(&self) -> Result<Resolution> {
        log::debug!("resolving native binding for {}", self.key);

        let entry = datadown_targets::lookup(&self.key).ok_or_else(|| {
            BindingError::UnsupportedPlatform {
                key: self.key.clone(),
                supported: datadown_targets::supported_keys(),
            }
        })?;

        let filename = entry.artifact_filename();
        let path = self.binding_dir.join(&filename);
        log::debug!("{} maps to {}, expecting {}", self.key, entry.triple, path.display());

        Ok(Resolution {
            key: self.key.clone(),
            entry,
            filename,
            path,
        })
    }

    /// Resolve and perform exactly one load attempt. Nothing is cached here;
    /// see [`BindingCell`](crate::BindingCell) for the initialize-once wrapper.
    pub fn resolve_and_load(&self) -> LoadOutcome {
        let outcome = self.load();
        if let Err(e) = &outcome {
            log::warn!("{}", error::report(e));
        }
        outcome
    }

    fn load(&self) -> LoadOutcome {
        let resolution = self.resolve()?;

        let converter = self.opener.open(&resolution.path).map_err(|cause| {
            BindingError::BindingLoadFailure {
                key: resolution.key.clone(),
                filename: resolution.filename.clone(),
                path: resolution.path.clone(),
                cause,
            }
        })?;

        let handle = ArtifactHandle::new(
            resolution.key,
            resolution.entry.triple.clone(),
            resolution.path,
            converter,
        );
        log::info!(
            "loaded native binding {} (ABI v{})",
            handle.path().display(),
            handle.abi_version()
        );
        Ok(handle)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("key", &self.key)
            .field("binding_dir", &self.binding_dir)
            .finish_non_exhaustive()
    }
}

/// Directory of the running executable, or `.` if it cannot be determined.
pub fn default_binding_dir() -> PathBuf {
    match std::env::current_exe() {
        Ok(exe) => match exe.parent() {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("."),
        },
        Err(e) => {
            log::debug!("cannot locate current executable ({e}), using working directory");
            PathBuf::from(".")
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use datadown_ffi::abi::{self, DatadownBuffer};
    use datadown_ffi::export;
    use datadown_ffi::{ConversionError, NativeExports, OutputFormat};

    use crate::error::LoadCause;
    use crate::handle::Converter;

    fn fake_convert(input: &str, format: OutputFormat) -> std::result::Result<String, ConversionError> {
        if format != OutputFormat::Json {
            return Err(ConversionError::UnsupportedFormat {
                message: format!("{format} is not built into this module"),
            });
        }
        let heading = input.lines().next().unwrap_or("").trim_start_matches("# ");
        let doc = serde_json::json!({
            "type": "document",
            "children": [{ "type": "heading", "level": 1, "text": heading }],
        });
        Ok(doc.to_string())
    }

    extern "C" fn fake_abi_version() -> u32 {
        abi::ABI_VERSION
    }

    unsafe extern "C" fn fake_datadown_convert(
        input: *const u8,
        input_len: usize,
        format: *const u8,
        format_len: usize,
        out: *mut DatadownBuffer,
    ) -> i32 {
        export::export_convert(input, input_len, format, format_len, out, fake_convert)
    }

    unsafe extern "C" fn fake_free_buffer(buf: DatadownBuffer) {
        export::free_buffer(buf)
    }

    /// Opens every path as an in-process module implementing the C ABI, and
    /// records each attempt.
    #[derive(Clone, Default)]
    pub(crate) struct InProcessOpener {
        pub attempts: Arc<AtomicUsize>,
        pub paths: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl ArtifactOpener for InProcessOpener {
        fn open(&self, path: &Path) -> std::result::Result<Box<dyn Converter>, LoadCause> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            self.paths.lock().unwrap().push(path.to_path_buf());
            let exports =
                unsafe { NativeExports::new(fake_abi_version, fake_datadown_convert, fake_free_buffer) };
            Ok(Box::new(exports))
        }
    }

    /// Fails every attempt with "not found".
    #[derive(Clone, Default)]
    pub(crate) struct MissingOpener {
        pub attempts: Arc<AtomicUsize>,
    }

    impl ArtifactOpener for MissingOpener {
        fn open(&self, _path: &Path) -> std::result::Result<Box<dyn Converter>, LoadCause> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(LoadCause::Io(io::Error::new(io::ErrorKind::NotFound, "artifact not found")))
        }
    }

    fn resolver(os: &str, arch: &str) -> Resolver {
        Resolver::new()
            .with_platform(PlatformKey::from_names(os, arch))
            .with_binding_dir("/opt/datadown")
    }

    #[test]
    fn every_supported_key_loads_or_names_its_file() {
        for key in datadown_targets::supported_keys() {
            let opener = InProcessOpener::default();
            let r = Resolver::new()
                .with_platform(key.clone())
                .with_binding_dir("/opt/datadown")
                .with_opener(opener.clone());
            let handle = r.resolve_and_load().unwrap();
            assert_eq!(handle.platform(), &key);
            assert!(handle.convert("# x", OutputFormat::Json).is_ok());

            let missing = MissingOpener::default();
            let r = Resolver::new()
                .with_platform(key.clone())
                .with_binding_dir("/opt/datadown")
                .with_opener(missing);
            match r.resolve_and_load() {
                Err(BindingError::BindingLoadFailure { filename, path, .. }) => {
                    let expected = datadown_targets::lookup(&key).unwrap().artifact_filename();
                    assert_eq!(filename, expected);
                    assert_eq!(path, Path::new("/opt/datadown").join(expected));
                }
                other => panic!("expected BindingLoadFailure for {key}, got {other:?}"),
            }
        }
    }

    #[test]
    fn unsupported_key_never_opens_a_file() {
        let opener = InProcessOpener::default();
        let r = resolver("linux", "arm64").with_opener(opener.clone());
        assert!(matches!(
            r.resolve_and_load(),
            Err(BindingError::UnsupportedPlatform { .. })
        ));
        assert_eq!(opener.attempts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn resolution_is_deterministic() {
        let a = resolver("darwin", "arm64").resolve().unwrap();
        let b = resolver("darwin", "arm64").resolve().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.filename, "index.aarch64-apple-darwin.dylib");
    }

    #[test]
    fn one_load_attempt_per_call() {
        let opener = InProcessOpener::default();
        let r = resolver("linux", "x64").with_opener(opener.clone());
        r.resolve_and_load().unwrap();
        assert_eq!(opener.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(
            opener.paths.lock().unwrap().as_slice(),
            [PathBuf::from("/opt/datadown/index.x86_64-unknown-linux-gnu.so")]
        );
    }

    #[test]
    fn scenario_linux_x64_converts_to_json() {
        let r = resolver("linux", "x64").with_opener(InProcessOpener::default());
        let resolution = r.resolve().unwrap();
        assert_eq!(resolution.entry.triple.as_str(), "x86_64-unknown-linux-gnu");
        assert_eq!(resolution.filename, "index.x86_64-unknown-linux-gnu.so");

        let handle = r.resolve_and_load().unwrap();
        let out = handle
            .convert("# Hello World\n\nThis is **bold**.", OutputFormat::Json)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["children"][0]["text"], "Hello World");
    }

    #[test]
    fn scenario_freebsd_is_unsupported() {
        let opener = InProcessOpener::default();
        let r = resolver("freebsd", "x64").with_opener(opener.clone());
        match r.resolve_and_load() {
            Err(BindingError::UnsupportedPlatform { key, supported }) => {
                assert_eq!(key.to_string(), "freebsd-x64");
                assert_eq!(supported, datadown_targets::supported_keys());
                assert_eq!(supported.len(), 4);
            }
            other => panic!("expected UnsupportedPlatform, got {other:?}"),
        }
        assert_eq!(opener.attempts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn scenario_win32_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let r = Resolver::new()
            .with_platform(PlatformKey::from_names("win32", "x64"))
            .with_binding_dir(dir.path());
        match r.resolve_and_load() {
            Err(BindingError::BindingLoadFailure {
                key,
                filename,
                cause: LoadCause::Io(e),
                ..
            }) => {
                assert_eq!(key.to_string(), "win32-x64");
                assert_eq!(filename, "index.x86_64-pc-windows-msvc.dll");
                assert_eq!(e.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected BindingLoadFailure with I/O cause, got {other:?}"),
        }
    }

    #[test]
    fn module_errors_pass_through() {
        let handle = resolver("linux", "x64")
            .with_opener(InProcessOpener::default())
            .resolve_and_load()
            .unwrap();
        let err = handle.convert("# x", OutputFormat::Toml).unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedFormat { .. }));
    }

    #[test]
    fn config_sets_binding_dir() {
        let config: ResolverConfig = serde_json::from_str(r#"{ "binding-dir": "/srv/bindings" }"#).unwrap();
        let r = Resolver::from_config(&config);
        assert_eq!(r.binding_dir(), Path::new("/srv/bindings"));
        assert_eq!(r.platform(), &PlatformKey::host());

        let r = Resolver::from_config(&ResolverConfig::default());
        assert_eq!(r.binding_dir(), default_binding_dir());
    }
}
