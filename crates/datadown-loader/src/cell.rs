//! Initialize-once ownership of the loaded binding.
//!
//! A [`BindingCell`] performs at most one load attempt. Concurrent first
//! callers block until that attempt finishes, then all of them observe the
//! same handle or the same failure. A failure is cached: later calls return
//! it without touching the filesystem again. Picking up a fixed deployment
//! requires a new process, or a freshly constructed cell.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::BindingError;
use crate::handle::ArtifactHandle;
use crate::resolver::Resolver;

/// Cached outcome shared by every caller of a cell.
pub type SharedOutcome = Result<ArtifactHandle, Arc<BindingError>>;

/// Where a cell is in its one-way lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Unresolved,
    Loaded,
    Failed,
}

/// Owns a resolver and the single outcome it produced.
pub struct BindingCell {
    resolver: Resolver,
    outcome: OnceLock<SharedOutcome>,
}

impl BindingCell {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            outcome: OnceLock::new(),
        }
    }

    /// The handle, loading it on first use.
    pub fn resolve_and_load(&self) -> SharedOutcome {
        self.outcome
            .get_or_init(|| self.resolver.resolve_and_load().map_err(Arc::new))
            .clone()
    }

    /// The outcome if resolution already ran. Never triggers a load.
    pub fn get(&self) -> Option<SharedOutcome> {
        self.outcome.get().cloned()
    }

    pub fn state(&self) -> BindingState {
        match self.outcome.get() {
            None => BindingState::Unresolved,
            Some(Ok(_)) => BindingState::Loaded,
            Some(Err(_)) => BindingState::Failed,
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }
}

impl fmt::Debug for BindingCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingCell")
            .field("resolver", &self.resolver)
            .field("state", &self.state())
            .finish()
    }
}

/// The process-wide cell, resolving for the host from the executable's directory.
pub fn binding() -> &'static BindingCell {
    static BINDING: OnceLock<BindingCell> = OnceLock::new();
    BINDING.get_or_init(|| BindingCell::new(Resolver::new()))
}

/// Load the process-wide binding on first use and return it.
pub fn resolve_and_load() -> SharedOutcome {
    binding().resolve_and_load()
}
