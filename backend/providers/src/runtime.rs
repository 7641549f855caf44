//! Process-wide completion provider.
//!
//! `init` installs the provider once; later calls are no-ops that return
//! `false`. `teardown` clears it so a fresh `init` can succeed.

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use tandem_core::{CompletionProvider, TandemError};
use tracing::{debug, info};

static PROVIDER: Lazy<RwLock<Option<Arc<dyn CompletionProvider>>>> =
    Lazy::new(|| RwLock::new(None));

/// Install the process-wide provider. Returns `false` if one is already set.
pub fn init(provider: Arc<dyn CompletionProvider>) -> bool {
    let mut slot = PROVIDER.write().unwrap_or_else(|e| e.into_inner());
    if slot.is_some() {
        debug!(provider = %provider.name(), "Provider runtime already initialized, skipping");
        return false;
    }
    info!(provider = %provider.name(), "Provider runtime initialized");
    *slot = Some(provider);
    true
}

/// The installed provider.
pub fn handle() -> Result<Arc<dyn CompletionProvider>, TandemError> {
    PROVIDER
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
        .ok_or(TandemError::NotInitialized)
}

pub fn is_initialized() -> bool {
    PROVIDER.read().unwrap_or_else(|e| e.into_inner()).is_some()
}

/// Remove the installed provider. Returns `false` if none was set.
pub fn teardown() -> bool {
    let removed = PROVIDER
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .take()
        .is_some();
    if removed {
        info!("Provider runtime torn down");
    }
    removed
}
