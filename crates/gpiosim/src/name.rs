//! Generation of unique simulator names
//!
//! Simulators live in a namespace shared by every process on the host, so a
//! generated name combines the executable name, the PID and a per-process
//! counter.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

/// Name used when the executable name cannot be determined
const DEFAULT_APP_NAME: &str = "gpiosim";

static SIM_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Return a simulator name that is very likely to be unique on the host.
///
/// The only way it can clash with an existing simulator is if someone goes out
/// of their way to explicitly create one with the same name.
pub fn unique_name() -> String {
    let count = SIM_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    format!("{}-p{}-{}", app_name(), std::process::id(), count)
}

/// Base name of the running executable, or "gpiosim".
fn app_name() -> String {
    std::env::current_exe()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_APP_NAME.to_string())
}
