use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::errors::{NotifyError, NotifyResult};

pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Runtime configuration loaded from configs.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configs {
    /// Host (and optional port) of the OCS event server, without scheme
    pub ws_host: String,
}

impl Default for Configs {
    fn default() -> Self {
        Self {
            ws_host: "127.0.0.1:8000".to_string(),
        }
    }
}

static CONFIGS: Lazy<RwLock<Configs>> = Lazy::new(|| RwLock::new(Configs::default()));

/// Reads a configs.json file and returns a Configs object
pub fn read_configs<P: AsRef<Path>>(path: P) -> NotifyResult<Configs> {
    let data = fs::read_to_string(path)
        .map_err(|e| NotifyError::Config(format!("Failed to read configs file: {}", e)))?;
    let configs: Configs = serde_json::from_str(&data)
        .map_err(|e| NotifyError::Config(format!("Failed to parse configs file: {}", e)))?;
    Ok(configs)
}

/// Replace the active configuration (e.g., after loading configs.json)
pub fn set_configs(configs: Configs) {
    *CONFIGS.write() = configs;
}

/// Get a clone of the active configuration
pub fn get_config_clone() -> Configs {
    CONFIGS.read().clone()
}

/// Check if a per-module debug flag is present on the command line
///
/// Module keys match LogTag debug keys: --debug-channel, --debug-events,
/// --debug-notify, --debug-callbacks, --debug-session.
pub fn is_debug_enabled_for(module: &str) -> bool {
    let flag = format!("--debug-{}", module);
    CMD_ARGS.lock().contains(&flag)
}

/// Check if verbose logging is enabled via command line args
pub fn is_verbose_enabled() -> bool {
    CMD_ARGS.lock().contains(&"--verbose".to_string())
}

/// Check if debug channel mode is enabled via command line args
pub fn is_debug_channel_enabled() -> bool {
    is_debug_enabled_for("channel")
}

/// Check if debug events mode is enabled via command line args
pub fn is_debug_events_enabled() -> bool {
    is_debug_enabled_for("events")
}
