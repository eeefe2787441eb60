//! Configuration management with environment variable support.
//!
//! This module provides centralized configuration for ui-probe, supporting:
//! - Environment variables for all configurable values
//! - Sensible defaults for running against the built-in demo surface
//! - A cached global for code paths without explicit configuration plumbing
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `UI_PROBE_BASE_URL` | URL of the application under test | `https://kanban-dusky-five.vercel.app` |
//! | `UI_PROBE_TIMEOUT_MS` | Default assertion timeout (ms) | `4000` |
//! | `UI_PROBE_POLL_INTERVAL_MS` | Default poll interval (ms) | `100` |
//! | `UI_PROBE_SETTLE_TIMEOUT_MS` | Settle-check timeout for viewport/navigation (ms) | `2000` |
//! | `UI_PROBE_DEFAULT_VIEWPORT` | Startup viewport profile (`mobile`, `tablet`, `desktop`, or `WxH`) | `desktop` |

use std::env;
use std::sync::OnceLock;

// ============================================================================
// Default Values
// ============================================================================

/// Default URL of the application under test
pub const DEFAULT_BASE_URL: &str = "https://kanban-dusky-five.vercel.app";

/// Default assertion timeout (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 4000;

/// Default poll interval (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Default settle-check timeout (milliseconds)
pub const DEFAULT_SETTLE_TIMEOUT_MS: u64 = 2000;

/// Default viewport profile name
pub const DEFAULT_VIEWPORT: &str = "desktop";

// ============================================================================
// Environment Variable Names
// ============================================================================

/// Environment variable for the application base URL
pub const ENV_BASE_URL: &str = "UI_PROBE_BASE_URL";

/// Environment variable for the default assertion timeout
pub const ENV_TIMEOUT_MS: &str = "UI_PROBE_TIMEOUT_MS";

/// Environment variable for the default poll interval
pub const ENV_POLL_INTERVAL_MS: &str = "UI_PROBE_POLL_INTERVAL_MS";

/// Environment variable for the settle-check timeout
pub const ENV_SETTLE_TIMEOUT_MS: &str = "UI_PROBE_SETTLE_TIMEOUT_MS";

/// Environment variable for the startup viewport profile
pub const ENV_DEFAULT_VIEWPORT: &str = "UI_PROBE_DEFAULT_VIEWPORT";

// ============================================================================
// Configuration Getters (with caching)
// ============================================================================

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Centralized configuration for ui-probe
#[derive(Debug, Clone)]
pub struct Config {
    /// Application-under-test settings
    pub target: TargetSettings,
    /// Default values for assertions and settle-checks
    pub defaults: DefaultSettings,
}

/// Application-under-test settings
#[derive(Debug, Clone)]
pub struct TargetSettings {
    /// Base URL scenarios navigate to
    pub base_url: String,
}

/// Default timing and viewport values
#[derive(Debug, Clone)]
pub struct DefaultSettings {
    /// Assertion timeout (milliseconds)
    pub timeout_ms: u64,
    /// Poll interval (milliseconds)
    pub poll_interval_ms: u64,
    /// Settle-check timeout for viewport and navigation (milliseconds)
    pub settle_timeout_ms: u64,
    /// Startup viewport profile name or WxH
    pub viewport: String,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            target: TargetSettings::from_env(),
            defaults: DefaultSettings::from_env(),
        }
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            target: TargetSettings::defaults(),
            defaults: DefaultSettings::defaults(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl TargetSettings {
    /// Create target settings from environment variables
    pub fn from_env() -> Self {
        Self {
            base_url: env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Create target settings with defaults
    pub fn defaults() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl DefaultSettings {
    /// Create default settings from environment variables
    pub fn from_env() -> Self {
        Self {
            timeout_ms: env_u64(ENV_TIMEOUT_MS, DEFAULT_TIMEOUT_MS),
            poll_interval_ms: env_u64(ENV_POLL_INTERVAL_MS, DEFAULT_POLL_INTERVAL_MS).max(1),
            settle_timeout_ms: env_u64(ENV_SETTLE_TIMEOUT_MS, DEFAULT_SETTLE_TIMEOUT_MS),
            viewport: env::var(ENV_DEFAULT_VIEWPORT)
                .unwrap_or_else(|_| DEFAULT_VIEWPORT.to_string()),
        }
    }

    /// Create default settings with hardcoded defaults
    pub fn defaults() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            settle_timeout_ms: DEFAULT_SETTLE_TIMEOUT_MS,
            viewport: DEFAULT_VIEWPORT.to_string(),
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Get the application base URL (convenience function)
pub fn base_url() -> String {
    get().target.base_url.clone()
}

/// Get the default assertion timeout in milliseconds (convenience function)
pub fn default_timeout_ms() -> u64 {
    get().defaults.timeout_ms
}

/// Get the default poll interval in milliseconds (convenience function)
pub fn default_poll_interval_ms() -> u64 {
    get().defaults.poll_interval_ms
}
