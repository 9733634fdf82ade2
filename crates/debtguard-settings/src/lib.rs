//! # debtguard-settings
//!
//! Layered configuration for the debtguard workflow.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`DebtguardSettings::default()`]
//! 2. **User file**: `~/.debtguard/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `DEBTGUARD_*` overrides (highest priority)
//!
//! The generation credential only ever comes from `GEMINI_API_KEY`.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, deep_merge, load_settings, load_settings_from_path, load_with_env,
    settings_path, API_KEY_ENV,
};
pub use types::*;
