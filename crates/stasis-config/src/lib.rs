//! Configuration system for Stasis session storage.
//!
//! Provides TOML-based configuration with:
//! - A `[redis]` section for the store connection
//! - A `[session]` section for key namespacing and renewal flushing
//! - Config file layering (XDG user config + project-local overrides)
//! - `STASIS_REDIS_URL` environment override for the store URL

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config, load_config_file, load_config_with_options,
    user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
