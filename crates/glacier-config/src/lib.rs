//! glacier-config: persisted settings for Glacier.
//!
//! One JSON object on disk holds the AI service credentials and the
//! per-language interpreter table. The configuration is loaded once at
//! startup, mutated only through explicit update operations, and persisted
//! explicitly — components receive a [`Config`] value, never global state.

pub mod interpreters;
pub mod store;

pub use interpreters::{auto_detect, resolve, LANGUAGES};
pub use store::{default_config_path, Config, ConfigError, DEFAULT_MODEL};
