//! Shared error model, configuration, and document-store abstraction for Lectern.
//!
//! This crate is the foundation depended on by all other Lectern crates.
//! It provides:
//! - [`LecternError`] — the unified error type
//! - Configuration ([`AppConfig`], config loading)
//! - The [`DocumentStore`] trait with filesystem and in-memory impls
//! - Order-file persistence and working-directory naming helpers

pub mod config;
pub mod error;
pub mod order;
pub mod store;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, DispatchConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, validate_api_key,
};
pub use error::{LecternError, Result};
pub use order::{ORDER_FILE, base_name, read_order, sanitize_stem, write_order};
pub use store::{DocumentStore, FsStore, MemStore};
