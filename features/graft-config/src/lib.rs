//! Graft Config provides a registry of configs that can be injected in the rest of the
//! modules.
//!
//! Graft Config is split into two major parts:
//! 1. ConfigProvider: Used to create the registry of all configs and install them into a DI registry
//! 2. Config<T>: A wrapper type to be able to resolve and retrieve configs
//!
//! # Examples
//!
//! ```rust
//! use graft_config::provider::ConfigProvider;
//!
//! struct AppConfig {
//!     host: String,
//!     port: u16,
//! }
//!
//! let mut config_provider = ConfigProvider::new();
//! config_provider
//!     .add_config(AppConfig {
//!         host: "localhost".to_string(),
//!         port: 8080,
//!     })
//!     .unwrap();
//!
//! let retrieved_config = config_provider.get_config::<AppConfig>().unwrap();
//!
//! assert_eq!(retrieved_config.host, "localhost");
//! assert_eq!(retrieved_config.port, 8080);
//! ```
//!
//! Graft Config consists of the following components:
//!
//! 1. Config - for depending on a config in a constructor
//! 2. Provider - for creating a registry of configs, adding and retrieving configs
//! 3. Errors - for config errors

pub mod config;
pub mod errors;
pub mod provider;
