//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SluiceConfig (validated, immutable)
//!     → engine config handed to Router::build, server config to HttpServer
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; the routing table is immutable afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Engine behaviour is passed in explicitly, never read from globals

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{EngineConfig, ObservabilityConfig, ServerConfig, SluiceConfig};
pub use validation::ValidationError;
