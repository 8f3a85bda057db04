//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! property snapshot (HashMap) or TOML document
//!     → loader.rs (read keys & deserialize)
//!     → validation.rs (semantic checks)
//!     → LoggerSettings
//!     → LoggerContext::from_settings builds encoder, writer and registry
//!
//! On a property change set:
//!     loader::level_updates extracts log.level.* keys
//!     → LoggerContext::put_all applies them as one batch
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once the context is built; only levels change
//! - All fields have defaults to allow minimal configs
//! - Non-fatal problems are reported once and replaced by defaults

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::LoggerSettings;
pub use schema::WriterKind;
pub use validation::ValidationError;
