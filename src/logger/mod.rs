//! Loggers and the context that creates them.
//!
//! # Responsibilities
//! - Create each named logger exactly once, at its resolved level
//! - Filter calls by level without locking
//! - Capture call-site data (time, thread, ambient context) into a `LogEvent`
//!
//! # Data Flow
//! ```text
//! LoggerContext::logger(name)
//!     → cache.rs (create once: abbreviate name, resolve level)
//!     → Logger::info(...) checks its atomic level
//!     → event.rs captures the call
//!     → LogWriter (encoder + sink)
//! ```

pub mod cache;
pub mod context;
pub mod event;
pub mod instance;
pub mod mdc;

pub use cache::LoggerCache;
pub use context::LoggerContext;
pub use event::LogEvent;
pub use instance::Logger;
