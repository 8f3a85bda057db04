//! Dynamic Logging Backend Library

pub mod config;
pub mod encoder;
pub mod level;
pub mod logger;
pub mod observability;

pub use config::schema::LoggerSettings;
pub use encoder::throwable::{StackFrame, Throwable};
pub use level::Level;
pub use logger::{Logger, LoggerContext};
