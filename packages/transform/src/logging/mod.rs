// Logging
//
// Transform-time diagnostics. The logger is injected into every transform so
// callers choose where lines go and tests can capture them.

mod capturing_logger;
mod console_logger;
mod logger;

pub use capturing_logger::CapturingLogger;
pub use console_logger::ConsoleLogger;
pub use logger::{LogLevel, Logger, NullLogger};
