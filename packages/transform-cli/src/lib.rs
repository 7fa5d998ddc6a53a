/**
 * Internal API Transform CLI
 *
 * Config loading and the parallel file driver behind the `internalize` binary.
 */
pub mod config;
pub mod driver;

pub use config::ConfigFile;
pub use driver::{expand_inputs, run, DriverSettings, UnitOutput};
