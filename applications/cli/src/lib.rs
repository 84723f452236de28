//! Tonal command-line player
//!
//! Library half of the `tonal` binary: configuration loading and the
//! interactive session, kept here so they can be tested without a device.

pub mod config;
pub mod error;
pub mod session;

pub use config::{AppConfig, Backend};
pub use error::{CliError, Result};
pub use session::{render_bars, Outcome, Session};
