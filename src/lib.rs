//! Read-only decoding of AFS directory objects.
//!
//! A [`DirReader`] yields the [pages](read/struct.Page.html) of a directory object one at a time,
//! and each page walks its slots as [records](record/enum.Record.html). The analysis [modes]
//! build on that walk.
//!
//! [modes]: config/enum.Mode.html

use slog::Drain;

pub mod config;
pub mod dump;
pub mod errors;
pub mod list;
pub mod read;
pub mod record;
pub mod stats;

pub use config::{Config, Mode};
pub use errors::{Error, Result};
pub use read::{DirReader, Page};
pub use record::{Entry, Record};
pub use stats::Stats;

pub fn default_logger() -> slog::Logger {
    slog::Logger::root(slog_stdlog::StdLog.fuse(), slog::o!())
}
