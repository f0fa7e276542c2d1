// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Talon's logger: a non-blocking file logger rolling over by day and by size.
//!
//! # Overview
//!
//! A [`FileLogger`] formats records on the calling thread and hands them over a bounded pipe to a
//! dedicated writer thread, so callers never wait on disk I/O unless the pipe is full. Records
//! are written to `{base_dir}/{log_name}/{YYYY-MM-DD}/{HH_MM_SS}.log`, one per line, terminated by
//! `\r\n`. A monitor thread starts a new file when the day changes, when the active file reaches
//! the size limit, or when it was removed from disk.
//!
//! # Examples
//!
//! Logger with the default settings, writing under `log/crawler`:
//!
//! ```no_run
//! let logger = talon::new_logger("crawler").unwrap();
//!
//! logger.info(&[&"crawler", &"started"]);
//! logger.errorf(format_args!("failed to fetch {}: status {}", "https://example.com", 503));
//!
//! logger.shutdown().unwrap();
//! ```
//!
//! Custom setup:
//!
//! ```no_run
//! use std::num::NonZeroU64;
//! use std::time::Duration;
//!
//! use talon::FileLoggerBuilder;
//!
//! let logger = FileLoggerBuilder::new("/var/log/talon", "scheduler")
//!     .max_file_size_mb(NonZeroU64::new(100).unwrap())
//!     .check_interval(Duration::from_secs(30))
//!     .position("scheduler")
//!     .build()
//!     .unwrap();
//!
//! logger.warn(&[&"queue is", &"full"]);
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

#[cfg(feature = "bridge-log")]
pub mod bridge;
#[cfg(feature = "crawl")]
pub mod crawl;
pub mod format;
pub mod trap;

mod builder;
mod error;
mod file;
mod level;
mod logger;
mod position;
mod stats;

pub use self::builder::FileLoggerBuilder;
pub use self::error::Error;
pub use self::level::Level;
pub use self::logger::FileLogger;
pub use self::position::Position;
pub use self::stats::Stats;
pub use self::trap::Trap;

/// Create a logger with the default settings, writing under `log/{log_name}`.
///
/// Records carry [`Position::Single`], up to 200 records are buffered, and files rotate at 10 MB
/// or at the start of a new day.
///
/// # Errors
///
/// Return an error if the first log file cannot be created.
pub fn new_logger(log_name: impl Into<String>) -> Result<FileLogger, Error> {
    FileLoggerBuilder::new("log", log_name)
        .position(Position::Single)
        .build()
}
