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

//! A bridge to forward logs from the `log` crate to a [`FileLogger`].

use crate::FileLogger;
use crate::Level;
use crate::Position;
use crate::format::Location;
use crate::format::Message;

impl log::Log for FileLogger {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let position = Position::named(record.target());
        let location = record
            .file()
            .zip(record.line())
            .map(|(file, line)| Location { file, line });
        self.emit_at(
            Level::from(record.level()),
            &position,
            location,
            Message::Format(*record.args()),
        );
    }

    fn flush(&self) {
        if let Err(err) = FileLogger::flush(self) {
            self.trap(&err);
        }
    }
}

/// Set up the log crate global logger.
///
/// All records of the log crate are forwarded to `logger`, with their target as the position.
/// `DEBUG` and `TRACE` records are written with the `INFO` tag; nothing is filtered out.
///
/// This function will set the global maximum log level to `Trace`.
///
/// # Errors
///
/// Return an error if the log crate global logger has already been set.
///
/// # Examples
///
/// ```no_run
/// use std::sync::OnceLock;
///
/// use talon::FileLogger;
///
/// static LOGGER: OnceLock<FileLogger> = OnceLock::new();
///
/// let logger = LOGGER.get_or_init(|| talon::new_logger("crawler").unwrap());
/// if let Err(err) = talon::bridge::try_setup_log_crate(logger) {
///     eprintln!("failed to setup log crate: {err}");
/// }
///
/// log::info!("this record lands in the crawler log");
/// ```
pub fn try_setup_log_crate(logger: &'static FileLogger) -> Result<(), crate::Error> {
    log::set_logger(logger).map_err(|err| {
        crate::Error::new("failed to set up log crate global logger").with_source(err)
    })?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

/// Set up the log crate global logger.
///
/// See [`try_setup_log_crate`].
///
/// # Panics
///
/// Panic if the log crate global logger has already been set.
pub fn setup_log_crate(logger: &'static FileLogger) {
    try_setup_log_crate(logger).expect(
        "talon::bridge::setup_log_crate must be called before the log crate global logger initialized",
    )
}
