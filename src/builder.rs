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

use std::num::NonZeroU64;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::Error;
use crate::FileLogger;
use crate::Position;
use crate::Trap;
use crate::file::ActiveFile;
use crate::file::Clock;
use crate::trap::DefaultTrap;

const BYTES_PER_MB: u64 = 1024 * 1024;
const DEFAULT_PIPE_CAPACITY: NonZeroUsize = NonZeroUsize::new(200).unwrap();
const DEFAULT_MAX_SIZE: NonZeroU64 = NonZeroU64::new(10 * BYTES_PER_MB).unwrap();
const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(10);

/// A builder to configure and create a [`FileLogger`].
///
/// # Examples
///
/// ```no_run
/// use std::num::NonZeroU64;
/// use std::num::NonZeroUsize;
///
/// use talon::FileLoggerBuilder;
/// use talon::Position;
///
/// let logger = FileLoggerBuilder::new("log/", "crawler")
///     .pipe_capacity(NonZeroUsize::new(1024).unwrap())
///     .max_file_size_mb(NonZeroU64::new(64).unwrap())
///     .position(Position::named("scheduler"))
///     .build()
///     .unwrap();
///
/// logger.infof(format_args!("crawler started with {} workers", 8));
/// ```
#[derive(Debug)]
pub struct FileLoggerBuilder {
    // required
    basedir: PathBuf,
    log_name: String,

    // has default
    pipe_capacity: NonZeroUsize,
    max_size: NonZeroU64,
    position: Position,
    check_interval: Duration,
    trap: Box<dyn Trap>,
    clock: Clock,
}

impl FileLoggerBuilder {
    /// Create a new builder writing under `{basedir}/{log_name}`.
    ///
    /// Trailing path separators of `basedir` are ignored.
    #[must_use]
    pub fn new(basedir: impl Into<PathBuf>, log_name: impl Into<String>) -> Self {
        Self {
            basedir: basedir.into(),
            log_name: log_name.into(),
            pipe_capacity: DEFAULT_PIPE_CAPACITY,
            max_size: DEFAULT_MAX_SIZE,
            position: Position::Single,
            check_interval: DEFAULT_CHECK_INTERVAL,
            trap: Box::new(DefaultTrap::default()),
            clock: Clock::System,
        }
    }

    /// Set how many formatted records may wait for the writer before callers block.
    ///
    /// Default to 200.
    #[must_use]
    pub fn pipe_capacity(mut self, n: NonZeroUsize) -> Self {
        self.pipe_capacity = n;
        self
    }

    /// Set the size, in megabytes, at which the active file is rotated.
    ///
    /// Default to 10 MB.
    #[must_use]
    pub fn max_file_size_mb(mut self, mb: NonZeroU64) -> Self {
        let bytes = mb.get().saturating_mul(BYTES_PER_MB);
        self.max_size = NonZeroU64::new(bytes).unwrap_or(NonZeroU64::MAX);
        self
    }

    /// Set the size, in bytes, at which the active file is rotated.
    #[must_use]
    pub fn max_file_size(mut self, bytes: NonZeroU64) -> Self {
        self.max_size = bytes;
        self
    }

    /// Set the position attached to every record.
    ///
    /// Default to [`Position::Single`]. It can be changed later with
    /// [`FileLogger::set_position`].
    #[must_use]
    pub fn position(mut self, position: impl Into<Position>) -> Self {
        self.position = position.into();
        self
    }

    /// Set how often the rotation monitor checks the active file.
    ///
    /// Default to 10 seconds. A zero interval is rejected by [`build`](Self::build).
    #[must_use]
    pub fn check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Set the trap receiving write and rotation failures.
    ///
    /// Default to [`DefaultTrap`], which prints to standard error.
    #[must_use]
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    #[cfg(test)]
    pub(crate) fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Open the first log file and start the writer and rotation monitor threads.
    ///
    /// The dated directory and the first file exist when this returns, so the very first
    /// record has somewhere to go.
    ///
    /// # Errors
    ///
    /// Return an error if either:
    ///
    /// * The log name is empty.
    /// * The check interval is zero.
    /// * The log directory or the first log file cannot be created.
    /// * A background thread cannot be spawned.
    pub fn build(self) -> Result<FileLogger, Error> {
        let Self {
            basedir,
            log_name,
            pipe_capacity,
            max_size,
            position,
            check_interval,
            trap,
            clock,
        } = self;

        if log_name.is_empty() {
            return Err(Error::new("log name must not be empty"));
        }
        if check_interval.is_zero() {
            return Err(Error::new("check interval must not be zero"));
        }

        let log_dir = strip_trailing_separators(basedir).join(log_name);
        let active = ActiveFile::open(log_dir, max_size.get(), clock)?;
        FileLogger::start(
            active,
            pipe_capacity.get(),
            position,
            check_interval,
            Arc::from(trap),
        )
    }
}

fn strip_trailing_separators(dir: PathBuf) -> PathBuf {
    if dir.as_os_str().is_empty() {
        return dir;
    }
    let dir: PathBuf = dir.components().collect();

    // `\` is only a separator on Windows, but a trailing one is dropped everywhere
    #[cfg(not(windows))]
    {
        let trimmed = dir.to_str().map(|s| s.trim_end_matches(['/', '\\']));
        if let Some(trimmed) = trimmed.filter(|s| !s.is_empty()) {
            return PathBuf::from(trimmed);
        }
    }

    dir
}
