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

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::Duration;

use arc_swap::ArcSwap;
use arc_swap::ArcSwapOption;
use crossbeam_channel::Sender;
use jiff::Zoned;

use crate::Error;
use crate::Level;
use crate::Position;
use crate::Stats;
use crate::Trap;
use crate::file::ActiveFile;
use crate::file::Monitor;
use crate::file::SharedFile;
use crate::file::Task;
use crate::file::Writer;
use crate::format::Location;
use crate::format::Message;
use crate::format::format_record;
use crate::stats::Counters;

const WRITER_THREAD_NAME: &str = "talon-log-writer";
const MONITOR_THREAD_NAME: &str = "talon-log-monitor";

/// A thread-safe logger appending records to day and size rolling files.
///
/// Each logging method formats the record on the calling thread, hands it to a bounded pipe and
/// returns the formatted line. A dedicated writer thread appends the lines to the active file in
/// submission order; a monitor thread replaces the active file when the day changes, when it
/// grows past the size limit, or when it was deleted. When the pipe is full, callers block until
/// the writer catches up. Records are never dropped for lack of room.
///
/// Dropping the logger shuts it down, see [`FileLogger::shutdown`].
///
/// Create one with [`FileLoggerBuilder`](crate::FileLoggerBuilder) or [`new_logger`](crate::new_logger).
pub struct FileLogger {
    pipe: ArcSwapOption<Sender<Task>>,
    position: ArcSwap<Position>,
    file: Arc<SharedFile>,
    workers: Mutex<Option<Workers>>,
    trap: Arc<dyn Trap>,
    counters: Arc<Counters>,
}

struct Workers {
    writer: JoinHandle<()>,
    monitor: JoinHandle<()>,
    stop_monitor: Sender<()>,
}

impl fmt::Debug for FileLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileLogger")
            .field("position", &self.position())
            .field("file", &self.file)
            .field("trap", &self.trap)
            .field("stats", &self.counters.snapshot())
            .finish_non_exhaustive()
    }
}

impl FileLogger {
    pub(crate) fn start(
        active: ActiveFile,
        pipe_capacity: usize,
        position: Position,
        check_interval: Duration,
        trap: Arc<dyn Trap>,
    ) -> Result<FileLogger, Error> {
        let file = Arc::new(SharedFile::new(active));
        let counters = Arc::new(Counters::default());

        let (sender, receiver) = crossbeam_channel::bounded(pipe_capacity);
        let writer = Writer::new(receiver, file.clone(), trap.clone(), counters.clone())
            .spawn(WRITER_THREAD_NAME)?;

        let (stop_monitor, stopped) = crossbeam_channel::bounded(0);
        let monitor = Monitor::new(
            check_interval,
            stopped,
            file.clone(),
            trap.clone(),
            counters.clone(),
        );
        let monitor = match monitor.spawn(MONITOR_THREAD_NAME) {
            Ok(monitor) => monitor,
            Err(err) => {
                drop(sender);
                let _ = writer.join();
                return Err(err);
            }
        };

        Ok(FileLogger {
            pipe: ArcSwapOption::from_pointee(sender),
            position: ArcSwap::from_pointee(position),
            file,
            workers: Mutex::new(Some(Workers {
                writer,
                monitor,
                stop_monitor,
            })),
            trap,
            counters,
        })
    }

    /// Return the position currently attached to records.
    pub fn position(&self) -> Position {
        self.position.load().as_ref().clone()
    }

    /// Set the position attached to subsequent records.
    pub fn set_position(&self, position: impl Into<Position>) {
        self.position.store(Arc::new(position.into()));
    }

    /// Return the path of the active log file, or `None` after shutdown.
    pub fn current_path(&self) -> Option<PathBuf> {
        self.file
            .lock()
            .as_ref()
            .map(|active| active.path().to_path_buf())
    }

    /// Return a snapshot of the write and rotation counters.
    pub fn stats(&self) -> Stats {
        self.counters.snapshot()
    }

    /// Log a formatted record at the given level.
    #[track_caller]
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) -> String {
        self.emit(level, Message::Format(args))
    }

    /// Log an `INFO` record made of `values` joined by single spaces.
    ///
    /// Returns the formatted line, as written to the file without its terminator.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// let logger = talon::new_logger("crawler").unwrap();
    /// let line = logger.info(&[&"fetched", &42, &"pages"]);
    /// assert!(line.ends_with("fetched 42 pages"));
    /// ```
    #[track_caller]
    pub fn info(&self, values: &[&dyn fmt::Display]) -> String {
        self.emit(Level::Info, Message::Values(values))
    }

    /// Log an `INFO` record from format arguments.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// let logger = talon::new_logger("crawler").unwrap();
    /// logger.infof(format_args!("fetched {} pages", 42));
    /// ```
    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) -> String {
        self.emit(Level::Info, Message::Format(args))
    }

    /// Same as [`FileLogger::info`].
    #[track_caller]
    pub fn infoln(&self, values: &[&dyn fmt::Display]) -> String {
        self.emit(Level::Info, Message::Values(values))
    }

    /// Log a `WARN` record made of `values` joined by single spaces.
    #[track_caller]
    pub fn warn(&self, values: &[&dyn fmt::Display]) -> String {
        self.emit(Level::Warn, Message::Values(values))
    }

    /// Log a `WARN` record from format arguments.
    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) -> String {
        self.emit(Level::Warn, Message::Format(args))
    }

    /// Same as [`FileLogger::warn`].
    #[track_caller]
    pub fn warnln(&self, values: &[&dyn fmt::Display]) -> String {
        self.emit(Level::Warn, Message::Values(values))
    }

    /// Log an `ERROR` record made of `values` joined by single spaces.
    #[track_caller]
    pub fn error(&self, values: &[&dyn fmt::Display]) -> String {
        self.emit(Level::Error, Message::Values(values))
    }

    /// Log an `ERROR` record from format arguments.
    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) -> String {
        self.emit(Level::Error, Message::Format(args))
    }

    /// Same as [`FileLogger::error`].
    #[track_caller]
    pub fn errorln(&self, values: &[&dyn fmt::Display]) -> String {
        self.emit(Level::Error, Message::Values(values))
    }

    /// Log a `FATAL` record made of `values` joined by single spaces.
    ///
    /// This only tags the record; the process keeps running.
    #[track_caller]
    pub fn fatal(&self, values: &[&dyn fmt::Display]) -> String {
        self.emit(Level::Fatal, Message::Values(values))
    }

    /// Log a `FATAL` record from format arguments.
    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> String {
        self.emit(Level::Fatal, Message::Format(args))
    }

    /// Same as [`FileLogger::fatal`].
    #[track_caller]
    pub fn fatalln(&self, values: &[&dyn fmt::Display]) -> String {
        self.emit(Level::Fatal, Message::Values(values))
    }

    /// Log a `PANIC` record made of `values` joined by single spaces.
    ///
    /// This only tags the record; it does not panic.
    #[track_caller]
    pub fn panic(&self, values: &[&dyn fmt::Display]) -> String {
        self.emit(Level::Panic, Message::Values(values))
    }

    /// Log a `PANIC` record from format arguments.
    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) -> String {
        self.emit(Level::Panic, Message::Format(args))
    }

    /// Same as [`FileLogger::panic`].
    #[track_caller]
    pub fn panicln(&self, values: &[&dyn fmt::Display]) -> String {
        self.emit(Level::Panic, Message::Values(values))
    }

    /// Block until every record submitted before this call is appended, then flush the file.
    ///
    /// # Errors
    ///
    /// Return an error if the logger is shut down or the file cannot be flushed.
    pub fn flush(&self) -> Result<(), Error> {
        let Some(sender) = self.pipe.load_full() else {
            return Err(Error::new("logger is shut down"));
        };

        let (done, wait) = oneshot::channel();
        sender
            .send(Task::Flush(done))
            .map_err(|_| Error::new("log writer has stopped"))?;
        drop(sender);

        wait.recv()
            .map_err(|err| Error::new("log writer has stopped").with_source(err))?
    }

    /// Stop accepting records, write out the buffered ones, stop the monitor and close the file.
    ///
    /// Records logged after shutdown are not written; the logging methods still return the
    /// formatted line and report the loss to the trap. Calling this more than once is a no-op.
    ///
    /// # Errors
    ///
    /// Return an error if a background thread panicked or the file cannot be synced.
    pub fn shutdown(&self) -> Result<(), Error> {
        let mut workers = self.workers.lock().unwrap_or_else(|e| e.into_inner());
        let Some(Workers {
            writer,
            monitor,
            stop_monitor,
        }) = workers.take()
        else {
            return Ok(());
        };

        // the writer exits once the last in-flight sender is gone and the pipe is drained
        drop(self.pipe.swap(None));
        let writer = writer.join();

        drop(stop_monitor);
        let monitor = monitor.join();

        if writer.is_err() {
            return Err(Error::new("log writer thread panicked"));
        }
        if monitor.is_err() {
            return Err(Error::new("log monitor thread panicked"));
        }

        match self.file.take() {
            Some(active) => active.close(),
            None => Ok(()),
        }
    }

    #[track_caller]
    fn emit(&self, level: Level, message: Message<'_>) -> String {
        let location = Location::from(std::panic::Location::caller());
        let position = self.position.load();
        self.emit_at(level, &position, Some(location), message)
    }

    pub(crate) fn emit_at(
        &self,
        level: Level,
        position: &Position,
        location: Option<Location<'_>>,
        message: Message<'_>,
    ) -> String {
        let line = format_record(&Zoned::now(), level, position, location, message);
        self.submit(line.clone());
        line
    }

    fn submit(&self, line: String) {
        let sent = match self.pipe.load_full() {
            Some(sender) => sender.send(Task::Record(line)).is_ok(),
            None => false,
        };
        if !sent {
            self.counters.write_failed();
            self.trap
                .trap(&Error::new("logger is shut down, record is not written"));
        }
    }

    pub(crate) fn trap(&self, err: &Error) {
        self.trap.trap(err);
    }
}

impl Drop for FileLogger {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            self.trap.trap(&err);
        }
    }
}
