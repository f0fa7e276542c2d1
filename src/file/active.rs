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

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::mem;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;

use jiff::Zoned;

use crate::Error;
use crate::file::clock::Clock;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H_%M_%S";

/// Why the active file was replaced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Rollover {
    /// The active file disappeared from disk.
    Missing,
    /// The calendar day changed since the file was created.
    Date,
    /// The file reached the size ceiling.
    Size,
}

/// The one open log file, together with what is needed to replace it.
#[derive(Debug)]
pub(crate) struct ActiveFile {
    log_dir: PathBuf,
    max_size: u64,
    clock: Clock,
    created_at: Zoned,
    path: PathBuf,
    file: File,
}

impl ActiveFile {
    /// Create the dated directory under `log_dir` and open the first file in it.
    pub(crate) fn open(log_dir: PathBuf, max_size: u64, clock: Clock) -> Result<Self, Error> {
        let now = clock.now();
        let (path, file) = create_log_file(&log_dir, &now)?;
        Ok(ActiveFile {
            log_dir,
            max_size,
            clock,
            created_at: now,
            path,
            file,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub(crate) fn set_now(&mut self, now: Zoned) {
        self.clock.set_now(now);
    }

    #[cfg(test)]
    pub(crate) fn replace_handle(&mut self, file: File) -> File {
        mem::replace(&mut self.file, file)
    }

    pub(crate) fn append(&mut self, line: &str) -> Result<(), Error> {
        let mut buf = Vec::with_capacity(line.len() + 2);
        buf.extend_from_slice(line.as_bytes());
        buf.extend_from_slice(b"\r\n");
        self.file
            .write_all(&buf)
            .map_err(|err| Error::from_io_error("failed to append to log file", &self.path, err))
    }

    pub(crate) fn flush(&mut self) -> Result<(), Error> {
        self.file
            .flush()
            .map_err(|err| Error::from_io_error("failed to flush log file", &self.path, err))
    }

    /// Sync the file to disk and close it.
    pub(crate) fn close(self) -> Result<(), Error> {
        self.file
            .sync_all()
            .map_err(|err| Error::from_io_error("failed to sync log file", &self.path, err))
    }

    /// Replace the active file if it is missing, belongs to a past day, or is full.
    ///
    /// Returns the reason of the replacement, or `None` if the file is kept. On error the
    /// previous file stays active.
    pub(crate) fn check(&mut self) -> Result<Option<Rollover>, Error> {
        let now = self.clock.now();

        let rollover = if !is_regular_file(&self.path) {
            Rollover::Missing
        } else if now.date() != self.created_at.date() {
            Rollover::Date
        } else if self.current_size()? >= self.max_size {
            Rollover::Size
        } else {
            return Ok(None);
        };

        // a second rotation within the same second would reopen the full file
        if rollover == Rollover::Size && log_file_path(&self.log_dir, &now) == self.path {
            return Ok(None);
        }

        self.rotate(now)?;
        Ok(Some(rollover))
    }

    fn current_size(&self) -> Result<u64, Error> {
        self.file
            .metadata()
            .map(|metadata| metadata.len())
            .map_err(|err| Error::from_io_error("failed to stat log file", &self.path, err))
    }

    fn rotate(&mut self, now: Zoned) -> Result<(), Error> {
        let (path, file) = create_log_file(&self.log_dir, &now)?;
        let previous = mem::replace(&mut self.file, file);
        self.path = path;
        self.created_at = now;
        drop(previous);
        Ok(())
    }
}

/// The active file shared by the writer and the rotation monitor.
///
/// `None` once the logger has been shut down.
#[derive(Debug)]
pub(crate) struct SharedFile(Mutex<Option<ActiveFile>>);

impl SharedFile {
    pub(crate) fn new(active: ActiveFile) -> Self {
        SharedFile(Mutex::new(Some(active)))
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Option<ActiveFile>> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn take(&self) -> Option<ActiveFile> {
        self.lock().take()
    }
}

fn log_file_path(log_dir: &Path, now: &Zoned) -> PathBuf {
    let date = now.strftime(DATE_FORMAT).to_string();
    let time = now.strftime(TIME_FORMAT);
    log_dir.join(date).join(format!("{time}.log"))
}

fn create_log_file(log_dir: &Path, now: &Zoned) -> Result<(PathBuf, File), Error> {
    let path = log_file_path(log_dir, now);
    if let Some(dir) = path.parent() {
        create_dir_all(dir)
            .map_err(|err| Error::from_io_error("failed to create log directory", dir, err))?;
    }

    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o666);
    }

    let file = options
        .open(&path)
        .map_err(|err| Error::from_io_error("failed to open log file", &path, err))?;
    Ok((path, file))
}

fn create_dir_all(dir: &Path) -> std::io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o777);
    }
    builder.create(dir)
}

fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|metadata| metadata.is_file())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::str::FromStr;

    use jiff::Span;
    use jiff::Zoned;
    use rand::Rng;
    use rand::distr::Alphanumeric;
    use tempfile::TempDir;

    use super::*;
    use crate::file::clock::ManualClock;

    fn manual(now: &str) -> Clock {
        Clock::Manual(ManualClock::new(Zoned::from_str(now).unwrap()))
    }

    fn advance(active: &mut ActiveFile, span: Span) {
        active.clock.advance(span);
    }

    fn random_line() -> String {
        let mut rng = rand::rng();
        let len = rng.random_range(50..=100);
        std::iter::repeat(())
            .map(|()| rng.sample(Alphanumeric))
            .map(char::from)
            .take(len)
            .collect()
    }

    #[test]
    fn test_layout_is_partitioned_by_day() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let log_dir = temp_dir.path().join("crawler");
        let active =
            ActiveFile::open(log_dir.clone(), 1024, manual("2024-08-10T17:12:52+08[+08]")).unwrap();

        assert_eq!(
            active.path(),
            log_dir.join("2024-08-10").join("17_12_52.log")
        );
        assert!(active.path().is_file());
    }

    #[test]
    fn test_lines_are_terminated_with_crlf() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let mut active = ActiveFile::open(
            temp_dir.path().to_path_buf(),
            1024,
            manual("2024-08-10T17:12:52+08[+08]"),
        )
        .unwrap();

        active.append("first").unwrap();
        active.append("second").unwrap();
        active.flush().unwrap();

        let content = fs::read_to_string(active.path()).unwrap();
        assert_eq!(content, "first\r\nsecond\r\n");
    }

    #[test]
    fn test_rollover_via_file_size() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let max_size = 1000;
        let mut active = ActiveFile::open(
            temp_dir.path().to_path_buf(),
            max_size,
            manual("2024-08-10T10:00:00+08[+08]"),
        )
        .unwrap();

        let mut paths = vec![active.path().to_path_buf()];
        for _ in 0..5 {
            let mut written = 0;
            while written < max_size {
                let line = random_line();
                written += line.len() as u64 + 2;
                assert_eq!(active.check().unwrap(), None);
                active.append(&line).unwrap();
            }

            advance(&mut active, Span::new().seconds(10));
            assert_eq!(active.check().unwrap(), Some(Rollover::Size));
            assert!(!paths.contains(&active.path().to_path_buf()));
            paths.push(active.path().to_path_buf());
        }

        for path in &paths[..paths.len() - 1] {
            assert!(fs::metadata(path).unwrap().len() >= max_size);
        }
        let dir = temp_dir.path().join("2024-08-10");
        assert_eq!(fs::read_dir(dir).unwrap().count(), paths.len());
    }

    #[test]
    fn test_no_writes_land_in_rotated_file() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let mut active = ActiveFile::open(
            temp_dir.path().to_path_buf(),
            10,
            manual("2024-08-10T10:00:00+08[+08]"),
        )
        .unwrap();

        active.append("0123456789").unwrap();
        let old_path = active.path().to_path_buf();
        advance(&mut active, Span::new().seconds(10));
        assert_eq!(active.check().unwrap(), Some(Rollover::Size));

        active.append("after rotation").unwrap();
        assert_eq!(fs::read_to_string(&old_path).unwrap(), "0123456789\r\n");
        assert_eq!(
            fs::read_to_string(active.path()).unwrap(),
            "after rotation\r\n"
        );
    }

    #[test]
    fn test_rollover_via_date() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let mut active = ActiveFile::open(
            temp_dir.path().to_path_buf(),
            u64::MAX,
            manual("2024-08-10T23:59:50+08[+08]"),
        )
        .unwrap();
        active.append("late").unwrap();

        advance(&mut active, Span::new().seconds(5));
        assert_eq!(active.check().unwrap(), None);

        advance(&mut active, Span::new().seconds(10));
        assert_eq!(active.check().unwrap(), Some(Rollover::Date));
        assert_eq!(
            active.path(),
            temp_dir.path().join("2024-08-11").join("00_00_05.log")
        );
        assert!(
            temp_dir
                .path()
                .join("2024-08-10")
                .join("23_59_50.log")
                .is_file()
        );
    }

    #[test]
    fn test_same_day_next_year_rolls_over() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let mut active = ActiveFile::open(
            temp_dir.path().to_path_buf(),
            u64::MAX,
            manual("2023-08-10T12:00:00+08[+08]"),
        )
        .unwrap();

        active
            .clock
            .set_now(Zoned::from_str("2024-08-09T12:00:00+08[+08]").unwrap());
        assert_eq!(active.check().unwrap(), Some(Rollover::Date));
        assert!(active.path().starts_with(temp_dir.path().join("2024-08-09")));
    }

    #[test]
    fn test_size_rollover_within_same_second_is_deferred() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let mut active = ActiveFile::open(
            temp_dir.path().to_path_buf(),
            4,
            manual("2024-08-10T10:00:00+08[+08]"),
        )
        .unwrap();
        active.append("full").unwrap();

        let path = active.path().to_path_buf();
        assert_eq!(active.check().unwrap(), None);
        assert_eq!(active.path(), path);

        advance(&mut active, Span::new().seconds(1));
        assert_eq!(active.check().unwrap(), Some(Rollover::Size));
        assert_ne!(active.path(), path);
    }

    #[test]
    fn test_directory_creation_is_idempotent() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let mut active = ActiveFile::open(
            temp_dir.path().to_path_buf(),
            1,
            manual("2024-08-10T10:00:00+08[+08]"),
        )
        .unwrap();

        for _ in 0..3 {
            active.append("x").unwrap();
            advance(&mut active, Span::new().seconds(1));
            assert_eq!(active.check().unwrap(), Some(Rollover::Size));
        }

        let dir = temp_dir.path().join("2024-08-10");
        assert_eq!(fs::read_dir(dir).unwrap().count(), 4);
    }

    #[test]
    fn test_deleted_file_is_recreated() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let mut active = ActiveFile::open(
            temp_dir.path().to_path_buf(),
            u64::MAX,
            manual("2024-08-10T10:00:00+08[+08]"),
        )
        .unwrap();
        active.append("gone").unwrap();

        fs::remove_dir_all(temp_dir.path().join("2024-08-10")).unwrap();
        advance(&mut active, Span::new().seconds(10));

        assert_eq!(active.check().unwrap(), Some(Rollover::Missing));
        assert_eq!(
            active.path(),
            temp_dir.path().join("2024-08-10").join("10_00_10.log")
        );
        active.append("back").unwrap();
        assert_eq!(fs::read_to_string(active.path()).unwrap(), "back\r\n");
    }

    #[test]
    fn test_failed_rotation_keeps_previous_file() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let mut active = ActiveFile::open(
            temp_dir.path().to_path_buf(),
            u64::MAX,
            manual("2024-08-10T23:59:55+08[+08]"),
        )
        .unwrap();
        let path = active.path().to_path_buf();

        // a plain file where tomorrow's directory should go
        fs::write(temp_dir.path().join("2024-08-11"), b"").unwrap();
        advance(&mut active, Span::new().seconds(10));

        let err = active.check().unwrap_err();
        assert_eq!(err.message(), "failed to create log directory");
        assert_eq!(active.path(), path);

        active.append("still here").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "still here\r\n");
    }
}
