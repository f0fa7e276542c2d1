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

//! The record formatter.
//!
//! Output format:
//!
//! ```text
//! 2024-08-10 17:12:52.123 [ERROR] <fetcher> src/fetch.rs:42 count=3
//! 2024-08-10 17:12:52.124 [INFO] <single> src/main.rs:7 a b
//! ```

use std::fmt;
use std::fmt::Write;

use jiff::Zoned;

use crate::Level;
use crate::Position;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Written in place of a message whose [`fmt::Display`] implementation returned an error.
pub const UNFORMATTABLE_MESSAGE: &str = "<unformattable message>";

/// The caller location written into a record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Location<'a> {
    /// Source file of the call site.
    pub file: &'a str,
    /// Line of the call site.
    pub line: u32,
}

impl<'a> From<&'a std::panic::Location<'a>> for Location<'a> {
    fn from(location: &'a std::panic::Location<'a>) -> Self {
        Location {
            file: location.file(),
            line: location.line(),
        }
    }
}

/// The payload of a record, in one of the two call shapes of the logger.
#[derive(Clone, Copy)]
pub enum Message<'a> {
    /// Values rendered with [`fmt::Display`] and joined by a single space.
    Values(&'a [&'a dyn fmt::Display]),
    /// Pre-formatted arguments, usually built with [`format_args!`].
    Format(fmt::Arguments<'a>),
}

impl fmt::Display for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Values(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
            Message::Format(args) => f.write_fmt(*args),
        }
    }
}

impl fmt::Debug for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// Format one record into a line of text.
///
/// The returned line never ends with a line terminator; the file writer appends `\r\n`.
pub fn format_record(
    now: &Zoned,
    level: Level,
    position: &Position,
    location: Option<Location<'_>>,
    message: Message<'_>,
) -> String {
    let mut text = String::new();

    // SAFETY: write to a string always succeeds and the header's values never fail to display
    write!(
        &mut text,
        "{}.{:03} [{level}] <{position}>",
        now.strftime(TIMESTAMP_FORMAT),
        now.millisecond()
    )
    .unwrap();
    if let Some(Location { file, line }) = location {
        write!(&mut text, " {file}:{line}").unwrap();
    }

    let header = text.len();
    if write!(&mut text, " {message}").is_err() {
        text.truncate(header);
        text.push(' ');
        text.push_str(UNFORMATTABLE_MESSAGE);
    }

    let len = text.trim_end_matches(['\r', '\n']).len();
    text.truncate(len);
    text
}
