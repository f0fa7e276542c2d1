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

/// Position tag attached to every record, marking where a record originates.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Position {
    /// The logger is used from a single logical position.
    #[default]
    Single,
    /// A caller-supplied label, such as the name of a crawler component.
    Named(String),
}

impl Position {
    /// Create a named position.
    pub fn named(name: impl Into<String>) -> Self {
        Position::Named(name.into())
    }

    /// The label written into each record.
    pub fn as_str(&self) -> &str {
        match self {
            Position::Single => "single",
            Position::Named(name) => name,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Position {
    fn from(name: &str) -> Self {
        Position::named(name)
    }
}

impl From<String> for Position {
    fn from(name: String) -> Self {
        Position::Named(name)
    }
}
