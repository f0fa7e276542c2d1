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

//! The file side of the logger: the active file, its writer and its rotation monitor.
//!
//! Files are laid out as `{base_dir}/{log_name}/{YYYY-MM-DD}/{HH_MM_SS}.log`, named after the
//! moment they were created.

pub(crate) use self::active::ActiveFile;
pub(crate) use self::active::SharedFile;
pub(crate) use self::clock::Clock;
pub(crate) use self::monitor::Monitor;
pub(crate) use self::writer::Task;
pub(crate) use self::writer::Writer;

mod active;
mod clock;
mod monitor;
mod writer;

#[cfg(test)]
pub(crate) use self::clock::ManualClock;
