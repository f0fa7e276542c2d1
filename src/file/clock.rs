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

use jiff::Zoned;

/// Source of the timestamps that name log files and decide day rollovers.
///
/// Both the file name and the dated directory of a rotation are derived from a single reading,
/// so a rotation can never straddle two days.
#[derive(Debug)]
pub(crate) enum Clock {
    /// The system wall clock in the local time zone.
    System,
    #[cfg(test)]
    Manual(ManualClock),
}

impl Clock {
    pub(crate) fn now(&self) -> Zoned {
        match self {
            Clock::System => Zoned::now(),
            #[cfg(test)]
            Clock::Manual(clock) => clock.now.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn set_now(&mut self, now: Zoned) {
        if let Clock::Manual(clock) = self {
            clock.now = now;
        }
    }

    /// Move a manual clock forward. The system clock is left alone.
    #[cfg(test)]
    pub(crate) fn advance(&mut self, span: jiff::Span) {
        if let Clock::Manual(clock) = self {
            clock.now = clock
                .now
                .checked_add(span)
                .expect("manual clock moved out of range");
        }
    }
}

/// A frozen clock for exercising day and size rollovers deterministically.
#[derive(Debug)]
#[cfg(test)]
pub(crate) struct ManualClock {
    now: Zoned,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new(now: Zoned) -> ManualClock {
        ManualClock { now }
    }
}
