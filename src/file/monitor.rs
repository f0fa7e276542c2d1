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

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Receiver;
use crossbeam_channel::select;
use crossbeam_channel::tick;

use crate::Error;
use crate::Trap;
use crate::file::active::SharedFile;
use crate::stats::Counters;

/// Periodically checks whether the active file must be replaced.
///
/// A failed check is reported to the trap and retried on the next tick. The monitor stops once
/// the shutdown channel is disconnected.
pub(crate) struct Monitor {
    interval: Duration,
    shutdown: Receiver<()>,
    file: Arc<SharedFile>,
    trap: Arc<dyn Trap>,
    counters: Arc<Counters>,
}

impl Monitor {
    pub(crate) fn new(
        interval: Duration,
        shutdown: Receiver<()>,
        file: Arc<SharedFile>,
        trap: Arc<dyn Trap>,
        counters: Arc<Counters>,
    ) -> Self {
        Self {
            interval,
            shutdown,
            file,
            trap,
            counters,
        }
    }

    pub(crate) fn spawn(self, name: &str) -> Result<JoinHandle<()>, Error> {
        std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || self.run())
            .map_err(|err| Error::new("failed to spawn log monitor thread").with_source(err))
    }

    fn run(self) {
        let ticker = tick(self.interval);
        loop {
            select! {
                recv(ticker) -> _ => self.check(),
                recv(self.shutdown) -> _ => break,
            }
        }
    }

    fn check(&self) {
        let result = match self.file.lock().as_mut() {
            Some(active) => active.check(),
            None => Ok(None),
        };
        match result {
            Ok(Some(_)) => self.counters.rotated(),
            Ok(None) => {}
            Err(err) => {
                self.counters.rotation_failed();
                self.trap.trap(&err);
            }
        }
    }
}
