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

use crossbeam_channel::Receiver;

use crate::Error;
use crate::Trap;
use crate::file::active::SharedFile;
use crate::stats::Counters;

pub(crate) enum Task {
    Record(String),
    Flush(oneshot::Sender<Result<(), Error>>),
}

/// The only appender of the active file.
///
/// Runs until every sender of the pipe is dropped, after draining what is left in it.
pub(crate) struct Writer {
    receiver: Receiver<Task>,
    file: Arc<SharedFile>,
    trap: Arc<dyn Trap>,
    counters: Arc<Counters>,
}

impl Writer {
    pub(crate) fn new(
        receiver: Receiver<Task>,
        file: Arc<SharedFile>,
        trap: Arc<dyn Trap>,
        counters: Arc<Counters>,
    ) -> Self {
        Self {
            receiver,
            file,
            trap,
            counters,
        }
    }

    pub(crate) fn spawn(self, name: &str) -> Result<JoinHandle<()>, Error> {
        std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || self.run())
            .map_err(|err| Error::new("failed to spawn log writer thread").with_source(err))
    }

    fn run(self) {
        let Self {
            receiver,
            file,
            trap,
            counters,
        } = self;

        while let Ok(task) = receiver.recv() {
            match task {
                Task::Record(line) => {
                    let result = match file.lock().as_mut() {
                        Some(active) => active.append(&line),
                        None => Err(Error::new("log file is closed")),
                    };
                    match result {
                        Ok(()) => counters.record_written(),
                        Err(err) => {
                            counters.write_failed();
                            trap.trap(&err);
                        }
                    }
                }
                Task::Flush(done) => {
                    let result = match file.lock().as_mut() {
                        Some(active) => active.flush(),
                        None => Err(Error::new("log file is closed")),
                    };
                    // the caller may have given up waiting
                    let _ = done.send(result);
                }
            }
        }
    }
}
