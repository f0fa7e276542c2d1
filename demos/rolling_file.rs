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
use std::time::Duration;

use talon::FileLoggerBuilder;
use talon::Position;

fn main() {
    let logger = FileLoggerBuilder::new("logs", "example")
        .max_file_size(NonZeroU64::new(4 * 1024).unwrap())
        .check_interval(Duration::from_secs(1))
        .position(Position::named("demo"))
        .build()
        .unwrap();

    let repeat = 3;

    for i in 0..repeat {
        for n in 0..50 {
            logger.infof(format_args!("round {i}, record {n}"));
        }
        logger.warn(&[&"round", &i, &"done"]);
        logger.errorln(&[&"nothing went wrong in round", &i]);

        if i + 1 < repeat {
            std::thread::sleep(Duration::from_secs(2));
        }
    }

    let stats = logger.stats();
    println!(
        "{} records written, {} rotations, active file {:?}",
        stats.records_written,
        stats.rotations,
        logger.current_path()
    );
    logger.shutdown().unwrap();
}
