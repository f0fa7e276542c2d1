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
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use talon::FileLoggerBuilder;
use tempfile::TempDir;

fn log_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = vec![];
    for day in fs::read_dir(dir).unwrap() {
        for file in fs::read_dir(day.unwrap().path()).unwrap() {
            files.push(file.unwrap().path());
        }
    }
    files.sort();
    files
}

#[test]
fn test_concurrent_producers_keep_every_record_in_order() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let producers = 8;
    let records = 500;

    let logger = Arc::new(
        FileLoggerBuilder::new(temp_dir.path(), "crawler")
            .pipe_capacity(NonZeroUsize::new(16).unwrap())
            .build()
            .unwrap(),
    );

    let handles = (0..producers)
        .map(|p| {
            let logger = logger.clone();
            thread::spawn(move || {
                for seq in 0..records {
                    logger.infof(format_args!("producer={p} seq={seq}"));
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.shutdown().unwrap();

    let mut content = String::new();
    for file in log_files(&temp_dir.path().join("crawler")) {
        content.push_str(&fs::read_to_string(file).unwrap());
    }
    assert!(content.ends_with("\r\n"));

    let lines = content.split("\r\n").filter(|l| !l.is_empty()).collect::<Vec<_>>();
    assert_eq!(lines.len(), producers * records);

    let mut next = vec![0; producers];
    for line in lines {
        let (_, tail) = line.split_once("producer=").unwrap();
        let (p, seq) = tail.split_once(" seq=").unwrap();
        let p = p.parse::<usize>().unwrap();
        let seq = seq.parse::<usize>().unwrap();
        assert_eq!(seq, next[p], "producer {p} is out of order");
        next[p] += 1;
    }
    assert!(next.iter().all(|&n| n == records));
    assert_eq!(logger.stats().records_written, (producers * records) as u64);
}

#[test]
fn test_trailing_separator_of_base_directory_is_ignored() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let basedir = format!("{}/", temp_dir.path().display());

    let logger = FileLoggerBuilder::new(basedir, "crawler").build().unwrap();
    let path = logger.current_path().unwrap();
    assert!(path.starts_with(temp_dir.path().join("crawler")));

    let name = path.file_name().unwrap().to_str().unwrap();
    assert_eq!(name.len(), "HH_MM_SS.log".len());
    assert!(name.ends_with(".log"));
    let day = path.parent().unwrap().file_name().unwrap().to_str().unwrap();
    assert_eq!(day.len(), "YYYY-MM-DD".len());
}
