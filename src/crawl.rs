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

//! Contracts shared with the crawling pipeline.
//!
//! The logger does not depend on these; they describe the functions the analyzer and item
//! pipeline plug in, and the cookie store handed to the HTTP client.

use std::collections::BTreeMap;
use std::sync::Arc;

/// An item extracted from a page.
pub type Item = BTreeMap<String, serde_json::Value>;

/// Something produced while parsing a response.
#[derive(Debug)]
pub enum Data {
    /// A follow-up request to schedule.
    Request(http::Request<()>),
    /// An extracted item to hand to the item pipeline.
    Item(Item),
}

/// Parses an HTTP response fetched at the given crawl depth.
///
/// Returns everything that could be extracted together with the errors met on the way; both may
/// be non-empty.
pub type ParseResponse =
    Box<dyn Fn(&http::Response<Vec<u8>>, u32) -> (Vec<Data>, Vec<anyhow::Error>) + Send + Sync>;

/// Processes one item, producing either the transformed item or an error.
pub type ProcessItem = Box<dyn Fn(Item) -> anyhow::Result<Item> + Send + Sync>;

/// Create an empty cookie store for the crawler's HTTP client.
///
/// Cookies are matched by domain and path; pass the jar to
/// [`reqwest::ClientBuilder::cookie_provider`].
pub fn new_cookie_jar() -> Arc<reqwest::cookie::Jar> {
    Arc::new(reqwest::cookie::Jar::default())
}
