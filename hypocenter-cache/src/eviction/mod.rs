// Copyright 2026 hypocenter Project Authors
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

use std::fmt::Debug;

use hypocenter_common::{error::Result, time::TimeWindow};
use serde::{de::DeserializeOwned, Serialize};

/// Bound policy of an object cache.
///
/// The cache keeps insertion order. A policy only decides when the oldest
/// item has to go, based on the item count and the stamp window the cache
/// currently covers.
pub trait Eviction: Send + Sync + 'static {
    /// Policy configuration.
    type Config: Clone + Debug + Default + Serialize + DeserializeOwned;

    /// Build the policy from a config.
    ///
    /// # Panics
    ///
    /// Panics if the config is invalid.
    fn new(config: &Self::Config) -> Self;

    /// Apply a new config.
    ///
    /// An invalid config fails with [`ErrorKind::Config`] and leaves the
    /// policy untouched. The new bound is enforced on the next feed, the
    /// cache is not shrunk retroactively.
    ///
    /// [`ErrorKind::Config`]: hypocenter_common::error::ErrorKind::Config
    fn update(&mut self, config: &Self::Config) -> Result<()>;

    /// Whether a cache holding `len` items covering `window` is over bound.
    ///
    /// `window` is `None` for an empty cache.
    fn overflow(&self, len: usize, window: Option<TimeWindow>) -> bool;
}

pub mod ring;
pub mod span;
