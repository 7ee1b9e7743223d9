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

use hypocenter_common::{
    error::{Error, Result},
    time::TimeWindow,
};
use serde::{Deserialize, Serialize};

use super::Eviction;

/// Ring eviction config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingConfig {
    /// Maximum number of cached objects.
    pub capacity: usize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

/// Keeps the newest `capacity` objects, oldest evicted first.
#[derive(Debug)]
pub struct Ring {
    capacity: usize,
}

impl Ring {
    /// Current capacity bound.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Eviction for Ring {
    type Config = RingConfig;

    fn new(config: &Self::Config) -> Self {
        assert!(config.capacity > 0, "ring capacity must not be zero");
        Self {
            capacity: config.capacity,
        }
    }

    fn update(&mut self, config: &Self::Config) -> Result<()> {
        if config.capacity == 0 {
            return Err(Error::config("ring capacity must not be zero"));
        }
        self.capacity = config.capacity;
        Ok(())
    }

    fn overflow(&self, len: usize, _window: Option<TimeWindow>) -> bool {
        len > self.capacity
    }
}
