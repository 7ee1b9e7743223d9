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

use chrono::{DateTime, TimeDelta, Utc};

/// Point on the UTC timeline.
pub type Timestamp = DateTime<Utc>;

/// Signed span between two [`Timestamp`]s.
pub type TimeSpan = TimeDelta;

/// Current wall clock time.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Closed time window between two timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    since: Timestamp,
    until: Timestamp,
}

impl TimeWindow {
    /// Create a window spanning `since..=until`.
    ///
    /// `since` must not be later than `until`.
    pub fn new(since: Timestamp, until: Timestamp) -> Self {
        debug_assert!(since <= until);
        Self { since, until }
    }

    /// Earliest covered timestamp.
    pub fn since(&self) -> Timestamp {
        self.since
    }

    /// Latest covered timestamp.
    pub fn until(&self) -> Timestamp {
        self.until
    }

    /// Span between the window bounds.
    pub fn length(&self) -> TimeSpan {
        self.until - self.since
    }

    /// Check whether `stamp` falls within the window bounds.
    pub fn contains(&self, stamp: Timestamp) -> bool {
        self.since <= stamp && stamp <= self.until
    }
}
