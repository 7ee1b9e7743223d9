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

use std::time::Duration;

use hypocenter_common::{
    error::{Error, Result},
    time::{TimeSpan, TimeWindow},
};
use serde::{Deserialize, Serialize};

use super::Eviction;

/// Span eviction config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanConfig {
    /// Maximum age of the oldest object relative to the newest.
    pub span: Duration,
}

impl Default for SpanConfig {
    fn default() -> Self {
        Self {
            span: Duration::from_secs(1800),
        }
    }
}

/// Keeps the objects stamped within a sliding time span behind the newest.
///
/// The newest object is always kept, whatever its age.
#[derive(Debug)]
pub struct Span {
    span: TimeSpan,
}

impl Span {
    /// Current span bound.
    pub fn span(&self) -> TimeSpan {
        self.span
    }
}

fn to_time_span(span: Duration) -> TimeSpan {
    TimeSpan::from_std(span).unwrap_or(TimeSpan::MAX)
}

impl Eviction for Span {
    type Config = SpanConfig;

    fn new(config: &Self::Config) -> Self {
        assert!(!config.span.is_zero(), "span must not be zero");
        Self {
            span: to_time_span(config.span),
        }
    }

    fn update(&mut self, config: &Self::Config) -> Result<()> {
        if config.span.is_zero() {
            return Err(Error::config("span must not be zero"));
        }
        self.span = to_time_span(config.span);
        Ok(())
    }

    fn overflow(&self, _len: usize, window: Option<TimeWindow>) -> bool {
        match window {
            Some(window) => window.length() > self.span,
            None => false,
        }
    }
}
