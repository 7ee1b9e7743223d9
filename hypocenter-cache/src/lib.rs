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

//! Bounded caches over the hypocenter object model.
//!
//! A [`cache::ObjectCache`] keeps recently seen public objects alive in
//! strict insertion order. The [`eviction::Eviction`] policy bounds it by
//! entry count or by covered time span, and an optional
//! [`archive::Archive`] serves lookup misses from long-term storage.

pub mod archive;
pub mod cache;
pub mod eviction;
pub mod item;

mod indexer;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub mod prelude;
