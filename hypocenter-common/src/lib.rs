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

//! Shared components and utilities for the hypocenter crates.

/// Assertion macros that upgrade with the `strict_assertions` feature.
pub mod assert;
/// Error and result types.
pub mod error;
/// Hash builder abstraction.
pub mod hasher;
/// Metrics framework.
pub mod metrics;
/// Scoped functional programming extensions.
pub mod scope;
/// Time types used across the data model.
pub mod time;
