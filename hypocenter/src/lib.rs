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

//! hypocenter is the identity, ownership, and caching backbone of a
//! seismological processing platform.
//!
//! It keeps every data object unique by publicID within a process, wires
//! objects into trees with single weak parents, broadcasts mutations to
//! observers, and bounds the live working set with insertion-ordered caches
//! backed by an archive.

pub use hypocenter_cache as cache;
pub use hypocenter_common as common;
pub use hypocenter_model as model;

pub mod prelude;
pub use prelude::*;
