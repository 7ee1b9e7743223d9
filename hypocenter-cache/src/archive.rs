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

use std::sync::Arc;

use hypocenter_model::{ident::TypeInfo, public::PublicObject};

/// Fallback source for objects absent from a cache.
///
/// Consulted by [`ObjectCache::find`] on a lookup miss. An archive that
/// cannot serve a request, for whatever reason, answers `None`. The cache
/// does not distinguish "not found" from "store unreachable", callers
/// needing that distinction take it up with the archive directly.
///
/// [`ObjectCache::find`]: crate::cache::ObjectCache::find
pub trait Archive: Send + Sync + 'static {
    /// Fetch the object bound to `id`, or `None`.
    fn get_object(&self, type_info: TypeInfo, id: &str) -> Option<Arc<dyn PublicObject>>;
}
