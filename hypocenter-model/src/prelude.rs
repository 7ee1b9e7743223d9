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

//! Re-exports commonly used types and traits.

#[cfg(any(test, feature = "test_utils"))]
pub use crate::test_utils::*;
pub use crate::{
    factory::{FactoryRegistry, ObjectFactory},
    ident::{PublicId, TypeInfo, Typed},
    notify::{Notification, Operation},
    object::{Object, ObjectState},
    observer::Observer,
    public::{PublicObject, PublicObjectState},
    registry::Registry,
    visitor::{walk_public, TraversalMode, Visitor},
};
