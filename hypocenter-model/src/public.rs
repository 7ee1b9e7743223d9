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

use std::{fmt::Debug, ops::Deref};

use hypocenter_common::strict_assert;

use crate::{
    ident::{PublicId, TypeInfo},
    object::{Object, ObjectState},
    registry::Registry,
};

/// Identity state of a public object.
///
/// Wraps the plain [`ObjectState`] with the mandatory public identity.
pub struct PublicObjectState {
    base: ObjectState,
    id: PublicId,
}

impl Debug for PublicObjectState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicObjectState")
            .field("type_info", &self.base.type_info())
            .field("public_id", &self.id)
            .finish()
    }
}

impl PublicObjectState {
    /// State for a public object identified by `id`.
    ///
    /// The state starts out unregistered. Registration happens through
    /// [`Registry::register`] once the object is fully constructed.
    ///
    /// [`Registry::register`]: crate::registry::Registry::register
    pub fn new(registry: &Registry, type_info: TypeInfo, id: impl Into<PublicId>) -> Self {
        let id = id.into();
        strict_assert!(!id.as_str().is_empty());
        Self {
            base: ObjectState::with_public_id(registry, type_info, id.clone()),
            id,
        }
    }

    /// Public identity of the object.
    pub fn public_id(&self) -> &PublicId {
        &self.id
    }

    /// State for a detached, unregistered copy of the object.
    pub fn clone_detached(&self) -> Self {
        Self {
            base: self.base.detached_copy(),
            id: self.id.clone(),
        }
    }
}

impl Deref for PublicObjectState {
    type Target = ObjectState;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

/// Objects that carry a process-unique public identity.
pub trait PublicObject: Object {
    /// Identity state of the public object.
    fn public_state(&self) -> &PublicObjectState;

    /// Upcast to a public object reference.
    fn as_public(&self) -> &dyn PublicObject;

    /// Process-unique identity of the object.
    fn public_id(&self) -> &PublicId {
        self.public_state().public_id()
    }

    /// Whether the object currently holds its identity registration.
    fn registered(&self) -> bool {
        self.public_state().registered()
    }

    /// Announce that `child` was attached below this object.
    fn child_added(&self, child: &dyn Object) {
        if let Some(core) = self.public_state().registry_core() {
            core.object_attached(self.as_public(), child);
        }
    }

    /// Announce that `child` was detached from below this object.
    fn child_removed(&self, child: &dyn Object) {
        if let Some(core) = self.public_state().registry_core() {
            core.object_detached(self.as_public(), child);
        }
    }
}
